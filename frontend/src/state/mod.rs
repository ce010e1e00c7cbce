pub mod availability_controller;
pub mod refresh_registry;

pub use availability_controller::{AvailabilityController, AvailabilityState, ControllerOptions, Phase};
pub use refresh_registry::RefreshRegistry;
