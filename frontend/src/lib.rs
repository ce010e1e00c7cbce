//! Availability view-state core of the coworking booking admin.
//!
//! - [`services`]: classification, date navigation, caching, fetching and normalization
//! - [`state`]: the view-state controller and the refresh registry
//! - [`components`]: pure day/week/month view-model builders

pub mod components;
pub mod services;
pub mod state;

pub use components::{render_calendar, CalendarView, CellAction};
pub use services::api::{ApiClient, AvailabilityApi, AvailabilityQuery};
pub use services::cache::{AvailabilityCache, CacheKey, InMemoryAvailabilityCache, NoopAvailabilityCache};
pub use services::config::{AvailabilityConfig, BusinessHours};
pub use services::error::{AvailabilityError, FetchError, NormalizationError};
pub use services::fetcher::AvailabilityFetcher;
pub use state::{AvailabilityController, AvailabilityState, ControllerOptions, Phase, RefreshRegistry};
