pub mod api;
pub mod cache;
pub mod config;
pub mod date_utils;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod normalize;
pub mod notifications;
pub mod status_classifier;
