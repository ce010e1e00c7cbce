//! Configuration for the availability core.
//!
//! Loaded from a YAML file with every field optional; missing values fall
//! back to the defaults below. `COWORKING_API_URL` overrides the base URL.

use chrono::{Duration as ChronoDuration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const API_URL_ENV: &str = "COWORKING_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid time '{value}' for {field}, expected HH:MM")]
    InvalidTime { field: &'static str, value: String },

    #[error("Invalid business hours: {0}")]
    InvalidHours(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityConfig {
    pub api: ApiConfig,
    pub business_hours: BusinessHours,
}

/// Where the availability endpoint lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Path segment before the resource id, without leading or trailing slash
    pub endpoint_path: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            endpoint_path: "api/espacios/disponibilidad".to_string(),
            request_timeout_secs: 20,
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Operating hours of a space.
///
/// Slots are generated up to `slot_close`, while the selectable-hour list in
/// booking forms runs to `selectable_close`. Both closes are kept per space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessHours {
    pub opening: String,
    pub slot_close: String,
    pub selectable_close: String,
    pub slot_minutes: u32,
    /// End of the morning half-day, start of the afternoon
    pub midday: String,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            opening: "08:00".to_string(),
            slot_close: "20:00".to_string(),
            selectable_close: "22:00".to_string(),
            slot_minutes: 60,
            midday: "14:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalfDay {
    Morning,
    Afternoon,
}

pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

impl BusinessHours {
    fn time(field: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
        parse_hhmm(value).ok_or_else(|| ConfigError::InvalidTime {
            field,
            value: value.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let opening = Self::time("opening", &self.opening)?;
        let slot_close = Self::time("slot_close", &self.slot_close)?;
        let selectable_close = Self::time("selectable_close", &self.selectable_close)?;
        let midday = Self::time("midday", &self.midday)?;

        if self.slot_minutes == 0 {
            return Err(ConfigError::InvalidHours("slot_minutes must be positive".to_string()));
        }
        if opening >= slot_close || opening >= selectable_close {
            return Err(ConfigError::InvalidHours(format!(
                "opening {} must be before closing time",
                self.opening
            )));
        }
        if midday <= opening || midday >= slot_close {
            return Err(ConfigError::InvalidHours(format!(
                "midday {} must fall inside {}-{}",
                self.midday, self.opening, self.slot_close
            )));
        }
        Ok(())
    }

    /// Bookable (start, end) pairs from opening to the slot close
    pub fn slot_ranges(&self) -> Vec<(NaiveTime, NaiveTime)> {
        let (Some(opening), Some(close)) = (parse_hhmm(&self.opening), parse_hhmm(&self.slot_close)) else {
            return Vec::new();
        };
        if self.slot_minutes == 0 {
            return Vec::new();
        }
        let step = ChronoDuration::minutes(i64::from(self.slot_minutes));

        let mut ranges = Vec::new();
        let mut start = opening;
        while start < close {
            let end = start + step;
            // Wrapped past midnight or overshot the close
            if end <= start || end > close {
                break;
            }
            ranges.push((start, end));
            start = end;
        }
        ranges
    }

    /// Number of rows a slot-based day view has
    pub fn slot_count(&self) -> usize {
        self.slot_ranges().len()
    }

    /// Whole hours offered in booking forms, opening to selectable close inclusive
    pub fn selectable_hours(&self) -> Vec<String> {
        let (Some(opening), Some(close)) = (parse_hhmm(&self.opening), parse_hhmm(&self.selectable_close)) else {
            return Vec::new();
        };
        (opening.hour()..=close.hour())
            .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
            .filter(|time| *time >= opening && *time <= close)
            .map(format_hhmm)
            .collect()
    }

    /// Fixed half-day split, morning from opening to midday and afternoon to the slot close
    pub fn half_day(&self, half: HalfDay) -> (String, String) {
        match half {
            HalfDay::Morning => (self.opening.clone(), self.midday.clone()),
            HalfDay::Afternoon => (self.midday.clone(), self.slot_close.clone()),
        }
    }

    /// End time of a slot that only carries its start (legacy wire shape)
    pub fn slot_end_for(&self, start: &str) -> String {
        match parse_hhmm(start) {
            Some(time) => {
                let end = time + ChronoDuration::minutes(i64::from(self.slot_minutes));
                format_hhmm(end)
            }
            None => start.to_string(),
        }
    }
}

impl AvailabilityConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: AvailabilityConfig = serde_yaml::from_str(yaml)?;
        config.business_hours.validate()?;
        Ok(config)
    }

    /// Load from a YAML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&yaml)?.with_env_overrides();
        tracing::info!(
            "Loaded availability config from {} (api: {})",
            path.display(),
            config.api.base_url
        );
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url.trim().to_string();
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AvailabilityConfig::default();
        assert_eq!(config.api.request_timeout(), Duration::from_secs(20));
        assert!(config.business_hours.validate().is_ok());
        assert_eq!(config.business_hours.slot_count(), 12);
        let ranges = config.business_hours.slot_ranges();
        assert_eq!(format_hhmm(ranges[0].0), "08:00");
        assert_eq!(format_hhmm(ranges[11].1), "20:00");
    }

    #[test]
    fn test_selectable_hours_run_to_22() {
        let hours = BusinessHours::default().selectable_hours();
        assert_eq!(hours.first().map(String::as_str), Some("08:00"));
        assert_eq!(hours.last().map(String::as_str), Some("22:00"));
        assert_eq!(hours.len(), 15);
    }

    #[test]
    fn test_half_day_split() {
        let hours = BusinessHours::default();
        assert_eq!(hours.half_day(HalfDay::Morning), ("08:00".to_string(), "14:00".to_string()));
        assert_eq!(hours.half_day(HalfDay::Afternoon), ("14:00".to_string(), "20:00".to_string()));
    }

    #[test]
    fn test_slot_end_for_legacy_slots() {
        let hours = BusinessHours::default();
        assert_eq!(hours.slot_end_for("08:00"), "09:00");
        assert_eq!(hours.slot_end_for("garbage"), "garbage");
        let half_hours = BusinessHours { slot_minutes: 30, ..BusinessHours::default() };
        assert_eq!(half_hours.slot_end_for("19:30"), "20:00");
        assert_eq!(half_hours.slot_count(), 24);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AvailabilityConfig::from_yaml_str(
            "api:\n  base_url: https://reservas.example.com\nbusiness_hours:\n  slot_close: \"22:00\"\n",
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://reservas.example.com");
        assert_eq!(config.api.endpoint_path, "api/espacios/disponibilidad");
        assert_eq!(config.business_hours.slot_count(), 14);
    }

    #[test]
    fn test_invalid_hours_are_rejected() {
        let err = AvailabilityConfig::from_yaml_str("business_hours:\n  opening: \"8am\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTime { field: "opening", .. }));

        let err = AvailabilityConfig::from_yaml_str("business_hours:\n  opening: \"21:00\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHours(_)));

        let err = AvailabilityConfig::from_yaml_str("business_hours:\n  slot_minutes: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHours(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api:\n  request_timeout_secs: 5").unwrap();
        let config = AvailabilityConfig::load(file.path()).unwrap();
        assert_eq!(config.api.request_timeout(), Duration::from_secs(5));

        let missing = AvailabilityConfig::load("/definitely/not/here.yaml");
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
