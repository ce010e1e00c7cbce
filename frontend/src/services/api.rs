use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use shared::{ResourceType, ViewMode};

use super::cache::CacheKey;
use super::config::ApiConfig;
use super::date_utils::format_date;
use super::error::{FetchError, NormalizationError};

/// Parameters of one availability request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AvailabilityQuery {
    pub resource_id: i64,
    pub date: NaiveDate,
    pub view_mode: ViewMode,
    pub resource_type: ResourceType,
}

impl AvailabilityQuery {
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.resource_id, self.date, self.view_mode, self.resource_type)
    }

    /// Query string pairs: `fecha`, `vista`, `tipo_espacio`
    pub fn query_params(&self) -> [(&'static str, String); 3] {
        [
            ("fecha", format_date(self.date)),
            ("vista", self.view_mode.as_str().to_string()),
            ("tipo_espacio", self.resource_type.as_str().to_string()),
        ]
    }
}

/// Transport for the availability endpoint, returning the raw JSON body
#[async_trait]
pub trait AvailabilityApi: Send + Sync {
    async fn get_availability(&self, query: &AvailabilityQuery) -> Result<Value, FetchError>;
}

/// API client for the booking backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    endpoint_path: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client with the default base URL
    pub fn new() -> Self {
        Self::from_config(&ApiConfig::default())
    }

    /// Create a new API client with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::new()
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            endpoint_path: config.endpoint_path.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// `{base_url}/{endpoint_path}/{resource_id}`
    pub fn availability_url(&self, resource_id: i64) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint_path.trim_matches('/'),
            resource_id
        )
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvailabilityApi for ApiClient {
    async fn get_availability(&self, query: &AvailabilityQuery) -> Result<Value, FetchError> {
        let url = self.availability_url(query.resource_id);
        tracing::debug!("GET {} {:?}", url, query.query_params());

        let response = self
            .http
            .get(&url)
            .query(&query.query_params())
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Normalization(NormalizationError::InvalidJson(e.to_string())))
    }
}
