//! EFA HTTP client.
//!
//! Issues the stop-finder and departure-monitor GETs against an EFA
//! deployment. Every request carries a bounded timeout; a timed-out call
//! fails the same way a non-success status does.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::api::{EfaApi, StopFinderRequest};
use super::error::EfaError;

/// Default EFA deployment (KVV Karlsruhe).
const DEFAULT_BASE_URL: &str = "https://projekte.kvv-efa.de/sl3-alone";

/// Default maximum concurrent upstream requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Default number of departures requested per board.
const DEFAULT_DEPARTURE_LIMIT: u16 = 40;

/// Maximum number of stop candidates requested per search.
const STOP_FINDER_MAX_HITS: &str = "100";

/// Configuration for the EFA client.
#[derive(Debug, Clone)]
pub struct EfaConfig {
    /// Base URL of the EFA deployment, without trailing slash
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Departures requested per board (`limit`)
    pub departure_limit: u16,
}

impl EfaConfig {
    /// Create a config pointing at the default deployment.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 10,
            departure_limit: DEFAULT_DEPARTURE_LIMIT,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the number of departures requested per board.
    pub fn with_departure_limit(mut self, limit: u16) -> Self {
        self.departure_limit = limit;
        self
    }
}

impl Default for EfaConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// EFA API client.
///
/// Uses a semaphore to bound concurrent upstream requests.
#[derive(Debug, Clone)]
pub struct EfaClient {
    http: reqwest::Client,
    base_url: String,
    departure_limit: u16,
    semaphore: Arc<Semaphore>,
}

impl EfaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: EfaConfig) -> Result<Self, EfaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            departure_limit: config.departure_limit,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    fn stop_finder_url(&self) -> String {
        format!("{}/XSLT_STOPFINDER_REQUEST", self.base_url)
    }

    fn departure_monitor_url(&self) -> String {
        format!("{}/XSLT_DM_REQUEST", self.base_url)
    }

    /// GET `url` and decode the body as a JSON object.
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, EfaError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| EfaError::NotConfigured("request semaphore closed".to_string()))?;

        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "EFA returned non-success status");
            return Err(EfaError::Upstream {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        decode_object(&body)
    }
}

impl EfaApi for EfaClient {
    async fn stop_finder(&self, request: &StopFinderRequest) -> Result<Value, EfaError> {
        let mut query = vec![
            ("outputFormat", "JSON".to_string()),
            ("locationServerActive", "1".to_string()),
            ("type_sf", "any".to_string()),
            ("name_sf", request.pattern.clone()),
            ("anyObjFilter_sf", "2".to_string()),
            ("anyMaxSizeHitList", STOP_FINDER_MAX_HITS.to_string()),
        ];
        if request.with_coordinates {
            query.push(("coordOutputFormat", "WGS84[dd.ddddd]".to_string()));
        }
        if let Some(city) = &request.sort_city {
            query.push(("anyResSort_sf", city.clone()));
        }

        debug!(pattern = %request.pattern, city = ?request.sort_city, "stop finder request");
        self.get_json(&self.stop_finder_url(), &query).await
    }

    async fn departure_board(&self, stop_id: &str) -> Result<Value, EfaError> {
        let query = [
            ("outputFormat", "JSON".to_string()),
            ("depType", "stopEvents".to_string()),
            ("mode", "direct".to_string()),
            ("type_dm", "stop".to_string()),
            ("name_dm", stop_id.to_string()),
            ("useRealtime", "1".to_string()),
            ("limit", self.departure_limit.to_string()),
        ];

        debug!(%stop_id, "departure monitor request");
        self.get_json(&self.departure_monitor_url(), &query).await
    }
}

/// Decode a response body, requiring a top-level JSON object.
pub(crate) fn decode_object(body: &str) -> Result<Value, EfaError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| EfaError::decode(e.to_string(), body))?;
    if !value.is_object() {
        return Err(EfaError::decode("expected a JSON object at top level", body));
    }
    Ok(value)
}
