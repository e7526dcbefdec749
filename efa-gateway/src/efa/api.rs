//! The provider capability consumed by the resolver and the cache.

use std::future::Future;

use serde_json::Value;

use super::error::EfaError;

/// Parameters for one stop-finder request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopFinderRequest {
    /// Name pattern, already carrying its trailing `*` wildcard.
    pub pattern: String,

    /// City passed upstream as a sort hint (`anyResSort_sf`). Upstream may
    /// ignore it; it never filters.
    pub sort_city: Option<String>,

    /// Ask upstream for WGS84 coordinates.
    pub with_coordinates: bool,
}

/// Source of raw EFA payloads.
///
/// Implemented by [`super::EfaClient`] for the live provider and by
/// [`super::MockEfaClient`] for development and tests.
pub trait EfaApi: Send + Sync {
    /// Fetch the raw stop-finder response.
    fn stop_finder(
        &self,
        request: &StopFinderRequest,
    ) -> impl Future<Output = Result<Value, EfaError>> + Send;

    /// Fetch the raw departure-monitor response for one stop.
    fn departure_board(
        &self,
        stop_id: &str,
    ) -> impl Future<Output = Result<Value, EfaError>> + Send;
}
