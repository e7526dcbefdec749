//! Data transfer objects for web requests and responses.
//!
//! Boolean query parameters arrive as free text: `true`, `1` and `yes`
//! (any case) mean true, anything else or absence means false.

use serde::{Deserialize, Serialize};

use crate::loose::is_truthy;

/// Query for `GET /api/stops/search`.
#[derive(Debug, Default, Deserialize)]
pub struct StopSearchRequest {
    /// Free-text stop name (required)
    pub q: Option<String>,

    /// Preferred city
    pub city: Option<String>,

    /// Include coordinates
    pub location: Option<String>,
}

impl StopSearchRequest {
    pub fn include_location(&self) -> bool {
        flag(self.location.as_deref())
    }
}

/// Query for `GET /api/stops/{stopId}`.
#[derive(Debug, Default, Deserialize)]
pub struct DeparturesRequest {
    /// Detailed mode
    pub detailed: Option<String>,

    /// Include delays
    pub delay: Option<String>,

    /// Platform/track token to filter by
    pub track: Option<String>,
}

impl DeparturesRequest {
    pub fn detailed(&self) -> bool {
        flag(self.detailed.as_deref())
    }

    pub fn include_delay(&self) -> bool {
        flag(self.delay.as_deref())
    }

    /// The track token, if a non-empty one was given.
    pub fn track(&self) -> Option<&str> {
        self.track.as_deref().filter(|t| !t.is_empty())
    }
}

fn flag(value: Option<&str>) -> bool {
    value.is_some_and(is_truthy)
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags() {
        let req = DeparturesRequest {
            detailed: Some("YES".to_string()),
            delay: Some("0".to_string()),
            track: Some(String::new()),
        };
        assert!(req.detailed());
        assert!(!req.include_delay());
        assert_eq!(req.track(), None);

        let req = DeparturesRequest::default();
        assert!(!req.detailed());
        assert!(!req.include_delay());
    }

    #[test]
    fn location_flag() {
        let req = StopSearchRequest {
            location: Some("True".to_string()),
            ..StopSearchRequest::default()
        };
        assert!(req.include_location());
        assert!(!StopSearchRequest::default().include_location());
    }
}
