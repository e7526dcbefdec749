//! Stop search results.

use serde::Serialize;

/// A WGS84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinates {
    /// Parse EFA's `"x,y"` coordinate string (`WGS84[dd.ddddd]` output,
    /// longitude first).
    ///
    /// ```
    /// use efa_gateway::domain::Coordinates;
    ///
    /// let c = Coordinates::parse_xy("8.40365,49.00937").unwrap();
    /// assert_eq!(c.lon, 8.40365);
    /// assert_eq!(c.lat, 49.00937);
    ///
    /// assert!(Coordinates::parse_xy("somewhere").is_none());
    /// ```
    pub fn parse_xy(s: &str) -> Option<Self> {
        let (x, y) = s.split_once(',')?;
        let lon = x.trim().parse::<f64>().ok()?;
        let lat = y.trim().parse::<f64>().ok()?;
        Some(Self { lon, lat })
    }
}

/// A candidate stop for a free-text query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopCandidate {
    /// Opaque upstream identifier (EFA `stateless`).
    pub id: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Upstream match quality; -1 when upstream did not supply one.
    pub match_quality: i64,

    pub is_best: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_xy_tolerates_spaces() {
        let c = Coordinates::parse_xy(" 8.4 , 49.0 ").unwrap();
        assert_eq!(c, Coordinates { lon: 8.4, lat: 49.0 });
    }

    #[test]
    fn parse_xy_rejects_partial() {
        assert!(Coordinates::parse_xy("8.4").is_none());
        assert!(Coordinates::parse_xy("8.4,").is_none());
        assert!(Coordinates::parse_xy(",49.0").is_none());
    }

    #[test]
    fn serializes_without_absent_fields() {
        let stop = StopCandidate {
            id: "de:08212:1".to_string(),
            name: "Marktplatz".to_string(),
            city: None,
            match_quality: 950,
            is_best: true,
            coordinates: None,
        };
        let json = serde_json::to_string(&stop).unwrap();
        assert_eq!(
            json,
            r#"{"id":"de:08212:1","name":"Marktplatz","match_quality":950,"is_best":true}"#
        );
    }
}
