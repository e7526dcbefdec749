//! Normalized departure records.

use serde::Serialize;

/// Response-shaping flags for a departure board request.
///
/// Different flag combinations produce differently-shaped records for the
/// same stop, so they are part of the cache key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BoardOptions {
    /// Add accessibility, vehicle and hint fields.
    pub detailed: bool,
    /// Add `delay_minutes` where upstream supplies a delay.
    pub include_delay: bool,
}

/// One upcoming departure, normalized from an EFA departure-list entry.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Departure {
    /// Line number, `"?"` if upstream gave none.
    pub line: String,

    /// Direction text, `"Unknown"` if upstream gave none.
    pub direction: String,

    /// EFA means-of-transport code, -1 if unknown.
    pub mot: i64,

    /// Platform label, `"Unknown"` if upstream gave none.
    pub platform: String,

    /// Upstream countdown, passed through unvalidated.
    pub minutes_remaining: i64,

    /// Whether upstream attached a realtime timestamp.
    pub is_realtime: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay_minutes: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_floor: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wheelchair_accessible: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_length: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_composition: Option<String>,

    /// Free-text hints; never empty when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<String>>,
}

impl Departure {
    /// A record carrying only the sentinel values.
    pub fn unknown() -> Self {
        Self {
            line: "?".to_string(),
            direction: "Unknown".to_string(),
            mot: -1,
            platform: "Unknown".to_string(),
            minutes_remaining: 0,
            is_realtime: false,
            delay_minutes: None,
            low_floor: None,
            wheelchair_accessible: None,
            train_type: None,
            train_length: None,
            train_composition: None,
            hints: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_record_serialization() {
        let json = serde_json::to_string(&Departure::unknown()).unwrap();
        assert_eq!(
            json,
            r#"{"line":"?","direction":"Unknown","mot":-1,"platform":"Unknown","minutes_remaining":0,"is_realtime":false}"#
        );
    }

    #[test]
    fn detailed_fields_serialize_when_set() {
        let dep = Departure {
            low_floor: Some(true),
            wheelchair_accessible: Some(true),
            hints: Some(vec!["Niederflurfahrzeug".to_string()]),
            ..Departure::unknown()
        };
        let value = serde_json::to_value(&dep).unwrap();
        assert_eq!(value["low_floor"], true);
        assert_eq!(value["wheelchair_accessible"], true);
        assert_eq!(value["hints"][0], "Niederflurfahrzeug");
        assert!(value.get("delay_minutes").is_none());
    }
}
