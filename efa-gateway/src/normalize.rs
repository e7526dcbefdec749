//! Departure board normalization.
//!
//! Turns a raw EFA departure-monitor payload into [`Departure`] records.
//! Every entry of `departureList` yields exactly one record; missing or
//! mistyped fields fall back to documented sentinels instead of dropping
//! the entry.
//!
//! # Accessibility in detailed mode
//!
//! Low-floor and wheelchair flags are inferred in this order:
//! 1. the structured attributes `planLowFloorVehicle` /
//!    `planWheelchairAccess` on the departure (names case-insensitive);
//! 2. otherwise, known German/English phrases in the serving line's hints;
//! 3. a low-floor vehicle is always reported as wheelchair accessible.

use serde_json::{Map, Value};

use crate::domain::{BoardOptions, Departure};
use crate::loose;

const LOW_FLOOR_ATTR: &str = "planlowfloorvehicle";
const WHEELCHAIR_ATTR: &str = "planwheelchairaccess";

const LOW_FLOOR_PHRASES: &[&str] = &["Niederflur", "low floor", "lowFloor"];
const WHEELCHAIR_PHRASES: &[&str] = &["Rollstuhl", "wheelchair", "barrierefrei", "barrier-free"];

/// Normalize a departure-monitor payload.
///
/// A payload without a `departureList` array is an empty board, not an
/// error.
pub fn normalize_board(raw: &Value, options: BoardOptions) -> Vec<Departure> {
    let Some(entries) = raw.get("departureList").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|entry| match entry.as_object() {
            Some(obj) => normalize_entry(obj, options),
            None => normalize_entry(&Map::new(), options),
        })
        .collect()
}

/// Normalize one `departureList` entry.
pub fn normalize_entry(entry: &Map<String, Value>, options: BoardOptions) -> Departure {
    let mut dep = Departure::unknown();
    let serving_line = entry.get("servingLine").and_then(Value::as_object);

    if let Some(sl) = serving_line {
        if let Some(v) = sl.get("number") {
            dep.line = loose::string_or(v, "?");
        }
        if let Some(v) = sl.get("direction") {
            dep.direction = loose::string_or(v, "Unknown");
        }
        if let Some(v) = sl.get("motType") {
            dep.mot = loose::int_or(v, -1);
        }
        if options.include_delay {
            dep.delay_minutes = sl.get("delay").map(|v| loose::int_or(v, 0));
        }
    }

    dep.platform = ["platform", "platformName"]
        .iter()
        .find_map(|k| entry.get(*k))
        .map_or_else(|| "Unknown".to_string(), |v| loose::string_or(v, "Unknown"));

    dep.minutes_remaining = entry.get("countdown").map_or(0, |v| loose::int_or(v, 0));
    dep.is_realtime = entry.contains_key("realDateTime");

    if options.detailed {
        let (low_floor, wheelchair) = accessibility(entry, serving_line);
        dep.low_floor = Some(low_floor);
        dep.wheelchair_accessible = Some(wheelchair || low_floor);

        if let Some(sl) = serving_line {
            dep.train_type = sl.get("trainType").map(|v| loose::string_or(v, ""));
            match sl.get("trainLength") {
                Some(v) => dep.train_length = Some(loose::string_or(v, "")),
                None => {
                    dep.train_composition =
                        sl.get("trainComposition").map(|v| loose::string_or(v, ""))
                }
            }
        }

        dep.hints = departure_hints(entry);
    }

    dep
}

/// Infer `(low_floor, wheelchair)` before the low-floor implication.
fn accessibility(
    entry: &Map<String, Value>,
    serving_line: Option<&Map<String, Value>>,
) -> (bool, bool) {
    let mut attr_low_floor = None;
    let mut attr_wheelchair = None;

    for attr in entry
        .get("attrs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
    {
        let name = attr
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_ascii_lowercase();
        let value = attr.get("value").is_some_and(|v| loose::bool_or(v, false));

        if name == LOW_FLOOR_ATTR {
            attr_low_floor = Some(value);
        } else if name == WHEELCHAIR_ATTR {
            attr_wheelchair = Some(value);
        }
    }

    let hint_texts: Vec<String> = serving_line
        .and_then(|sl| sl.get("hints"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(hint_text)
        .collect();

    let mentions = |phrases: &[&str]| {
        hint_texts
            .iter()
            .any(|t| phrases.iter().any(|p| t.contains(p)))
    };

    let low_floor = attr_low_floor.unwrap_or_else(|| mentions(LOW_FLOOR_PHRASES));
    let wheelchair = attr_wheelchair.unwrap_or_else(|| mentions(WHEELCHAIR_PHRASES));
    (low_floor, wheelchair)
}

/// Text of a hint entry: its `hint` field, else `content`.
fn hint_text(hint: &Value) -> Option<String> {
    let obj = hint.as_object()?;
    obj.get("hint")
        .or_else(|| obj.get("content"))
        .and_then(loose::parse_string)
}

/// Non-empty per-departure hint texts, or `None` if there are none.
fn departure_hints(entry: &Map<String, Value>) -> Option<Vec<String>> {
    let hints: Vec<String> = entry
        .get("hints")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(hint_text)
        .filter(|t| !t.is_empty())
        .collect();

    (!hints.is_empty()).then_some(hints)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i32>().prop_map(|n| json!(n)),
            "[0-9]{1,3}".prop_map(Value::String),
            "[a-zA-Z ]{0,12}".prop_map(Value::String),
            any::<bool>().prop_map(Value::Bool),
            Just(Value::Null),
        ]
    }

    fn arb_entry() -> impl Strategy<Value = Value> {
        (
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            prop::option::of(arb_scalar()),
            any::<bool>(),
            prop::collection::vec("[a-zA-Z ]{0,20}", 0..3),
        )
            .prop_map(|(countdown, platform, number, mot, realtime, hints)| {
                let mut entry = serde_json::Map::new();
                if let Some(c) = countdown {
                    entry.insert("countdown".into(), c);
                }
                if let Some(p) = platform {
                    entry.insert("platform".into(), p);
                }
                let mut sl = serde_json::Map::new();
                if let Some(n) = number {
                    sl.insert("number".into(), n);
                }
                if let Some(m) = mot {
                    sl.insert("motType".into(), m);
                }
                sl.insert(
                    "hints".into(),
                    Value::Array(hints.iter().map(|h| json!({"hint": h})).collect()),
                );
                entry.insert("servingLine".into(), Value::Object(sl));
                if realtime {
                    entry.insert("realDateTime".into(), json!({}));
                }
                entry.insert(
                    "hints".into(),
                    Value::Array(hints.iter().map(|h| json!({"content": h})).collect()),
                );
                Value::Object(entry)
            })
    }

    fn arb_options() -> impl Strategy<Value = BoardOptions> {
        (any::<bool>(), any::<bool>()).prop_map(|(detailed, include_delay)| BoardOptions {
            detailed,
            include_delay,
        })
    }

    proptest! {
        /// One output record per upstream entry
        #[test]
        fn one_record_per_entry(
            entries in prop::collection::vec(arb_entry(), 0..15),
            options in arb_options()
        ) {
            let board = json!({"departureList": entries});
            prop_assert_eq!(normalize_board(&board, options).len(), entries.len());
        }

        /// Re-running on the same payload gives byte-identical output
        #[test]
        fn normalization_is_deterministic(
            entries in prop::collection::vec(arb_entry(), 0..15),
            options in arb_options()
        ) {
            let board = json!({"departureList": entries});
            let first = serde_json::to_string(&normalize_board(&board, options)).unwrap();
            let second = serde_json::to_string(&normalize_board(&board, options)).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Detailed mode never reports low floor without wheelchair access
        #[test]
        fn low_floor_implies_accessible(entries in prop::collection::vec(arb_entry(), 0..15)) {
            let board = json!({"departureList": entries});
            let options = BoardOptions { detailed: true, include_delay: false };
            for dep in normalize_board(&board, options) {
                if dep.low_floor == Some(true) {
                    prop_assert_eq!(dep.wheelchair_accessible, Some(true));
                }
                if let Some(hints) = &dep.hints {
                    prop_assert!(!hints.is_empty());
                    prop_assert!(hints.iter().all(|h| !h.is_empty()));
                }
            }
        }
    }
}
