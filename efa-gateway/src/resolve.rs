//! Stop resolution: free text to a ranked list of candidate stops.
//!
//! # City preference
//!
//! EFA offers two ways to prefer a city. Passing it as a *filter* makes
//! upstream drop other cities, but combined with a wildcard pattern some
//! deployments then answer with an empty list. Passing it as a *sort hint*
//! (`anyResSort_sf`) only reorders. We use the sort hint and rank
//! client-side with a stable sort on match quality, so the city preference
//! survives inside each quality tier and a city mismatch can never empty
//! the result on its own.

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{Coordinates, StopCandidate};
use crate::efa::{EfaApi, EfaError, StopFinderRequest};
use crate::loose;

/// Wildcard marker appended to queries for prefix matching.
const WILDCARD: char = '*';

const MATCH_QUALITY_KEYS: &[&str] = &["matchQuality", "matchquality", "quality"];
const IS_BEST_KEYS: &[&str] = &["isBest", "isbest"];

/// A stop search as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopQuery {
    /// Free text typed by the user.
    pub text: String,
    /// Preferred city; empty for none.
    pub preferred_city: String,
    /// Attach coordinates to candidates.
    pub include_location: bool,
}

impl StopQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.preferred_city = city.into();
        self
    }

    pub fn with_location(mut self, include: bool) -> Self {
        self.include_location = include;
        self
    }

    /// The upstream request for this query, or `None` for an empty query.
    pub fn to_request(&self) -> Option<StopFinderRequest> {
        if self.text.is_empty() {
            return None;
        }

        let mut pattern = self.text.clone();
        if !pattern.ends_with(WILDCARD) {
            pattern.push(WILDCARD);
        }

        let sort_city = Some(self.preferred_city.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Some(StopFinderRequest {
            pattern,
            sort_city,
            with_coordinates: self.include_location,
        })
    }
}

/// Resolve a query into ranked stop candidates.
///
/// An empty query returns no candidates without contacting upstream.
/// Upstream and decode failures are returned as-is; nothing is retried.
pub async fn resolve<C: EfaApi>(
    client: &C,
    query: &StopQuery,
) -> Result<Vec<StopCandidate>, EfaError> {
    let Some(request) = query.to_request() else {
        return Ok(Vec::new());
    };

    let raw = client.stop_finder(&request).await?;
    let candidates = rank(extract_candidates(&raw, query.include_location));

    debug!(
        query = %query.text,
        count = candidates.len(),
        "resolved stop candidates"
    );
    Ok(candidates)
}

/// Pull candidates out of a stop-finder payload, in upstream order.
///
/// `stopFinder.points` may be an array, a single point object, or EFA's
/// one-hit shape `{"point": {...}}`. Points without a `stateless`
/// identifier are incomplete and dropped.
pub fn extract_candidates(raw: &Value, include_location: bool) -> Vec<StopCandidate> {
    let Some(points) = raw.get("stopFinder").and_then(|sf| sf.get("points")) else {
        return Vec::new();
    };

    let points: Vec<&Value> = match points {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("point") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(inner @ Value::Object(_)) => vec![inner],
            _ => vec![points],
        },
        _ => Vec::new(),
    };

    points
        .into_iter()
        .filter_map(Value::as_object)
        .filter_map(|p| candidate_from_point(p, include_location))
        .collect()
}

fn candidate_from_point(
    point: &Map<String, Value>,
    include_location: bool,
) -> Option<StopCandidate> {
    let id = point.get("stateless").and_then(loose::parse_string)?;

    let coordinates = if include_location {
        point.get("ref").and_then(|r| r.get("coords")).and_then(parse_coords)
    } else {
        None
    };

    Some(StopCandidate {
        id,
        name: point
            .get("name")
            .map_or_else(|| "Unknown".to_string(), |v| loose::string_or(v, "Unknown")),
        city: point.get("place").map(|v| loose::string_or(v, "")),
        match_quality: loose::int_field(point, MATCH_QUALITY_KEYS, -1),
        is_best: loose::bool_field(point, IS_BEST_KEYS, false),
        coordinates,
    })
}

fn parse_coords(value: &Value) -> Option<Coordinates> {
    match value {
        Value::String(s) => Coordinates::parse_xy(s),
        Value::Array(items) if items.len() == 2 => Some(Coordinates {
            lon: items[0].as_f64()?,
            lat: items[1].as_f64()?,
        }),
        _ => None,
    }
}

/// Rank candidates by match quality, best first.
///
/// The sort is stable and uses no secondary key: among equal qualities the
/// upstream order, which already reflects the city sort hint, is kept.
///
/// If upstream marked no candidate as best, every candidate sharing the top
/// quality is marked, provided that quality is known (>= 0).
pub fn rank(mut candidates: Vec<StopCandidate>) -> Vec<StopCandidate> {
    candidates.sort_by(|a, b| b.match_quality.cmp(&a.match_quality));

    let any_marked = candidates.iter().any(|c| c.is_best);
    if let Some(top) = candidates.first().map(|c| c.match_quality)
        && !any_marked
        && top >= 0
    {
        for c in &mut candidates {
            c.is_best = c.match_quality == top;
        }
    }

    candidates
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_candidates() -> impl Strategy<Value = Vec<StopCandidate>> {
        prop::collection::vec((-1i64..5, any::<bool>()), 0..30).prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (quality, is_best))| StopCandidate {
                    id: format!("stop{i}"),
                    name: format!("Stop {i}"),
                    city: None,
                    match_quality: quality,
                    is_best,
                    coordinates: None,
                })
                .collect()
        })
    }

    fn upstream_index(c: &StopCandidate) -> usize {
        c.id.trim_start_matches("stop").parse().unwrap()
    }

    proptest! {
        /// Output is non-increasing in match quality
        #[test]
        fn sorted_by_quality(candidates in arb_candidates()) {
            let ranked = rank(candidates);
            for w in ranked.windows(2) {
                prop_assert!(w[0].match_quality >= w[1].match_quality);
            }
        }

        /// Equal-quality candidates keep their upstream order
        #[test]
        fn ties_keep_upstream_order(candidates in arb_candidates()) {
            let ranked = rank(candidates);
            for w in ranked.windows(2) {
                if w[0].match_quality == w[1].match_quality {
                    prop_assert!(upstream_index(&w[0]) < upstream_index(&w[1]));
                }
            }
        }

        /// Ranking is a permutation of the input
        #[test]
        fn ranking_keeps_every_candidate(candidates in arb_candidates()) {
            let n = candidates.len();
            let ranked = rank(candidates);
            let mut seen: Vec<usize> = ranked.iter().map(upstream_index).collect();
            seen.sort_unstable();
            prop_assert_eq!(seen, (0..n).collect::<Vec<_>>());
        }

        /// Without upstream best marks, best == exactly the top-quality tier
        #[test]
        fn inferred_best_is_top_tier(candidates in arb_candidates()) {
            let unmarked: Vec<StopCandidate> = candidates
                .into_iter()
                .map(|c| StopCandidate { is_best: false, ..c })
                .collect();
            let max = unmarked.iter().map(|c| c.match_quality).max();
            let ranked = rank(unmarked);

            for c in &ranked {
                let expected = matches!(max, Some(m) if m >= 0 && c.match_quality == m);
                prop_assert_eq!(c.is_best, expected);
            }
        }
    }
}
