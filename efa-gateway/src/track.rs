//! Platform/track filtering of normalized departures.
//!
//! Platform labels are free text (`"1"`, `"1 (U)"`, `"Gleis 1"`,
//! `"Gl. 1"`), so a requested track token is matched in three tiers:
//! 1. exact equality;
//! 2. prefix, provided the next character is not a digit (`"1"` matches
//!    `"1 (U)"` but not `"10"`);
//! 3. the token preceded by a space or by `"Gleis "` anywhere in the label.

use crate::domain::Departure;

/// Whether `platform` matches the requested `track` token.
pub fn platform_matches(platform: &str, track: &str) -> bool {
    if platform == track {
        return true;
    }

    if let Some(rest) = platform.strip_prefix(track)
        && !rest.starts_with(|c: char| c.is_ascii_digit())
    {
        return true;
    }

    platform.contains(&format!(" {track}")) || platform.contains(&format!("Gleis {track}"))
}

/// Keep the departures whose platform matches `track`, in input order.
pub fn filter_by_track<'a, I>(departures: I, track: &str) -> Vec<Departure>
where
    I: IntoIterator<Item = &'a Departure>,
{
    departures
        .into_iter()
        .filter(|d| platform_matches(&d.platform, track))
        .cloned()
        .collect()
}
