//! Pure text feature extraction from alert descriptions.
//!
//! All of this is heuristic pattern matching over free-form NWS prose.
//! The city heuristic in particular is a rough capitalized-word scan
//! kept deliberately as-is; downstream consumers depend on its output
//! shape.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use super::locale::is_state_abbrev;

/// Joined city lists longer than this are truncated before pagination.
const CITY_TEXT_LIMIT: usize = 1024;
const CITY_TRUNCATE_AT: usize = 1000;
const CITY_TRUNCATE_MARKER: &str = "... (see NWS link for full list)";

static WIND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*mph").expect("wind pattern"));
static GUST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gusts?\s*(?:up)?\s*to\s*(\d+)\s*mph").expect("gust pattern"));
static HAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*inch(?:es)?\s*hail").expect("hail pattern"));
static CITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)\b").expect("city pattern"));

/// Compound directions listed first so "moving northeast" resolves to
/// Northeast rather than North.
const DIRECTIONS: [(&str, &str); 8] = [
    ("northeast", "Northeast"),
    ("northwest", "Northwest"),
    ("southeast", "Southeast"),
    ("southwest", "Southwest"),
    ("north", "North"),
    ("south", "South"),
    ("east", "East"),
    ("west", "West"),
];

/// Storm metrics pulled out of a description. Absent wind, movement
/// and gust values render as "N/A"; absent hail is omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StormDetails {
    pub wind_speed: String,
    pub movement: String,
    pub gusts: String,
    pub hail_size: Option<String>,
}

/// Scan a description for wind, movement, gust and (optionally) hail
/// figures.
pub fn storm_details(description: &str, include_hail: bool) -> StormDetails {
    let lower = description.to_lowercase();

    // "<N> mph" not immediately followed by "gust": the first
    // qualifying figure wins.
    let wind_speed = WIND_RE
        .captures_iter(&lower)
        .find(|caps| {
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
            !lower[whole..].trim_start().starts_with("gust")
        })
        .map(|caps| format!("{} MPH", &caps[1]))
        .unwrap_or_else(|| "N/A".to_string());

    let movement = DIRECTIONS
        .iter()
        .find(|(keyword, _)| {
            lower.contains(&format!("moving {keyword}"))
                || lower.contains(&format!("heading {keyword}"))
        })
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let gusts = GUST_RE
        .captures(&lower)
        .map(|caps| format!("{} MPH", &caps[1]))
        .unwrap_or_else(|| "N/A".to_string());

    let hail_size = if include_hail {
        HAIL_RE
            .captures(&lower)
            .map(|caps| format!("{} inches", &caps[1]))
    } else {
        None
    };

    StormDetails {
        wind_speed,
        movement,
        gusts,
        hail_size,
    }
}

/// Best-effort list of candidate city names from the area text and
/// description, sorted and comma-joined. `None` when nothing matched.
pub fn extract_cities(area_desc: &str, description: &str) -> Option<String> {
    let text = format!("{area_desc} {description}");
    let cities: BTreeSet<&str> = CITY_RE
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|candidate| {
            candidate.len() > 2
                && !is_state_abbrev(candidate)
                && !candidate.to_lowercase().starts_with("county")
        })
        .collect();

    if cities.is_empty() {
        return None;
    }

    let mut joined = cities.into_iter().collect::<Vec<_>>().join(", ");
    if joined.len() > CITY_TEXT_LIMIT {
        let mut cut = CITY_TRUNCATE_AT;
        while !joined.is_char_boundary(cut) {
            cut -= 1;
        }
        // Back up to the last separator so no city name is cut in half.
        if let Some(boundary) = joined[..cut].rfind(", ") {
            cut = boundary;
        }
        joined.truncate(cut);
        joined.push_str(CITY_TRUNCATE_MARKER);
    }
    Some(joined)
}
