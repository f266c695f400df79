//! State detection and timezone-aware time rendering.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Fallback timezone when no state can be resolved.
pub const DEFAULT_TZ: Tz = chrono_tz::America::New_York;

/// Placeholder for absent or unparseable timestamps.
pub const UNKNOWN_TIME: &str = "Unknown Time";

/// USPS state abbreviations mapped to their dominant IANA timezone.
const STATE_TIMEZONES: [(&str, Tz); 50] = [
    ("AK", chrono_tz::America::Anchorage),
    ("AL", chrono_tz::America::Chicago),
    ("AR", chrono_tz::America::Chicago),
    ("AZ", chrono_tz::America::Phoenix),
    ("CA", chrono_tz::America::Los_Angeles),
    ("CO", chrono_tz::America::Denver),
    ("CT", chrono_tz::America::New_York),
    ("DE", chrono_tz::America::New_York),
    ("FL", chrono_tz::America::New_York),
    ("GA", chrono_tz::America::New_York),
    ("HI", chrono_tz::Pacific::Honolulu),
    ("IA", chrono_tz::America::Chicago),
    ("ID", chrono_tz::America::Boise),
    ("IL", chrono_tz::America::Chicago),
    ("IN", chrono_tz::America::New_York),
    ("KS", chrono_tz::America::Chicago),
    ("KY", chrono_tz::America::New_York),
    ("LA", chrono_tz::America::Chicago),
    ("MA", chrono_tz::America::New_York),
    ("MD", chrono_tz::America::New_York),
    ("ME", chrono_tz::America::New_York),
    ("MI", chrono_tz::America::New_York),
    ("MN", chrono_tz::America::Chicago),
    ("MO", chrono_tz::America::Chicago),
    ("MS", chrono_tz::America::Chicago),
    ("MT", chrono_tz::America::Denver),
    ("NC", chrono_tz::America::New_York),
    ("ND", chrono_tz::America::Chicago),
    ("NE", chrono_tz::America::Chicago),
    ("NH", chrono_tz::America::New_York),
    ("NJ", chrono_tz::America::New_York),
    ("NM", chrono_tz::America::Denver),
    ("NV", chrono_tz::America::Los_Angeles),
    ("NY", chrono_tz::America::New_York),
    ("OH", chrono_tz::America::New_York),
    ("OK", chrono_tz::America::Chicago),
    ("OR", chrono_tz::America::Los_Angeles),
    ("PA", chrono_tz::America::New_York),
    ("RI", chrono_tz::America::New_York),
    ("SC", chrono_tz::America::New_York),
    ("SD", chrono_tz::America::Chicago),
    ("TN", chrono_tz::America::Chicago),
    ("TX", chrono_tz::America::Chicago),
    ("UT", chrono_tz::America::Denver),
    ("VA", chrono_tz::America::New_York),
    ("VT", chrono_tz::America::New_York),
    ("WA", chrono_tz::America::Los_Angeles),
    ("WI", chrono_tz::America::Chicago),
    ("WV", chrono_tz::America::New_York),
    ("WY", chrono_tz::America::Denver),
];

pub fn is_state_abbrev(token: &str) -> bool {
    STATE_TIMEZONES.iter().any(|(abbr, _)| *abbr == token)
}

fn timezone_for(state: &str) -> Tz {
    STATE_TIMEZONES
        .iter()
        .find(|(abbr, _)| *abbr == state)
        .map(|(_, tz)| *tz)
        .unwrap_or(DEFAULT_TZ)
}

/// Scan a semicolon-separated area description for state abbreviations.
///
/// When more than one state matches, returns a "PARTS OF {sorted
/// states}" display string and the timezone of the alphabetically
/// first state. A single state (or none) keeps the raw area text and
/// the default timezone.
pub fn extract_states_and_timezone(area_desc: &str) -> (Option<String>, Tz) {
    let mut states: Vec<&str> = Vec::new();
    for area in area_desc.split(';') {
        let area = area.trim();
        for (abbr, _) in STATE_TIMEZONES {
            if area.contains(&format!(" {abbr}")) || area.ends_with(abbr) {
                if !states.contains(&abbr) {
                    states.push(abbr);
                }
                break;
            }
        }
    }

    if states.len() > 1 {
        states.sort_unstable();
        let display = format!("PARTS OF {}", states.join(", "));
        let tz = timezone_for(states[0]);
        (Some(display), tz)
    } else {
        (None, DEFAULT_TZ)
    }
}

/// Render an expiry instant as e.g. "8 PM EDT" in the given timezone.
pub fn format_expiry(expires: Option<DateTime<Utc>>, tz: Tz) -> String {
    match expires {
        Some(instant) => {
            let local = instant.with_timezone(&tz);
            local.format("%-I %p %Z").to_string().to_uppercase()
        }
        None => UNKNOWN_TIME.to_string(),
    }
}

/// Render an instant as "YYYY-MM-DD HH:MM:SS" in the default timezone.
pub fn local_timestamp(instant: Option<DateTime<Utc>>) -> String {
    match instant {
        Some(instant) => instant
            .with_timezone(&DEFAULT_TZ)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => UNKNOWN_TIME.to_string(),
    }
}

/// Current wall-clock instant in the default timezone, RFC 3339.
pub fn now_local_rfc3339() -> String {
    Utc::now().with_timezone(&DEFAULT_TZ).to_rfc3339()
}
