//! Builds the 1 to 3 display messages for one classified alert.

use rand::seq::IndexedRandom;

use crate::alert::entity::{AlertRecord, CategoryStyle, NotificationCategory};

use super::extract::{extract_cities, storm_details};
use super::locale::{extract_states_and_timezone, format_expiry, now_local_rfc3339};

/// Destination-side cap on a single content block.
pub const FIELD_LIMIT: usize = 1024;

const GENERIC_SAFETY_TIP: &str = "Stay safe and follow local guidance.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageField {
    pub name: &'static str,
    pub value: String,
    pub inline: bool,
}

/// One rendered message page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
    pub color: u32,
    pub fields: Vec<MessageField>,
    pub timestamp: String,
}

/// All pages for one alert, delivered as a single publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBatch {
    /// Role mention content prepended to the publish, when policy and
    /// configuration allow one.
    pub mention: Option<String>,
    pub messages: Vec<NotificationMessage>,
}

#[derive(Debug, Clone, Copy)]
pub struct FormatRequest<'a> {
    pub category: NotificationCategory,
    pub record: &'a AlertRecord,
    pub tornado_possible: bool,
    pub is_update: bool,
    pub sequence: &'a str,
    pub style: &'a CategoryStyle,
}

pub fn build_notification(req: &FormatRequest<'_>) -> NotificationBatch {
    let record = req.record;
    let category = req.category;
    let style = req.style;

    let (multi_state, tz) = extract_states_and_timezone(&record.area_desc);
    let location = multi_state.unwrap_or_else(|| record.area_desc.clone());
    let expires = format_expiry(record.expires_at, tz);

    let alert_word = if category.is_watch() { "WATCH" } else { "WARNING" };
    let body = format!(
        "THE NATIONAL WEATHER SERVICE HAS ISSUED {alert_word} IN EFFECT UNTIL \
         {expires} THIS EVENING FOR THE FOLLOWING AREAS\n\n{location}\n\n{}",
        record.description
    );

    let mut title = String::new();
    if req.is_update {
        title.push_str("UPDATED: ");
    }
    title.push_str(category.display_name());
    if req.tornado_possible {
        title.push_str(" [Tornado Possible]");
    }

    let safety_tip = style
        .safety_tips
        .choose(&mut rand::rng())
        .cloned()
        .unwrap_or_else(|| GENERIC_SAFETY_TIP.to_string());

    let mut fields = vec![MessageField {
        name: "📍 Location",
        value: location,
        inline: true,
    }];
    if category.has_detail_fields() {
        let details = storm_details(&record.description, category.has_hail_field());
        fields.push(MessageField {
            name: "💨 Wind Speed",
            value: details.wind_speed,
            inline: true,
        });
        fields.push(MessageField {
            name: "🧭 Movement",
            value: details.movement,
            inline: true,
        });
        fields.push(MessageField {
            name: "🌬️ Gusts",
            value: details.gusts,
            inline: true,
        });
        if let Some(hail) = details.hail_size {
            fields.push(MessageField {
                name: "❄️ Hail Size",
                value: hail,
                inline: true,
            });
        }
    }
    fields.push(MessageField {
        name: "📡 Issued By",
        value: record.sender_name.clone(),
        inline: true,
    });
    fields.push(MessageField {
        name: "💡 Safety Tip",
        value: safety_tip,
        inline: true,
    });
    fields.push(MessageField {
        name: "🔗 More Info",
        value: format!("[NWS Link]({})", record.source_url),
        inline: false,
    });

    let city_text = extract_cities(&record.area_desc, &record.description);
    let city_parts = match &city_text {
        None => Vec::new(),
        Some(text) if text.len() <= FIELD_LIMIT => vec![text.clone()],
        Some(text) => split_cities(text),
    };
    let total = 1 + city_parts.len();
    let timestamp = now_local_rfc3339();

    let page_title = |page: usize| {
        if total == 1 {
            format!("{} {title} [{}]", style.icon, req.sequence)
        } else {
            format!("{} {title} [{}, {page}/{total}]", style.icon, req.sequence)
        }
    };

    let mut messages = vec![NotificationMessage {
        title: page_title(1),
        body,
        color: style.color,
        fields,
        timestamp: timestamp.clone(),
    }];

    for (index, part) in city_parts.iter().enumerate() {
        let body = if city_parts.len() == 1 {
            "Affected cities:".to_string()
        } else {
            format!("Affected cities (part {}):", index + 1)
        };
        messages.push(NotificationMessage {
            title: page_title(index + 2),
            body,
            color: style.color,
            fields: vec![MessageField {
                name: "🏙️ Cities",
                value: part.clone(),
                inline: false,
            }],
            timestamp: timestamp.clone(),
        });
    }

    let mention = if category.is_watch() {
        None
    } else {
        style.mention.clone()
    };

    NotificationBatch { mention, messages }
}

/// Split an over-limit comma-joined city list into two parts, never
/// breaking a city name.
pub fn split_cities(joined: &str) -> Vec<String> {
    let mut first = Vec::new();
    let mut second = Vec::new();
    let mut length = 0usize;
    for city in joined.split(", ") {
        if length + city.len() + 2 <= FIELD_LIMIT {
            first.push(city);
            length += city.len() + 2;
        } else {
            second.push(city);
        }
    }
    let second_text = if second.is_empty() {
        "Continued list unavailable.".to_string()
    } else {
        second.join(", ")
    };
    vec![first.join(", "), second_text]
}
