//! Notification rendering: text feature extraction, locale handling
//! and message pagination.

pub mod extract;
pub mod locale;
pub mod message;
