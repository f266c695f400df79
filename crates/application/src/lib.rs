#![forbid(unsafe_code)]

pub mod daily_summary;
pub mod delivery;
pub mod error_reporter;
pub mod health;
pub mod poll_service;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;
