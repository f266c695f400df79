#![forbid(unsafe_code)]

pub mod alert;
pub mod common;
pub mod format;
pub mod sequence;
