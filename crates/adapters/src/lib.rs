#![forbid(unsafe_code)]

pub mod http;
pub mod notify;
pub mod source;
pub mod storage;
