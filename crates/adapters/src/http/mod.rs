pub mod server;
pub mod state;
pub mod status_handler;
