// Library root of `ismis_scheduler`: the schedule engine plus the catalog
// store and HTTP layer built on top of it.
pub mod algorithm;
pub mod api_json;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod server_handlers;

pub use config::AppConfig;
pub use error::SchedulerError;
/// Runs the HTTP server (re-exported for `main`).
pub use server::run_server;
