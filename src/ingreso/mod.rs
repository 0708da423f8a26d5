pub mod api;
pub mod calendar;
pub mod capture;
pub mod config;
pub mod session;
pub mod validate;
pub mod workflow;

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
