pub mod client;
pub mod errors;
pub mod http;
pub mod types;

pub use self::client::{Backend, HttpBackend};
pub use self::errors::ApiError;
