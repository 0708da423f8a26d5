//! Runtime configuration for the kiosk: backend location, request timeout,
//! session id strategy and the explicit demo switch. Values come from the CLI
//! (flags or `INGRESO_*` environment variables). Nothing here is secret.

use crate::ingreso::{calendar::OpeningHours, session::IdStrategy};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub id_strategy: IdStrategy,
    /// Substitute canned data when the backend is unreachable. Off unless asked for.
    pub demo_mode: bool,
    pub hours: OpeningHours,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            id_strategy: IdStrategy::default(),
            demo_mode: false,
            hours: OpeningHours::default(),
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        if let Some(value) = normalize_value(url) {
            self.api_base_url = value;
        }
        self
    }
}

pub fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
