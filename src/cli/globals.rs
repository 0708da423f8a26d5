use crate::ingreso::{config::AppConfig, session::IdStrategy};
use std::{path::PathBuf, time::Duration};

/// Options shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: AppConfig,
    pub session_dir: Option<PathBuf>,
    pub photo_dir: PathBuf,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(api_url: &str) -> Self {
        Self {
            config: AppConfig::default().with_base_url(api_url),
            session_dir: None,
            photo_dir: PathBuf::from("."),
        }
    }

    pub fn set_timeout(&mut self, millis: u64) {
        self.config.timeout = Duration::from_millis(millis);
    }

    pub fn set_id_strategy(&mut self, strategy: IdStrategy) {
        self.config.id_strategy = strategy;
    }

    pub fn set_demo(&mut self, demo: bool) {
        self.config.demo_mode = demo;
    }
}
