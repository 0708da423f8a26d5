//! Session identifiers used as storage keys and as the `sid` continuity token
//! carried in step URLs. They are correlation handles, not credentials.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const BASE36_LEN: usize = 13;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wraps an identifier received from a URL or a store listing.
    /// Returns `None` for empty or whitespace-only input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How fresh session identifiers are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdStrategy {
    /// Short pseudo-random base-36 token.
    #[default]
    Base36,
    /// Random UUID (v4).
    Uuid,
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "base36" => Ok(Self::Base36),
            "uuid" => Ok(Self::Uuid),
            other => Err(format!("unknown session id strategy: {other}")),
        }
    }
}

/// Produce a new identifier. Called once per workflow entry.
#[must_use]
pub fn generate(strategy: IdStrategy) -> SessionId {
    match strategy {
        IdStrategy::Base36 => {
            let mut rng = rand::thread_rng();
            let token: String = (0..BASE36_LEN)
                .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
                .collect();
            SessionId(token)
        }
        IdStrategy::Uuid => SessionId(Uuid::new_v4().to_string()),
    }
}
