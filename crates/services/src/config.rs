use std::env;
use std::sync::Arc;

use quiz_core::{RandomSource, SeededRandom, ThreadRandom};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DATABASE_URL_VAR: &str = "QUIZ_DB_URL";
pub const RANDOM_SEED_VAR: &str = "QUIZ_RANDOM_SEED";
pub const DEFAULT_DATABASE_URL: &str = "sqlite:quiz.sqlite3";

/// Settings needed to wire `QuizServices` to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesConfig {
    pub database_url: String,
    /// Seeds the random source so quizzes are reproducible.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_URL)
    }
}

impl ServicesConfig {
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            random_seed: None,
        }
    }

    #[must_use]
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Read `QUIZ_DB_URL` and `QUIZ_RANDOM_SEED`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSeed` if the seed is not a `u64`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_owned());

        let random_seed = match lookup(RANDOM_SEED_VAR) {
            Some(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|source| ConfigError::InvalidSeed { value: raw, source })?,
            ),
            _ => None,
        };

        Ok(Self {
            database_url,
            random_seed,
        })
    }

    /// Seeded when `random_seed` is set, otherwise thread-local.
    #[must_use]
    pub fn random_source(&self) -> Arc<dyn RandomSource> {
        match self.random_seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        }
    }
}
