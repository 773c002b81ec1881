use std::fs;
use std::path::Path;

use config::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::combination::combination_count;
use crate::error::ShardError;

pub const DEFAULT_MAX_COMBINATIONS: u64 = 5_000_000;

/// Solver settings, layered from defaults, an optional TOML file and `SHARD_*`
/// environment variables (in increasing priority).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// Largest number of threshold-sized combinations a search may visit.
    pub max_combinations: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            pretty: true,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
        }
    }
}

impl SolverConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ShardError> {
        let mut builder = Config::builder()
            .set_default("pretty", true)?
            .set_default("max_combinations", DEFAULT_MAX_COMBINATIONS as i64)?;

        if let Some(path) = path {
            debug!("📝 Loading config at path: {:#?}", path);
            // Add in e.g. `./shard.toml`
            builder = builder.add_source(config::File::from(path).required(true));
        }

        // Add in settings from the environment (with a prefix of SHARD)
        // Eg.. `SHARD_PRETTY=false ./target/shard recover` would set the `pretty` key
        let settings = builder
            .add_source(config::Environment::with_prefix("SHARD"))
            .build()?;

        Ok(settings.try_into()?)
    }

    /// Writes the default settings as TOML to `path`.
    pub fn write_default(path: &Path) -> Result<(), ShardError> {
        let toml = toml::to_string_pretty(&SolverConfig::default())
            .map_err(|err| ShardError::Config(err.to_string()))?;
        fs::write(path, toml).map_err(|err| ShardError::Config(err.to_string()))?;
        Ok(())
    }

    /// Refuses searches over `n` shares at threshold `k` that would visit more
    /// combinations than `max_combinations`.
    pub fn check_budget(&self, n: usize, k: usize) -> Result<(), ShardError> {
        let combinations = combination_count(n, k);
        if combinations > u128::from(self.max_combinations) {
            return Err(ShardError::SearchTooLarge {
                combinations,
                limit: self.max_combinations,
            });
        }
        Ok(())
    }
}

impl TryFrom<Config> for SolverConfig {
    type Error = ConfigError;

    fn try_from(config: Config) -> Result<Self, Self::Error> {
        let max_combinations = u64::try_from(config.get_int("max_combinations")?)
            .map_err(|_| ConfigError::Message("max_combinations must not be negative".into()))?;
        Ok(SolverConfig {
            pretty: config.get_bool("pretty")?,
            max_combinations,
        })
    }
}
