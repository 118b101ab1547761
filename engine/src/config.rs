use crate::error::{ConfigError, EngineError};
use crate::traversal::{DEFAULT_FLOOR_COUNT, TraversalEngine};
use crate::walker::Pacing;
use std::env;
use std::time::Duration;

pub const FLOORS_ENV: &str = "ADVENTURER_FLOORS";
pub const STEP_DELAY_ENV: &str = "ADVENTURER_STEP_DELAY_MS";
pub const CYCLE_DELAY_ENV: &str = "ADVENTURER_CYCLE_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkerConfig {
    pub floor_count: usize,
    pub pacing: Pacing,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            floor_count: DEFAULT_FLOOR_COUNT,
            pacing: Pacing::default(),
        }
    }
}

impl WalkerConfig {
    /// Reads the `ADVENTURER_*` variables, falling back to the defaults for
    /// any that are unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let floor_count = parse_var(&lookup, FLOORS_ENV)?.unwrap_or(defaults.floor_count);
        if floor_count == 0 {
            return Err(EngineError::InvalidFloorCount(floor_count).into());
        }

        let step_delay = parse_var(&lookup, STEP_DELAY_ENV)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.pacing.step_delay);
        let cycle_delay = parse_var(&lookup, CYCLE_DELAY_ENV)?
            .map(Duration::from_millis)
            .unwrap_or(defaults.pacing.cycle_delay);

        Ok(Self {
            floor_count,
            pacing: Pacing {
                step_delay,
                cycle_delay,
            },
        })
    }

    pub fn build_engine(&self) -> Result<TraversalEngine, EngineError> {
        TraversalEngine::new(self.floor_count)
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value }),
    }
}
