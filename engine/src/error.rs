use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("floor count must be at least 1, got {0}")]
    InvalidFloorCount(usize),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error(transparent)]
    Engine(#[from] EngineError),
}
