pub mod config;
pub mod error;
pub mod event;
pub mod sink;
pub mod state;
pub mod traversal;
pub mod walker;


pub use config::WalkerConfig;
pub use error::{ConfigError, EngineError};
pub use event::TraversalEvent;
pub use sink::{EventRecord, EventSink, FanoutSink, HistorySink, LogSink};
pub use state::{Floor, Progress, TraversalState};
pub use traversal::{DEFAULT_FLOOR_COUNT, TraversalEngine};
pub use walker::{Pacing, StepOutcome, Walker};
