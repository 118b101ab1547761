use crate::event::TraversalEvent;
use crate::sink::{EventSink, LogSink};
use crate::state::TraversalState;
use crate::traversal::TraversalEngine;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_CYCLE_DELAY: Duration = Duration::from_millis(1000);

/// How long the walker stays busy after each kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub step_delay: Duration,
    pub cycle_delay: Duration,
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            step_delay: Duration::ZERO,
            cycle_delay: Duration::ZERO,
        }
    }

    pub fn delay_for(&self, event: &TraversalEvent) -> Duration {
        match event {
            TraversalEvent::CycleComplete => self.cycle_delay,
            _ => self.step_delay,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            cycle_delay: DEFAULT_CYCLE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub event: TraversalEvent,
    pub message: String,
    pub state: TraversalState,
}

// Clears the busy flag once the pacing task is done with it.
struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

/// Owns a traversal engine and lets one step run at a time.
///
/// A trigger that arrives while the previous step is still pacing is dropped
/// without touching the state. The pacing runs on its own task, so the walker
/// stays busy for the full delay even if the caller stops waiting.
pub struct Walker {
    engine: Mutex<TraversalEngine>,
    busy: Arc<AtomicBool>,
    pacing: Pacing,
    sink: Arc<dyn EventSink>,
}

impl Walker {
    pub fn new(engine: TraversalEngine, pacing: Pacing) -> Self {
        Self::with_sink(engine, pacing, Arc::new(LogSink))
    }

    pub fn with_sink(engine: TraversalEngine, pacing: Pacing, sink: Arc<dyn EventSink>) -> Self {
        Self {
            engine: Mutex::new(engine),
            busy: Arc::new(AtomicBool::new(false)),
            pacing,
            sink,
        }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> TraversalState {
        self.engine.lock().await.state().clone()
    }

    /// Advances the traversal by one step and waits out the pacing delay.
    ///
    /// Returns `None` when another step is still in progress.
    pub async fn step(&self) -> Option<StepOutcome> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("step ignored, previous step still in progress");
            return None;
        }
        let guard = BusyGuard {
            busy: self.busy.clone(),
        };

        let (event, state) = {
            let mut engine = self.engine.lock().await;
            let event = engine.step();
            (event, engine.state().clone())
        };

        let sink = self.sink.clone();
        let delay = self.pacing.delay_for(&event);
        let snapshot = state.clone();
        let pacing = tokio::spawn(async move {
            let _guard = guard;
            if let Err(e) = sink.notify(&event, &snapshot).await {
                warn!("event sink failed for {}: {:#}", event, e);
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        });
        if let Err(e) = pacing.await {
            warn!("pacing task for {} failed: {}", event, e);
        }

        Some(StepOutcome {
            event,
            message: event.message(),
            state,
        })
    }
}
