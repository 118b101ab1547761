use crate::event::TraversalEvent;
use crate::state::{Progress, TraversalState};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Receives every classified event together with the state it produced.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn notify(&self, event: &TraversalEvent, state: &TraversalState) -> Result<()>;
}

/// Writes events to the tracing log.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl EventSink for LogSink {
    async fn notify(&self, event: &TraversalEvent, state: &TraversalState) -> Result<()> {
        info!(
            event = %event,
            current = state.current(),
            progress = %state.progress(),
            "{}",
            event.message()
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub at: DateTime<Utc>,
    pub event: TraversalEvent,
    pub message: String,
    pub current: usize,
    pub progress: Progress,
}

/// Keeps the most recent events, oldest first.
#[derive(Debug)]
pub struct HistorySink {
    records: Mutex<VecDeque<EventRecord>>,
    capacity: usize,
}

impl HistorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub async fn recent(&self) -> Vec<EventRecord> {
        self.records.lock().await.iter().cloned().collect()
    }

    pub async fn events(&self) -> Vec<TraversalEvent> {
        self.records.lock().await.iter().map(|r| r.event).collect()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

impl Default for HistorySink {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[async_trait]
impl EventSink for HistorySink {
    async fn notify(&self, event: &TraversalEvent, state: &TraversalState) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }
        let mut records = self.records.lock().await;
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(EventRecord {
            at: Utc::now(),
            event: *event,
            message: event.message(),
            current: state.current(),
            progress: state.progress(),
        });
        Ok(())
    }
}

/// Forwards each event to every inner sink in order. All sinks are tried;
/// the first failure is returned.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

#[async_trait]
impl EventSink for FanoutSink {
    async fn notify(&self, event: &TraversalEvent, state: &TraversalState) -> Result<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.notify(event, state).await {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::TraversalEngine;

    struct FailingSink;

    #[async_trait]
    impl EventSink for FailingSink {
        async fn notify(&self, _: &TraversalEvent, _: &TraversalState) -> Result<()> {
            anyhow::bail!("sink offline")
        }
    }

    #[tokio::test]
    async fn test_history_keeps_latest_records() {
        let history = HistorySink::new(2);
        let mut engine = TraversalEngine::new(3).unwrap();

        for _ in 0..3 {
            let event = engine.step();
            history.notify(&event, engine.state()).await.unwrap();
        }

        let records = history.recent().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event, TraversalEvent::Discovery(3));
        assert_eq!(records[1].event, TraversalEvent::Backtrack(2));
        assert_eq!(records[1].current, 2);
        assert_eq!(records[1].progress, Progress { conquered: 3, total: 3 });
        assert_eq!(records[1].message, "Backtracking to floor 2");
    }

    #[tokio::test]
    async fn test_history_with_zero_capacity_keeps_nothing() {
        let history = HistorySink::new(0);
        let engine = TraversalEngine::new(2).unwrap();
        history
            .notify(&TraversalEvent::Discovery(2), engine.state())
            .await
            .unwrap();
        assert_eq!(history.len().await, 0);
    }

    #[tokio::test]
    async fn test_fanout_reaches_every_sink_even_after_failure() {
        let history = Arc::new(HistorySink::default());
        let fanout = FanoutSink::new()
            .with(Arc::new(FailingSink))
            .with(history.clone());
        let engine = TraversalEngine::new(2).unwrap();

        let result = fanout
            .notify(&TraversalEvent::CycleComplete, engine.state())
            .await;
        assert!(result.is_err());
        assert_eq!(history.events().await, vec![TraversalEvent::CycleComplete]);
    }
}
