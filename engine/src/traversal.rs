use crate::error::EngineError;
use crate::event::TraversalEvent;
use crate::state::TraversalState;
use tracing::debug;

pub const DEFAULT_FLOOR_COUNT: usize = 10;

/// Depth-first walk over floors `1..=N`.
///
/// From the floor on top of the path the engine climbs to the lowest higher
/// floor it has not visited yet. When there is none it backtracks one floor,
/// and once it is back on floor 1 with nothing left above, it clears every
/// flag and starts the next cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalEngine {
    state: TraversalState,
}

impl TraversalEngine {
    pub fn new(floor_count: usize) -> Result<Self, EngineError> {
        if floor_count == 0 {
            return Err(EngineError::InvalidFloorCount(floor_count));
        }
        Ok(Self {
            state: TraversalState::new(floor_count),
        })
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    pub fn floor_count(&self) -> usize {
        self.state.floor_count()
    }

    /// Number of steps that takes a fresh engine back to its initial state.
    pub fn cycle_length(&self) -> usize {
        2 * self.floor_count() - 1
    }

    pub fn step(&mut self) -> TraversalEvent {
        let top = self.state.top();

        let event = match self.next_unvisited_above(top) {
            Some(next) => {
                self.state.push(next);
                TraversalEvent::Discovery(next)
            }
            None => match self.state.pop() {
                Some(floor) => TraversalEvent::Backtrack(floor),
                None => {
                    self.state.reset();
                    TraversalEvent::CycleComplete
                }
            },
        };

        debug!(
            from = top,
            current = self.state.current(),
            depth = self.state.stack().len(),
            "{}",
            event
        );
        event
    }

    fn next_unvisited_above(&self, top: usize) -> Option<usize> {
        (top + 1..=self.floor_count()).find(|&number| !self.state.is_visited(number))
    }
}

impl Default for TraversalEngine {
    fn default() -> Self {
        Self {
            state: TraversalState::new(DEFAULT_FLOOR_COUNT),
        }
    }
}
