use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "floor", rename_all = "snake_case")]
pub enum TraversalEvent {
    /// Moved up to a floor that had not been visited yet.
    Discovery(usize),
    /// Retreated to this floor after running out of higher unvisited floors.
    Backtrack(usize),
    /// Every floor was explored and the traversal started over from floor 1.
    CycleComplete,
}

impl TraversalEvent {
    /// The floor the adventurer stands on after the event.
    pub fn floor(&self) -> Option<usize> {
        match self {
            TraversalEvent::Discovery(floor) | TraversalEvent::Backtrack(floor) => Some(*floor),
            TraversalEvent::CycleComplete => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            TraversalEvent::Discovery(floor) => format!("Conquered floor {}!", floor),
            TraversalEvent::Backtrack(floor) => format!("Backtracking to floor {}", floor),
            TraversalEvent::CycleComplete => {
                "All floors conquered! Returning to start...".to_string()
            }
        }
    }
}

impl fmt::Display for TraversalEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalEvent::Discovery(floor) => write!(f, "Discovery({})", floor),
            TraversalEvent::Backtrack(floor) => write!(f, "Backtrack({})", floor),
            TraversalEvent::CycleComplete => write!(f, "CycleComplete"),
        }
    }
}
