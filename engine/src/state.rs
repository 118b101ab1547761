use serde::Serialize;
use std::fmt;

/// The floor the adventurer starts on and returns to after every cycle.
pub const START_FLOOR: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Floor {
    pub number: usize,
    pub visited: bool,
}

/// Floors conquered so far. The start floor counts as conquered since the
/// adventurer stands on it, so a fully explored tower reads `N / N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub conquered: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} floors", self.conquered, self.total)
    }
}

/// Position, path and per-floor flags of one traversal.
///
/// `stack` is never empty, starts at floor 1 and always ends at `current`.
/// Only the engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraversalState {
    current: usize,
    stack: Vec<usize>,
    floors: Vec<Floor>,
}

impl TraversalState {
    pub(crate) fn new(floor_count: usize) -> Self {
        let floors = (1..=floor_count)
            .map(|number| Floor {
                number,
                visited: false,
            })
            .collect();

        Self {
            current: START_FLOOR,
            stack: vec![START_FLOOR],
            floors,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn stack(&self) -> &[usize] {
        &self.stack
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    pub fn floor(&self, number: usize) -> Option<&Floor> {
        number.checked_sub(1).and_then(|index| self.floors.get(index))
    }

    pub fn is_visited(&self, number: usize) -> bool {
        self.floor(number).is_some_and(|floor| floor.visited)
    }

    pub fn is_on_path(&self, number: usize) -> bool {
        self.stack.contains(&number)
    }

    pub fn visited_count(&self) -> usize {
        self.floors.iter().filter(|floor| floor.visited).count()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            conquered: self.visited_count() + 1,
            total: self.floor_count(),
        }
    }

    pub(crate) fn top(&self) -> usize {
        // stack is never empty
        self.stack.last().copied().unwrap_or(START_FLOOR)
    }

    pub(crate) fn push(&mut self, number: usize) {
        if let Some(floor) = self.floors.get_mut(number - 1) {
            floor.visited = true;
        }
        self.stack.push(number);
        self.current = number;
    }

    /// Pops the top of the path and returns the floor now on top, or `None`
    /// if only the start floor is left.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        if self.stack.len() <= 1 {
            return None;
        }
        self.stack.pop();
        self.current = self.top();
        Some(self.current)
    }

    pub(crate) fn reset(&mut self) {
        for floor in &mut self.floors {
            floor.visited = false;
        }
        self.stack.clear();
        self.stack.push(START_FLOOR);
        self.current = START_FLOOR;
    }
}
