use gestura_infer::{Gesture, ProbabilityVector};
use std::collections::VecDeque;
use std::fmt;

pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Recent confident gestures, oldest first, with no two adjacent entries equal.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureHistory {
    entries: VecDeque<Gesture>,
    capacity: usize,
}

impl Default for GestureHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl GestureHistory {
    /// A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends `gesture` unless it repeats the newest entry, evicting the
    /// oldest entries past capacity. Returns whether it was appended.
    pub fn push(&mut self, gesture: Gesture) -> bool {
        if self.entries.back() == Some(&gesture) {
            return false;
        }
        self.entries.push_back(gesture);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        true
    }

    pub fn last(&self) -> Option<Gesture> {
        self.entries.back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = Gesture> + '_ {
        self.entries.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Gesture> {
        self.iter().collect()
    }
}

/// Space separated labels, oldest first.
impl fmt::Display for GestureHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gesture) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{gesture}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmootherState {
    Idle,
    Tracking,
}

/// Feeds classifier output into a [`GestureHistory`], ignoring frames whose
/// best score does not exceed the threshold.
#[derive(Debug, Clone)]
pub struct HistorySmoother {
    history: GestureHistory,
    threshold: f32,
}

impl HistorySmoother {
    pub fn new(threshold: f32, capacity: usize) -> Self {
        Self {
            history: GestureHistory::new(capacity),
            threshold,
        }
    }

    /// Returns the newest history entry when `p` is confident, `None` when the
    /// frame is withheld.
    pub fn observe(&mut self, p: &ProbabilityVector) -> Option<Gesture> {
        let confidence = p.confidence();
        if confidence.is_nan() || confidence <= self.threshold {
            return None;
        }
        self.history.push(p.argmax());
        self.history.last()
    }

    pub fn state(&self) -> SmootherState {
        if self.history.is_empty() {
            SmootherState::Idle
        } else {
            SmootherState::Tracking
        }
    }

    pub fn history(&self) -> &GestureHistory {
        &self.history
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}
