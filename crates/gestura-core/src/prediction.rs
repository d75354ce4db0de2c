use gestura_infer::Gesture;
use std::sync::{
    Arc,
    atomic::{AtomicU8, Ordering},
};

const NONE: u8 = 0;

/// Latest stable gesture, shared between pipelines and prediction readers.
///
/// Clones share the same cell. Starts out empty and is only ever overwritten.
#[derive(Clone, Debug, Default)]
pub struct SharedPrediction {
    value: Arc<AtomicU8>,
}

impl SharedPrediction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, gesture: Gesture) {
        self.value.store(gesture.index() as u8 + 1, Ordering::Release);
    }

    pub fn latest(&self) -> Option<Gesture> {
        match self.value.load(Ordering::Acquire) {
            NONE => None,
            code => Gesture::from_index(code as usize - 1),
        }
    }

    /// The latest label, or `"none"` before anything was published.
    pub fn label(&self) -> &'static str {
        self.latest().map_or("none", |gesture| gesture.label())
    }
}
