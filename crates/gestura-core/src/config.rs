use crate::{DEFAULT_HISTORY_CAPACITY, TieBreak};
use gestura_base::Vec2;

/// Per-session pipeline settings.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    threshold: f32,
    history_capacity: usize,
    tie_break: TieBreak,
    output_size: Vec2<usize>,
    jpeg_quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            tie_break: TieBreak::Discard,
            output_size: Vec2::new(300, 533),
            jpeg_quality: 95,
        }
    }
}

impl PipelineConfig {
    /// Minimum best score for a frame to enter the history.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity.max(1);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Size (width, height) of emitted frames.
    pub fn with_output_size(mut self, output_size: Vec2<usize>) -> Self {
        self.output_size = Vec2::new(output_size.x.max(1), output_size.y.max(1));
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn output_size(&self) -> Vec2<usize> {
        self.output_size
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}
