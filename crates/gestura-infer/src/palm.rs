//! Palm detection.
//!
//! A single-shot detector over a letterboxed frame. Each anchor predicts a
//! palm box and seven palm keypoints; overlapping boxes are suppressed and
//! the most confident palms are kept.

use crate::session::expect_output;
use crate::{Backend, InferError, ModelSource, Session, letterbox};
use gestura_base::{Tensor, Vec2};
use std::collections::VecDeque;

/// Values regressed per anchor: box center, box size, then 7 keypoints.
pub const PALM_REGRESSION_LEN: usize = 18;

/// Index of the wrist among the palm keypoints.
pub const PALM_WRIST: usize = 0;
/// Index of the middle finger base among the palm keypoints.
pub const PALM_MIDDLE_MCP: usize = 2;

const PALM_KEYPOINTS: usize = 7;

// (stride, anchors per cell) of the MediaPipe palm detector's feature maps
const ANCHOR_LAYERS: [(usize, usize); 2] = [(8, 2), (16, 6)];

/// Anchor center in normalized input coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

/// SSD anchor centers for a square input, in the model's output order.
pub fn ssd_anchors(input_size: usize) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    for (stride, per_cell) in ANCHOR_LAYERS {
        let grid = input_size.div_ceil(stride);
        for y in 0..grid {
            for x in 0..grid {
                let anchor = Anchor {
                    x: (x as f32 + 0.5) / grid as f32,
                    y: (y as f32 + 0.5) / grid as f32,
                };
                anchors.extend(std::iter::repeat_n(anchor, per_cell));
            }
        }
    }
    anchors
}

/// Axis-aligned box in frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PalmBox {
    pub center: Vec2<f32>,
    pub width: f32,
    pub height: f32,
}

impl PalmBox {
    fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Intersection over union, 0 for disjoint or empty boxes.
    pub fn iou(&self, other: &PalmBox) -> f32 {
        let left = (self.center.x - self.width / 2.0).max(other.center.x - other.width / 2.0);
        let right = (self.center.x + self.width / 2.0).min(other.center.x + other.width / 2.0);
        let top = (self.center.y - self.height / 2.0).max(other.center.y - other.height / 2.0);
        let bottom = (self.center.y + self.height / 2.0).min(other.center.y + other.height / 2.0);
        let intersection = (right - left).max(0.0) * (bottom - top).max(0.0);
        let union = self.area() + other.area() - intersection;
        if union > 0.0 { intersection / union } else { 0.0 }
    }
}

/// A detected palm in frame pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct PalmDetection {
    pub score: f32,
    pub bounds: PalmBox,
    pub keypoints: Vec<Vec2<f32>>,
}

impl PalmDetection {
    pub fn wrist(&self) -> Vec2<f32> {
        self.keypoints[PALM_WRIST]
    }

    pub fn middle_mcp(&self) -> Vec2<f32> {
        self.keypoints[PALM_MIDDLE_MCP]
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Keeps the highest scoring detection of every overlapping group,
/// best first.
fn suppress(mut detections: Vec<PalmDetection>, iou_threshold: f32) -> Vec<PalmDetection> {
    detections.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    let mut pending: VecDeque<PalmDetection> = detections.into();
    let mut keep = Vec::new();
    while let Some(best) = pending.pop_front() {
        pending.retain(|other| best.bounds.iou(&other.bounds) < iou_threshold);
        keep.push(best);
    }
    keep
}

#[derive(Debug, Clone)]
pub struct PalmDetectorConfig {
    input_size: usize,
    min_score: f32,
    iou_threshold: f32,
    max_palms: usize,
}

impl Default for PalmDetectorConfig {
    fn default() -> Self {
        Self {
            input_size: 192,
            min_score: 0.5,
            iou_threshold: 0.3,
            max_palms: 2,
        }
    }
}

impl PalmDetectorConfig {
    /// Side of the square model input in pixels.
    pub fn with_input_size(mut self, input_size: usize) -> Self {
        self.input_size = input_size.max(1);
        self
    }

    /// Palms scoring at or below this are dropped.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn with_iou_threshold(mut self, iou_threshold: f32) -> Self {
        self.iou_threshold = iou_threshold;
        self
    }

    pub fn with_max_palms(mut self, max_palms: usize) -> Self {
        self.max_palms = max_palms;
        self
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn min_score(&self) -> f32 {
        self.min_score
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }

    pub fn max_palms(&self) -> usize {
        self.max_palms
    }
}

/// Palm detection model in the MediaPipe layout.
///
/// Outputs, in declared order: regressors `[1, anchors, 18]` in input
/// pixels relative to each anchor, and raw scores `[1, anchors, 1]`.
pub struct PalmDetector {
    session: Box<dyn Session>,
    config: PalmDetectorConfig,
    anchors: Vec<Anchor>,
}

impl PalmDetector {
    pub fn new(model: ModelSource, backend: &dyn Backend) -> Result<Self, InferError> {
        Self::from_session(backend.load_model(model)?)
    }

    pub fn from_session(session: Box<dyn Session>) -> Result<Self, InferError> {
        if session.input_names().is_empty() {
            return Err(InferError::ModelLoad("palm model has no inputs".to_string()));
        }
        if session.output_names().len() < 2 {
            return Err(InferError::ModelLoad(format!(
                "palm model needs 2 outputs, has {}",
                session.output_names().len()
            )));
        }
        let config = PalmDetectorConfig::default();
        Ok(Self {
            session,
            anchors: ssd_anchors(config.input_size),
            config,
        })
    }

    pub fn with_config(mut self, config: PalmDetectorConfig) -> Self {
        self.anchors = ssd_anchors(config.input_size);
        self.config = config;
        self
    }

    pub fn config(&self) -> &PalmDetectorConfig {
        &self.config
    }

    /// Palms in an `[H, W, 3]` frame, most confident first.
    pub fn detect(&mut self, frame: &Tensor<u8>) -> Result<Vec<PalmDetection>, InferError> {
        let size = self.config.input_size;
        let (input, letterbox) = letterbox(frame, size)?;

        let input_name = self.session.input_names()[0].clone();
        let names = self.session.output_names()[..2].to_vec();
        let outputs = self.session.run(&[(input_name.as_str(), input)])?;

        let count = self.anchors.len();
        let regressors = expect_output(&outputs, &names[0], count * PALM_REGRESSION_LEN)?;
        let scores = expect_output(&outputs, &names[1], count)?;

        let input_size = size as f32;
        let mut candidates = Vec::new();
        for (index, (anchor, &raw)) in self.anchors.iter().zip(&scores.data).enumerate() {
            let score = sigmoid(raw);
            if score.is_nan() || score <= self.config.min_score {
                continue;
            }

            let r = &regressors.data[index * PALM_REGRESSION_LEN..(index + 1) * PALM_REGRESSION_LEN];
            let point = |dx: f32, dy: f32| {
                letterbox.to_pixels(dx + anchor.x * input_size, dy + anchor.y * input_size)
            };
            candidates.push(PalmDetection {
                score,
                bounds: PalmBox {
                    center: point(r[0], r[1]),
                    width: r[2] / letterbox.scale,
                    height: r[3] / letterbox.scale,
                },
                keypoints: (0..PALM_KEYPOINTS)
                    .map(|k| point(r[4 + 2 * k], r[5 + 2 * k]))
                    .collect(),
            });
        }

        let mut palms = suppress(candidates, self.config.iou_threshold);
        palms.truncate(self.config.max_palms);
        log::trace!("palm detector: {} palms", palms.len());
        Ok(palms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palm(score: f32, x: f32, size: f32) -> PalmDetection {
        PalmDetection {
            score,
            bounds: PalmBox {
                center: Vec2::new(x, 50.0),
                width: size,
                height: size,
            },
            keypoints: vec![Vec2::new(x, 50.0); PALM_KEYPOINTS],
        }
    }

    #[test]
    fn test_anchor_layout_for_192() {
        let anchors = ssd_anchors(192);
        assert_eq!(anchors.len(), 2016);
        assert_eq!(anchors[0], Anchor { x: 0.5 / 24.0, y: 0.5 / 24.0 });
        assert_eq!(anchors[1], anchors[0]);
        assert_eq!(anchors[2].x, 1.5 / 24.0);
        // first anchor of the stride 16 layer
        assert_eq!(anchors[1152], Anchor { x: 0.5 / 12.0, y: 0.5 / 12.0 });
    }

    #[test]
    fn test_iou() {
        let a = palm(0.9, 50.0, 20.0).bounds;
        assert_eq!(a.iou(&a), 1.0);
        assert_eq!(a.iou(&palm(0.9, 100.0, 20.0).bounds), 0.0);
        // half overlap: 200 / (400 + 400 - 200)
        let b = palm(0.9, 60.0, 20.0).bounds;
        assert!((a.iou(&b) - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_suppress_keeps_best_of_overlapping() {
        let kept = suppress(
            vec![palm(0.6, 50.0, 20.0), palm(0.9, 52.0, 20.0), palm(0.7, 150.0, 20.0)],
            0.3,
        );
        let scores: Vec<f32> = kept.iter().map(|p| p.score).collect();
        assert_eq!(scores, vec![0.9, 0.7]);
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(f32::NAN).is_nan());
    }
}
