#![allow(dead_code)]

use gestura_base::Tensor;
use gestura_camera::{Camera, CameraError};
use gestura_infer::{
    GestureClassifier, HAND_LANDMARK_COUNT, HandLandmarkSet, HandLandmarks, HandLandmarker,
    InferError, Landmark, ProbabilityVector,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::sync::atomic::{AtomicBool, Ordering};

pub fn frame(width: usize, height: usize) -> Tensor<u8> {
    Tensor::new(vec![height, width, 3], vec![40; width * height * 3]).unwrap()
}

pub fn hand(count: usize, x: f32) -> HandLandmarkSet {
    HandLandmarkSet::new(
        (0..count)
            .map(|i| Landmark::new(x, i as f32 / HAND_LANDMARK_COUNT as f32, -0.01 * i as f32))
            .collect(),
    )
}

pub fn confident(index: usize, score: f32) -> ProbabilityVector {
    let rest = (1.0 - score) / 3.0;
    let mut scores = [rest; 4];
    scores[index] = score;
    ProbabilityVector::new(scores)
}

/// Yields `frames` frames, then reports end of stream. Sets `released` on drop.
pub struct MockCamera {
    pub frames: usize,
    pub size: (usize, usize),
    pub released: Arc<AtomicBool>,
}

impl MockCamera {
    pub fn new(frames: usize) -> Self {
        Self {
            frames,
            size: (64, 48),
            released: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Camera for MockCamera {
    async fn recv(&mut self) -> Result<Option<Tensor<u8>>, CameraError> {
        if self.frames == 0 {
            return Ok(None);
        }
        self.frames -= 1;
        Ok(Some(frame(self.size.0, self.size.1)))
    }
}

impl Drop for MockCamera {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

/// Returns scripted detections, repeating the last one.
pub struct MockDetector {
    pub script: VecDeque<HandLandmarks>,
}

impl MockDetector {
    pub fn new(script: Vec<HandLandmarks>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn right_hand() -> Self {
        Self::new(vec![HandLandmarks {
            left: None,
            right: Some(hand(HAND_LANDMARK_COUNT, 0.5)),
        }])
    }
}

impl HandLandmarker for MockDetector {
    fn detect(&mut self, _frame: &Tensor<u8>) -> Result<HandLandmarks, InferError> {
        if self.script.len() > 1 {
            Ok(self.script.pop_front().unwrap_or_default())
        } else {
            Ok(self.script.front().cloned().unwrap_or_default())
        }
    }
}

/// Returns scripted probabilities in order, repeating the last one, and
/// records every feature tensor it receives. `delay` blocks each call.
pub struct MockClassifier {
    pub script: VecDeque<ProbabilityVector>,
    pub seen: Arc<Mutex<Vec<Tensor<f32>>>>,
    pub delay: Duration,
}

impl MockClassifier {
    pub fn new(script: Vec<ProbabilityVector>) -> Self {
        Self {
            script: script.into(),
            seen: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl GestureClassifier for MockClassifier {
    fn classify(&mut self, features: &Tensor<f32>) -> Result<ProbabilityVector, InferError> {
        std::thread::sleep(self.delay);
        self.seen.lock().unwrap().push(features.clone());
        let next = if self.script.len() > 1 {
            self.script.pop_front()
        } else {
            self.script.front().copied()
        };
        next.ok_or_else(|| InferError::Backend("empty script".to_string()))
    }
}
