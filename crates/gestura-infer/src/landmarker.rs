//! Hand landmark detection.
//!
//! Two stages: the palm detector finds up to two palms in the full frame,
//! then the landmark model runs once on a rotated square crop around each
//! palm. Each result is routed to the left or right slot by the landmark
//! model's handedness score.

use crate::session::expect_output;
use crate::{
    Backend, HAND_LANDMARK_COUNT, HandLandmarkSet, HandLandmarks, Handedness, InferError,
    Landmark, ModelSource, PalmDetection, PalmDetector, PalmDetectorConfig, Session,
};
use gestura_base::{Tensor, Vec2};

/// Detects hand landmarks in RGB frames.
pub trait HandLandmarker {
    /// Returns the hands found in an `[H, W, 3]` frame, landmarks normalized to the frame.
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<HandLandmarks, InferError>;
}

#[derive(Debug, Clone)]
pub struct HandLandmarkerConfig {
    input_size: usize,
    presence_threshold: f32,
    handedness_threshold: f32,
    roi_scale: f32,
}

impl Default for HandLandmarkerConfig {
    fn default() -> Self {
        Self {
            input_size: 224,
            presence_threshold: 0.5,
            handedness_threshold: 0.5,
            roi_scale: 2.6,
        }
    }
}

impl HandLandmarkerConfig {
    /// Side of the square model input in pixels.
    pub fn with_input_size(mut self, input_size: usize) -> Self {
        self.input_size = input_size.max(1);
        self
    }

    /// Minimum presence score for a hand to be reported.
    pub fn with_presence_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold;
        self
    }

    /// Handedness scores above this are right hands.
    pub fn with_handedness_threshold(mut self, threshold: f32) -> Self {
        self.handedness_threshold = threshold;
        self
    }

    /// Side of the hand crop relative to the larger palm box side.
    pub fn with_roi_scale(mut self, scale: f32) -> Self {
        self.roi_scale = scale;
        self
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn presence_threshold(&self) -> f32 {
        self.presence_threshold
    }

    pub fn handedness_threshold(&self) -> f32 {
        self.handedness_threshold
    }

    pub fn roi_scale(&self) -> f32 {
        self.roi_scale
    }
}

/// Mapping between frame pixels and the square model input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub frame_width: f32,
    pub frame_height: f32,
}

impl Letterbox {
    /// Converts a point in model input pixels to frame pixels.
    pub fn to_pixels(&self, x: f32, y: f32) -> Vec2<f32> {
        Vec2::new((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }

    /// Converts a point in model input pixels to normalized frame coordinates.
    pub fn to_frame(&self, x: f32, y: f32, z: f32) -> Landmark {
        let p = self.to_pixels(x, y);
        Landmark::new(
            p.x / self.frame_width,
            p.y / self.frame_height,
            z / self.scale / self.frame_width,
        )
    }
}

fn frame_dims(frame: &Tensor<u8>) -> Result<(usize, usize), InferError> {
    match frame.shape.as_slice() {
        [h, w, 3] if *h > 0 && *w > 0 => Ok((*h, *w)),
        shape => Err(InferError::ShapeMismatch {
            expected: "[H, W, 3]".to_string(),
            got: format!("{:?}", shape),
        }),
    }
}

/// Letterboxes an RGB frame into a `[1, 3, size, size]` tensor with values in `[0, 1]`.
///
/// The frame is scaled (nearest neighbor) to fit, centered, and padded with black.
pub fn letterbox(frame: &Tensor<u8>, size: usize) -> Result<(Tensor<f32>, Letterbox), InferError> {
    let (h, w) = frame_dims(frame)?;

    let scale = (size as f32 / w as f32).min(size as f32 / h as f32);
    let new_w = ((w as f32 * scale) as usize).clamp(1, size);
    let new_h = ((h as f32 * scale) as usize).clamp(1, size);
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;

    let plane = size * size;
    let mut data = vec![0.0f32; 3 * plane];
    for y in 0..new_h {
        let src_y = ((y as f32 / scale) as usize).min(h - 1);
        for x in 0..new_w {
            let src_x = ((x as f32 / scale) as usize).min(w - 1);
            let src = (src_y * w + src_x) * 3;
            let dst = (y + pad_y) * size + x + pad_x;
            for ch in 0..3 {
                data[ch * plane + dst] = frame.data[src + ch] as f32 / 255.0;
            }
        }
    }

    let input = Tensor::new(vec![1, 3, size, size], data)?;
    Ok((
        input,
        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            frame_width: w as f32,
            frame_height: h as f32,
        },
    ))
}

/// Rotated square around a hand, in frame pixels.
///
/// `rotation` is clockwise in image coordinates; at 0 the fingers point up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandRegion {
    pub center: Vec2<f32>,
    pub side: f32,
    pub rotation: f32,
}

impl HandRegion {
    /// Region covering the whole hand of a detected palm.
    ///
    /// The square is aligned with the wrist to middle finger axis, shifted
    /// half a palm toward the fingers and scaled up from the palm box.
    pub fn from_palm(palm: &PalmDetection, scale: f32) -> Self {
        let wrist = palm.wrist();
        let middle = palm.middle_mcp();
        let (dx, dy) = (middle.x - wrist.x, middle.y - wrist.y);
        let rotation = if dx == 0.0 && dy == 0.0 { 0.0 } else { dx.atan2(-dy) };

        let shift = 0.5 * palm.bounds.height;
        let (sin, cos) = rotation.sin_cos();
        Self {
            center: Vec2::new(
                palm.bounds.center.x + sin * shift,
                palm.bounds.center.y - cos * shift,
            ),
            side: palm.bounds.width.max(palm.bounds.height) * scale,
            rotation,
        }
    }

    /// Converts a point in `size` x `size` crop pixels to frame pixels.
    pub fn to_frame(&self, u: f32, v: f32, size: usize) -> Vec2<f32> {
        let du = (u / size as f32 - 0.5) * self.side;
        let dv = (v / size as f32 - 0.5) * self.side;
        let (sin, cos) = self.rotation.sin_cos();
        Vec2::new(
            self.center.x + cos * du - sin * dv,
            self.center.y + sin * du + cos * dv,
        )
    }
}

/// Samples a region of an RGB frame into a `[1, 3, size, size]` tensor with
/// values in `[0, 1]`. Nearest neighbor; outside the frame is black.
pub fn crop_region(
    frame: &Tensor<u8>,
    region: &HandRegion,
    size: usize,
) -> Result<Tensor<f32>, InferError> {
    let (h, w) = frame_dims(frame)?;

    let plane = size * size;
    let mut data = vec![0.0f32; 3 * plane];
    for v in 0..size {
        for u in 0..size {
            let p = region.to_frame(u as f32 + 0.5, v as f32 + 0.5, size);
            let (sx, sy) = (p.x.floor(), p.y.floor());
            if sx < 0.0 || sy < 0.0 || sx >= w as f32 || sy >= h as f32 {
                continue;
            }
            let src = (sy as usize * w + sx as usize) * 3;
            let dst = v * size + u;
            for ch in 0..3 {
                data[ch * plane + dst] = frame.data[src + ch] as f32 / 255.0;
            }
        }
    }
    Ok(Tensor::new(vec![1, 3, size, size], data)?)
}

/// Palm detector followed by the hand landmark model, MediaPipe layout.
///
/// Landmark model outputs, in declared order: screen landmarks `[1, 63]` in
/// crop pixels, presence `[1, 1]`, handedness `[1, 1]`, and optionally world
/// landmarks.
pub struct OnnxHandLandmarker {
    palms: PalmDetector,
    session: Box<dyn Session>,
    config: HandLandmarkerConfig,
}

struct Hand {
    side: Handedness,
    presence: f32,
    landmarks: HandLandmarkSet,
}

impl OnnxHandLandmarker {
    pub fn new(
        palm_model: ModelSource,
        landmark_model: ModelSource,
        backend: &dyn Backend,
    ) -> Result<Self, InferError> {
        Self::from_sessions(
            backend.load_model(palm_model)?,
            backend.load_model(landmark_model)?,
        )
    }

    pub fn from_sessions(
        palm: Box<dyn Session>,
        landmark: Box<dyn Session>,
    ) -> Result<Self, InferError> {
        if landmark.input_names().is_empty() {
            return Err(InferError::ModelLoad("landmark model has no inputs".to_string()));
        }
        if landmark.output_names().len() < 3 {
            return Err(InferError::ModelLoad(format!(
                "landmark model needs 3 outputs, has {}",
                landmark.output_names().len()
            )));
        }
        Ok(Self {
            palms: PalmDetector::from_session(palm)?,
            session: landmark,
            config: HandLandmarkerConfig::default(),
        })
    }

    pub fn with_config(mut self, config: HandLandmarkerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_palm_config(mut self, config: PalmDetectorConfig) -> Self {
        self.palms = self.palms.with_config(config);
        self
    }

    pub fn config(&self) -> &HandLandmarkerConfig {
        &self.config
    }

    pub fn palm_config(&self) -> &PalmDetectorConfig {
        self.palms.config()
    }

    fn landmarks(&mut self, frame: &Tensor<u8>, region: &HandRegion) -> Result<Option<Hand>, InferError> {
        let size = self.config.input_size;
        let input = crop_region(frame, region, size)?;

        let input_name = self.session.input_names()[0].clone();
        let names = self.session.output_names()[..3].to_vec();
        let outputs = self.session.run(&[(input_name.as_str(), input)])?;

        let screen = expect_output(&outputs, &names[0], HAND_LANDMARK_COUNT * 3)?;
        let presence = expect_output(&outputs, &names[1], 1)?.data[0];
        let handedness = expect_output(&outputs, &names[2], 1)?.data[0];

        if presence.is_nan() || presence <= self.config.presence_threshold {
            return Ok(None);
        }

        let (h, w) = frame_dims(frame)?;
        let (w, h) = (w as f32, h as f32);
        let depth = region.side / size as f32 / w;
        let landmarks = screen
            .data
            .chunks_exact(3)
            .map(|p| {
                let q = region.to_frame(p[0], p[1], size);
                Landmark::new(q.x / w, q.y / h, p[2] * depth)
            })
            .collect();
        let side = if handedness > self.config.handedness_threshold {
            Handedness::Right
        } else {
            Handedness::Left
        };
        Ok(Some(Hand {
            side,
            presence,
            landmarks: HandLandmarkSet::new(landmarks),
        }))
    }
}

impl HandLandmarker for OnnxHandLandmarker {
    fn detect(&mut self, frame: &Tensor<u8>) -> Result<HandLandmarks, InferError> {
        let palms = self.palms.detect(frame)?;

        // best presence per slot, left then right
        let mut slots: [Option<Hand>; 2] = [None, None];
        for palm in &palms {
            let region = HandRegion::from_palm(palm, self.config.roi_scale);
            let Some(hand) = self.landmarks(frame, &region)? else {
                continue;
            };
            let slot = &mut slots[hand.side as usize];
            if slot.as_ref().is_some_and(|kept| kept.presence >= hand.presence) {
                log::debug!("dropping second {:?} hand", hand.side);
            } else {
                *slot = Some(hand);
            }
        }

        let mut hands = HandLandmarks::none();
        for hand in slots.into_iter().flatten() {
            hands.insert(hand.side, hand.landmarks);
        }
        Ok(hands)
    }
}
