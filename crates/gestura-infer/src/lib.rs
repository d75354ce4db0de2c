//! Model adapters for the gestura pipeline.
//!
//! The pipeline only sees the [`HandLandmarker`] and [`GestureClassifier`]
//! traits. The ONNX adapters (palm detection, hand landmarks, gesture
//! classification) implement them on top of a generic
//! [`Backend`]/[`Session`] pair so tests can substitute scripted sessions.

pub mod backend;
pub mod backends;
pub mod classifier;
pub mod device;
pub mod error;
pub mod gesture;
pub mod hand;
pub mod landmarker;
pub mod modelsource;
pub mod palm;
pub mod session;

pub use backend::Backend;
pub use classifier::{GestureClassifier, OnnxGestureClassifier};
pub use device::Device;
pub use error::InferError;
pub use gesture::{Gesture, ProbabilityVector};
pub use hand::{
    HAND_CONNECTIONS, HAND_LANDMARK_COUNT, HandLandmarkSet, HandLandmarks, Handedness, Landmark,
};
pub use landmarker::{
    HandLandmarker, HandLandmarkerConfig, HandRegion, Letterbox, OnnxHandLandmarker, crop_region,
    letterbox,
};
pub use modelsource::ModelSource;
pub use palm::{
    Anchor, PALM_REGRESSION_LEN, PalmBox, PalmDetection, PalmDetector, PalmDetectorConfig,
    ssd_anchors,
};
pub use session::Session;

#[cfg(feature = "onnx")]
pub use backends::OnnxBackend;
