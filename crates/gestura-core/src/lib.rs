//! Per-frame gesture pipeline.
//!
//! A [`Pipeline`] pulls frames from a [`Camera`](gestura_camera::Camera),
//! detects hands, selects one hand's keypoints, classifies them, smooths the
//! result into a [`GestureHistory`], renders overlays and emits JPEG frames.
//! Stable gestures are published to a [`SharedPrediction`] that any number of
//! readers can poll.

pub mod config;
pub mod error;
pub mod features;
pub mod history;
pub mod keypoints;
pub mod overlay;
pub mod pipeline;
pub mod prediction;

pub use config::PipelineConfig;
pub use error::PipelineError;
pub use features::{KEYPOINT_SHAPE, encode_keypoints};
pub use history::{DEFAULT_HISTORY_CAPACITY, GestureHistory, HistorySmoother, SmootherState};
pub use keypoints::{Selection, TieBreak, select_keypoints};
pub use pipeline::{Pipeline, PipelineExit, PipelineState};
pub use prediction::SharedPrediction;
