//! Camera capture for the gestura pipeline.
//!
//! Provides the async [`Camera`] trait yielding RGB frames, device
//! enumeration through [`CameraProbe`], and a V4L2 backend.

pub mod config;
pub mod enumerate;
pub mod error;
pub mod selection;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::CameraConfig;
pub use enumerate::{CameraProbe, DEFAULT_MAX_CAMERAS, enumerate_cameras};
pub use error::CameraError;
pub use selection::CameraSelection;
pub use traits::Camera;

#[cfg(feature = "v4l2")]
pub use v4l2::{V4l2Camera, V4l2Probe};
