//! HTTP front end for the gestura pipeline.
//!
//! One request per connection. `/video_feed` streams annotated frames as
//! `multipart/x-mixed-replace`, `/get_prediction` reads the shared
//! prediction, `/get_cameras` and `/set_camera` manage the per-session
//! camera choice.

pub mod error;
pub mod factory;
pub mod framing;
pub mod server;
pub mod session;

pub use error::ComError;
pub use factory::PipelineFactory;
pub use server::{GestureService, Server};
pub use session::{DEFAULT_MAX_SESSIONS, SESSION_COOKIE, SessionStore};
