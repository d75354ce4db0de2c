//! Shared primitives for the gestura workspace: logging setup, a minimal
//! shape-checked tensor, and a 2-D vector used for sizes and positions.

pub mod logging;
pub mod tensor;
pub mod vec2;

pub use logging::{FileLogger, StdoutLogger, init_file_logger, init_stdout_logger};
pub use tensor::{Tensor, TensorError};
pub use vec2::Vec2;

// Re-export log crate so downstream crates can use gestura_base::log::*
pub use log;
