pub mod config;
pub mod factory;

pub use config::{ConfigError, ServerConfig};
pub use factory::OnnxPipelineFactory;
