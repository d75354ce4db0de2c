use gestura_core::TieBreak;
use gestura_infer::Device;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_PALM_MODEL: &str = "data/hand/palm_detection_full.onnx";
pub const DEFAULT_LANDMARK_MODEL: &str = "data/hand/hand_landmark_full.onnx";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "data/gesture/gesture_classifier.onnx";

#[derive(Debug)]
pub enum ConfigError {
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "invalid {key}={value:?}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Settings for the web server, read from `GESTURA_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub palm_model: PathBuf,
    pub landmark_model: PathBuf,
    pub classifier_model: PathBuf,
    pub max_cameras: u32,
    /// Distinct browser sessions remembered at once.
    pub max_sessions: usize,
    pub tie_break: TieBreak,
    pub device: Device,
    /// Log to day files in this directory instead of stdout.
    pub log_dir: Option<PathBuf>,
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = match lookup("GESTURA_ADDR") {
            Some(value) => parse("GESTURA_ADDR", value)?,
            None => parse("GESTURA_ADDR", DEFAULT_ADDR.to_string())?,
        };
        let max_cameras = match lookup("GESTURA_MAX_CAMERAS") {
            Some(value) => parse("GESTURA_MAX_CAMERAS", value)?,
            None => gestura_camera::DEFAULT_MAX_CAMERAS,
        };
        let max_sessions = match lookup("GESTURA_MAX_SESSIONS") {
            Some(value) => parse("GESTURA_MAX_SESSIONS", value)?,
            None => gestura_com::DEFAULT_MAX_SESSIONS,
        };
        let tie_break = match lookup("GESTURA_TIE_BREAK") {
            Some(value) => parse("GESTURA_TIE_BREAK", value)?,
            None => TieBreak::default(),
        };
        let device = match lookup("GESTURA_DEVICE") {
            Some(value) => parse("GESTURA_DEVICE", value)?,
            None => Device::Cpu,
        };

        Ok(Self {
            addr,
            palm_model: lookup("GESTURA_PALM_MODEL")
                .unwrap_or_else(|| DEFAULT_PALM_MODEL.to_string())
                .into(),
            landmark_model: lookup("GESTURA_LANDMARK_MODEL")
                .unwrap_or_else(|| DEFAULT_LANDMARK_MODEL.to_string())
                .into(),
            classifier_model: lookup("GESTURA_CLASSIFIER_MODEL")
                .unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string())
                .into(),
            max_cameras,
            max_sessions,
            tie_break,
            device,
            log_dir: lookup("GESTURA_LOG_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
