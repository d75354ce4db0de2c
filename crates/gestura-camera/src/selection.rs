use crate::CameraError;
use std::{fmt, str::FromStr};

/// Index of the capture device a client session streams from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CameraSelection(pub u32);

impl CameraSelection {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl FromStr for CameraSelection {
    type Err = CameraError;

    /// Strict parse: surrounding whitespace is allowed, anything else that is
    /// not a non-negative integer is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(CameraSelection)
            .map_err(|_| CameraError::InvalidSelection(s.to_string()))
    }
}

impl fmt::Display for CameraSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "camera {}", self.0)
    }
}
