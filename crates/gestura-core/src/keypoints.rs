use crate::PipelineError;
use gestura_infer::{HandLandmarkSet, HandLandmarks, Handedness};
use std::{fmt, str::FromStr};

/// What to do when both hands are present with the same landmark count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Select neither hand; the classifier sees the zero vector.
    #[default]
    Discard,
    PreferRight,
}

impl FromStr for TieBreak {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "discard" => Ok(TieBreak::Discard),
            "prefer-right" => Ok(TieBreak::PreferRight),
            other => Err(PipelineError::Config(format!(
                "unknown tie-break {other:?}, expected \"discard\" or \"prefer-right\""
            ))),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::Discard => f.write_str("discard"),
            TieBreak::PreferRight => f.write_str("prefer-right"),
        }
    }
}

/// The hand whose keypoints feed the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a> {
    Hand(Handedness, &'a HandLandmarkSet),
    /// No usable hand; encodes to the zero tensor.
    None,
}

impl Selection<'_> {
    pub fn handedness(&self) -> Option<Handedness> {
        match self {
            Selection::Hand(handedness, _) => Some(*handedness),
            Selection::None => None,
        }
    }
}

/// Picks one hand from a detection.
///
/// A lone hand is always selected. With both present the one with more
/// landmarks wins, and equal counts fall to `tie_break`.
pub fn select_keypoints(hands: &HandLandmarks, tie_break: TieBreak) -> Selection<'_> {
    match (&hands.left, &hands.right) {
        (None, Some(right)) => Selection::Hand(Handedness::Right, right),
        (Some(left), None) => Selection::Hand(Handedness::Left, left),
        (Some(left), Some(right)) if right.len() > left.len() => {
            Selection::Hand(Handedness::Right, right)
        }
        (Some(left), Some(right)) if left.len() > right.len() => {
            Selection::Hand(Handedness::Left, left)
        }
        (Some(_), Some(right)) => match tie_break {
            TieBreak::Discard => Selection::None,
            TieBreak::PreferRight => Selection::Hand(Handedness::Right, right),
        },
        (None, None) => Selection::None,
    }
}
