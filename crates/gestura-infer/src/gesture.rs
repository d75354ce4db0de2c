use crate::InferError;
use std::{fmt, str::FromStr};

/// Gesture labels, in classifier output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    Right,
    Left,
    Up,
    Down,
}

impl Gesture {
    pub const ALL: [Gesture; 4] = [Gesture::Right, Gesture::Left, Gesture::Up, Gesture::Down];

    pub fn label(&self) -> &'static str {
        match self {
            Gesture::Right => "right",
            Gesture::Left => "left",
            Gesture::Up => "up",
            Gesture::Down => "down",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gesture {
    type Err = InferError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|gesture| gesture.label() == s)
            .ok_or_else(|| InferError::Backend(format!("unknown gesture label: {s:?}")))
    }
}

/// Classifier scores, one per [`Gesture`] in [`Gesture::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProbabilityVector([f32; 4]);

impl ProbabilityVector {
    pub const fn new(scores: [f32; 4]) -> Self {
        Self(scores)
    }

    /// Builds a vector from raw model output, which must hold exactly 4 scores.
    pub fn from_slice(scores: &[f32]) -> Result<Self, InferError> {
        <[f32; 4]>::try_from(scores).map(Self).map_err(|_| InferError::ShapeMismatch {
            expected: "4 scores".to_string(),
            got: format!("{} scores", scores.len()),
        })
    }

    pub fn scores(&self) -> &[f32; 4] {
        &self.0
    }

    pub fn get(&self, gesture: Gesture) -> f32 {
        self.0[gesture.index()]
    }

    /// Highest scoring gesture; the first index wins ties and a NaN score
    /// wins over any number.
    pub fn argmax(&self) -> Gesture {
        let mut best = 0;
        for (index, &score) in self.0.iter().enumerate().skip(1) {
            let current = self.0[best];
            if current.is_nan() {
                break;
            }
            if score.is_nan() || score > current {
                best = index;
            }
        }
        Gesture::ALL[best]
    }

    /// Score of the [`argmax`](Self::argmax) gesture.
    pub fn confidence(&self) -> f32 {
        self.get(self.argmax())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Gesture, f32)> + '_ {
        Gesture::ALL.into_iter().zip(self.0.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_first_index_wins_ties() {
        let p = ProbabilityVector::new([0.4, 0.4, 0.1, 0.1]);
        assert_eq!(p.argmax(), Gesture::Right);
        let p = ProbabilityVector::new([0.1, 0.2, 0.35, 0.35]);
        assert_eq!(p.argmax(), Gesture::Up);
    }

    #[test]
    fn test_argmax_nan_wins() {
        let p = ProbabilityVector::new([0.2, f32::NAN, 0.7, 0.1]);
        assert_eq!(p.argmax(), Gesture::Left);
        assert!(p.confidence().is_nan());
    }
}
