//! Hand landmark types.

/// Number of landmarks in a complete hand.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Bone connections between hand landmarks, for skeleton drawing.
///
/// Index 0 is the wrist, then four landmarks per digit from thumb to pinky,
/// base to tip.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    // thumb
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    // index
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    // middle
    (5, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    // ring
    (9, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    // pinky
    (13, 17),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
];

/// A landmark in normalized frame coordinates: `x` and `y` in `[0, 1]`
/// across the frame, `z` relative depth on the same scale as `x`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmarks of one hand.
///
/// A well-behaved detector produces [`HAND_LANDMARK_COUNT`] points; the
/// count is kept as reported so downstream stages can compare hands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandLandmarkSet {
    landmarks: Vec<Landmark>,
}

impl HandLandmarkSet {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn zeros() -> Self {
        Self::new(vec![Landmark::default(); HAND_LANDMARK_COUNT])
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.landmarks.iter()
    }
}

impl From<Vec<Landmark>> for HandLandmarkSet {
    fn from(landmarks: Vec<Landmark>) -> Self {
        Self::new(landmarks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

/// Detector output for one frame, one optional slot per hand.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandLandmarks {
    pub left: Option<HandLandmarkSet>,
    pub right: Option<HandLandmarkSet>,
}

impl HandLandmarks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    pub fn get(&self, handedness: Handedness) -> Option<&HandLandmarkSet> {
        match handedness {
            Handedness::Left => self.left.as_ref(),
            Handedness::Right => self.right.as_ref(),
        }
    }

    /// Stores `hand` in the slot for `handedness`, replacing what was there.
    pub fn insert(&mut self, handedness: Handedness, hand: HandLandmarkSet) {
        match handedness {
            Handedness::Left => self.left = Some(hand),
            Handedness::Right => self.right = Some(hand),
        }
    }

    /// Present hands, left first.
    pub fn hands(&self) -> impl Iterator<Item = (Handedness, &HandLandmarkSet)> {
        [
            (Handedness::Left, self.left.as_ref()),
            (Handedness::Right, self.right.as_ref()),
        ]
        .into_iter()
        .filter_map(|(handedness, hand)| hand.map(|hand| (handedness, hand)))
    }
}
