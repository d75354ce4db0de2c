//! Diagnostic overlays drawn onto each frame before it is emitted.

use crate::{GestureHistory, PipelineError};
use gestura_base::{Tensor, Vec2};
use gestura_image::{Canvas, Rgb};
use gestura_infer::{
    HAND_CONNECTIONS, HandLandmarkSet, HandLandmarks, Handedness, ProbabilityVector,
};

pub const LEFT_HAND_COLOR: Rgb = [0, 128, 0];
pub const RIGHT_HAND_COLOR: Rgb = [0, 0, 255];
/// Bar colors in gesture order: orange, green, cyan, violet.
pub const BAR_COLORS: [Rgb; 4] = [[255, 127, 0], [0, 255, 0], [0, 255, 255], [127, 0, 255]];
pub const BANNER_COLOR: Rgb = [24, 25, 26];
pub const TEXT_COLOR: Rgb = [255, 255, 255];

const SKELETON_THICKNESS: i32 = 2;
const JOINT_RADIUS: i32 = 2;

const BAR_TOP: i32 = 60;
const BAR_HEIGHT: i32 = 30;
const BAR_SPACING: i32 = 40;
const BAR_LABEL_BASELINE: i32 = 85;
/// Pixels per unit of probability.
const BAR_SCALE: f32 = 100.0;

const BANNER_END: Vec2<i32> = Vec2::new(725, 40);
const BANNER_TEXT: Vec2<i32> = Vec2::new(25, 30);

pub fn hand_color(handedness: Handedness) -> Rgb {
    match handedness {
        Handedness::Left => LEFT_HAND_COLOR,
        Handedness::Right => RIGHT_HAND_COLOR,
    }
}

// far enough off-frame to clip, small enough that brush offsets cannot overflow
const PIXEL_LIMIT: f32 = (1 << 20) as f32;

fn to_pixel(size: Vec2<usize>, x: f32, y: f32) -> Vec2<i32> {
    let scale = |v: f32, extent: usize| {
        (v * extent as f32).round().clamp(-PIXEL_LIMIT, PIXEL_LIMIT) as i32
    };
    Vec2::new(scale(x, size.x), scale(y, size.y))
}

/// Bones and joints of one hand. Connections to missing landmarks are skipped.
pub fn draw_hand(canvas: &mut Canvas<'_>, hand: &HandLandmarkSet, color: Rgb) {
    let size = canvas.dimensions();
    let points: Vec<Vec2<i32>> = hand.iter().map(|lm| to_pixel(size, lm.x, lm.y)).collect();

    for (a, b) in HAND_CONNECTIONS {
        if let (Some(&a), Some(&b)) = (points.get(a), points.get(b)) {
            canvas.thick_line(a, b, SKELETON_THICKNESS, color);
        }
    }
    for &point in &points {
        canvas.filled_circle(point, JOINT_RADIUS, color);
    }
}

pub fn draw_hands(canvas: &mut Canvas<'_>, hands: &HandLandmarks) {
    for (handedness, hand) in hands.hands() {
        draw_hand(canvas, hand, hand_color(handedness));
    }
}

/// One bar per gesture, length proportional to its score, with the label.
pub fn draw_probabilities(canvas: &mut Canvas<'_>, probabilities: &ProbabilityVector) {
    for (i, (gesture, score)) in probabilities.iter().enumerate() {
        let offset = i as i32 * BAR_SPACING;
        let top = BAR_TOP + offset;
        let width = if score.is_nan() { 0 } else { (score * BAR_SCALE) as i32 };
        canvas.fill_rect(
            Vec2::new(0, top),
            Vec2::new(width, top + BAR_HEIGHT),
            BAR_COLORS[i],
        );
        canvas.text(gesture.label(), Vec2::new(0, BAR_LABEL_BASELINE + offset), TEXT_COLOR);
    }
}

pub fn draw_history(canvas: &mut Canvas<'_>, history: &GestureHistory) {
    canvas.fill_rect(Vec2::new(0, 0), BANNER_END, BANNER_COLOR);
    canvas.text(&history.to_string(), BANNER_TEXT, TEXT_COLOR);
}

/// Draws hands, probability bars, then the history banner on top.
pub fn render(
    frame: &mut Tensor<u8>,
    hands: &HandLandmarks,
    probabilities: &ProbabilityVector,
    history: &GestureHistory,
) -> Result<(), PipelineError> {
    let mut canvas = Canvas::new(frame)?;
    draw_hands(&mut canvas, hands);
    draw_probabilities(&mut canvas, probabilities);
    draw_history(&mut canvas, history);
    Ok(())
}
