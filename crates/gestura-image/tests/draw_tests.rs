use gestura_base::{Tensor, Vec2};
use gestura_image::Canvas;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];

fn blank(width: usize, height: usize) -> Tensor<u8> {
    Tensor::zeros(vec![height, width, 3]).unwrap()
}

#[test]
fn test_line_horizontal() {
    let mut frame = blank(10, 5);
    let mut canvas = Canvas::new(&mut frame).unwrap();
    canvas.line(Vec2::new(1, 2), Vec2::new(8, 2), WHITE);

    for x in 1..=8 {
        assert_eq!(canvas.pixel(x, 2), Some(WHITE), "pixel ({x}, 2)");
    }
    assert_eq!(canvas.pixel(0, 0), Some(BLACK));
}

#[test]
fn test_line_clips_to_bounds() {
    let mut frame = blank(10, 10);
    let mut canvas = Canvas::new(&mut frame).unwrap();
    canvas.line(Vec2::new(-5, 5), Vec2::new(15, 5), WHITE);

    for x in 0..10 {
        assert_eq!(canvas.pixel(x, 5), Some(WHITE));
    }
}

#[test]
fn test_thick_line_far_outside_does_not_panic() {
    let mut frame = blank(10, 10);
    let mut canvas = Canvas::new(&mut frame).unwrap();
    canvas.thick_line(Vec2::new(-1000, -1000), Vec2::new(5000, 4000), 4, WHITE);
    canvas.thick_line(Vec2::new(-100, 3), Vec2::new(-50, 8), 4, WHITE);
}

#[test]
fn test_filled_circle_clips() {
    let mut frame = blank(10, 10);
    let mut canvas = Canvas::new(&mut frame).unwrap();
    canvas.filled_circle(Vec2::new(0, 0), 3, WHITE);

    assert_eq!(canvas.pixel(0, 0), Some(WHITE));
    assert_eq!(canvas.pixel(2, 2), Some(WHITE));
    assert_eq!(canvas.pixel(3, 3), Some(BLACK));
}

#[test]
fn test_fill_rect_inclusive_and_clipped() {
    let mut frame = blank(20, 20);
    let mut canvas = Canvas::new(&mut frame).unwrap();
    let red = [255, 0, 0];
    canvas.fill_rect(Vec2::new(0, 10), Vec2::new(100, 15), red);

    assert_eq!(canvas.pixel(19, 10), Some(red));
    assert_eq!(canvas.pixel(0, 15), Some(red));
    assert_eq!(canvas.pixel(0, 16), Some(BLACK));
    assert_eq!(canvas.pixel(0, 9), Some(BLACK));
}

#[test]
fn test_fill_rect_zero_width_draws_single_column() {
    let mut frame = blank(8, 8);
    let mut canvas = Canvas::new(&mut frame).unwrap();
    canvas.fill_rect(Vec2::new(0, 2), Vec2::new(0, 4), WHITE);

    assert_eq!(canvas.pixel(0, 3), Some(WHITE));
    assert_eq!(canvas.pixel(1, 3), Some(BLACK));
}

#[test]
fn test_text_draws_pixels_above_baseline() {
    let mut frame = blank(120, 40);
    let mut canvas = Canvas::new(&mut frame).unwrap();
    canvas.text("up down", Vec2::new(5, 30), WHITE);
    drop(canvas);

    let lit = frame.data.chunks_exact(3).filter(|p| *p == WHITE).count();
    assert!(lit > 0);
    // nothing below the baseline except descenders
    let below: usize = (36..40)
        .map(|y| (0..120).filter(|&x| frame.data[(y * 120 + x) * 3] == 255).count())
        .sum();
    assert_eq!(below, 0);
}

#[test]
fn test_text_off_frame_is_clipped() {
    let mut frame = blank(20, 20);
    let mut canvas = Canvas::new(&mut frame).unwrap();
    canvas.text("left right up down", Vec2::new(-50, 500), WHITE);
    drop(canvas);
    assert!(frame.data.iter().all(|&v| v == 0));
}

#[test]
fn test_canvas_rejects_non_rgb_frame() {
    let mut frame = Tensor::new(vec![2, 2, 1], vec![0u8; 4]).unwrap();
    assert!(Canvas::new(&mut frame).is_err());
}
