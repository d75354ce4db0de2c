//! Clipped drawing onto RGB frames.
//!
//! Every primitive silently discards pixels outside the frame, so callers can
//! pass coordinates from detectors or fixed layouts without bounds checks.

use crate::{ImageError, frame_size};
use embedded_graphics::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{MonoTextStyle, ascii::FONT_10X20},
    pixelcolor::{Rgb888, RgbColor},
    text::{Baseline, Text},
    Drawable,
};
use gestura_base::{Tensor, Vec2};
use std::convert::Infallible;

pub type Rgb = [u8; 3];

/// Mutable drawing view over an RGB frame.
pub struct Canvas<'a> {
    buf: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut Tensor<u8>) -> Result<Self, ImageError> {
        let size = frame_size(frame)?;
        Ok(Self {
            buf: &mut frame.data,
            width: size.x,
            height: size.y,
        })
    }

    pub fn dimensions(&self) -> Vec2<usize> {
        Vec2::new(self.width, self.height)
    }

    /// Read back a pixel, `None` outside the frame.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        if !self.contains(x, y) {
            return None;
        }
        let idx = (y as usize * self.width + x as usize) * 3;
        Some([self.buf[idx], self.buf[idx + 1], self.buf[idx + 2]])
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if self.contains(x, y) {
            let idx = (y as usize * self.width + x as usize) * 3;
            self.buf[idx..idx + 3].copy_from_slice(&color);
        }
    }

    /// One pixel wide line (Bresenham), clipped with Cohen-Sutherland first.
    pub fn line(&mut self, from: Vec2<i32>, to: Vec2<i32>, color: Rgb) {
        self.stroke(from, to, 0, color);
    }

    /// Line drawn with a round brush of the given thickness.
    pub fn thick_line(&mut self, from: Vec2<i32>, to: Vec2<i32>, thickness: i32, color: Rgb) {
        self.stroke(from, to, (thickness / 2).max(0), color);
    }

    fn stroke(&mut self, from: Vec2<i32>, to: Vec2<i32>, radius: i32, color: Rgb) {
        let Some((from, to)) = clip_line(from, to, self.width as i32, self.height as i32) else {
            return;
        };
        bresenham(from, to, |x, y| {
            if radius == 0 {
                self.set_pixel(x, y, color);
            } else {
                self.filled_circle(Vec2::new(x, y), radius, color);
            }
        });
    }

    pub fn filled_circle(&mut self, center: Vec2<i32>, radius: i32, color: Rgb) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(center.x + dx, center.y + dy, color);
                }
            }
        }
    }

    /// Filled rectangle between two inclusive corners, in any order.
    pub fn fill_rect(&mut self, a: Vec2<i32>, b: Vec2<i32>, color: Rgb) {
        let x0 = a.x.min(b.x).max(0);
        let y0 = a.y.min(b.y).max(0);
        let x1 = a.x.max(b.x).min(self.width as i32 - 1);
        let y1 = a.y.max(b.y).min(self.height as i32 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Text with its baseline starting at `origin`.
    pub fn text(&mut self, text: &str, origin: Vec2<i32>, color: Rgb) {
        let style = MonoTextStyle::new(&FONT_10X20, Rgb888::new(color[0], color[1], color[2]));
        match Text::with_baseline(text, Point::new(origin.x, origin.y), style, Baseline::Alphabetic)
            .draw(self)
        {
            Ok(_) => {}
            Err(infallible) => match infallible {},
        }
    }
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, [color.r(), color.g(), color.b()]);
        }
        Ok(())
    }
}

fn bresenham(from: Vec2<i32>, to: Vec2<i32>, mut plot: impl FnMut(i32, i32)) {
    let (mut x0, mut y0) = (from.x, from.y);
    let dx = (to.x - x0).abs();
    let dy = (to.y - y0).abs();
    let sx = if x0 < to.x { 1 } else { -1 };
    let sy = if y0 < to.y { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        plot(x0, y0);
        if x0 == to.x && y0 == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

// Cohen-Sutherland outcodes
const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

fn outcode(p: Vec2<i32>, width: i32, height: i32) -> u8 {
    let mut code = INSIDE;
    if p.x < 0 {
        code |= LEFT;
    } else if p.x >= width {
        code |= RIGHT;
    }
    if p.y < 0 {
        code |= TOP;
    } else if p.y >= height {
        code |= BOTTOM;
    }
    code
}

/// Clips a segment to `[0, width) x [0, height)`, `None` if fully outside.
fn clip_line(
    mut a: Vec2<i32>,
    mut b: Vec2<i32>,
    width: i32,
    height: i32,
) -> Option<(Vec2<i32>, Vec2<i32>)> {
    if width <= 0 || height <= 0 {
        return None;
    }
    loop {
        let code_a = outcode(a, width, height);
        let code_b = outcode(b, width, height);
        if code_a | code_b == 0 {
            return Some((a, b));
        }
        if code_a & code_b != 0 {
            return None;
        }

        let code = if code_a != 0 { code_a } else { code_b };
        // i64 keeps the products from overflowing for far off-screen points
        let (x0, y0, x1, y1) = (a.x as i64, a.y as i64, b.x as i64, b.y as i64);
        let (w, h) = (width as i64, height as i64);
        let clipped = if code & TOP != 0 {
            Vec2::new(x0 + (x1 - x0) * (0 - y0) / (y1 - y0), 0)
        } else if code & BOTTOM != 0 {
            Vec2::new(x0 + (x1 - x0) * (h - 1 - y0) / (y1 - y0), h - 1)
        } else if code & LEFT != 0 {
            Vec2::new(0, y0 + (y1 - y0) * (0 - x0) / (x1 - x0))
        } else {
            Vec2::new(w - 1, y0 + (y1 - y0) * (w - 1 - x0) / (x1 - x0))
        };
        let clipped = Vec2::new(clipped.x as i32, clipped.y as i32);

        if code == code_a {
            a = clipped;
        } else {
            b = clipped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_line_inside_is_unchanged() {
        let a = Vec2::new(1, 1);
        let b = Vec2::new(5, 3);
        assert_eq!(clip_line(a, b, 10, 10), Some((a, b)));
    }

    #[test]
    fn test_clip_line_fully_outside() {
        assert_eq!(clip_line(Vec2::new(-5, -5), Vec2::new(-1, -9), 10, 10), None);
        assert_eq!(clip_line(Vec2::new(12, 0), Vec2::new(20, 9), 10, 10), None);
    }

    #[test]
    fn test_clip_line_crossing_edges() {
        let (a, b) = clip_line(Vec2::new(-5, 5), Vec2::new(15, 5), 10, 10).unwrap();
        assert_eq!(a, Vec2::new(0, 5));
        assert_eq!(b, Vec2::new(9, 5));
    }

    #[test]
    fn test_bresenham_diagonal_endpoints() {
        let mut points = Vec::new();
        bresenham(Vec2::new(0, 0), Vec2::new(3, 3), |x, y| points.push((x, y)));
        assert_eq!(points, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }
}
