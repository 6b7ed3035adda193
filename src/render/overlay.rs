//! Route and marker overlay
//!
//! Stamps the journey onto the composed base map: a connecting line across
//! the waypoints in list order, then a pin per waypoint.

use image::{Rgba, RgbaImage};

/// Route line color (`#00585E` at ~70% opacity)
pub const ROUTE_COLOR: Rgba<u8> = Rgba([0x00, 0x58, 0x5e, 179]);

/// Route line weight in pixels
pub const ROUTE_WEIGHT: f64 = 3.0;

/// Marker pin color (`#00585E`, solid)
const MARKER_COLOR: Rgba<u8> = Rgba([0x00, 0x58, 0x5e, 255]);

const MARKER_DOT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Pin head center sits this many pixels above the anchor point
const MARKER_HEAD_OFFSET: f64 = 22.0;

const MARKER_HEAD_RADIUS: f64 = 9.0;

const MARKER_DOT_RADIUS: f64 = 3.5;

/// Half-width of the pin stem where it meets the head
const MARKER_STEM_HALF_WIDTH: f64 = 6.0;

/// Draw the connecting route line across the points in order.
/// Fewer than two points draw nothing.
pub fn draw_route(canvas: &mut RgbaImage, points: &[(f64, f64)]) {
    for pair in points.windows(2) {
        draw_segment(canvas, pair[0], pair[1], ROUTE_WEIGHT / 2.0, ROUTE_COLOR);
    }
}

/// Draw a pin marker anchored at each point
pub fn draw_markers(canvas: &mut RgbaImage, points: &[(f64, f64)]) {
    for &point in points {
        draw_pin(canvas, point);
    }
}

fn draw_segment(canvas: &mut RgbaImage, a: (f64, f64), b: (f64, f64), radius: f64, color: Rgba<u8>) {
    let x0 = (a.0.min(b.0) - radius).floor() as i64;
    let x1 = (a.0.max(b.0) + radius).ceil() as i64;
    let y0 = (a.1.min(b.1) - radius).floor() as i64;
    let y1 = (a.1.max(b.1) + radius).ceil() as i64;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let center = (x as f64 + 0.5, y as f64 + 0.5);
            if distance_to_segment(center, a, b) <= radius {
                blend_pixel(canvas, x, y, color);
            }
        }
    }
}

fn draw_pin(canvas: &mut RgbaImage, anchor: (f64, f64)) {
    let (ax, ay) = anchor;

    // Stem: tapers from the head width down to the anchor tip
    let steps = MARKER_HEAD_OFFSET as i64;
    for dy in 0..=steps {
        let half_width = dy as f64 / MARKER_HEAD_OFFSET * MARKER_STEM_HALF_WIDTH;
        let y = (ay - dy as f64).round() as i64;
        let x0 = (ax - half_width).round() as i64;
        let x1 = (ax + half_width).round() as i64;
        for x in x0..=x1 {
            blend_pixel(canvas, x, y, MARKER_COLOR);
        }
    }

    let head = (ax, ay - MARKER_HEAD_OFFSET);
    stamp_disc(canvas, head, MARKER_HEAD_RADIUS, MARKER_COLOR);
    stamp_disc(canvas, head, MARKER_DOT_RADIUS, MARKER_DOT_COLOR);
}

fn stamp_disc(canvas: &mut RgbaImage, center: (f64, f64), radius: f64, color: Rgba<u8>) {
    let (cx, cy) = center;
    let x0 = (cx - radius).floor() as i64;
    let x1 = (cx + radius).ceil() as i64;
    let y0 = (cy - radius).floor() as i64;
    let y1 = (cy + radius).ceil() as i64;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= radius * radius {
                blend_pixel(canvas, x, y, color);
            }
        }
    }
}

/// Distance from a point to the closest point on segment a-b
fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (px, py) = p;
    let (ax, ay) = a;
    let (bx, by) = b;
    let (dx, dy) = (bx - ax, by - ay);
    let length_sq = dx * dx + dy * dy;

    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / length_sq).clamp(0.0, 1.0)
    };

    let (nx, ny) = (ax + t * dx, ay + t * dy);
    ((px - nx).powi(2) + (py - ny).powi(2)).sqrt()
}

/// Source-over blend onto an opaque canvas; out-of-bounds writes are dropped
fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= i64::from(canvas.width()) || y >= i64::from(canvas.height()) {
        return;
    }
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    let alpha = f64::from(color.0[3]) / 255.0;
    for channel in 0..3 {
        let src = f64::from(color.0[channel]);
        let dst = f64::from(pixel.0[channel]);
        pixel.0[channel] = (src * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    pixel.0[3] = 255;
}
