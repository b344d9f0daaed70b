//! Per-pixel raster primitives for the procedural backends.
//!
//! Sampling happens at pixel centers so shapes come out symmetric at any
//! output size; nothing here depends on ambient state, which keeps every
//! backend byte-deterministic.

use image::{Rgba, RgbaImage};

pub fn fill(image: &mut RgbaImage, color: Rgba<u8>) {
    for pixel in image.pixels_mut() {
        *pixel = color;
    }
}

pub fn fill_rect(image: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
    for y in 0..image.height() {
        for x in 0..image.width() {
            let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
            if px >= x0 && px < x1 && py >= y0 && py < y1 {
                image.put_pixel(x, y, color);
            }
        }
    }
}

/// Ellipse inscribed in the bounding box (x0, y0)..(x1, y1).
pub fn fill_ellipse(image: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
    let cx = (x0 + x1) / 2.0;
    let cy = (y0 + y1) / 2.0;
    let rx = (x1 - x0) / 2.0;
    let ry = (y1 - y0) / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }

    for y in 0..image.height() {
        for x in 0..image.width() {
            let dx = (x as f32 + 0.5 - cx) / rx;
            let dy = (y as f32 + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                image.put_pixel(x, y, color);
            }
        }
    }
}

pub fn fill_circle(image: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    fill_ellipse(image, cx - radius, cy - radius, cx + radius, cy + radius, color);
}

pub fn fill_triangle(
    image: &mut RgbaImage,
    a: (f32, f32),
    b: (f32, f32),
    c: (f32, f32),
    color: Rgba<u8>,
) {
    let edge = |p: (f32, f32), q: (f32, f32), r: (f32, f32)| -> f32 {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    };

    for y in 0..image.height() {
        for x in 0..image.width() {
            let p = (x as f32 + 0.5, y as f32 + 0.5);
            let d0 = edge(a, b, p);
            let d1 = edge(b, c, p);
            let d2 = edge(c, a, p);
            let has_neg = d0 < 0.0 || d1 < 0.0 || d2 < 0.0;
            let has_pos = d0 > 0.0 || d1 > 0.0 || d2 > 0.0;
            if !(has_neg && has_pos) {
                image.put_pixel(x, y, color);
            }
        }
    }
}
