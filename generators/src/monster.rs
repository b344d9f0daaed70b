use crate::draw;
use crate::registry::Generator;
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

/// Monster composite: body, eyes, mouth and optional horns are picked and
/// colored by digest bytes and layered onto a light background. All
/// coordinates are proportional, so the composite renders at any size.
pub struct MonsterId;

impl Generator for MonsterId {
    fn generate(&self, fingerprint: &str, size: u32) -> RgbaImage {
        let seed: [u8; 32] = Sha256::digest(fingerprint.as_bytes()).into();
        let s = size as f32;

        let background = Rgba([0xe8 - seed[0] % 0x18, 0xe8 - seed[1] % 0x18, 0xf0, 0xff]);
        let body = Rgba([64 + seed[2] % 160, 64 + seed[3] % 160, 64 + seed[4] % 160, 0xff]);
        let dark = Rgba([0x20, 0x20, 0x20, 0xff]);
        let white = Rgba([0xff, 0xff, 0xff, 0xff]);

        let mut image = RgbaImage::new(size, size);
        draw::fill(&mut image, background);

        // Horns behind the body, present for half of all digests
        if seed[5] & 1 == 1 {
            draw::fill_triangle(&mut image, (s * 0.25, s * 0.30), (s * 0.15, s * 0.05), (s * 0.40, s * 0.25), body);
            draw::fill_triangle(&mut image, (s * 0.75, s * 0.30), (s * 0.85, s * 0.05), (s * 0.60, s * 0.25), body);
        }

        // Body
        draw::fill_ellipse(&mut image, s * 0.15, s * 0.20, s * 0.85, s * 0.95, body);

        // Arms, three placements
        match seed[6] % 3 {
            0 => {
                draw::fill_rect(&mut image, s * 0.02, s * 0.45, s * 0.18, s * 0.55, body);
                draw::fill_rect(&mut image, s * 0.82, s * 0.45, s * 0.98, s * 0.55, body);
            }
            1 => {
                draw::fill_rect(&mut image, s * 0.05, s * 0.30, s * 0.18, s * 0.40, body);
                draw::fill_rect(&mut image, s * 0.82, s * 0.30, s * 0.95, s * 0.40, body);
            }
            _ => {}
        }

        // Eyes: spacing and pupil size vary by digest
        let eye_y = s * (0.38 + (seed[7] % 8) as f32 / 100.0);
        let eye_dx = s * (0.14 + (seed[8] % 6) as f32 / 100.0);
        let eye_r = s * 0.08;
        let pupil_r = s * (0.02 + (seed[9] % 3) as f32 / 100.0);
        for direction in [-1.0f32, 1.0] {
            let cx = s * 0.5 + direction * eye_dx;
            draw::fill_circle(&mut image, cx, eye_y, eye_r, white);
            draw::fill_circle(&mut image, cx, eye_y, pupil_r, dark);
        }

        // Mouth, three variants
        match seed[10] % 3 {
            0 => draw::fill_rect(&mut image, s * 0.35, s * 0.65, s * 0.65, s * 0.72, dark),
            1 => draw::fill_ellipse(&mut image, s * 0.40, s * 0.62, s * 0.60, s * 0.78, dark),
            _ => draw::fill_triangle(&mut image, (s * 0.35, s * 0.65), (s * 0.65, s * 0.65), (s * 0.5, s * 0.78), dark),
        }

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_covers_center() {
        let image = MonsterId.generate("63a75a80e6b1f4adfdb04c1ca02e596c", 100);
        // Center of the canvas is always body or a facial feature, never
        // the background
        let background = *image.get_pixel(0, 0);
        assert_ne!(image.get_pixel(50, 55), &background);
    }

    #[test]
    fn test_exact_dimensions() {
        for size in [16, 47, 128] {
            let image = MonsterId.generate("63a75a80e6b1f4adfdb04c1ca02e596c", size);
            assert_eq!(image.dimensions(), (size, size));
        }
    }
}
