use crate::draw;
use crate::registry::Generator;
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

/// Robot composite: head plate, antenna, eyes and a mouth grill, with the
/// part variants and the metallic palette picked by digest bytes.
pub struct Robohash;

impl Generator for Robohash {
    fn generate(&self, fingerprint: &str, size: u32) -> RgbaImage {
        let seed: [u8; 32] = Sha256::digest(fingerprint.as_bytes()).into();
        let s = size as f32;

        let background = Rgba([0xf0, 0xf0 - seed[0] % 0x10, 0xe8, 0xff]);
        let plate = Rgba([96 + seed[1] % 120, 96 + seed[2] % 120, 128 + seed[3] % 112, 0xff]);
        let trim = Rgba([
            plate.0[0].saturating_sub(48),
            plate.0[1].saturating_sub(48),
            plate.0[2].saturating_sub(48),
            0xff,
        ]);
        let glow = Rgba([0xff, 0xd0 + seed[4] % 0x30, 0x40, 0xff]);

        let mut image = RgbaImage::new(size, size);
        draw::fill(&mut image, background);

        // Antenna mast and tip
        draw::fill_rect(&mut image, s * 0.48, s * 0.08, s * 0.52, s * 0.22, trim);
        draw::fill_circle(&mut image, s * 0.5, s * 0.08, s * 0.04, glow);

        // Head plate with a darker jaw band
        draw::fill_rect(&mut image, s * 0.18, s * 0.22, s * 0.82, s * 0.88, plate);
        draw::fill_rect(&mut image, s * 0.18, s * 0.76, s * 0.82, s * 0.88, trim);

        // Eyes: round or square lenses
        let eye_y = s * 0.45;
        let eye_dx = s * (0.15 + (seed[5] % 5) as f32 / 100.0);
        let eye_r = s * (0.06 + (seed[6] % 4) as f32 / 100.0);
        for direction in [-1.0f32, 1.0] {
            let cx = s * 0.5 + direction * eye_dx;
            if seed[7] & 1 == 0 {
                draw::fill_circle(&mut image, cx, eye_y, eye_r, glow);
            } else {
                draw::fill_rect(&mut image, cx - eye_r, eye_y - eye_r, cx + eye_r, eye_y + eye_r, glow);
            }
        }

        // Mouth grill: three to five bars
        let bars = 3 + (seed[8] % 3) as u32;
        let grill_width = s * 0.36;
        let bar_width = grill_width / (bars * 2 - 1) as f32;
        let grill_x = s * 0.5 - grill_width / 2.0;
        for bar in 0..bars {
            let x0 = grill_x + bar as f32 * bar_width * 2.0;
            draw::fill_rect(&mut image, x0, s * 0.62, x0 + bar_width, s * 0.72, background);
        }

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plate_and_antenna_present() {
        let image = Robohash.generate("63a75a80e6b1f4adfdb04c1ca02e596c", 100);
        let background = *image.get_pixel(0, 0);
        // head plate center
        assert_ne!(image.get_pixel(30, 30), &background);
        // antenna mast
        assert_ne!(image.get_pixel(50, 15), &background);
    }

    #[test]
    fn test_exact_dimensions() {
        for size in [16, 47, 128] {
            let image = Robohash.generate("63a75a80e6b1f4adfdb04c1ca02e596c", size);
            assert_eq!(image.dimensions(), (size, size));
        }
    }
}
