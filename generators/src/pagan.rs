use crate::registry::Generator;
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

/// Bilaterally symmetric figure on a dark field, loosely in the style of
/// the "pagan" avatar family: an 8x8 mirrored mask rendered in a bright
/// color drawn from the digest.
pub struct Pagan;

const GRID: u32 = 8;

impl Generator for Pagan {
    fn generate(&self, fingerprint: &str, size: u32) -> RgbaImage {
        let seed: [u8; 32] = Sha256::digest(fingerprint.as_bytes()).into();

        // 32 bits fill the left four columns, mirrored to the right
        let mut cells = [[false; GRID as usize]; GRID as usize];
        let mut bit = 0;
        for col in 0..4 {
            for row in 0..GRID as usize {
                cells[row][col] = (seed[bit / 8] >> (bit % 8)) & 1 == 1;
                bit += 1;
            }
        }
        for row in 0..GRID as usize {
            for col in 4..GRID as usize {
                cells[row][col] = cells[row][GRID as usize - 1 - col];
            }
        }

        let figure = Rgba([
            128 + seed[4] % 128,
            128 + seed[5] % 128,
            128 + seed[6] % 128,
            0xff,
        ]);
        let field = Rgba([0x20, 0x20, 0x28, 0xff]);

        let margin = size / 8;
        let span = size - 2 * margin;

        let mut image = RgbaImage::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let inside = x >= margin && x < margin + span && y >= margin && y < margin + span;
                let color = if inside {
                    let row = ((y - margin) * GRID / span).min(GRID - 1) as usize;
                    let col = ((x - margin) * GRID / span).min(GRID - 1) as usize;
                    if cells[row][col] { figure } else { field }
                } else {
                    field
                };
                image.put_pixel(x, y, color);
            }
        }
        image
    }
}
