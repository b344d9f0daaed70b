use crate::registry::Generator;
use image::{Rgba, RgbaImage};
use md5::{Digest, Md5};

/// Second identicon family: vertically mirrored colored cells on white with
/// a margin. The fingerprint is re-digested with MD5 so the whole input
/// digest contributes to the pattern even for 64-char fingerprints.
pub struct Identicon;

const GRID: u32 = 5;

impl Generator for Identicon {
    fn generate(&self, fingerprint: &str, size: u32) -> RgbaImage {
        let seed: [u8; 16] = Md5::digest(fingerprint.as_bytes()).into();

        // 15 bits fill the top three rows, mirrored to the bottom
        let mut cells = [[false; GRID as usize]; GRID as usize];
        let mut bit = 0;
        for row in 0..3 {
            for col in 0..GRID as usize {
                cells[row][col] = (seed[bit / 8] >> (bit % 8)) & 1 == 1;
                bit += 1;
            }
        }
        for col in 0..GRID as usize {
            cells[3][col] = cells[1][col];
            cells[4][col] = cells[0][col];
        }

        let foreground = Rgba([
            55 + seed[13] % 180,
            55 + seed[14] % 180,
            55 + seed[15] % 180,
            0xff,
        ]);
        let background = Rgba([0xff, 0xff, 0xff, 0xff]);

        let margin = size / 10;
        let span = size - 2 * margin;

        let mut image = RgbaImage::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let inside = x >= margin && x < margin + span && y >= margin && y < margin + span;
                let color = if inside {
                    let row = ((y - margin) * GRID / span).min(GRID - 1) as usize;
                    let col = ((x - margin) * GRID / span).min(GRID - 1) as usize;
                    if cells[row][col] { foreground } else { background }
                } else {
                    background
                };
                image.put_pixel(x, y, color);
            }
        }
        image
    }
}
