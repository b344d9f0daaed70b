use crate::registry::Generator;
use image::{Rgba, RgbaImage};
use sha2::{Digest, Sha256};

/// Classic 5x5 identicon: a horizontally mirrored block grid in a single
/// foreground color on white. The grid is sampled per output pixel, so any
/// requested size renders exactly without a resample pass.
pub struct Retro;

const GRID: u32 = 5;

impl Generator for Retro {
    fn generate(&self, fingerprint: &str, size: u32) -> RgbaImage {
        let seed: [u8; 32] = Sha256::digest(fingerprint.as_bytes()).into();

        // 15 bits fill the left three columns, mirrored to the right
        let mut cells = [[false; GRID as usize]; GRID as usize];
        let mut bit = 0;
        for col in 0..3 {
            for row in 0..GRID as usize {
                cells[row][col] = (seed[bit / 8] >> (bit % 8)) & 1 == 1;
                bit += 1;
            }
        }
        for row in 0..GRID as usize {
            cells[row][3] = cells[row][1];
            cells[row][4] = cells[row][0];
        }

        // Foreground stays well below white so the pattern keeps contrast
        let foreground = Rgba([seed[16] % 200, seed[17] % 200, seed[18] % 200, 0xff]);
        let background = Rgba([0xff, 0xff, 0xff, 0xff]);

        let mut image = RgbaImage::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let row = (y * GRID / size).min(GRID - 1) as usize;
                let col = (x * GRID / size).min(GRID - 1) as usize;
                let color = if cells[row][col] { foreground } else { background };
                image.put_pixel(x, y, color);
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_is_mirrored() {
        let image = Retro.generate("63a75a80e6b1f4adfdb04c1ca02e596c", 100);
        // Column 0 mirrors column 4, sampled at cell centers
        for row in 0..5u32 {
            let y = row * 20 + 10;
            assert_eq!(image.get_pixel(10, y), image.get_pixel(90, y));
            assert_eq!(image.get_pixel(30, y), image.get_pixel(70, y));
        }
    }

    #[test]
    fn test_odd_sizes_stay_in_bounds() {
        let image = Retro.generate("63a75a80e6b1f4adfdb04c1ca02e596c", 33);
        assert_eq!(image.dimensions(), (33, 33));
    }
}
