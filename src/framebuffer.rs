/// display width in pixels
pub const WIDTH: usize = 64;

/// display height in pixels
pub const HEIGHT: usize = 32;

/// Monochrome 64x32 pixel grid, one byte (0 or 1) per pixel, row-major.
/// Coordinates handed to it wrap, so nothing outside the grid is ever indexed.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Box<[u8]>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            pixels: vec![0u8; WIDTH * HEIGHT].into_boxed_slice(),
        }
    }

    pub fn width(&self) -> usize {
        WIDTH
    }

    pub fn height(&self) -> usize {
        HEIGHT
    }

    /// all pixels, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// is the pixel at (x, y) lit? coordinates wrap
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[Self::index(x, y)] != 0
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    /// XOR an 8-pixel-wide sprite in at (x, y), one byte per row, MSB on the
    /// left. Each pixel wraps around both edges independently. Returns true if
    /// any lit pixel was turned off.
    pub fn draw_sprite(&mut self, x: u8, y: u8, rows: &[u8]) -> bool {
        let mut collision = false;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..8 {
                if bits & (0x80u8 >> col) == 0 {
                    continue;
                }
                let px = &mut self.pixels[Self::index(x as usize + col, y as usize + row)];
                collision |= *px == 1;
                *px ^= 1;
            }
        }
        collision
    }

    fn index(x: usize, y: usize) -> usize {
        (y % HEIGHT) * WIDTH + (x % WIDTH)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.pixels.chunks(WIDTH) {
            let line: String = row.iter().map(|p| if *p == 0 { '.' } else { '#' }).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
