use crate::error::{ExecError, LoadError};
use std::io;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents the memory map. Every access is bounds-checked: nothing outside
/// the map is ever observable, an out-of-range access is an error instead.
pub trait MemoryMap {
    /// get a r/w slice of the underlying memory
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], ExecError>;

    /// get a r/o slice of the underlying memory; an empty slice is always fine
    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], ExecError>;

    /// write a chunk of bytes into "RAM"
    fn write(&mut self, data: &[u8], addr: u16) -> Result<(), ExecError> {
        self.get_rw_slice(addr, data.len())?.copy_from_slice(data);
        Ok(())
    }

    /// get a big-endian two-byte word (opcodes)
    fn get_word(&self, addr: u16) -> Result<u16, ExecError> {
        let word = self.get_ro_slice(addr, 2)?;
        Ok(u16::from_be_bytes([word[0], word[1]]))
    }

    fn get_byte(&self, addr: u16) -> Result<u8, ExecError> {
        Ok(self.get_ro_slice(addr, 1)?[0])
    }
}

/// how much RAM we have
pub const MEMORY_SIZE: usize = 4096;

/// where the program is loaded
pub const PROGRAM_ADDR: u16 = 0x0200;

/// where the hex digit sprites live, inside the reserved low region
pub const FONT_ADDR: u16 = 0x0050;

/// bytes per hex digit sprite
pub const FONT_GLYPH_BYTES: u16 = 5;

/// Defines the CHIP-8 standard 4K memory map
///   0x0000-0x004f  reserved
///   0x0050-0x009f  font
///   0x00a0-0x01ff  reserved
///   0x0200-0x0fff  program
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    pub program_addr: u16,
    pub font_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn get_rw_slice(&mut self, addr: u16, len: usize) -> Result<&mut [u8], ExecError> {
        if len == 0 {
            return Ok(&mut []);
        }
        let a = addr as usize;
        self.bytes
            .get_mut(a..(a + len))
            .ok_or(ExecError::AddressOutOfRange { address: addr })
    }

    fn get_ro_slice(&self, addr: u16, len: usize) -> Result<&[u8], ExecError> {
        if len == 0 {
            return Ok(&[]);
        }
        let a = addr as usize;
        self.bytes
            .get(a..(a + len))
            .ok_or(ExecError::AddressOutOfRange { address: addr })
    }
}

impl Chip8MemoryMap {
    /// zeroed memory with the font baked into the reserved region
    pub fn new() -> Self {
        let mut bytes = vec![0u8; MEMORY_SIZE].into_boxed_slice();
        let font = FONT_ADDR as usize;
        bytes[font..font + CHIP8_CONTEMPORARY_FONT.len()].copy_from_slice(&CHIP8_CONTEMPORARY_FONT);
        Chip8MemoryMap {
            bytes,
            program_addr: PROGRAM_ADDR,
            font_addr: FONT_ADDR,
        }
    }

    /// largest program image that fits above the program address
    pub fn max_program_size(&self) -> usize {
        self.bytes.len() - self.program_addr as usize
    }

    /// copy a program image in at 0x200; nothing else is touched
    pub fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        let max_size = self.max_program_size();
        if image.len() > max_size {
            return Err(LoadError::ImageTooLarge {
                size: image.len(),
                max_size,
            });
        }
        let start = self.program_addr as usize;
        self.bytes[start..start + image.len()].copy_from_slice(image);
        Ok(())
    }

    /// read a whole program image from somewhere and load it at 0x200
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.load(&buf)
    }

    /// address of the sprite for a hex digit; only the low nibble counts
    pub fn font_glyph_addr(&self, digit: u8) -> u16 {
        self.font_addr + (digit & 0x0f) as u16 * FONT_GLYPH_BYTES
    }

    /// the raw memory, for inspection
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Self::new()
    }
}

const CHIP8_CONTEMPORARY_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed() {
        let m = Chip8MemoryMap::new();
        // NB. memory is zeroed apart from the font
        assert_eq!(m.bytes[..0x50], [0; 0x50]);
        assert_eq!(m.bytes[0xa0..], [0; 0xf60]);
    }

    #[test]
    fn test_font_loaded() {
        let m = Chip8MemoryMap::new();
        assert_eq!(m.bytes[0x50..0xa0], CHIP8_CONTEMPORARY_FONT);
        assert_eq!(m.font_glyph_addr(0x0), 0x50);
        assert_eq!(m.font_glyph_addr(0xa), 0x50 + 50);
        assert_eq!(m.font_glyph_addr(0x1f), 0x55);
    }

    #[test]
    fn test_write_slice_ok() -> Result<(), ExecError> {
        let mut dst = Chip8MemoryMap::new();
        let src: &[u8] = &[0, 1, 2, 3, 4, 5, 6, 7];
        dst.write(src, 8)?;
        assert_eq!(
            dst.bytes[..16],
            [0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7]
        );
        Ok(())
    }

    #[test]
    fn test_read_word() -> Result<(), ExecError> {
        let mut m = Chip8MemoryMap::new();
        m.write(&[0, 1, 2, 3, 4, 5, 6, 7], 0x300)?;
        assert_eq!(m.get_word(0x304)?, 0x0405);
        Ok(())
    }

    #[test]
    fn test_read_word_at_last_byte_fails() {
        let m = Chip8MemoryMap::new();
        assert_eq!(
            m.get_word(0x0fff),
            Err(ExecError::AddressOutOfRange { address: 0x0fff })
        );
        assert_eq!(m.get_byte(0x0fff), Ok(0));
    }

    #[test]
    fn test_empty_access_never_fails() -> Result<(), ExecError> {
        let mut m = Chip8MemoryMap::new();
        assert!(m.get_ro_slice(0x1001, 0)?.is_empty());
        assert!(m.get_rw_slice(0xffff, 0)?.is_empty());
        m.write(&[], 0x2000)?;
        Ok(())
    }

    #[test]
    fn test_write_too_much_fails() {
        let mut dst = Chip8MemoryMap::new();
        let res = dst.write(&[0xaa; 8], 4089);
        assert_eq!(res, Err(ExecError::AddressOutOfRange { address: 4089 }));
        // nothing written
        assert_eq!(dst.bytes[4089..], [0; 7]);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), LoadError> {
        let mut dst = Chip8MemoryMap::new();
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        dst.load_program(&mut prog)?;
        assert_eq!(dst.get_ro_slice(0x200, 2).unwrap(), &[0x00, 0xe0]);
        assert_eq!(dst.bytes[0x50..0xa0], CHIP8_CONTEMPORARY_FONT);
        Ok(())
    }

    #[test]
    fn test_program_fills_memory() -> Result<(), LoadError> {
        let mut dst = Chip8MemoryMap::new();
        dst.load(&[0x12; 0xe00])?;
        assert_eq!(dst.bytes[0xfff], 0x12);
        Ok(())
    }

    #[test]
    fn test_program_too_large() {
        let mut dst = Chip8MemoryMap::new();
        let res = dst.load(&[0x12; 0xe01]);
        assert!(matches!(
            res,
            Err(LoadError::ImageTooLarge {
                size: 0xe01,
                max_size: 0xe00
            })
        ));
        assert_eq!(dst.bytes[0x200], 0);
    }
}
