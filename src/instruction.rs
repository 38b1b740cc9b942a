//! # instruction set
//!
//! Every 16-bit word either decodes into exactly one `Instruction` or is
//! rejected as an unknown opcode. Operand fields, by nibble:
//!
//!   X   = bits 8-11
//!   Y   = bits 4-7
//!   N   = bits 0-3
//!   NN  = bits 0-7
//!   NNN = bits 0-11

use crate::config::Quirks;
use crate::error::ExecError;
use std::fmt;

/// register indices are 0x0..=0xf
pub type Reg = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipIfEqImm { x: Reg, nn: u8 },
    /// 4XNN
    SkipIfNeImm { x: Reg, nn: u8 },
    /// 5XY0
    SkipIfEqReg { x: Reg, y: Reg },
    /// 6XNN
    LoadImm { x: Reg, nn: u8 },
    /// 7XNN
    AddImm { x: Reg, nn: u8 },
    /// 8XY0
    Move { x: Reg, y: Reg },
    /// 8XY1
    Or { x: Reg, y: Reg },
    /// 8XY2
    And { x: Reg, y: Reg },
    /// 8XY3
    Xor { x: Reg, y: Reg },
    /// 8XY4
    Add { x: Reg, y: Reg },
    /// 8XY5
    Sub { x: Reg, y: Reg },
    /// 8XY6
    ShiftRight { x: Reg, y: Reg },
    /// 8XY7
    SubReverse { x: Reg, y: Reg },
    /// 8XYE
    ShiftLeft { x: Reg, y: Reg },
    /// 9XY0
    SkipIfNeReg { x: Reg, y: Reg },
    /// ANNN
    LoadIndex(u16),
    /// BNNN; `x` is the top nibble of NNN, only used under the jump quirk
    JumpOffset { x: Reg, nnn: u16 },
    /// CXNN
    Random { x: Reg, nn: u8 },
    /// DXYN
    Draw { x: Reg, y: Reg, n: u8 },
    /// EX9E
    SkipIfKey { x: Reg },
    /// EXA1
    SkipIfNotKey { x: Reg },
    /// FX07
    LoadDelay { x: Reg },
    /// FX0A
    WaitKey { x: Reg },
    /// FX15
    SetDelay { x: Reg },
    /// FX18
    SetSound { x: Reg },
    /// FX1E
    AddIndex { x: Reg },
    /// FX29
    LoadGlyph { x: Reg },
    /// FX33
    StoreBcd { x: Reg },
    /// FX55
    StoreRegisters { x: Reg },
    /// FX65
    LoadRegisters { x: Reg },
}

impl Instruction {
    /// decode a raw opcode; anything not in the table above is an error
    pub fn decode(raw: u16) -> Result<Instruction, ExecError> {
        use Instruction::*;

        let x = ((raw >> 8) & 0xf) as Reg;
        let y = ((raw >> 4) & 0xf) as Reg;
        let n = (raw & 0xf) as u8;
        let nn = (raw & 0xff) as u8;
        let nnn = raw & 0x0fff;

        let instruction = match raw >> 12 {
            0x0 => match raw {
                0x00e0 => ClearScreen,
                0x00ee => Return,
                _ => return Err(ExecError::UnknownOpcode(raw)),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipIfEqImm { x, nn },
            0x4 => SkipIfNeImm { x, nn },
            0x5 if n == 0 => SkipIfEqReg { x, y },
            0x6 => LoadImm { x, nn },
            0x7 => AddImm { x, nn },
            0x8 => match n {
                0x0 => Move { x, y },
                0x1 => Or { x, y },
                0x2 => And { x, y },
                0x3 => Xor { x, y },
                0x4 => Add { x, y },
                0x5 => Sub { x, y },
                0x6 => ShiftRight { x, y },
                0x7 => SubReverse { x, y },
                0xe => ShiftLeft { x, y },
                _ => return Err(ExecError::UnknownOpcode(raw)),
            },
            0x9 if n == 0 => SkipIfNeReg { x, y },
            0xa => LoadIndex(nnn),
            0xb => JumpOffset { x, nnn },
            0xc => Random { x, nn },
            0xd => Draw { x, y, n },
            0xe => match nn {
                0x9e => SkipIfKey { x },
                0xa1 => SkipIfNotKey { x },
                _ => return Err(ExecError::UnknownOpcode(raw)),
            },
            0xf => match nn {
                0x07 => LoadDelay { x },
                0x0a => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1e => AddIndex { x },
                0x29 => LoadGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => return Err(ExecError::UnknownOpcode(raw)),
            },
            // 5XYN and 9XYN with N != 0
            _ => return Err(ExecError::UnknownOpcode(raw)),
        };
        Ok(instruction)
    }

    /// mnemonic as executed under `quirks`; only BNNN reads differently
    pub fn disassemble(&self, quirks: Quirks) -> String {
        match *self {
            Instruction::JumpOffset { x, nnn } if quirks.jump_uses_vx => {
                format!("JP V{:X}, {:#05x}", x, nnn)
            }
            _ => self.to_string(),
        }
    }
}

/// conventional CHIP-8 assembler mnemonics. BNNN is written `JP V0, nnn`,
/// which is only right without the jump quirk; see `disassemble`
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            ClearScreen => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP {:#05x}", nnn),
            Call(nnn) => write!(f, "CALL {:#05x}", nnn),
            SkipIfEqImm { x, nn } => write!(f, "SE V{:X}, {:#04x}", x, nn),
            SkipIfNeImm { x, nn } => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            SkipIfEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadImm { x, nn } => write!(f, "LD V{:X}, {:#04x}", x, nn),
            AddImm { x, nn } => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            SubReverse { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, y } => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipIfNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(nnn) => write!(f, "LD I, {:#05x}", nnn),
            JumpOffset { nnn, .. } => write!(f, "JP V0, {:#05x}", nnn),
            Random { x, nn } => write!(f, "RND V{:X}, {:#04x}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipIfKey { x } => write!(f, "SKP V{:X}", x),
            SkipIfNotKey { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Instruction::*;
    use super::*;

    #[test]
    fn test_decode_system_family() {
        assert_eq!(Instruction::decode(0x00e0), Ok(ClearScreen));
        assert_eq!(Instruction::decode(0x00ee), Ok(Return));
        // SYS addr is not supported
        assert_eq!(
            Instruction::decode(0x0123),
            Err(ExecError::UnknownOpcode(0x0123))
        );
        assert_eq!(
            Instruction::decode(0x0000),
            Err(ExecError::UnknownOpcode(0x0000))
        );
    }

    #[test]
    fn test_decode_operands() {
        assert_eq!(Instruction::decode(0x1abc), Ok(Jump(0xabc)));
        assert_eq!(Instruction::decode(0x2def), Ok(Call(0xdef)));
        assert_eq!(Instruction::decode(0x3a42), Ok(SkipIfEqImm { x: 0xa, nn: 0x42 }));
        assert_eq!(Instruction::decode(0x6f01), Ok(LoadImm { x: 0xf, nn: 0x01 }));
        assert_eq!(Instruction::decode(0x8124), Ok(Add { x: 1, y: 2 }));
        assert_eq!(Instruction::decode(0x8ffe), Ok(ShiftLeft { x: 0xf, y: 0xf }));
        assert_eq!(Instruction::decode(0xb234), Ok(JumpOffset { x: 2, nnn: 0x234 }));
        assert_eq!(Instruction::decode(0xd125), Ok(Draw { x: 1, y: 2, n: 5 }));
        assert_eq!(Instruction::decode(0xe39e), Ok(SkipIfKey { x: 3 }));
        assert_eq!(Instruction::decode(0xf70a), Ok(WaitKey { x: 7 }));
        assert_eq!(Instruction::decode(0xf065), Ok(LoadRegisters { x: 0 }));
    }

    #[test]
    fn test_decode_rejects_gaps() {
        for raw in [0x5121u16, 0x912f, 0x8128, 0x812f, 0xe100, 0xe19f, 0xf100, 0xf1ff] {
            assert_eq!(
                Instruction::decode(raw),
                Err(ExecError::UnknownOpcode(raw)),
                "{:#06x} should not decode",
                raw
            );
        }
    }

    #[test]
    fn test_decode_is_total() {
        // every word either decodes or is reported, never panics
        let known = (0..=u16::MAX)
            .filter(|raw| Instruction::decode(*raw).is_ok())
            .count();
        // 1-4, 6, 7, A-D: 4096 each; 5, 9: 256 each; 8: 9 * 256; E: 2 * 16; F: 9 * 16; 0: 2
        assert_eq!(known, 10 * 4096 + 2 * 256 + 9 * 256 + 2 * 16 + 9 * 16 + 2);
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(ClearScreen.to_string(), "CLS");
        assert_eq!(Jump(0x234).to_string(), "JP 0x234");
        assert_eq!(LoadImm { x: 1, nn: 0x2a }.to_string(), "LD V1, 0x2a");
        assert_eq!(Draw { x: 0, y: 1, n: 5 }.to_string(), "DRW V0, V1, 5");
        assert_eq!(StoreRegisters { x: 0xe }.to_string(), "LD [I], VE");
    }

    #[test]
    fn test_jump_offset_mnemonic_follows_quirk() -> Result<(), ExecError> {
        let jp = Instruction::decode(0xb234)?;
        assert_eq!(jp.to_string(), "JP V0, 0x234");
        assert_eq!(jp.disassemble(Quirks::default()), "JP V0, 0x234");
        let quirks = Quirks {
            jump_uses_vx: true,
            ..Quirks::default()
        };
        assert_eq!(jp.disassemble(quirks), "JP V2, 0x234");
        assert_eq!(Jump(0x234).disassemble(quirks), "JP 0x234");
        Ok(())
    }
}
