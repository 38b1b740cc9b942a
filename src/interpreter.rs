//! # interpreter
//!
//! One `step()` is one full fetch/decode/execute cycle:
//!
//!  1. fetch the big-endian word at PC (PC and PC+1 must both be in memory)
//!  2. advance PC by 2, so jumps, calls and returns write the final PC
//!  3. decode into an `Instruction`; unknown words are reported, never skipped
//!  4. execute against the machine state and report what the driver should do
//!
//! A failing step leaves the machine exactly as it found it, PC included.
//! Handlers check everything that can fail before they write anything.
//!
//! The interpreter has no clock and no devices. The driver calls `step()` as
//! often as it likes, `tick_timers()` at 60Hz, feeds key changes in through
//! `set_key()` and reads the framebuffer back out when a redraw is requested.
//! FX0A does not spin: it parks the machine in a key-wait state that every
//! following `step()` reports as halted until a key goes down. The step that
//! sees the key stores it and then carries on with the next instruction.

use crate::config::Quirks;
use crate::error::{ExecError, LoadError};
use crate::framebuffer::Framebuffer;
use crate::instruction::{Instruction, Reg};
use crate::memory::{MemoryMap, MEMORY_SIZE};
use crate::random::RandomSource;
use crate::state::{KeyWait, MachineState, FLAG, KEY_COUNT};
use log::{debug, trace, warn};
use std::io;

/// what the driver should know after a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepEffect {
    /// the framebuffer changed
    pub redraw_requested: bool,
    /// waiting for a key press; PC will not move until one arrives
    pub halted: bool,
}

impl StepEffect {
    fn redraw() -> Self {
        StepEffect {
            redraw_requested: true,
            halted: false,
        }
    }

    fn halted() -> Self {
        StepEffect {
            redraw_requested: false,
            halted: true,
        }
    }
}

pub struct Chip8Interpreter {
    state: MachineState,
    quirks: Quirks,
    random: Box<dyn RandomSource>,
}

impl Chip8Interpreter {
    pub fn new(quirks: Quirks, random: Box<dyn RandomSource>) -> Self {
        Chip8Interpreter {
            state: MachineState::new(),
            quirks,
            random,
        }
    }

    /// copy a program image in at 0x200
    pub fn load(&mut self, image: &[u8]) -> Result<(), LoadError> {
        self.state.memory.load(image)?;
        debug!("loaded {} byte program", image.len());
        Ok(())
    }

    /// load a chip8 program from a file or whatever
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), LoadError> {
        self.state.memory.load_program(reader)
    }

    /// run one fetch/decode/execute cycle
    pub fn step(&mut self) -> Result<StepEffect, ExecError> {
        let resumed = match self.state.key_wait {
            Some(KeyWait { captured: None, .. }) => return Ok(StepEffect::halted()),
            Some(wait) => Some(self.resume_key_wait(wait)),
            None => None,
        };

        let pc = self.state.program_counter;
        let raw = match self.state.memory.get_word(pc) {
            Ok(raw) => raw,
            Err(e) => {
                self.undo_resume(resumed);
                return Err(e);
            }
        };
        self.state.program_counter = pc + 2;

        let result = Instruction::decode(raw).and_then(|instruction| {
            trace!("{:#05x}: {:04x}  {}", pc, raw, instruction.disassemble(self.quirks));
            execute(
                &mut self.state,
                self.quirks,
                self.random.as_mut(),
                instruction,
            )
        });
        if result.is_err() {
            self.state.program_counter = pc;
            self.undo_resume(resumed);
        }
        result
    }

    /// step over the instruction at PC without running it, e.g. to carry on
    /// past an unknown opcode
    pub fn skip_instruction(&mut self) {
        self.state.program_counter = self.state.program_counter.wrapping_add(2);
    }

    /// count both timers down by one; call at 60Hz
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// latch the state of one keypad key. only the low nibble of `key` counts
    pub fn set_key(&mut self, key: u8, pressed: bool) {
        if key as usize >= KEY_COUNT {
            warn!("key {:#04x} is not on the keypad, using {:#03x}", key, key & 0x0f);
        }
        let key = key & 0x0f;
        self.state.keypad[key as usize] = pressed;
        if pressed {
            if let Some(wait) = self.state.key_wait.as_mut() {
                wait.captured.get_or_insert(key);
            }
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.state.framebuffer
    }

    pub fn quirks(&self) -> Quirks {
        self.quirks
    }

    /// the sound timer is running
    pub fn sound_active(&self) -> bool {
        self.state.sound_timer > 0
    }

    pub fn is_waiting_for_key(&self) -> bool {
        self.state.key_wait.is_some()
    }

    /// hand the captured key to the waiting register and leave the wait;
    /// returns the wait and the register's old value so a failed step can
    /// put them back
    fn resume_key_wait(&mut self, wait: KeyWait) -> (KeyWait, u8) {
        let old = self.state.v[wait.register];
        if let Some(key) = wait.captured {
            debug!("key {:X} pressed, V{:X} updated", key, wait.register);
            self.state.v[wait.register] = key;
        }
        self.state.key_wait = None;
        (wait, old)
    }

    fn undo_resume(&mut self, resumed: Option<(KeyWait, u8)>) {
        if let Some((wait, old)) = resumed {
            self.state.v[wait.register] = old;
            self.state.key_wait = Some(wait);
        }
    }
}

/// run one decoded instruction; PC already points at the next one
fn execute(
    s: &mut MachineState,
    quirks: Quirks,
    random: &mut dyn RandomSource,
    instruction: Instruction,
) -> Result<StepEffect, ExecError> {
    use Instruction::*;

    let mut skip = false;
    match instruction {
        ClearScreen => {
            s.framebuffer.clear();
            return Ok(StepEffect::redraw());
        }
        Return => s.program_counter = s.pop().ok_or(ExecError::StackUnderflow)?,
        Jump(nnn) => s.program_counter = nnn,
        Call(nnn) => {
            if !s.push(s.program_counter) {
                return Err(ExecError::StackOverflow);
            }
            s.program_counter = nnn;
        }
        SkipIfEqImm { x, nn } => skip = s.v[x] == nn,
        SkipIfNeImm { x, nn } => skip = s.v[x] != nn,
        SkipIfEqReg { x, y } => skip = s.v[x] == s.v[y],
        SkipIfNeReg { x, y } => skip = s.v[x] != s.v[y],
        LoadImm { x, nn } => s.v[x] = nn,
        AddImm { x, nn } => s.v[x] = s.v[x].wrapping_add(nn),
        Move { x, y } => s.v[x] = s.v[y],
        Or { x, y } => s.v[x] |= s.v[y],
        And { x, y } => s.v[x] &= s.v[y],
        Xor { x, y } => s.v[x] ^= s.v[y],
        Add { x, y } => {
            let (sum, carry) = s.v[x].overflowing_add(s.v[y]);
            set_with_flag(s, x, sum, carry);
        }
        Sub { x, y } => {
            let (vx, vy) = (s.v[x], s.v[y]);
            set_with_flag(s, x, vx.wrapping_sub(vy), vx >= vy);
        }
        SubReverse { x, y } => {
            let (vx, vy) = (s.v[x], s.v[y]);
            set_with_flag(s, x, vy.wrapping_sub(vx), vy >= vx);
        }
        ShiftRight { x, y } => {
            let src = shift_source(s, quirks, x, y);
            set_with_flag(s, x, src >> 1, src & 0x01 == 1);
        }
        ShiftLeft { x, y } => {
            let src = shift_source(s, quirks, x, y);
            set_with_flag(s, x, src << 1, src & 0x80 != 0);
        }
        LoadIndex(nnn) => s.i = nnn,
        JumpOffset { x, nnn } => {
            let base = if quirks.jump_uses_vx { s.v[x] } else { s.v[0] };
            let target = nnn + base as u16;
            if target as usize >= MEMORY_SIZE {
                return Err(ExecError::AddressOutOfRange { address: target });
            }
            s.program_counter = target;
        }
        Random { x, nn } => s.v[x] = random.random_byte() & nn,
        Draw { x, y, n } => return draw(s, x, y, n),
        SkipIfKey { x } => skip = key_down(s, x),
        SkipIfNotKey { x } => skip = !key_down(s, x),
        LoadDelay { x } => s.v[x] = s.delay_timer,
        WaitKey { x } => {
            debug!("waiting for a key for V{:X}", x);
            s.key_wait = Some(KeyWait {
                register: x,
                captured: None,
            });
            return Ok(StepEffect::halted());
        }
        SetDelay { x } => s.delay_timer = s.v[x],
        SetSound { x } => s.sound_timer = s.v[x],
        AddIndex { x } => s.i = s.i.wrapping_add(s.v[x] as u16),
        LoadGlyph { x } => s.i = s.memory.font_glyph_addr(s.v[x]),
        StoreBcd { x } => {
            let vx = s.v[x];
            s.memory.write(&[vx / 100, vx / 10 % 10, vx % 10], s.i)?;
        }
        StoreRegisters { x } => {
            s.memory.write(&s.v[..=x], s.i)?;
            advance_index(s, quirks, x);
        }
        LoadRegisters { x } => {
            let src = s.memory.get_ro_slice(s.i, x + 1)?;
            s.v[..=x].copy_from_slice(src);
            advance_index(s, quirks, x);
        }
    }
    if skip {
        s.program_counter += 2;
    }
    Ok(StepEffect::default())
}

/// VF is written last, so it wins when X is F
fn set_with_flag(s: &mut MachineState, x: Reg, value: u8, flag: bool) {
    s.v[x] = value;
    s.v[FLAG] = flag as u8;
}

fn shift_source(s: &MachineState, quirks: Quirks, x: Reg, y: Reg) -> u8 {
    if quirks.shift_uses_vy {
        s.v[y]
    } else {
        s.v[x]
    }
}

fn key_down(s: &MachineState, x: Reg) -> bool {
    s.keypad[(s.v[x] & 0x0f) as usize]
}

fn advance_index(s: &mut MachineState, quirks: Quirks, x: Reg) {
    if quirks.load_store_increments_i {
        s.i = s.i.wrapping_add(x as u16 + 1);
    }
}

/// XOR N rows of sprite data from I onto the screen at (VX, VY)
fn draw(s: &mut MachineState, x: Reg, y: Reg, n: u8) -> Result<StepEffect, ExecError> {
    let rows = s.memory.get_ro_slice(s.i, n as usize)?;
    let collision = s.framebuffer.draw_sprite(s.v[x], s.v[y], rows);
    s.v[FLAG] = collision as u8;
    Ok(StepEffect::redraw())
}
