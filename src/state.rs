use crate::framebuffer::Framebuffer;
use crate::memory::Chip8MemoryMap;

/// how deep subroutine calls can nest
pub const STACK_DEPTH: usize = 16;

/// general purpose registers V0-VF
pub const REGISTER_COUNT: usize = 16;

/// keys on the hex keypad, 0x0-0xf
pub const KEY_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG: usize = 0xf;

/// FX0A has suspended the machine until a key goes down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyWait {
    /// where the key symbol will be stored
    pub register: usize,
    /// first key pressed since the wait began
    pub captured: Option<u8>,
}

/// Everything one CHIP-8 machine knows. Pure data; the interpreter does all
/// the mutating.
pub struct MachineState {
    pub(crate) memory: Chip8MemoryMap,
    pub(crate) v: [u8; REGISTER_COUNT],
    pub(crate) i: u16,
    pub(crate) program_counter: u16,
    pub(crate) stack: [u16; STACK_DEPTH],
    pub(crate) stack_pointer: usize,
    pub(crate) delay_timer: u8,
    pub(crate) sound_timer: u8,
    pub(crate) framebuffer: Framebuffer,
    pub(crate) keypad: [bool; KEY_COUNT],
    pub(crate) key_wait: Option<KeyWait>,
}

impl MachineState {
    /// zeroed machine with the font loaded and PC at the program start
    pub fn new() -> Self {
        let memory = Chip8MemoryMap::new();
        let program_counter = memory.program_addr;
        MachineState {
            memory,
            v: [0; REGISTER_COUNT],
            i: 0,
            program_counter,
            stack: [0; STACK_DEPTH],
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            framebuffer: Framebuffer::new(),
            keypad: [false; KEY_COUNT],
            key_wait: None,
        }
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn registers(&self) -> &[u8; REGISTER_COUNT] {
        &self.v
    }

    pub fn index(&self) -> u16 {
        self.i
    }

    pub fn program_counter(&self) -> u16 {
        self.program_counter
    }

    /// return addresses currently on the call stack, oldest first
    pub fn call_stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer]
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack_pointer
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn keypad(&self) -> &[bool; KEY_COUNT] {
        &self.keypad
    }

    pub fn key_wait(&self) -> Option<KeyWait> {
        self.key_wait
    }

    pub(crate) fn push(&mut self, addr: u16) -> bool {
        if self.stack_pointer == STACK_DEPTH {
            return false;
        }
        self.stack[self.stack_pointer] = addr;
        self.stack_pointer += 1;
        true
    }

    pub(crate) fn pop(&mut self) -> Option<u16> {
        if self.stack_pointer == 0 {
            return None;
        }
        self.stack_pointer -= 1;
        Some(self.stack[self.stack_pointer])
    }
}

impl Default for MachineState {
    fn default() -> Self {
        Self::new()
    }
}
