use crate::state::KEY_COUNT;
use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::warn;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;

/// COSMAC hex keypad laid over the left-hand side of a qwerty keyboard
///   1 2 3 C      1 2 3 4
///   4 5 6 D      q w e r
///   7 8 9 E  =>  a s d f
///   A 0 B F      z x c v
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00), // x
    ('1', 0x01), // 1
    ('2', 0x02), // 2
    ('3', 0x03), // 3
    ('q', 0x04), // q
    ('w', 0x05), // w
    ('e', 0x06), // e
    ('a', 0x07), // a
    ('s', 0x08), // s
    ('d', 0x09), // d
    ('z', 0x0a), // z
    ('c', 0x0b), // c
    ('4', 0x0c), // 4
    ('r', 0x0d), // r
    ('f', 0x0e), // f
    ('v', 0x0f), // v
];

/// terminals only report presses, so a press counts as held for this many polls
const KEY_HOLD_POLLS: u32 = 6;

/// what the keypad looks like right now
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub keys: [bool; KEY_COUNT],
    /// the user wants to stop
    pub quit: bool,
}

impl InputState {
    /// just these keys held down
    pub fn with_keys(keys: &[u8]) -> Self {
        let mut state = InputState::default();
        for k in keys {
            state.keys[(*k & 0x0f) as usize] = true;
        }
        state
    }

    pub fn quit() -> Self {
        InputState {
            quit: true,
            ..InputState::default()
        }
    }
}

/// reads keypresses
pub trait Input {
    /// current state of every key, plus whether to stop
    fn poll(&mut self) -> Result<InputState, io::Error>;
}

/// simple implementation of Input, using the terminal in raw mode
pub struct StdinInput {
    keymap: HashMap<char, u8>,
    held: [u32; KEY_COUNT],
    quit: bool,
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            held: [0; KEY_COUNT],
            quit: false,
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => self.key_event(evt),
                Event::Resize(..) => {}
                _ => warn!("unknown event received"),
            }
        }
        Ok(())
    }

    fn key_event(&mut self, evt: KeyEvent) {
        match evt.code {
            KeyCode::Esc => self.quit = true,
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => self.quit = true,
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => self.held[*mapped_key as usize] = KEY_HOLD_POLLS,
                None => warn!("can't map {:?} to a COSMAC key", key),
            },
            _ => warn!("unmapped key event received"),
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl Input for StdinInput {
    fn poll(&mut self) -> Result<InputState, io::Error> {
        for h in self.held.iter_mut() {
            *h = h.saturating_sub(1);
        }
        self.read_stdin()?;
        let mut state = InputState {
            quit: self.quit,
            ..InputState::default()
        };
        for (key, h) in self.held.iter().enumerate() {
            state.keys[key] = *h > 0;
        }
        Ok(state)
    }
}

/// dummy Input implementation for testing; replays a script one poll at a
/// time, then reports nothing pressed
pub struct DummyInput {
    script: VecDeque<InputState>,
}

impl DummyInput {
    pub fn new(script: Vec<InputState>) -> Self {
        DummyInput {
            script: VecDeque::from(script),
        }
    }
}

impl Input for DummyInput {
    fn poll(&mut self) -> Result<InputState, io::Error> {
        Ok(self.script.pop_front().unwrap_or_default())
    }
}
