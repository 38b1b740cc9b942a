//! The environment sets everything up and runs the main loop. Timing is
//! frame based: each frame runs a batch of instructions, ticks the timers
//! once, redraws if anything changed, then sleeps off the rest of the frame.
//! Instructions therefore run in bursts rather than evenly spaced, which is
//! close enough for wallclock purposes.

use crate::config::{RunConfig, UnknownOpcodePolicy};
use crate::display::Display;
use crate::error::{ExecError, RunError};
use crate::input::{Input, InputState};
use crate::interpreter::Chip8Interpreter;
use crate::state::KEY_COUNT;
use log::{info, warn};
use std::time::{Duration, Instant};

/// how a run went
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub instructions: u64,
}

pub struct Environment<'a> {
    interpreter: Chip8Interpreter,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    config: RunConfig,
    keys: [bool; KEY_COUNT],
}

impl<'a> Environment<'a> {
    pub fn new(
        interpreter: Chip8Interpreter,
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        config: RunConfig,
    ) -> Self {
        Environment {
            interpreter,
            display,
            input,
            config,
            keys: [false; KEY_COUNT],
        }
    }

    pub fn interpreter(&self) -> &Chip8Interpreter {
        &self.interpreter
    }

    /// run until the user quits, the frame limit is hit or the program breaks
    pub fn run(&mut self) -> Result<RunSummary, RunError> {
        let frame_time = match self.config.frame_rate {
            0 => None,
            hz => Some(Duration::from_secs(1) / hz),
        };
        let mut summary = RunSummary::default();
        // draw once so there is something on screen before the first redraw
        self.display.draw(self.interpreter.framebuffer())?;

        while self.config.max_frames.map_or(true, |max| summary.frames < max) {
            let started = Instant::now();
            let input = self.input.poll()?;
            if input.quit {
                info!("quit requested");
                break;
            }
            self.apply_keys(&input);

            let mut redraw = false;
            for _ in 0..self.config.cycles_per_frame {
                let parked = self.interpreter.is_waiting_for_key();
                match self.interpreter.step() {
                    Ok(effect) => {
                        // a step that stays in the key wait runs nothing
                        if !(parked && effect.halted) {
                            summary.instructions += 1;
                        }
                        redraw |= effect.redraw_requested;
                        // nothing more will happen until the next key poll
                        if effect.halted {
                            break;
                        }
                    }
                    Err(ExecError::UnknownOpcode(raw))
                        if self.config.unknown_opcode == UnknownOpcodePolicy::Skip =>
                    {
                        warn!(
                            "skipping unknown opcode {:#06x} at {:#05x}",
                            raw,
                            self.interpreter.state().program_counter()
                        );
                        self.interpreter.skip_instruction();
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            self.interpreter.tick_timers();

            if redraw {
                self.display.draw(self.interpreter.framebuffer())?;
            }
            summary.frames += 1;

            if let Some(frame_time) = frame_time {
                if let Some(rest) = frame_time.checked_sub(started.elapsed()) {
                    spin_sleep::sleep(rest);
                }
            }
        }
        info!(
            "stopped after {} frames, {} instructions",
            summary.frames, summary.instructions
        );
        Ok(summary)
    }

    /// only tell the interpreter about keys that changed
    fn apply_keys(&mut self, input: &InputState) {
        for (key, pressed) in input.keys.iter().enumerate() {
            if self.keys[key] != *pressed {
                self.interpreter.set_key(key as u8, *pressed);
                self.keys[key] = *pressed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Quirks;
    use crate::display::DummyDisplay;
    use crate::input::DummyInput;
    use crate::random::SequenceRandom;

    fn interpreter(program: &[u8]) -> Chip8Interpreter {
        let mut i = Chip8Interpreter::new(Quirks::default(), Box::new(SequenceRandom::new(&[0])));
        i.load(program).unwrap();
        i
    }

    fn unpaced(frames: u64) -> RunConfig {
        RunConfig {
            frame_rate: 0,
            max_frames: Some(frames),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_runs_for_max_frames() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        // 0x200: jump to self
        let mut env = Environment::new(interpreter(&[0x12, 0x00]), &mut display, &mut input, unpaced(3));
        let summary = env.run()?;
        assert_eq!(summary, RunSummary { frames: 3, instructions: 30 });
        // only the initial draw
        assert_eq!(display.draw_count, 1);
        Ok(())
    }

    #[test]
    fn test_redraws_after_draw() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        // draw glyph 0 at 0,0 then spin
        let program = [0xa0, 0x50, 0xd0, 0x05, 0x12, 0x04];
        let mut env = Environment::new(interpreter(&program), &mut display, &mut input, unpaced(2));
        env.run()?;
        assert_eq!(display.draw_count, 2);
        let frame = display.last_frame.as_ref().unwrap();
        assert!(frame.pixel(0, 0) && frame.pixel(3, 0));
        Ok(())
    }

    #[test]
    fn test_quit_stops_run() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![InputState::default(), InputState::quit()]);
        let mut env = Environment::new(interpreter(&[0x12, 0x00]), &mut display, &mut input, unpaced(100));
        assert_eq!(env.run()?.frames, 1);
        Ok(())
    }

    #[test]
    fn test_timers_tick_once_per_frame() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        // DT = 10, then spin
        let program = [0x60, 0x0a, 0xf0, 0x15, 0x12, 0x04];
        let mut env = Environment::new(interpreter(&program), &mut display, &mut input, unpaced(4));
        env.run()?;
        assert_eq!(env.interpreter().state().delay_timer(), 6);
        Ok(())
    }

    #[test]
    fn test_key_wait_resumes_on_input() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![
            InputState::default(),
            InputState::default(),
            InputState::with_keys(&[0x7]),
        ]);
        // V1 = key, then spin
        let program = [0xf1, 0x0a, 0x12, 0x02];
        let mut env = Environment::new(interpreter(&program), &mut display, &mut input, unpaced(3));
        let summary = env.run()?;
        assert_eq!(env.interpreter().state().registers()[1], 0x7);
        assert!(!env.interpreter().is_waiting_for_key());
        // FX0A, then the resumed step's jump and 9 more in the last frame
        assert_eq!(summary.instructions, 1 + 10);
        Ok(())
    }

    #[test]
    fn test_unknown_opcode_halts_by_default() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let mut env = Environment::new(interpreter(&[0xff, 0xff]), &mut display, &mut input, unpaced(1));
        assert!(matches!(
            env.run(),
            Err(RunError::Exec(ExecError::UnknownOpcode(0xffff)))
        ));
    }

    #[test]
    fn test_unknown_opcode_skip_policy() -> Result<(), RunError> {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let config = RunConfig {
            unknown_opcode: UnknownOpcodePolicy::Skip,
            ..unpaced(1)
        };
        // junk, V0 = 1, spin
        let program = [0xff, 0xff, 0x60, 0x01, 0x12, 0x04];
        let mut env = Environment::new(interpreter(&program), &mut display, &mut input, config);
        env.run()?;
        assert_eq!(env.interpreter().state().registers()[0], 1);
        Ok(())
    }

    #[test]
    fn test_stack_errors_always_stop() {
        let mut display = DummyDisplay::new();
        let mut input = DummyInput::new(vec![]);
        let config = RunConfig {
            unknown_opcode: UnknownOpcodePolicy::Skip,
            ..unpaced(1)
        };
        let mut env = Environment::new(interpreter(&[0x00, 0xee]), &mut display, &mut input, config);
        assert!(matches!(
            env.run(),
            Err(RunError::Exec(ExecError::StackUnderflow))
        ));
    }
}
