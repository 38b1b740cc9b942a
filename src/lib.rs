//!
//! ## Design
//!
//! * the interpreter is a pure state machine: no clock, no devices, no statics
//! * one `MachineState` per machine, owned by its `Chip8Interpreter`; as many
//!   machines as you like can run side by side
//! * opcodes decode once into a closed `Instruction` enum and are executed by
//!   an exhaustive match; anything that doesn't decode is reported
//! * quirks that historical interpreters disagree on are explicit config
//! * FX0A suspends the machine rather than spinning; the driver resumes it by
//!   feeding in key presses and calling `step()` again
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * input device, with trait for reading key-presses
//!
//! Model
//!
//! ```text
//! Environment
//!  |-- display, input, run config
//!  |-- interpreter(quirks, random source)
//!  |    `-- machine state(memory, registers, stack, timers, framebuffer, keypad)
//!  `-- main loop, once per frame
//!       |-- poll input; pass changed keys to interpreter.set_key()
//!       |-- interpreter.step() x cycles_per_frame, stopping early if halted
//!       |-- interpreter.tick_timers()
//!       |-- display.draw() if any step asked for a redraw
//!       `-- sleep off the rest of the frame
//! ```

pub mod config;
pub mod display;
pub mod environment;
pub mod error;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod random;
pub mod state;

pub use config::{Quirks, RunConfig, UnknownOpcodePolicy};
pub use error::{ExecError, LoadError, RunError};
pub use framebuffer::Framebuffer;
pub use instruction::Instruction;
pub use interpreter::{Chip8Interpreter, StepEffect};
pub use state::MachineState;
