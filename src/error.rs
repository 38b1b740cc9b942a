use std::io;
use thiserror::Error;

/// failure to place a program image into memory
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("program image is too large ({size} bytes), max size is {max_size} bytes")]
    ImageTooLarge { size: usize, max_size: usize },

    #[error("failed to read program image: {0}")]
    Io(#[from] io::Error),
}

/// failure of a single fetch/decode/execute cycle; the machine state is left
/// as it was before the failing step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExecError {
    #[error("memory access out of range at address {address:#06x}")]
    AddressOutOfRange { address: u16 },

    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),

    #[error("call stack overflow")]
    StackOverflow,

    #[error("return with an empty call stack")]
    StackUnderflow,
}

/// failure of the driver loop
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_error_messages() {
        assert_eq!(
            ExecError::UnknownOpcode(0x5ab1).to_string(),
            "unknown opcode 0x5ab1"
        );
        assert_eq!(
            ExecError::AddressOutOfRange { address: 0x0fff }.to_string(),
            "memory access out of range at address 0x0fff"
        );
    }

    #[test]
    fn test_run_error_wraps_exec_error() {
        let e: RunError = ExecError::StackUnderflow.into();
        assert!(matches!(e, RunError::Exec(ExecError::StackUnderflow)));
        assert_eq!(e.to_string(), "return with an empty call stack");
    }
}
