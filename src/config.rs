/// Interpreter behaviours that historical CHIP-8 implementations disagree on.
/// The default is the common modern set: shifts work on VX in place, BNNN
/// offsets from V0, FX55/FX65 leave I alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// 8XY6/8XYE shift VY and store the result in VX (COSMAC VIP)
    pub shift_uses_vy: bool,
    /// BNNN jumps to VX + NNN, X being the top nibble of NNN (CHIP-48, SUPER-CHIP)
    pub jump_uses_vx: bool,
    /// FX55/FX65 leave I pointing just past the last byte touched (COSMAC VIP)
    pub load_store_increments_i: bool,
}

impl Quirks {
    /// the behaviour of the original COSMAC VIP interpreter
    pub fn cosmac_vip() -> Self {
        Quirks {
            shift_uses_vy: true,
            jump_uses_vx: false,
            load_store_increments_i: true,
        }
    }
}

/// what the driver does when the program hits an opcode nobody defined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownOpcodePolicy {
    /// stop running and report the error
    Halt,
    /// log it, step over it and carry on
    Skip,
}

/// How the driver loop paces the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// instructions executed per timer tick
    pub cycles_per_frame: u32,
    /// timer ticks per second; 0 runs unpaced
    pub frame_rate: u32,
    pub unknown_opcode: UnknownOpcodePolicy,
    /// stop after this many frames
    pub max_frames: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            cycles_per_frame: 10,
            frame_rate: 60,
            unknown_opcode: UnknownOpcodePolicy::Halt,
            max_frames: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quirks_are_modern() {
        let q = Quirks::default();
        assert!(!q.shift_uses_vy);
        assert!(!q.jump_uses_vx);
        assert!(!q.load_store_increments_i);
    }

    #[test]
    fn test_default_run_config() {
        let c = RunConfig::default();
        assert_eq!(c.cycles_per_frame, 10);
        assert_eq!(c.frame_rate, 60);
        assert_eq!(c.unknown_opcode, UnknownOpcodePolicy::Halt);
        assert_eq!(c.max_frames, None);
    }
}
