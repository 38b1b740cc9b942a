use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Where CXNN gets its random bytes from. Injected so tests can be
/// deterministic.
pub trait RandomSource {
    fn random_byte(&mut self) -> u8;
}

/// random bytes from a seedable standard rng
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// seeded from system entropy
    pub fn new() -> Self {
        StdRandom {
            rng: StdRng::from_entropy(),
        }
    }

    /// reproducible run
    pub fn seeded(seed: u64) -> Self {
        StdRandom {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for StdRandom {
    fn random_byte(&mut self) -> u8 {
        self.rng.gen()
    }
}

/// dummy RandomSource for testing; cycles through a fixed list of bytes
pub struct SequenceRandom {
    bytes: Vec<u8>,
    next: usize,
}

impl SequenceRandom {
    pub fn new(bytes: &[u8]) -> Self {
        assert!(!bytes.is_empty(), "SequenceRandom needs at least one byte");
        SequenceRandom {
            bytes: Vec::from(bytes),
            next: 0,
        }
    }
}

impl RandomSource for SequenceRandom {
    fn random_byte(&mut self) -> u8 {
        let b = self.bytes[self.next];
        self.next = (self.next + 1) % self.bytes.len();
        b
    }
}
