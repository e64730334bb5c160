//! Single-byte XOR obfuscation used by the clone-mode protocol.
//!
//! Every obfuscated byte on the wire is the plain byte XOR the session seed.
//! There is no keystream: the same seed covers every command and the whole
//! image. This is an obfuscation layer the radio expects, not encryption.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How a session picks its seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "value")]
pub enum SeedPolicy {
    /// Always use this seed. The default, `Fixed(0)`, sends every payload in clear.
    Fixed(u8),
    /// Draw a fresh seed in `1..=254` for every session.
    Random,
}

impl Default for SeedPolicy {
    fn default() -> Self {
        SeedPolicy::Fixed(0)
    }
}

impl SeedPolicy {
    /// Produce the seed for a new session.
    pub fn pick(&self) -> u8 {
        match *self {
            SeedPolicy::Fixed(seed) => seed,
            SeedPolicy::Random => rand::rng().random_range(1..=254),
        }
    }
}

/// XOR cipher keyed by one seed byte for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCipher {
    seed: u8,
}

impl SeedCipher {
    pub fn new(seed: u8) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u8 {
        self.seed
    }

    #[inline]
    pub fn obfuscate(&self, byte: u8) -> u8 {
        obfuscate(byte, self.seed)
    }

    #[inline]
    pub fn deobfuscate(&self, byte: u8) -> u8 {
        deobfuscate(byte, self.seed)
    }

    /// XOR a buffer in place.
    pub fn apply(&self, buf: &mut [u8]) {
        if self.seed == 0 {
            return;
        }
        for b in buf.iter_mut() {
            *b ^= self.seed;
        }
    }

    /// XOR a copy of `data`.
    pub fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply(&mut out);
        out
    }

    /// Whether `byte` decodes to `expected`.
    pub fn matches(&self, byte: u8, expected: u8) -> bool {
        self.deobfuscate(byte) == expected
    }
}

#[inline]
pub fn obfuscate(byte: u8, seed: u8) -> u8 {
    byte ^ seed
}

#[inline]
pub fn deobfuscate(byte: u8, seed: u8) -> u8 {
    byte ^ seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_self_inverse() {
        for seed in [0u8, 0x37, 0xFF] {
            for b in 0..=255u8 {
                assert_eq!(deobfuscate(obfuscate(b, seed), seed), b);
            }
        }
    }

    #[test]
    fn zero_seed_is_identity() {
        let cipher = SeedCipher::new(0);
        assert_eq!(cipher.encode(b"PROGRAM"), b"PROGRAM".to_vec());
    }

    #[test]
    fn apply_xors_every_byte() {
        let cipher = SeedCipher::new(0x37);
        let mut buf = [0x00, 0x37, 0xFF];
        cipher.apply(&mut buf);
        assert_eq!(buf, [0x37, 0x00, 0xC8]);
        assert!(cipher.matches(b'A' ^ 0x37, b'A'));
    }

    #[test]
    fn random_seed_stays_in_range() {
        for _ in 0..200 {
            let seed = SeedPolicy::Random.pick();
            assert!((1..=254).contains(&seed));
        }
        assert_eq!(SeedPolicy::default().pick(), 0);
        assert_eq!(SeedPolicy::Fixed(9).pick(), 9);
    }
}
