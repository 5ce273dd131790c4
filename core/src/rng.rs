//! Deterministic RNG carrier for rule resolution
//!
//! The generator is an immutable value: every draw consumes the carrier and
//! hands back the drawn value together with the successor state. Nothing in
//! the crate keeps hidden random state, so a game replays bit-for-bit from
//! its seed and command sequence.

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Trait for value-threaded random number generation
pub trait BattleRng: Copy {
    /// Draw a random u32 and the next generator state
    fn next_u32(self) -> (u32, Self);

    /// Draw a number in range [0, max) and the next generator state
    fn gen_range(self, max: usize) -> (usize, Self) {
        if max == 0 {
            return (0, self);
        }
        let (value, next) = self.next_u32();
        ((value as usize) % max, next)
    }

    /// Roll a die with `sides` faces (1..=sides)
    fn roll_die(self, sides: u8) -> (u8, Self) {
        if sides == 0 {
            return (0, self);
        }
        let (value, next) = self.gen_range(sides as usize);
        (value as u8 + 1, next)
    }

    /// Roll `count` dice, returning the faces in roll order
    fn roll_dice(self, count: u32, sides: u8) -> (alloc::vec::Vec<u8>, Self) {
        let mut rng = self;
        let mut faces = alloc::vec::Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (face, next) = rng.roll_die(sides);
            faces.push(face);
            rng = next;
        }
        (faces, rng)
    }
}

/// XorShift32 RNG - simple, fast, deterministic
///
/// This is suitable for game logic where cryptographic security is not needed.
/// The same seed will always produce the same sequence.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
pub struct XorShiftRng {
    state: u32,
}

/// The carrier threaded through `GameState`.
pub type RngState = XorShiftRng;

impl XorShiftRng {
    /// Create a new RNG from a u64 seed
    ///
    /// The seed is combined into a u32, ensuring state is never 0.
    pub fn seed_from_u64(seed: u64) -> Self {
        let state = ((seed as u32) ^ ((seed >> 32) as u32)).max(1);
        Self { state }
    }

    /// Create a new RNG from a u32 seed
    pub fn seed_from_u32(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }
}

impl BattleRng for XorShiftRng {
    fn next_u32(self) -> (u32, Self) {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        (x, Self { state: x })
    }
}
