//! Rule constants and battle termination limits

use crate::context::EndReason;

/// Faces on every combat die.
pub const DIE_FACES: u8 = 6;
/// A force scores a hit on a roll at or below this face.
pub const FORCE_HIT_FACES: u8 = 2;
/// Consecutive rounds without progress after which a battle ends as stale.
pub const STALE_ROUND_LIMIT: u32 = 20;
/// Number of game-log entries kept in the ring.
pub const EVENT_LOG_CAPACITY: usize = 200;

/// Tracks round counters for a single cell battle.
///
/// A round makes progress when it lands hits and leaves the cell's combined
/// strength (champion hp plus one per force) below the lowest value seen so
/// far. A zero-hit round never makes progress, and neither does a round whose
/// damage was undone by healing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleLimits {
    pub rounds: u32,
    pub stale_rounds: u32,
    /// Lowest combined strength seen on the cell
    pub low_water: u64,
}

impl BattleLimits {
    pub fn new(strength: u64) -> Self {
        Self {
            rounds: 0,
            stale_rounds: 0,
            low_water: strength,
        }
    }

    /// Start a new round and return its 1-based number
    pub fn next_round(&mut self) -> u32 {
        self.rounds += 1;
        self.rounds
    }

    /// Record a finished round.
    ///
    /// Returns `Err(EndReason::Stale)` once `STALE_ROUND_LIMIT` consecutive
    /// rounds pass without progress.
    pub fn record_round(&mut self, total_hits: u32, strength: u64) -> Result<(), EndReason> {
        if total_hits > 0 && strength < self.low_water {
            self.low_water = strength;
            self.stale_rounds = 0;
            return Ok(());
        }
        self.stale_rounds += 1;
        if self.stale_rounds >= STALE_ROUND_LIMIT {
            return Err(EndReason::Stale);
        }
        Ok(())
    }
}
