//! Rules core for Hexlords
//!
//! A modifier composition engine plus the combat and reward resolvers built
//! on it. Every operation takes a [`GameState`] by value and returns the next
//! one; randomness is threaded through the state's RNG carrier.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod battle;
pub mod context;
pub mod error;
pub mod events;
pub mod families;
pub mod limits;
mod log;
pub mod modifiers;
pub mod queries;
pub mod rewards;
pub mod rng;
pub mod round;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;

pub use battle::{resolve_battle_at_hex, resolve_immediate_battles, resolve_sieges};
pub use context::*;
pub use error::{GameError, GameResult};
pub use events::{EventLog, LogEvent};
pub use modifiers::{
    combat_modifiers_at, event_fold, install_modifier, query_fold, Attachment, Duration,
    HookContext, Modifier, ModifierData, ModifierHooks, ModifierSource,
};
pub use rewards::apply_champion_kill_rewards;
pub use rng::{BattleRng, RngState};
pub use round::end_round;
pub use state::{Cell, GameState, Player};
pub use types::*;
