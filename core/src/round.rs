//! Round cleanup

use alloc::format;

use crate::log;
use crate::modifiers::{expire_modifiers, ExpiryScope};
use crate::queries::dispatch_round_end;
use crate::state::GameState;

/// Close the current round.
///
/// Runs round-end triggers, retires end-of-round and exhausted modifiers,
/// clears champion ability counters, then advances the round number.
pub fn end_round(state: GameState) -> GameState {
    let finished = state.round;
    let mut state = dispatch_round_end(state);
    state = expire_modifiers(state, ExpiryScope::Round);
    state.reset_ability_uses();
    state.round += 1;
    log::info(&format!("round {} closed", finished));
    state
}
