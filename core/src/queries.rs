//! Decision points
//!
//! Every rule that other sources can bend is read through one of these
//! functions. Each picks the right modifier scope and folds the base value
//! through the matching hook.

use crate::context::*;
use crate::limits::FORCE_HIT_FACES;
use crate::modifiers::{
    combat_modifiers_at, event_fold, global_modifiers, modifiers_for_edge, query_fold,
};
use crate::state::GameState;
use crate::types::{EdgeKey, HexKey, PlayerId, Unit};

// ==========================================
// COMBAT
// ==========================================

/// Highest die face that counts as a hit for a force
pub fn force_hit_faces(state: &GameState, cx: &UnitCombatContext) -> u8 {
    let modifiers = combat_modifiers_at(state, cx.combat.hex);
    query_fold(
        state,
        &modifiers,
        |h, hc, v| h.force_hit_faces(hc, v),
        cx,
        FORCE_HIT_FACES,
    )
}

/// Dice a champion rolls this round
pub fn champion_attack_dice(state: &GameState, cx: &UnitCombatContext) -> u32 {
    let base = cx.unit.champion().map(|c| c.attack_dice).unwrap_or(0);
    let modifiers = combat_modifiers_at(state, cx.combat.hex);
    query_fold(
        state,
        &modifiers,
        |h, hc, v| h.champion_attack_dice(hc, v),
        cx,
        base,
    )
}

/// Highest die face that counts as a hit for a champion
pub fn champion_hit_faces(state: &GameState, cx: &UnitCombatContext) -> u8 {
    let base = cx.unit.champion().map(|c| c.hit_faces).unwrap_or(0);
    let modifiers = combat_modifiers_at(state, cx.combat.hex);
    query_fold(
        state,
        &modifiers,
        |h, hc, v| h.champion_hit_faces(hc, v),
        cx,
        base,
    )
}

/// How hits landing on the target side are spread
pub fn hit_assignment_policy(state: &GameState, cx: &HitAssignmentContext) -> HitAssignmentPolicy {
    let modifiers = combat_modifiers_at(state, cx.combat.hex);
    query_fold(
        state,
        &modifiers,
        |h, hc, v| h.hit_assignment_policy(hc, v),
        cx,
        HitAssignmentPolicy::default(),
    )
}

// ==========================================
// MOVEMENT
// ==========================================

/// Whether `from` and `to` count as adjacent, starting from board geometry
pub fn are_adjacent(state: &GameState, from: HexKey, to: HexKey, player: Option<PlayerId>) -> bool {
    let cx = AdjacencyContext { from, to, player };
    let modifiers = global_modifiers(state);
    query_fold(
        state,
        &modifiers,
        |h, hc, v| h.adjacency(hc, v),
        &cx,
        from.is_neighbor(&to),
    )
}

/// Whether crossing `edge` needs a bridge; `base` comes from the board
pub fn requires_bridge(
    state: &GameState,
    edge: EdgeKey,
    player: Option<PlayerId>,
    base: bool,
) -> bool {
    let cx = EdgeContext { edge, player };
    let modifiers = modifiers_for_edge(state, edge);
    query_fold(state, &modifiers, |h, hc, v| h.requires_bridge(hc, v), &cx, base)
}

pub fn max_move_distance(state: &GameState, unit: &Unit, base: u32) -> u32 {
    let cx = MoveContext { unit: unit.clone() };
    let modifiers = combat_modifiers_at(state, unit.hex);
    query_fold(state, &modifiers, |h, hc, v| h.max_move_distance(hc, v), &cx, base)
}

// ==========================================
// ECONOMY
// ==========================================

pub fn deploy_count(state: &GameState, player: PlayerId, base: u32) -> u32 {
    let cx = PlayerContext { player };
    let modifiers = global_modifiers(state);
    query_fold(state, &modifiers, |h, hc, v| h.deploy_count(hc, v), &cx, base)
}

pub fn mine_gold(state: &GameState, player: PlayerId, hex: HexKey, base: u32) -> u32 {
    let cx = HexPlayerContext { player, hex };
    let modifiers = combat_modifiers_at(state, hex);
    query_fold(state, &modifiers, |h, hc, v| h.mine_gold(hc, v), &cx, base)
}

pub fn card_choice_count(state: &GameState, player: PlayerId, base: u32) -> u32 {
    let cx = PlayerContext { player };
    let modifiers = global_modifiers(state);
    query_fold(state, &modifiers, |h, hc, v| h.card_choice_count(hc, v), &cx, base)
}

pub fn control_value(state: &GameState, player: PlayerId, hex: HexKey, base: u32) -> u32 {
    let cx = HexPlayerContext { player, hex };
    let modifiers = combat_modifiers_at(state, hex);
    query_fold(state, &modifiers, |h, hc, v| h.control_value(hc, v), &cx, base)
}

/// Extra gold the killer earns on top of the bounty
pub fn champion_kill_bonus_gold(state: &GameState, cx: &ChampionKillContext) -> u32 {
    query_fold(
        state,
        &state.modifiers,
        |h, hc, v| h.champion_kill_bonus_gold(hc, v),
        cx,
        0,
    )
}

/// Gold the killer takes from the victim, before capping by the victim's purse
pub fn champion_kill_steal_gold(state: &GameState, cx: &ChampionKillContext) -> u32 {
    query_fold(
        state,
        &state.modifiers,
        |h, hc, v| h.champion_kill_steal_gold(hc, v),
        cx,
        0,
    )
}

// ==========================================
// EVENTS
// ==========================================

/// Run card-draw side effects after `player` drew `cards_drawn` cards
pub fn dispatch_card_draw(state: GameState, player: PlayerId, cards_drawn: u32) -> GameState {
    let cx = CardDrawContext {
        player,
        cards_drawn,
    };
    let modifiers = state.modifiers.clone();
    event_fold(state, &modifiers, |h, hc| h.on_card_draw(hc), &cx)
}

/// Run round-end triggers for the current round
pub fn dispatch_round_end(state: GameState) -> GameState {
    let cx = RoundEndContext { round: state.round };
    let modifiers = state.modifiers.clone();
    event_fold(state, &modifiers, |h, hc| h.on_round_end(hc), &cx)
}
