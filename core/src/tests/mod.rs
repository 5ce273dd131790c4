mod families;
mod rewards;

use crate::events::LogEvent;
use crate::modifiers::{HookContext, ModifierHooks};
use crate::state::{Cell, GameState};
use crate::types::*;
use crate::context::UnitCombatContext;

// ==========================================
// HELPER FUNCTIONS (Boilerplate Reduction)
// ==========================================

const P1: PlayerId = 1;
const P2: PlayerId = 2;
const P3: PlayerId = 3;
const STARTING_GOLD: u32 = 10;

fn hex(q: i32, r: i32) -> HexKey {
    HexKey::new(q, r)
}

/// Two seated players (P1 in seat 0, P2 in seat 1) and an empty 3x3 board
fn two_player_state(seed: u64) -> GameState {
    let mut state = GameState::new(seed);
    state.add_player(P1, 0, STARTING_GOLD).unwrap();
    state.add_player(P2, 1, STARTING_GOLD).unwrap();
    for q in 0..3 {
        for r in 0..3 {
            state.insert_cell(Cell::new(hex(q, r)));
        }
    }
    state
}

fn add_force(state: &mut GameState, owner: PlayerId, at: HexKey) -> UnitId {
    state.deploy_unit(owner, at, UnitState::Force).unwrap()
}

fn add_champion(
    state: &mut GameState,
    owner: PlayerId,
    at: HexKey,
    hp: i32,
    dice: u32,
    faces: u8,
    bounty: u32,
) -> UnitId {
    let stats = ChampionStats::new("Champion", hp, dice, faces, bounty);
    state
        .deploy_unit(owner, at, UnitState::Champion(stats))
        .unwrap()
}

/// A champion that hits with every die it rolls
fn add_sure_hitter(state: &mut GameState, owner: PlayerId, at: HexKey, hp: i32) -> UnitId {
    add_champion(state, owner, at, hp, 1, 6, 4)
}

/// A champion that can never hit by its base stats
fn add_harmless(state: &mut GameState, owner: PlayerId, at: HexKey, hp: i32) -> UnitId {
    add_champion(state, owner, at, hp, 1, 0, 4)
}

fn hp_of(state: &GameState, unit: UnitId) -> Option<i32> {
    state.unit(unit).and_then(|u| u.champion()).map(|c| c.hp)
}

fn events_of<'a>(state: &'a GameState, kind: &'a str) -> Vec<&'a LogEvent> {
    state.log.of_kind(kind).collect()
}

/// Every hook call sees a hit threshold of zero
struct NeverHit;

impl ModifierHooks for NeverHit {
    fn force_hit_faces(
        &self,
        _cx: &HookContext<'_, UnitCombatContext>,
        _current: u8,
    ) -> Option<u8> {
        Some(0)
    }

    fn champion_hit_faces(
        &self,
        _cx: &HookContext<'_, UnitCombatContext>,
        _current: u8,
    ) -> Option<u8> {
        Some(0)
    }
}
