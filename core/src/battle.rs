//! Cell combat
//!
//! Dice battles between the two players holding a cell. Every round both
//! sides roll at once, hits are spread over the opposing side, and casualties
//! are removed before the next round. All randomness comes from the state's
//! RNG carrier, so a battle replays identically from the same state.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::vec::Vec;

use crate::context::*;
use crate::events::{LogEvent, OccupantSummary, SideRoll, UnitRoll};
use crate::limits::{BattleLimits, DIE_FACES};
use crate::log;
use crate::modifiers::{combat_modifiers_at, event_fold, expire_modifiers, ExpiryScope};
use crate::queries;
use crate::rewards::apply_champion_kill_rewards;
use crate::rng::{BattleRng, RngState};
use crate::state::GameState;
use crate::types::{HexKey, PlayerId, Unit, UnitId};

// ==========================================
// ENTRY POINTS
// ==========================================

/// Fight out the battle on one cell.
///
/// Only a cell held by exactly two players is resolved; anything else
/// (missing cell, zero, one, or three or more players) returns the state
/// unchanged.
pub fn resolve_battle_at_hex(state: GameState, hex: HexKey) -> GameState {
    let combat = match assign_sides(&state, hex) {
        Some(combat) => combat,
        None => return state,
    };
    run_battle(state, combat)
}

/// Resolve every contested non-capital cell, in cell key order.
///
/// Capitals are left for [`resolve_sieges`].
pub fn resolve_immediate_battles(state: GameState) -> GameState {
    let battlefields: Vec<HexKey> = state
        .contested_cells()
        .into_iter()
        .filter(|hex| state.cell(*hex).map_or(false, |c| !c.is_capital()))
        .collect();

    let mut state = state;
    for hex in battlefields {
        state = resolve_battle_at_hex(state, hex);
    }
    state
}

/// Resolve every contested capital, ordered by the defender's seat and then
/// by cell key.
pub fn resolve_sieges(state: GameState) -> GameState {
    let mut sieges: Vec<(u32, HexKey)> = state
        .contested_cells()
        .into_iter()
        .filter(|hex| state.cell(*hex).map_or(false, |c| c.is_capital()))
        .filter_map(|hex| {
            let combat = assign_sides(&state, hex)?;
            let seat = state
                .player(combat.defender)
                .map(|p| p.seat)
                .unwrap_or(u32::MAX);
            Some((seat, hex))
        })
        .collect();
    sieges.sort();

    let mut state = state;
    for (_, hex) in sieges {
        state = resolve_battle_at_hex(state, hex);
    }
    state
}

/// Fix the attacker and defender slots for a battle on `hex`.
///
/// A capital's owner always defends it. Elsewhere the player who arrived
/// first defends.
fn assign_sides(state: &GameState, hex: HexKey) -> Option<CombatContext> {
    let cell = state.cell(hex)?;
    let players = cell.players();
    if players.len() != 2 {
        return None;
    }
    let defender = match cell.capital_of {
        Some(owner) if players.contains(&owner) => owner,
        _ => players[0],
    };
    let attacker = if players[0] == defender {
        players[1]
    } else {
        players[0]
    };
    Some(CombatContext {
        hex,
        attacker,
        defender,
        round: 0,
    })
}

// ==========================================
// BATTLE LOOP
// ==========================================

fn run_battle(state: GameState, combat: CombatContext) -> GameState {
    let mut state = state;
    let mut combat = combat;
    let mut limits = BattleLimits::new(field_strength(&state, &combat));
    let hex = combat.hex;

    let (attacker_units, defender_units) = side_units(&state, &combat);
    let siege = state.cell(hex).map_or(false, |c| c.is_capital());
    state.push_event(LogEvent::CombatStart {
        hex,
        attacker_player_id: combat.attacker,
        defender_player_id: combat.defender,
        attacker_units,
        defender_units,
        siege,
    });
    log::action(
        "battle",
        &format!(
            "player {} attacks player {} at {}",
            combat.attacker, combat.defender, hex
        ),
    );

    let reason = loop {
        // 1-3. Can this battle go on?
        if let Err(reason) = check_continue(&state, &combat) {
            break reason;
        }
        combat.round = limits.next_round();

        let (attacker_units, defender_units) = side_units(&state, &combat);
        let round_cx = RoundContext {
            combat: combat.clone(),
            attacker_units,
            defender_units,
        };
        let modifiers = combat_modifiers_at(&state, hex);
        state = event_fold(
            state,
            &modifiers,
            |h, hc| h.before_combat_round(hc),
            &round_cx,
        );

        // Round-start hooks may have changed either side
        if let Err(reason) = check_continue(&state, &combat) {
            break reason;
        }
        let (attacker_units, defender_units) = side_units(&state, &combat);

        // 4. Both sides roll against the state as it stood at round start
        let attacker_roll = roll_side(&mut state, &combat, Side::Attacker, &attacker_units);
        let defender_roll = roll_side(&mut state, &combat, Side::Defender, &defender_units);
        let total_hits = attacker_roll.hits + defender_roll.hits;

        // 5. A round without hits changes nothing but the dice
        if total_hits == 0 {
            state.push_event(LogEvent::CombatRound {
                hex,
                round: combat.round,
                attacker: attacker_roll,
                defender: defender_roll,
                casualties: Vec::new(),
            });
            match limits.record_round(0, field_strength(&state, &combat)) {
                Ok(()) => continue,
                Err(reason) => break reason,
            }
        }

        // 6. Spread each side's hits over the opposing side
        let on_defender = assign_side_hits(
            &mut state,
            &combat,
            Side::Defender,
            &defender_units,
            attacker_roll.hits,
        );
        let on_attacker = assign_side_hits(
            &mut state,
            &combat,
            Side::Attacker,
            &attacker_units,
            defender_roll.hits,
        );

        // 7-8. Apply damage, remove the dead, pay for champions
        let mut casualties = Vec::new();
        state = apply_hits(state, &combat, Side::Attacker, &on_attacker, &mut casualties);
        state = apply_hits(state, &combat, Side::Defender, &on_defender, &mut casualties);

        log::debug(
            "combat",
            &format!(
                "{} round {}: {} vs {} hits, {} casualties",
                hex,
                combat.round,
                attacker_roll.hits,
                defender_roll.hits,
                casualties.len()
            ),
        );
        state.push_event(LogEvent::CombatRound {
            hex,
            round: combat.round,
            attacker: attacker_roll,
            defender: defender_roll,
            casualties,
        });

        // Hits that healing has cancelled out count toward staleness
        if let Err(reason) = limits.record_round(total_hits, field_strength(&state, &combat)) {
            break reason;
        }
    };

    finish_battle(state, combat, reason, limits.rounds)
}

/// Whether the two sides can still fight.
///
/// Feasibility looks at base stats only; modifiers are not consulted.
fn check_continue(state: &GameState, combat: &CombatContext) -> Result<(), EndReason> {
    let (attackers, defenders) = side_units(state, combat);
    if attackers.is_empty() || defenders.is_empty() {
        return Err(EndReason::Eliminated);
    }
    let can_hit = |units: &[UnitId]| {
        units
            .iter()
            .filter_map(|id| state.unit(*id))
            .any(Unit::can_deal_damage)
    };
    if !can_hit(&attackers) && !can_hit(&defenders) {
        return Err(EndReason::NoHitsPossible);
    }
    Ok(())
}

/// Current unit ids of both slots on the battle cell
fn side_units(state: &GameState, combat: &CombatContext) -> (Vec<UnitId>, Vec<UnitId>) {
    match state.cell(combat.hex) {
        Some(cell) => (cell.units_of(combat.attacker), cell.units_of(combat.defender)),
        None => (Vec::new(), Vec::new()),
    }
}

/// Combined strength on the cell: champion hp plus one per force
fn field_strength(state: &GameState, combat: &CombatContext) -> u64 {
    let (attackers, defenders) = side_units(state, combat);
    attackers
        .iter()
        .chain(defenders.iter())
        .filter_map(|id| state.unit(*id))
        .map(|unit| match unit.champion() {
            Some(stats) => stats.hp.max(0) as u64,
            None => 1,
        })
        .sum()
}

// ==========================================
// ROLLING
// ==========================================

fn roll_side(
    state: &mut GameState,
    combat: &CombatContext,
    side: Side,
    units: &[UnitId],
) -> SideRoll {
    let mut rolls = Vec::with_capacity(units.len());
    for &unit_id in units {
        let unit = match state.unit(unit_id) {
            Some(unit) => unit.clone(),
            None => continue,
        };
        let is_champion = unit.is_champion();
        let cx = UnitCombatContext {
            combat: combat.clone(),
            side,
            unit_id,
            unit,
        };
        let (dice_count, hit_faces) = if is_champion {
            (
                queries::champion_attack_dice(state, &cx),
                queries::champion_hit_faces(state, &cx),
            )
        } else {
            (1, queries::force_hit_faces(state, &cx))
        };

        let (dice, rng) = state.rng.roll_dice(dice_count, DIE_FACES);
        state.rng = rng;
        let hits = dice.iter().filter(|face| **face <= hit_faces).count() as u32;
        rolls.push(UnitRoll {
            unit_id,
            dice,
            hit_faces,
            hits,
        });
    }
    let hits = rolls.iter().map(|r| r.hits).sum();
    SideRoll {
        player_id: combat.player(side),
        rolls,
        hits,
    }
}

// ==========================================
// HIT ASSIGNMENT
// ==========================================

/// Choose targets for `hits` incoming hits on `target_side`
fn assign_side_hits(
    state: &mut GameState,
    combat: &CombatContext,
    target_side: Side,
    candidates: &[UnitId],
    hits: u32,
) -> BTreeMap<UnitId, u32> {
    if hits == 0 || candidates.is_empty() {
        return BTreeMap::new();
    }
    let cx = HitAssignmentContext {
        combat: combat.clone(),
        target_side,
        target_player: combat.player(target_side),
        candidates: candidates.to_vec(),
        pending_hits: hits,
    };
    let policy = queries::hit_assignment_policy(state, &cx);
    let (assigned, rng) = assign_hits(state, state.rng, policy, candidates, hits);
    state.rng = rng;
    assigned
}

/// Spread `hits` over `candidates` according to `policy`.
///
/// `Random` draws one target per hit with replacement. The ordered policies
/// fill each unit up to a lethal amount before moving on and draw nothing.
pub fn assign_hits(
    state: &GameState,
    rng: RngState,
    policy: HitAssignmentPolicy,
    candidates: &[UnitId],
    hits: u32,
) -> (BTreeMap<UnitId, u32>, RngState) {
    let mut assigned = BTreeMap::new();
    if hits == 0 || candidates.is_empty() {
        return (assigned, rng);
    }

    let (forces, champions): (Vec<UnitId>, Vec<UnitId>) = candidates
        .iter()
        .copied()
        .partition(|id| state.unit(*id).map_or(true, Unit::is_force));

    let rng = match policy {
        HitAssignmentPolicy::Random => {
            draw_targets(rng, candidates, hits, |_| None, &mut assigned)
        }
        HitAssignmentPolicy::Bodyguard => {
            // Only the first hit that lands on a champion is taken by a guard
            let mut guard = forces.first().copied();
            let redirect = |target: UnitId| {
                if champions.contains(&target) {
                    guard.take()
                } else {
                    None
                }
            };
            draw_targets(rng, candidates, hits, redirect, &mut assigned)
        }
        HitAssignmentPolicy::ForcesFirst => {
            let order: Vec<UnitId> = forces.iter().chain(champions.iter()).copied().collect();
            fill_in_order(state, &order, hits, &mut assigned);
            rng
        }
        HitAssignmentPolicy::ChampionsFirst => {
            let order: Vec<UnitId> = champions.iter().chain(forces.iter()).copied().collect();
            fill_in_order(state, &order, hits, &mut assigned);
            rng
        }
    };
    (assigned, rng)
}

/// One uniform draw per hit; `redirect` may swap the drawn target
fn draw_targets(
    rng: RngState,
    candidates: &[UnitId],
    hits: u32,
    mut redirect: impl FnMut(UnitId) -> Option<UnitId>,
    assigned: &mut BTreeMap<UnitId, u32>,
) -> RngState {
    let mut rng = rng;
    for _ in 0..hits {
        let (index, next) = rng.gen_range(candidates.len());
        rng = next;
        let drawn = candidates[index];
        let target = redirect(drawn).unwrap_or(drawn);
        *assigned.entry(target).or_insert(0) += 1;
    }
    rng
}

/// Give each unit in `order` enough hits to kill it; overflow lands on the last
fn fill_in_order(
    state: &GameState,
    order: &[UnitId],
    hits: u32,
    assigned: &mut BTreeMap<UnitId, u32>,
) {
    let mut remaining = hits;
    for (position, id) in order.iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let lethal = match state.unit(*id).and_then(Unit::champion) {
            Some(stats) => stats.hp.max(1) as u32,
            None => 1,
        };
        let take = if position + 1 == order.len() {
            remaining
        } else {
            remaining.min(lethal)
        };
        *assigned.entry(*id).or_insert(0) += take;
        remaining -= take;
    }
}

// ==========================================
// CASUALTIES
// ==========================================

/// Apply assigned hits to `side`, remove the dead, and pay for any champions.
///
/// A force dies to a single hit. A champion loses one hp per hit.
fn apply_hits(
    state: GameState,
    combat: &CombatContext,
    side: Side,
    assigned: &BTreeMap<UnitId, u32>,
    casualties: &mut Vec<UnitId>,
) -> GameState {
    let mut state = state;
    let mut dead_champions: Vec<Unit> = Vec::new();

    for (&unit_id, &hits) in assigned {
        let dead = match state.units.get_mut(&unit_id) {
            None => continue,
            Some(unit) => match unit.champion_mut() {
                None => hits > 0,
                Some(stats) => {
                    stats.hp = stats.hp.saturating_sub(hits.min(i32::MAX as u32) as i32);
                    stats.hp <= 0
                }
            },
        };
        if !dead {
            continue;
        }
        if let Some(removed) = state.remove_unit(unit_id) {
            casualties.push(unit_id);
            if removed.is_champion() {
                dead_champions.push(removed);
            }
        }
    }

    if dead_champions.is_empty() {
        return state;
    }
    let cx = ChampionKillContext::new(
        combat.player(side.opponent()),
        combat.player(side),
        dead_champions,
        Some(combat.hex),
        KillSource::Battle,
    );
    apply_champion_kill_rewards(state, &cx)
}

// ==========================================
// BATTLE END
// ==========================================

fn finish_battle(
    state: GameState,
    combat: CombatContext,
    reason: EndReason,
    rounds: u32,
) -> GameState {
    let mut state = state;
    let hex = combat.hex;
    let (attacker_units, defender_units) = side_units(&state, &combat);

    let winner = match (attacker_units.is_empty(), defender_units.is_empty()) {
        (false, true) => Some(combat.attacker),
        (true, false) => Some(combat.defender),
        _ => None,
    };

    state.push_event(LogEvent::CombatEnd {
        hex,
        reason,
        winner_player_id: winner,
        rounds,
        attacker: summarize(&state, combat.attacker, &attacker_units),
        defender: summarize(&state, combat.defender, &defender_units),
    });

    let end_cx = BattleEndContext {
        combat,
        attacker_units,
        defender_units,
        reason,
        winner,
    };
    let modifiers = combat_modifiers_at(&state, hex);
    state = event_fold(state, &modifiers, |h, hc| h.after_battle(hc), &end_cx);
    state = expire_modifiers(state, ExpiryScope::Battle(hex));

    log::battle_summary(&format!("{}", hex), rounds, reason.as_str(), winner);
    state
}

fn summarize(state: &GameState, player: PlayerId, units: &[UnitId]) -> OccupantSummary {
    let champions = units
        .iter()
        .filter_map(|id| state.unit(*id))
        .filter(|u| u.is_champion())
        .count() as u32;
    let total = units.len() as u32;
    OccupantSummary {
        player_id: player,
        forces: total - champions,
        champions,
        total,
    }
}
