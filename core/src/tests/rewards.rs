use super::*;
use crate::battle::resolve_battle_at_hex;
use crate::context::{ChampionKillContext, KillSource};
use crate::families::{gold_armor, kill_bonus_gold, kill_steal_gold, mark_for_bounty};
use crate::modifiers::{expire_modifiers, prune_inert, ExpiryScope, ModifierData, ModifierSource};
use crate::rewards::{apply_champion_kill_rewards, damage_champion_by_effect, kill_unit_by_effect};

fn snapshot(state: &GameState, unit: UnitId) -> Unit {
    state.unit(unit).cloned().unwrap()
}

fn kill_context(state: &GameState, killer: PlayerId, victim_unit: UnitId) -> ChampionKillContext {
    let victim = snapshot(state, victim_unit);
    ChampionKillContext::new(
        killer,
        victim.owner,
        vec![victim],
        Some(hex(0, 0)),
        KillSource::Effect,
    )
}

#[test]
fn test_empty_kill_list_is_noop() {
    let state = two_player_state(1);
    let cx = ChampionKillContext::new(P1, P2, vec![], None, KillSource::Battle);
    assert_eq!(apply_champion_kill_rewards(state.clone(), &cx), state);
}

#[test]
fn test_killer_earns_bounty_plus_bonus() {
    let mut state = two_player_state(1);
    let champion = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 5);
    let state = kill_bonus_gold(state, ModifierSource::faction("raiders"), P1, 2);
    let cx = kill_context(&state, P1, champion);
    assert_eq!(cx.bounty, 5);

    let state = apply_champion_kill_rewards(state, &cx);

    assert_eq!(state.gold_of(P1), STARTING_GOLD + 7);
    assert_eq!(state.gold_of(P2), STARTING_GOLD);
    match events_of(&state, "reward.bounty")[0] {
        LogEvent::RewardBounty { bounty, bonus, .. } => {
            assert_eq!(*bounty, 5);
            assert_eq!(*bonus, 2);
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_bonus_belongs_to_its_owner_only() {
    let mut state = two_player_state(1);
    let champion = add_champion(&mut state, P1, hex(0, 0), 3, 1, 1, 5);
    // P1's passive must not pay P2 for killing P1's champion
    let state = kill_bonus_gold(state, ModifierSource::faction("raiders"), P1, 2);
    let cx = kill_context(&state, P2, champion);

    let state = apply_champion_kill_rewards(state, &cx);

    assert_eq!(state.gold_of(P2), STARTING_GOLD + 5);
}

#[test]
fn test_no_bounty_for_own_champion() {
    let mut state = two_player_state(1);
    let champion = add_champion(&mut state, P1, hex(0, 0), 3, 1, 1, 5);
    let state = kill_steal_gold(state, ModifierSource::faction("raiders"), P1, 3);
    let cx = kill_context(&state, P1, champion);

    let state = apply_champion_kill_rewards(state, &cx);

    assert_eq!(state.gold_of(P1), STARTING_GOLD);
    assert!(events_of(&state, "reward.bounty").is_empty());
    assert!(events_of(&state, "reward.steal").is_empty());
}

#[test]
fn test_steal_is_capped_by_victim_purse() {
    let mut state = two_player_state(1);
    let champion = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 1);
    state.debit_gold(P2, STARTING_GOLD - 3);
    let state = kill_steal_gold(state, ModifierSource::faction("raiders"), P1, 10);
    let cx = kill_context(&state, P1, champion);

    let state = apply_champion_kill_rewards(state, &cx);

    assert_eq!(state.gold_of(P2), 0);
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 1 + 3);
    match events_of(&state, "reward.steal")[0] {
        LogEvent::RewardSteal { amount, .. } => assert_eq!(*amount, 3),
        _ => unreachable!(),
    }
}

#[test]
fn test_gold_armor_reduces_steal() {
    let mut state = two_player_state(1);
    let champion = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 0);
    let state = kill_steal_gold(state, ModifierSource::faction("raiders"), P1, 4);
    let state = gold_armor(state, ModifierSource::card("strongbox"), P2, 3);
    let cx = kill_context(&state, P1, champion);

    let state = apply_champion_kill_rewards(state, &cx);

    assert_eq!(state.gold_of(P2), STARTING_GOLD - 1);
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 1);
}

// ==========================================
// BOUNTY MARKS
// ==========================================

#[test]
fn test_mark_pays_owner_whoever_kills() {
    let mut state = two_player_state(1);
    state.add_player(P3, 2, STARTING_GOLD).unwrap();
    let target = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 2);
    let state = mark_for_bounty(state, ModifierSource::card("wanted"), P1, target, 4);
    let mark = state.modifiers[0].id;

    // P3 makes the kill, P1 still collects the mark
    let state = kill_unit_by_effect(state, target, P3);

    assert!(state.modifier(mark).is_none(), "mark is consumed");
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 4);
    assert_eq!(state.gold_of(P3), STARTING_GOLD + 2);
    match events_of(&state, "reward.marked")[0] {
        LogEvent::RewardMarked {
            modifier_id,
            owner_player_id,
            unit_id,
            bonus_gold,
        } => {
            assert_eq!(*modifier_id, mark);
            assert_eq!(*owner_player_id, P1);
            assert_eq!(*unit_id, target);
            assert_eq!(*bonus_gold, 4);
        }
        _ => unreachable!(),
    }
}

#[test]
fn test_mark_pays_on_self_kill() {
    let mut state = two_player_state(1);
    let target = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 2);
    let state = mark_for_bounty(state, ModifierSource::card("wanted"), P1, target, 4);

    let state = kill_unit_by_effect(state, target, P2);

    assert_eq!(state.gold_of(P1), STARTING_GOLD + 4);
    assert_eq!(state.gold_of(P2), STARTING_GOLD);
    assert!(state.modifiers.is_empty());
}

#[test]
fn test_mark_pays_on_battle_kill() {
    let mut state = two_player_state(1);
    let field = hex(1, 1);
    let target = add_harmless(&mut state, P2, field, 1);
    add_sure_hitter(&mut state, P1, field, 1);
    let state = mark_for_bounty(state, ModifierSource::card("wanted"), P1, target, 4);

    let state = resolve_battle_at_hex(state, field);

    // Bounty 4 from the champion plus 4 from the mark
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 8);
    assert!(state
        .modifiers
        .iter()
        .all(|m| !matches!(m.data, ModifierData::MarkedForBounty { .. })));
}

#[test]
fn test_mark_on_survivor_stays() {
    let mut state = two_player_state(1);
    let marked = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 2);
    let other = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 2);
    let state = mark_for_bounty(state, ModifierSource::card("wanted"), P1, marked, 4);

    let state = kill_unit_by_effect(state, other, P1);

    assert_eq!(state.modifiers.len(), 1);
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 2);
}

#[test]
fn test_mark_on_force_is_refused() {
    let mut state = two_player_state(1);
    let force = add_force(&mut state, P2, hex(0, 0));

    let state = mark_for_bounty(state, ModifierSource::card("wanted"), P1, force, 4);
    assert!(state.modifiers.is_empty());

    let state = kill_unit_by_effect(state, force, P1);
    assert_eq!(state.gold_of(P1), STARTING_GOLD);
    assert!(state.modifiers.is_empty());
}

#[test]
fn test_mark_outliving_its_unit_is_retired() {
    let mut state = two_player_state(1);
    let target = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 2);
    let mut state = mark_for_bounty(state, ModifierSource::card("wanted"), P1, target, 4);

    // Removed without a kill, so nobody collects the mark
    state.remove_unit(target);
    assert_eq!(state.modifiers.len(), 1);

    let pruned = prune_inert(state.clone());
    assert!(pruned.modifiers.is_empty());
    assert_eq!(events_of(&pruned, "modifier.expired").len(), 1);
    assert_eq!(pruned.gold_of(P1), STARTING_GOLD);

    let expired = expire_modifiers(state, ExpiryScope::Round);
    assert!(expired.modifiers.is_empty());
}

#[test]
fn test_huge_kill_bonus_saturates() {
    let mut state = two_player_state(1);
    let champion = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 5);
    let state = kill_bonus_gold(state, ModifierSource::faction("raiders"), P1, u32::MAX);
    let state = kill_bonus_gold(state, ModifierSource::faction("pirates"), P1, 7);

    let state = kill_unit_by_effect(state, champion, P1);

    assert_eq!(state.gold_of(P1), u32::MAX);
}

// ==========================================
// DIRECT DAMAGE
// ==========================================

#[test]
fn test_effect_damage_wounds_then_kills() {
    let mut state = two_player_state(1);
    let champion = add_champion(&mut state, P2, hex(0, 0), 3, 1, 1, 6);

    let state = damage_champion_by_effect(state, champion, 2, P1);
    assert_eq!(hp_of(&state, champion), Some(1));
    assert_eq!(state.gold_of(P1), STARTING_GOLD);

    let state = damage_champion_by_effect(state, champion, 5, P1);
    assert!(state.unit(champion).is_none());
    assert!(state.cell(hex(0, 0)).unwrap().occupants.is_empty());
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 6);
}

#[test]
fn test_effect_damage_destroys_force_without_bounty() {
    let mut state = two_player_state(1);
    let force = add_force(&mut state, P2, hex(0, 0));

    let state = damage_champion_by_effect(state, force, 1, P1);

    assert!(state.unit(force).is_none());
    assert_eq!(state.gold_of(P1), STARTING_GOLD);
    assert!(events_of(&state, "reward.bounty").is_empty());
}

#[test]
fn test_effect_on_unknown_unit_is_noop() {
    let state = two_player_state(1);
    assert_eq!(kill_unit_by_effect(state.clone(), UnitId(42), P1), state);
    assert_eq!(damage_champion_by_effect(state.clone(), UnitId(42), 3, P1), state);
}
