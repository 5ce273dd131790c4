use super::*;
use crate::battle::resolve_battle_at_hex;
use crate::context::{CombatContext, Side};
use crate::families::*;
use crate::modifiers::{install_modifier, Duration, Modifier, ModifierData, ModifierSource};
use crate::queries;
use crate::rewards::{damage_champion_by_effect, kill_unit_by_effect};

fn card(key: &str) -> ModifierSource {
    ModifierSource::card(key)
}

fn unit_context(state: &GameState, unit: UnitId, opponent: PlayerId) -> UnitCombatContext {
    let unit = state.unit(unit).cloned().unwrap();
    UnitCombatContext {
        combat: CombatContext {
            hex: unit.hex,
            attacker: unit.owner,
            defender: opponent,
            round: 1,
        },
        side: Side::Attacker,
        unit_id: unit.id,
        unit,
    }
}

fn fog(state: GameState) -> GameState {
    let mut state = state;
    let id = state.allocate_modifier_id();
    install_modifier(state, Modifier::new(id, card("fog"), NeverHit))
}

// ==========================================
// COMBAT FAMILIES
// ==========================================

#[test]
fn test_force_hit_floor_applies_to_owner_only() {
    let mut state = two_player_state(1);
    let field = hex(1, 1);
    let mine = add_force(&mut state, P1, field);
    let theirs = add_force(&mut state, P2, field);
    let state = force_hit_floor(
        state,
        card("volley"),
        P1,
        Some(field),
        6,
        Duration::EndOfBattle,
    );

    assert_eq!(queries::force_hit_faces(&state, &unit_context(&state, mine, P2)), 6);
    assert_eq!(queries::force_hit_faces(&state, &unit_context(&state, theirs, P1)), 2);
}

#[test]
fn test_force_hit_floor_wins_battle() {
    let mut state = two_player_state(5);
    let field = hex(1, 1);
    let champion = add_harmless(&mut state, P2, field, 3);
    for _ in 0..3 {
        add_force(&mut state, P1, field);
    }
    let state = force_hit_floor(
        state,
        card("volley"),
        P1,
        Some(field),
        6,
        Duration::EndOfBattle,
    );

    let state = resolve_battle_at_hex(state, field);

    // Three sure hits drop the 3 hp champion in the first round
    assert!(state.unit(champion).is_none());
    assert_eq!(state.cell(field).unwrap().units_of(P1).len(), 3);
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 4);
    assert!(state.modifiers.is_empty());
}

#[test]
fn test_ambush_spends_a_use_per_battle() {
    let mut state = two_player_state(5);
    let first = hex(0, 0);
    let second = hex(2, 2);
    add_harmless(&mut state, P2, first, 1);
    add_sure_hitter(&mut state, P1, first, 1);
    add_harmless(&mut state, P2, second, 1);
    add_sure_hitter(&mut state, P1, second, 1);
    let state = ambush(state, card("ambush"), P1, 6, 2);
    let id = state.modifiers[0].id;

    let state = resolve_battle_at_hex(state, first);
    assert_eq!(state.modifier(id).unwrap().duration, Duration::Uses(1));

    let state = resolve_battle_at_hex(state, second);
    assert!(state.modifier(id).is_none(), "exhausted ambush is retired");
}

#[test]
fn test_ambush_ignores_battles_of_others() {
    let mut state = two_player_state(5);
    state.add_player(P3, 2, STARTING_GOLD).unwrap();
    let field = hex(1, 1);
    add_harmless(&mut state, P2, field, 1);
    add_sure_hitter(&mut state, P3, field, 1);
    let state = ambush(state, card("ambush"), P1, 6, 2);

    let state = resolve_battle_at_hex(state, field);

    assert_eq!(state.modifiers[0].duration, Duration::Uses(2));
}

#[test]
fn test_champion_dice_bonus_follows_its_champion() {
    let mut state = two_player_state(1);
    let field = hex(0, 1);
    let hero = add_champion(&mut state, P1, field, 3, 2, 3, 1);
    let squire = add_champion(&mut state, P1, field, 3, 2, 3, 1);
    let state = champion_dice_bonus(state, card("blessing"), hero, 2, Duration::Permanent);

    assert_eq!(queries::champion_attack_dice(&state, &unit_context(&state, hero, P2)), 4);
    assert_eq!(queries::champion_attack_dice(&state, &unit_context(&state, squire, P2)), 2);
    assert_eq!(state.modifiers[0].owner, Some(P1));

    let state = kill_unit_by_effect(state, hero, P2);
    assert!(state.modifiers.is_empty(), "anchored modifiers die with their unit");
}

#[test]
fn test_field_medic_heals_tracked_champions_each_round() {
    let mut state = two_player_state(9);
    let field = hex(2, 0);
    let patient = add_champion(&mut state, P2, field, 4, 1, 2, 1);
    let bystander = add_champion(&mut state, P2, field, 4, 1, 2, 1);
    add_champion(&mut state, P1, field, 4, 1, 2, 1);
    let state = damage_champion_by_effect(state, patient, 3, P1);
    let state = damage_champion_by_effect(state, bystander, 3, P1);
    let state = field_medic(state, card("medic"), P2, vec![patient], Duration::Permanent);
    let state = fog(state);

    // Nobody can hit; the battle goes stale while the medic works
    let state = resolve_battle_at_hex(state, field);

    assert_eq!(hp_of(&state, patient), Some(4), "healed up to max hp");
    assert_eq!(hp_of(&state, bystander), Some(1));
}

// ==========================================
// REWARD FAMILIES
// ==========================================

#[test]
fn test_war_chest_grows_with_victories() {
    let mut state = two_player_state(3);
    let field = hex(1, 1);
    add_harmless(&mut state, P2, field, 1);
    add_sure_hitter(&mut state, P1, field, 1);
    let straggler = add_champion(&mut state, P2, hex(2, 2), 2, 1, 1, 2);
    let state = war_chest(state, ModifierSource::faction("merchants"), P1);

    let state = resolve_battle_at_hex(state, field);
    // The kill happens before the victory is counted
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 4);
    assert_eq!(state.modifiers[0].data, ModifierData::Counter { value: 1 });

    let state = kill_unit_by_effect(state, straggler, P1);
    assert_eq!(state.gold_of(P1), STARTING_GOLD + 4 + 2 + 1);
}

// ==========================================
// MOVEMENT FAMILIES
// ==========================================

#[test]
fn test_linked_hexes_become_adjacent() {
    let a = hex(0, 0);
    let b = hex(2, 2);
    let state = two_player_state(1);
    assert!(!queries::are_adjacent(&state, a, b, Some(P1)));
    assert!(queries::are_adjacent(&state, a, hex(1, 0), None));

    let state = linked_hexes(state, card("portal"), Some(P1), a, b, Duration::EndOfRound);

    assert!(queries::are_adjacent(&state, a, b, Some(P1)));
    assert!(queries::are_adjacent(&state, b, a, Some(P1)));
    assert!(!queries::are_adjacent(&state, a, b, Some(P2)));
    assert!(!queries::are_adjacent(&state, a, hex(0, 2), Some(P1)));
}

#[test]
fn test_bridge_waiver_is_per_edge_and_owner() {
    let edge = EdgeKey::new(hex(0, 0), hex(1, 0));
    let other = EdgeKey::new(hex(1, 0), hex(2, 0));
    let state = bridge_waiver(two_player_state(1), card("ford"), P1, edge, Duration::EndOfRound);

    assert!(!queries::requires_bridge(&state, edge, Some(P1), true));
    assert!(queries::requires_bridge(&state, edge, Some(P2), true));
    assert!(queries::requires_bridge(&state, other, Some(P1), true));
    assert!(!queries::requires_bridge(&state, other, Some(P1), false));
}

#[test]
fn test_move_boost_scopes() {
    let mut state = two_player_state(1);
    let scout = add_force(&mut state, P1, hex(0, 0));
    let infantry = add_force(&mut state, P1, hex(0, 0));
    let enemy = add_force(&mut state, P2, hex(1, 0));
    let state = move_boost(state, card("boots"), P1, Some(scout), 2, Duration::EndOfRound);
    let state = move_boost(state, card("roads"), P1, None, 1, Duration::EndOfRound);

    let range = |state: &GameState, unit: UnitId| {
        queries::max_move_distance(state, state.unit(unit).unwrap(), 1)
    };
    assert_eq!(range(&state, scout), 4);
    assert_eq!(range(&state, infantry), 2);
    assert_eq!(range(&state, enemy), 1);
}

// ==========================================
// ECONOMY FAMILIES
// ==========================================

#[test]
fn test_player_boosts_stack_per_target() {
    let mine = hex(1, 2);
    let state = two_player_state(1);
    let state = deploy_boost(state, card("muster"), P1, 1, Duration::EndOfRound);
    let state = deploy_boost(state, card("levy"), P1, 2, Duration::EndOfRound);
    let state = card_choice_boost(state, card("scholar"), P2, 1, Duration::Permanent);
    let state = mine_gold_bonus(state, card("pickaxe"), P1, Some(mine), 3, Duration::Permanent);
    let state = control_bonus(state, card("banner"), P2, None, 1, Duration::Permanent);

    assert_eq!(queries::deploy_count(&state, P1, 2), 5);
    assert_eq!(queries::deploy_count(&state, P2, 2), 2);
    assert_eq!(queries::card_choice_count(&state, P2, 3), 4);
    assert_eq!(queries::card_choice_count(&state, P1, 3), 3);
    assert_eq!(queries::mine_gold(&state, P1, mine, 2), 5);
    assert_eq!(queries::mine_gold(&state, P1, hex(0, 0), 2), 2, "scoped to one mine");
    assert_eq!(queries::control_value(&state, P2, hex(0, 0), 1), 2);
    assert_eq!(queries::control_value(&state, P1, hex(0, 0), 1), 1);
}
