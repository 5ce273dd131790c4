//! Champion kill rewards
//!
//! Combat and direct-damage effects both pay for champion kills here, so
//! faction bonuses, steals and bounty marks apply whatever did the killing.

use alloc::format;
use alloc::vec::Vec;

use crate::context::{ChampionKillContext, KillSource};
use crate::events::LogEvent;
use crate::log;
use crate::modifiers::{remove_modifier, ModifierData};
use crate::queries::{champion_kill_bonus_gold, champion_kill_steal_gold};
use crate::state::GameState;
use crate::types::{ModifierId, PlayerId, UnitId};

/// Pay out every reward owed for the champions in `cx.killed`.
///
/// 1. Killer and victim differ: the killer earns the bounty plus any kill
///    bonus, then steals gold from the victim (capped by the victim's purse).
/// 2. Any bounty mark on a killed unit pays its owner and is removed, no
///    matter who made the kill.
pub fn apply_champion_kill_rewards(state: GameState, cx: &ChampionKillContext) -> GameState {
    if cx.killed.is_empty() {
        return state;
    }
    let mut state = state;

    if cx.killer != cx.victim {
        let bonus = champion_kill_bonus_gold(&state, cx);
        state.credit_gold(cx.killer, cx.bounty.saturating_add(bonus));
        state.push_event(LogEvent::RewardBounty {
            killer_player_id: cx.killer,
            victim_player_id: cx.victim,
            bounty: cx.bounty,
            bonus,
        });

        let armor = gold_armor(&state, cx.victim);
        let steal = champion_kill_steal_gold(&state, cx).saturating_sub(armor);
        if steal > 0 {
            let amount = state.debit_gold(cx.victim, steal);
            state.credit_gold(cx.killer, amount);
            if amount > 0 {
                state.push_event(LogEvent::RewardSteal {
                    killer_player_id: cx.killer,
                    victim_player_id: cx.victim,
                    amount,
                });
            }
        }
    }

    let killed: Vec<UnitId> = cx.killed_ids().collect();
    for (modifier_id, owner, unit_id, bonus_gold) in bounty_marks(&state, &killed) {
        if let Some(owner) = owner {
            state.credit_gold(owner, bonus_gold);
            state.push_event(LogEvent::RewardMarked {
                modifier_id,
                owner_player_id: owner,
                unit_id,
                bonus_gold,
            });
        }
        state = remove_modifier(state, modifier_id);
    }

    log::action(
        "champion_kill",
        &format!(
            "player {} killed {} champion(s) of player {} ({:?})",
            cx.killer,
            cx.killed.len(),
            cx.victim,
            cx.source
        ),
    );
    state
}

/// Active bounty marks on any of `killed`, in registration order
fn bounty_marks(
    state: &GameState,
    killed: &[UnitId],
) -> Vec<(ModifierId, Option<PlayerId>, UnitId, u32)> {
    state
        .modifiers
        .iter()
        .filter(|m| !m.is_inert())
        .filter_map(|m| match m.data {
            ModifierData::MarkedForBounty { unit, bonus_gold } if killed.contains(&unit) => {
                Some((m.id, m.owner, unit, bonus_gold))
            }
            _ => None,
        })
        .collect()
}

/// Total steal protection held by `player`
fn gold_armor(state: &GameState, player: PlayerId) -> u32 {
    state
        .modifiers
        .iter()
        .filter(|m| !m.is_inert() && m.owner == Some(player))
        .map(|m| match m.data {
            ModifierData::GoldArmor { amount } => amount,
            _ => 0,
        })
        .sum()
}

// ==========================================
// DIRECT DAMAGE
// ==========================================

/// Remove a unit outright on behalf of `killer`.
///
/// A champion kill is paid through [`apply_champion_kill_rewards`]. Unknown
/// units are ignored.
pub fn kill_unit_by_effect(state: GameState, unit: UnitId, killer: PlayerId) -> GameState {
    let mut state = state;
    let removed = match state.remove_unit(unit) {
        Some(removed) => removed,
        None => return state,
    };
    if !removed.is_champion() {
        return state;
    }
    let victim = removed.owner;
    let hex = removed.hex;
    let cx = ChampionKillContext::new(
        killer,
        victim,
        alloc::vec![removed],
        Some(hex),
        KillSource::Effect,
    );
    apply_champion_kill_rewards(state, &cx)
}

/// Deal `amount` damage to a unit outside combat.
///
/// Any damage destroys a force. A champion loses hp and dies at zero or below.
pub fn damage_champion_by_effect(
    state: GameState,
    unit: UnitId,
    amount: u32,
    killer: PlayerId,
) -> GameState {
    if amount == 0 {
        return state;
    }
    let mut state = state;
    let lethal = match state.units.get_mut(&unit) {
        None => return state,
        Some(target) => match target.champion_mut() {
            None => true,
            Some(stats) => {
                stats.hp = stats.hp.saturating_sub(amount.min(i32::MAX as u32) as i32);
                stats.hp <= 0
            }
        },
    };
    if lethal {
        return kill_unit_by_effect(state, unit, killer);
    }
    state
}
