//! Modifier families
//!
//! Ready-made hook implementations and their installers. Card effects,
//! faction passives and champion deployment build their modifiers here
//! instead of touching the resolvers. Every installer allocates a fresh id,
//! appends the modifier, and returns the next state.

use alloc::vec::Vec;

use crate::context::*;
use crate::modifiers::{
    consume_modifier_use, install_modifier, Attachment, Duration, HookContext, Modifier,
    ModifierData, ModifierHooks, ModifierSource, NoHooks,
};
use crate::state::GameState;
use crate::types::{EdgeKey, HexKey, ModifierId, PlayerId, UnitId};

/// True when the modifier has no owner or is owned by `player`
fn applies_to(modifier: &Modifier, player: PlayerId) -> bool {
    modifier.owner.map_or(true, |owner| owner == player)
}

/// True when a unit-attached modifier targets `unit`, or the modifier is not unit-attached
fn anchored_to(modifier: &Modifier, unit: UnitId) -> bool {
    match modifier.attachment {
        Some(Attachment::Unit(anchor)) => anchor == unit,
        _ => true,
    }
}

fn install(state: GameState, build: impl FnOnce(ModifierId) -> Modifier) -> GameState {
    let mut state = state;
    let id = state.allocate_modifier_id();
    install_modifier(state, build(id))
}

// ==========================================
// BOUNTIES
// ==========================================

/// Mark an enemy champion; the owner collects `bonus_gold` whoever kills it.
///
/// The mark carries no hooks. The reward resolver pays and removes it.
/// Marking anything but a live champion does nothing.
pub fn mark_for_bounty(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    target: UnitId,
    bonus_gold: u32,
) -> GameState {
    if !state.unit(target).map_or(false, |u| u.is_champion()) {
        return state;
    }
    install(state, |id| {
        Modifier::new(id, source, NoHooks)
            .owned_by(owner)
            .with_data(ModifierData::MarkedForBounty {
                unit: target,
                bonus_gold,
            })
    })
}

/// Extra gold for every champion kill made by the owner
pub struct KillBonusGold {
    pub amount: u32,
}

impl ModifierHooks for KillBonusGold {
    fn champion_kill_bonus_gold(
        &self,
        cx: &HookContext<'_, ChampionKillContext>,
        current: u32,
    ) -> Option<u32> {
        if !applies_to(cx.modifier, cx.killer) {
            return None;
        }
        Some(current.saturating_add(self.amount))
    }
}

pub fn kill_bonus_gold(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    amount: u32,
) -> GameState {
    install(state, |id| {
        Modifier::new(id, source, KillBonusGold { amount }).owned_by(owner)
    })
}

/// Gold the owner takes from the victim on every champion kill
pub struct KillStealGold {
    pub amount: u32,
}

impl ModifierHooks for KillStealGold {
    fn champion_kill_steal_gold(
        &self,
        cx: &HookContext<'_, ChampionKillContext>,
        current: u32,
    ) -> Option<u32> {
        if !applies_to(cx.modifier, cx.killer) {
            return None;
        }
        Some(current.saturating_add(self.amount))
    }
}

pub fn kill_steal_gold(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    amount: u32,
) -> GameState {
    install(state, |id| {
        Modifier::new(id, source, KillStealGold { amount }).owned_by(owner)
    })
}

/// Shields the owner's purse: steals against the owner shrink by `amount`.
///
/// Read from the payload by the reward resolver after the steal fold.
pub fn gold_armor(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    amount: u32,
) -> GameState {
    install(state, |id| {
        Modifier::new(id, source, NoHooks)
            .owned_by(owner)
            .with_data(ModifierData::GoldArmor { amount })
    })
}

/// Kill bonus that grows by one each time the owner wins a battle
pub struct WarChest;

impl ModifierHooks for WarChest {
    fn champion_kill_bonus_gold(
        &self,
        cx: &HookContext<'_, ChampionKillContext>,
        current: u32,
    ) -> Option<u32> {
        if !applies_to(cx.modifier, cx.killer) {
            return None;
        }
        match cx.modifier.data {
            ModifierData::Counter { value } => Some(current.saturating_add(value.max(0) as u32)),
            _ => None,
        }
    }

    fn after_battle(&self, cx: &HookContext<'_, BattleEndContext>) -> Option<GameState> {
        let owner = cx.modifier.owner?;
        if cx.winner != Some(owner) {
            return None;
        }
        let mut next = cx.state.clone();
        let modifier = next.modifiers.iter_mut().find(|m| m.id == cx.modifier.id)?;
        if let ModifierData::Counter { value } = &mut modifier.data {
            *value += 1;
        }
        Some(next)
    }
}

pub fn war_chest(state: GameState, source: ModifierSource, owner: PlayerId) -> GameState {
    install(state, |id| {
        Modifier::new(id, source, WarChest)
            .owned_by(owner)
            .with_data(ModifierData::Counter { value: 0 })
    })
}

// ==========================================
// COMBAT
// ==========================================

/// Raise the owner's force hit threshold to at least `faces`
pub struct ForceHitFloor {
    pub faces: u8,
}

impl ModifierHooks for ForceHitFloor {
    fn force_hit_faces(&self, cx: &HookContext<'_, UnitCombatContext>, current: u8) -> Option<u8> {
        if !applies_to(cx.modifier, cx.unit.owner) {
            return None;
        }
        Some(current.max(self.faces))
    }
}

/// Force hit floor for the owner, optionally limited to one cell
pub fn force_hit_floor(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    hex: Option<HexKey>,
    faces: u8,
    duration: Duration,
) -> GameState {
    install(state, |id| {
        let modifier = Modifier::new(id, source, ForceHitFloor { faces })
            .owned_by(owner)
            .lasting(duration);
        match hex {
            Some(hex) => modifier.attached_to(Attachment::Hex(hex)),
            None => modifier,
        }
    })
}

/// Force hit floor that spends one use per battle the owner fights in
pub struct Ambush {
    pub faces: u8,
}

impl ModifierHooks for Ambush {
    fn force_hit_faces(&self, cx: &HookContext<'_, UnitCombatContext>, current: u8) -> Option<u8> {
        ForceHitFloor { faces: self.faces }.force_hit_faces(cx, current)
    }

    fn after_battle(&self, cx: &HookContext<'_, BattleEndContext>) -> Option<GameState> {
        let owner = cx.modifier.owner?;
        cx.combat.side_of(owner)?;
        Some(consume_modifier_use(cx.state.clone(), cx.modifier.id))
    }
}

pub fn ambush(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    faces: u8,
    battles: u32,
) -> GameState {
    install(state, |id| {
        Modifier::new(id, source, Ambush { faces })
            .owned_by(owner)
            .lasting(Duration::Uses(battles))
    })
}

/// Extra attack dice for a champion
pub struct ChampionDiceBonus {
    pub extra: u32,
}

impl ModifierHooks for ChampionDiceBonus {
    fn champion_attack_dice(
        &self,
        cx: &HookContext<'_, UnitCombatContext>,
        current: u32,
    ) -> Option<u32> {
        if !cx.unit.is_champion()
            || !applies_to(cx.modifier, cx.unit.owner)
            || !anchored_to(cx.modifier, cx.unit_id)
        {
            return None;
        }
        Some(current.saturating_add(self.extra))
    }
}

/// Dice bonus anchored to one champion; it disappears with the champion
pub fn champion_dice_bonus(
    state: GameState,
    source: ModifierSource,
    champion: UnitId,
    extra: u32,
    duration: Duration,
) -> GameState {
    let owner = state.unit(champion).map(|u| u.owner);
    install(state, |id| {
        let modifier = Modifier::new(id, source, ChampionDiceBonus { extra })
            .attached_to(Attachment::Unit(champion))
            .lasting(duration);
        match owner {
            Some(owner) => modifier.owned_by(owner),
            None => modifier,
        }
    })
}

/// Override how hits on the owner's units are assigned
pub struct HitPolicyOverride {
    pub policy: HitAssignmentPolicy,
}

impl ModifierHooks for HitPolicyOverride {
    fn hit_assignment_policy(
        &self,
        cx: &HookContext<'_, HitAssignmentContext>,
        current: HitAssignmentPolicy,
    ) -> Option<HitAssignmentPolicy> {
        if !applies_to(cx.modifier, cx.target_player) {
            return None;
        }
        Some(current.stronger(self.policy))
    }
}

pub fn hit_policy_override(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    hex: Option<HexKey>,
    policy: HitAssignmentPolicy,
    duration: Duration,
) -> GameState {
    install(state, |id| {
        let modifier = Modifier::new(id, source, HitPolicyOverride { policy })
            .owned_by(owner)
            .lasting(duration);
        match hex {
            Some(hex) => modifier.attached_to(Attachment::Hex(hex)),
            None => modifier,
        }
    })
}

/// Heals tracked champions by one hp at the start of every combat round
pub struct FieldMedic;

impl ModifierHooks for FieldMedic {
    fn before_combat_round(&self, cx: &HookContext<'_, RoundContext>) -> Option<GameState> {
        let tracked = match &cx.modifier.data {
            ModifierData::TrackedUnits { units } => units,
            _ => return None,
        };
        let fighting: Vec<UnitId> = cx
            .attacker_units
            .iter()
            .chain(cx.defender_units.iter())
            .copied()
            .filter(|id| tracked.contains(id))
            .collect();
        if fighting.is_empty() {
            return None;
        }
        let mut next = cx.state.clone();
        for id in fighting {
            if let Some(stats) = next.units.get_mut(&id).and_then(|u| u.champion_mut()) {
                stats.hp = (stats.hp + 1).min(stats.max_hp);
            }
        }
        Some(next)
    }
}

pub fn field_medic(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    champions: Vec<UnitId>,
    duration: Duration,
) -> GameState {
    install(state, |id| {
        Modifier::new(id, source, FieldMedic)
            .owned_by(owner)
            .lasting(duration)
            .with_data(ModifierData::TrackedUnits { units: champions })
    })
}

// ==========================================
// MOVEMENT
// ==========================================

/// Makes the two linked cells adjacent
pub struct LinkedHexes;

impl ModifierHooks for LinkedHexes {
    fn adjacency(&self, cx: &HookContext<'_, AdjacencyContext>, current: bool) -> Option<bool> {
        let (a, b) = match cx.modifier.data {
            ModifierData::LinkedHexes { a, b } => (a, b),
            _ => return None,
        };
        if let Some(player) = cx.player {
            if !applies_to(cx.modifier, player) {
                return None;
            }
        }
        let linked = (cx.from == a && cx.to == b) || (cx.from == b && cx.to == a);
        Some(current || linked)
    }
}

pub fn linked_hexes(
    state: GameState,
    source: ModifierSource,
    owner: Option<PlayerId>,
    a: HexKey,
    b: HexKey,
    duration: Duration,
) -> GameState {
    install(state, |id| {
        let modifier = Modifier::new(id, source, LinkedHexes)
            .lasting(duration)
            .with_data(ModifierData::LinkedHexes { a, b });
        match owner {
            Some(owner) => modifier.owned_by(owner),
            None => modifier,
        }
    })
}

/// Lets the owner cross an edge without a bridge
pub struct BridgeWaiver;

impl ModifierHooks for BridgeWaiver {
    fn requires_bridge(&self, cx: &HookContext<'_, EdgeContext>, _current: bool) -> Option<bool> {
        let player = cx.player?;
        if !applies_to(cx.modifier, player) {
            return None;
        }
        Some(false)
    }
}

pub fn bridge_waiver(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    edge: EdgeKey,
    duration: Duration,
) -> GameState {
    install(state, |id| {
        Modifier::new(id, source, BridgeWaiver)
            .owned_by(owner)
            .attached_to(Attachment::Edge(edge))
            .lasting(duration)
    })
}

/// Extra movement range for the owner's units (or the anchored unit)
pub struct MoveBoost {
    pub extra: u32,
}

impl ModifierHooks for MoveBoost {
    fn max_move_distance(&self, cx: &HookContext<'_, MoveContext>, current: u32) -> Option<u32> {
        if !applies_to(cx.modifier, cx.unit.owner) || !anchored_to(cx.modifier, cx.unit.id) {
            return None;
        }
        Some(current.saturating_add(self.extra))
    }
}

pub fn move_boost(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    unit: Option<UnitId>,
    extra: u32,
    duration: Duration,
) -> GameState {
    install(state, |id| {
        let modifier = Modifier::new(id, source, MoveBoost { extra })
            .owned_by(owner)
            .lasting(duration);
        match unit {
            Some(unit) => modifier.attached_to(Attachment::Unit(unit)),
            None => modifier,
        }
    })
}

// ==========================================
// ECONOMY
// ==========================================

/// Additive boost to one player-scoped count
pub struct PlayerBoost {
    pub target: BoostTarget,
    pub extra: u32,
}

/// Which player-scoped value a `PlayerBoost` raises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostTarget {
    DeployCount,
    CardChoices,
    MineGold,
    ControlValue,
}

impl PlayerBoost {
    fn boost(
        &self,
        modifier: &Modifier,
        player: PlayerId,
        target: BoostTarget,
        current: u32,
    ) -> Option<u32> {
        if self.target != target || !applies_to(modifier, player) {
            return None;
        }
        Some(current.saturating_add(self.extra))
    }
}

impl ModifierHooks for PlayerBoost {
    fn deploy_count(&self, cx: &HookContext<'_, PlayerContext>, current: u32) -> Option<u32> {
        self.boost(cx.modifier, cx.player, BoostTarget::DeployCount, current)
    }

    fn card_choice_count(&self, cx: &HookContext<'_, PlayerContext>, current: u32) -> Option<u32> {
        self.boost(cx.modifier, cx.player, BoostTarget::CardChoices, current)
    }

    fn mine_gold(&self, cx: &HookContext<'_, HexPlayerContext>, current: u32) -> Option<u32> {
        self.boost(cx.modifier, cx.player, BoostTarget::MineGold, current)
    }

    fn control_value(&self, cx: &HookContext<'_, HexPlayerContext>, current: u32) -> Option<u32> {
        self.boost(cx.modifier, cx.player, BoostTarget::ControlValue, current)
    }
}

fn player_boost(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    boost: PlayerBoost,
    hex: Option<HexKey>,
    duration: Duration,
) -> GameState {
    install(state, |id| {
        let modifier = Modifier::new(id, source, boost)
            .owned_by(owner)
            .lasting(duration);
        match hex {
            Some(hex) => modifier.attached_to(Attachment::Hex(hex)),
            None => modifier,
        }
    })
}

/// Extra deployments per round for the owner
pub fn deploy_boost(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    extra: u32,
    duration: Duration,
) -> GameState {
    let boost = PlayerBoost {
        target: BoostTarget::DeployCount,
        extra,
    };
    player_boost(state, source, owner, boost, None, duration)
}

/// Extra cards offered to the owner on each draw
pub fn card_choice_boost(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    extra: u32,
    duration: Duration,
) -> GameState {
    let boost = PlayerBoost {
        target: BoostTarget::CardChoices,
        extra,
    };
    player_boost(state, source, owner, boost, None, duration)
}

/// Extra mine income for the owner, on one cell or everywhere
pub fn mine_gold_bonus(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    hex: Option<HexKey>,
    extra: u32,
    duration: Duration,
) -> GameState {
    let boost = PlayerBoost {
        target: BoostTarget::MineGold,
        extra,
    };
    player_boost(state, source, owner, boost, hex, duration)
}

/// Extra control weight for the owner, on one cell or everywhere
pub fn control_bonus(
    state: GameState,
    source: ModifierSource,
    owner: PlayerId,
    hex: Option<HexKey>,
    extra: u32,
    duration: Duration,
) -> GameState {
    let boost = PlayerBoost {
        target: BoostTarget::ControlValue,
        extra,
    };
    player_boost(state, source, owner, boost, hex, duration)
}
