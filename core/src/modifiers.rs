//! Modifier registry and hook dispatch
//!
//! Rule sources (cards, faction passives, champion abilities) never call each
//! other. Each one installs a [`Modifier`] carrying a [`ModifierHooks`]
//! implementation, and the resolvers fold a candidate value (query hooks) or
//! the whole state (event hooks) through every applicable modifier.
//!
//! # Hook convention
//!
//! Folds run in registration order, so the result only stays independent of
//! that order when every hook is a narrow refinement of `current`: "raise to
//! at least X", "add N", "replace the policy if mine is stronger". A hook that
//! overwrites `current` wholesale makes the outcome depend on install order.
//! The engine does not check this; hook authors must keep to it.

use alloc::collections::BTreeSet;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Deref;

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::context::*;
use crate::error::{GameError, GameResult};
use crate::events::LogEvent;
use crate::state::GameState;
use crate::types::{EdgeKey, HexKey, ModifierId, PlayerId, UnitId};

/// What kind of rule source installed a modifier
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Faction,
    Card,
    Champion,
}

/// Provenance of a modifier, used for removal-by-source
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ModifierSource {
    pub kind: SourceKind,
    pub key: String,
}

impl ModifierSource {
    pub fn faction(key: &str) -> Self {
        Self {
            kind: SourceKind::Faction,
            key: key.into(),
        }
    }

    pub fn card(key: &str) -> Self {
        Self {
            kind: SourceKind::Card,
            key: key.into(),
        }
    }

    pub fn champion(key: &str) -> Self {
        Self {
            kind: SourceKind::Champion,
            key: key.into(),
        }
    }
}

/// Location or unit a modifier is scoped to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(tag = "type", content = "key", rename_all = "camelCase")]
pub enum Attachment {
    Unit(UnitId),
    Hex(HexKey),
    /// Edge-scoped modifiers govern movement and bridges, never combat
    Edge(EdgeKey),
}

/// When a modifier stops applying
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(tag = "type", content = "remaining", rename_all = "camelCase")]
pub enum Duration {
    Permanent,
    EndOfRound,
    EndOfBattle,
    /// Limited uses remaining; zero means inert
    Uses(u32),
}

/// Modifier-specific data, one arm per modifier family
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModifierData {
    None,
    /// Whoever owns the modifier collects `bonus_gold` when `unit` dies
    MarkedForBounty { unit: UnitId, bonus_gold: u32 },
    TrackedUnits { units: Vec<UnitId> },
    Counter { value: i32 },
    LinkedHexes { a: HexKey, b: HexKey },
    GoldArmor { amount: u32 },
}

impl Default for ModifierData {
    fn default() -> Self {
        ModifierData::None
    }
}

/// What a hook sees: its own modifier, the current state, and the call context
pub struct HookContext<'a, C> {
    pub modifier: &'a Modifier,
    pub state: &'a GameState,
    pub context: &'a C,
}

impl<'a, C> Deref for HookContext<'a, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.context
    }
}

/// Extension points a modifier can contribute to.
///
/// Every method defaults to `None`, meaning "this modifier has no such hook".
/// Query hooks return the refined value; event hooks return the complete next
/// state. See the module docs for the refinement convention.
#[allow(unused_variables)]
pub trait ModifierHooks: Send + Sync {
    // ==========================================
    // QUERY HOOKS
    // ==========================================

    fn force_hit_faces(&self, cx: &HookContext<'_, UnitCombatContext>, current: u8) -> Option<u8> {
        None
    }

    fn champion_attack_dice(
        &self,
        cx: &HookContext<'_, UnitCombatContext>,
        current: u32,
    ) -> Option<u32> {
        None
    }

    fn champion_hit_faces(
        &self,
        cx: &HookContext<'_, UnitCombatContext>,
        current: u8,
    ) -> Option<u8> {
        None
    }

    fn hit_assignment_policy(
        &self,
        cx: &HookContext<'_, HitAssignmentContext>,
        current: HitAssignmentPolicy,
    ) -> Option<HitAssignmentPolicy> {
        None
    }

    fn adjacency(&self, cx: &HookContext<'_, AdjacencyContext>, current: bool) -> Option<bool> {
        None
    }

    fn requires_bridge(&self, cx: &HookContext<'_, EdgeContext>, current: bool) -> Option<bool> {
        None
    }

    fn max_move_distance(&self, cx: &HookContext<'_, MoveContext>, current: u32) -> Option<u32> {
        None
    }

    fn deploy_count(&self, cx: &HookContext<'_, PlayerContext>, current: u32) -> Option<u32> {
        None
    }

    fn mine_gold(&self, cx: &HookContext<'_, HexPlayerContext>, current: u32) -> Option<u32> {
        None
    }

    fn card_choice_count(&self, cx: &HookContext<'_, PlayerContext>, current: u32) -> Option<u32> {
        None
    }

    fn control_value(&self, cx: &HookContext<'_, HexPlayerContext>, current: u32) -> Option<u32> {
        None
    }

    fn champion_kill_bonus_gold(
        &self,
        cx: &HookContext<'_, ChampionKillContext>,
        current: u32,
    ) -> Option<u32> {
        None
    }

    fn champion_kill_steal_gold(
        &self,
        cx: &HookContext<'_, ChampionKillContext>,
        current: u32,
    ) -> Option<u32> {
        None
    }

    // ==========================================
    // EVENT HOOKS
    // ==========================================

    fn before_combat_round(&self, cx: &HookContext<'_, RoundContext>) -> Option<GameState> {
        None
    }

    fn after_battle(&self, cx: &HookContext<'_, BattleEndContext>) -> Option<GameState> {
        None
    }

    fn on_card_draw(&self, cx: &HookContext<'_, CardDrawContext>) -> Option<GameState> {
        None
    }

    fn on_round_end(&self, cx: &HookContext<'_, RoundEndContext>) -> Option<GameState> {
        None
    }
}

/// Hooks of a pure data modifier
pub struct NoHooks;

impl ModifierHooks for NoHooks {}

/// Shared handle to a modifier's hook implementation.
///
/// Hooks are fixed at install time; equality is identity of the implementation.
#[derive(Clone)]
pub struct Hooks(Arc<dyn ModifierHooks>);

impl Hooks {
    pub fn new(hooks: impl ModifierHooks + 'static) -> Self {
        Self(Arc::new(hooks))
    }
}

impl Deref for Hooks {
    type Target = dyn ModifierHooks;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl PartialEq for Hooks {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hooks(..)")
    }
}

/// A registered extension record
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    pub id: ModifierId,
    pub source: ModifierSource,
    pub owner: Option<PlayerId>,
    pub attachment: Option<Attachment>,
    pub duration: Duration,
    pub data: ModifierData,
    pub hooks: Hooks,
}

impl Modifier {
    /// A permanent, global, ownerless modifier with the given hooks
    pub fn new(
        id: ModifierId,
        source: ModifierSource,
        hooks: impl ModifierHooks + 'static,
    ) -> Self {
        Self {
            id,
            source,
            owner: None,
            attachment: None,
            duration: Duration::Permanent,
            data: ModifierData::None,
            hooks: Hooks::new(hooks),
        }
    }

    pub fn owned_by(mut self, player: PlayerId) -> Self {
        self.owner = Some(player);
        self
    }

    pub fn attached_to(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_data(mut self, data: ModifierData) -> Self {
        self.data = data;
        self
    }

    /// A limited-use modifier with no uses left no longer applies
    pub fn is_inert(&self) -> bool {
        matches!(self.duration, Duration::Uses(0))
    }

    pub fn is_global(&self) -> bool {
        self.attachment.is_none()
    }
}

// ==========================================
// DISPATCH
// ==========================================

/// Modifiers eligible to affect combat at a cell, in registration order.
///
/// Global modifiers, modifiers attached to the cell, and modifiers attached
/// to a unit currently standing on it. Edge-attached modifiers never apply.
pub fn combat_modifiers_at(state: &GameState, hex: HexKey) -> Vec<Modifier> {
    state
        .modifiers
        .iter()
        .filter(|m| match m.attachment {
            None => true,
            Some(Attachment::Hex(key)) => key == hex,
            Some(Attachment::Unit(unit)) => state.unit(unit).map(|u| u.hex) == Some(hex),
            Some(Attachment::Edge(_)) => false,
        })
        .cloned()
        .collect()
}

/// Modifiers governing movement across an edge: global plus those attached to it
pub fn modifiers_for_edge(state: &GameState, edge: EdgeKey) -> Vec<Modifier> {
    state
        .modifiers
        .iter()
        .filter(|m| match m.attachment {
            None => true,
            Some(Attachment::Edge(key)) => key == edge,
            _ => false,
        })
        .cloned()
        .collect()
}

/// Modifiers with no location scope
pub fn global_modifiers(state: &GameState) -> Vec<Modifier> {
    state
        .modifiers
        .iter()
        .filter(|m| m.is_global())
        .cloned()
        .collect()
}

/// Fold `base` through the selected query hook of every applicable modifier.
///
/// Modifiers without the hook and inert modifiers are skipped. A modifier id
/// that appears twice in `modifiers` is dispatched once.
pub fn query_fold<C, V, F>(
    state: &GameState,
    modifiers: &[Modifier],
    select: F,
    context: &C,
    base: V,
) -> V
where
    V: Copy,
    F: Fn(&dyn ModifierHooks, &HookContext<'_, C>, V) -> Option<V>,
{
    let mut seen = BTreeSet::new();
    let mut current = base;
    for modifier in modifiers {
        if modifier.is_inert() || !seen.insert(modifier.id) {
            continue;
        }
        let cx = HookContext {
            modifier,
            state,
            context,
        };
        if let Some(next) = select(&*modifier.hooks, &cx, current) {
            current = next;
        }
    }
    current
}

/// Thread the state through the selected event hook of every applicable modifier.
///
/// Each hook sees the state produced by the previous one.
pub fn event_fold<C, F>(
    state: GameState,
    modifiers: &[Modifier],
    select: F,
    context: &C,
) -> GameState
where
    F: Fn(&dyn ModifierHooks, &HookContext<'_, C>) -> Option<GameState>,
{
    let mut seen = BTreeSet::new();
    let mut current = state;
    for modifier in modifiers {
        if modifier.is_inert() || !seen.insert(modifier.id) {
            continue;
        }
        let next = {
            let cx = HookContext {
                modifier,
                state: &current,
                context,
            };
            select(&*modifier.hooks, &cx)
        };
        if let Some(next) = next {
            current = next;
        }
    }
    current
}

// ==========================================
// REGISTRY MAINTENANCE
// ==========================================

/// Append a modifier to the registry.
///
/// A duplicate id among active modifiers is a programmer error.
pub fn install_modifier(mut state: GameState, modifier: Modifier) -> GameState {
    debug_assert!(
        state.modifier(modifier.id).is_none(),
        "duplicate modifier id {:?}",
        modifier.id
    );
    state.modifiers.push(modifier);
    state
}

/// Append a modifier after checking its id and anchor
pub fn try_install_modifier(mut state: GameState, modifier: Modifier) -> GameResult<GameState> {
    if state.modifier(modifier.id).is_some() {
        return Err(GameError::DuplicateModifierId { id: modifier.id });
    }
    match modifier.attachment {
        Some(Attachment::Unit(unit)) if state.unit(unit).is_none() => {
            return Err(GameError::UnknownUnit { unit });
        }
        Some(Attachment::Hex(hex)) if state.cell(hex).is_none() => {
            return Err(GameError::UnknownHex { hex });
        }
        _ => {}
    }
    state.modifiers.push(modifier);
    Ok(state)
}

pub fn remove_modifier(mut state: GameState, id: ModifierId) -> GameState {
    state.modifiers.retain(|m| m.id != id);
    state
}

pub fn remove_modifiers_by_source(mut state: GameState, source: &ModifierSource) -> GameState {
    state.modifiers.retain(|m| m.source != *source);
    state
}

/// Spend one use of a limited-use modifier. Other durations are unaffected.
pub fn consume_modifier_use(mut state: GameState, id: ModifierId) -> GameState {
    if let Some(modifier) = state.modifiers.iter_mut().find(|m| m.id == id) {
        if let Duration::Uses(remaining) = modifier.duration {
            modifier.duration = Duration::Uses(remaining.saturating_sub(1));
        }
    }
    state
}

/// Drop modifiers that can no longer apply: exhausted uses, or a bounty mark
/// on a unit that is gone
pub fn prune_inert(state: GameState) -> GameState {
    let orphaned = orphaned_marks(&state);
    retire(state, |m| m.is_inert() || orphaned.contains(&m.id))
}

/// Bounty marks whose unit no longer exists
fn orphaned_marks(state: &GameState) -> Vec<ModifierId> {
    state
        .modifiers
        .iter()
        .filter(|m| match m.data {
            ModifierData::MarkedForBounty { unit, .. } => state.unit(unit).is_none(),
            _ => false,
        })
        .map(|m| m.id)
        .collect()
}

/// Which timed modifiers a cleanup boundary retires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryScope {
    /// Every end-of-round modifier
    Round,
    /// End-of-battle modifiers scoped to this cell (or to a unit on it)
    Battle(HexKey),
    /// Every end-of-battle modifier, whatever its scope
    AllBattles,
}

/// Retire the timed modifiers of a scope, plus any that [`prune_inert`] would
pub fn expire_modifiers(state: GameState, scope: ExpiryScope) -> GameState {
    let orphaned = orphaned_marks(&state);
    let battle_units: Vec<UnitId> = match scope {
        ExpiryScope::Battle(hex) => state
            .cell(hex)
            .map(|c| c.occupants.iter().flat_map(|g| g.units.clone()).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    retire(state, |m| {
        if m.is_inert() || orphaned.contains(&m.id) {
            return true;
        }
        match (scope, m.duration) {
            (ExpiryScope::Round, Duration::EndOfRound) => true,
            (ExpiryScope::AllBattles, Duration::EndOfBattle) => true,
            (ExpiryScope::Battle(hex), Duration::EndOfBattle) => match m.attachment {
                Some(Attachment::Hex(key)) => key == hex,
                Some(Attachment::Unit(unit)) => battle_units.contains(&unit),
                _ => false,
            },
            _ => false,
        }
    })
}

fn retire(mut state: GameState, mut should_retire: impl FnMut(&Modifier) -> bool) -> GameState {
    let mut kept = Vec::with_capacity(state.modifiers.len());
    let mut expired = Vec::new();
    for modifier in core::mem::take(&mut state.modifiers) {
        if should_retire(&modifier) {
            expired.push(modifier.id);
        } else {
            kept.push(modifier);
        }
    }
    state.modifiers = kept;
    for modifier_id in expired {
        state.push_event(LogEvent::ModifierExpired { modifier_id });
    }
    state
}
