//! Context records handed to modifier hooks
//!
//! Each record is a plain value. The more specific contexts embed the base
//! `CombatContext` rather than repeating its fields.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::types::{EdgeKey, HexKey, PlayerId, Unit, UnitId};

/// One of the two fixed participant slots of a battle
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Attacker,
    Defender,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Attacker => Side::Defender,
            Side::Defender => Side::Attacker,
        }
    }
}

/// Why a battle stopped
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
#[serde(rename_all = "camelCase")]
pub enum EndReason {
    /// One side (or both) has no occupants left
    Eliminated,
    /// Neither side has a unit able to deal damage
    NoHitsPossible,
    /// Too many consecutive rounds without a single hit
    Stale,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Eliminated => "eliminated",
            EndReason::NoHitsPossible => "noHitsPossible",
            EndReason::Stale => "stale",
        }
    }
}

/// How incoming hits are spread over the target side
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum HitAssignmentPolicy {
    /// Each hit picks a target uniformly at random, with replacement
    #[default]
    Random,
    /// Forces soak hits before champions
    ForcesFirst,
    /// Champions soak hits before forces
    ChampionsFirst,
    /// Random, but the first hit on a champion is redirected to a friendly force
    Bodyguard,
}

impl HitAssignmentPolicy {
    /// Rank used by hooks that only replace the current policy with a stronger one
    pub fn strength(self) -> u8 {
        match self {
            HitAssignmentPolicy::Random => 0,
            HitAssignmentPolicy::ChampionsFirst => 1,
            HitAssignmentPolicy::ForcesFirst => 2,
            HitAssignmentPolicy::Bodyguard => 3,
        }
    }

    pub fn stronger(self, other: HitAssignmentPolicy) -> HitAssignmentPolicy {
        if other.strength() > self.strength() {
            other
        } else {
            self
        }
    }
}

/// Base context of every combat hook
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct CombatContext {
    pub hex: HexKey,
    pub attacker: PlayerId,
    pub defender: PlayerId,
    pub round: u32,
}

impl CombatContext {
    pub fn player(&self, side: Side) -> PlayerId {
        match side {
            Side::Attacker => self.attacker,
            Side::Defender => self.defender,
        }
    }

    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if player == self.attacker {
            Some(Side::Attacker)
        } else if player == self.defender {
            Some(Side::Defender)
        } else {
            None
        }
    }
}

/// Context for per-unit combat queries (hit faces, dice)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitCombatContext {
    pub combat: CombatContext,
    pub side: Side,
    pub unit_id: UnitId,
    pub unit: Unit,
}

/// Context for the hit-assignment policy query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitAssignmentContext {
    pub combat: CombatContext,
    pub target_side: Side,
    pub target_player: PlayerId,
    pub candidates: Vec<UnitId>,
    pub pending_hits: u32,
}

/// Context for round-start event hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundContext {
    pub combat: CombatContext,
    pub attacker_units: Vec<UnitId>,
    pub defender_units: Vec<UnitId>,
}

/// Context for battle-end event hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleEndContext {
    pub combat: CombatContext,
    pub attacker_units: Vec<UnitId>,
    pub defender_units: Vec<UnitId>,
    pub reason: EndReason,
    pub winner: Option<PlayerId>,
}

/// Where a champion kill came from
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
#[serde(rename_all = "camelCase")]
pub enum KillSource {
    Battle,
    Effect,
}

/// Context for champion kill rewards
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChampionKillContext {
    pub killer: PlayerId,
    pub victim: PlayerId,
    /// Snapshots of the champions as they were when killed
    pub killed: Vec<Unit>,
    /// Sum of the killed champions' bounties
    pub bounty: u32,
    pub hex: Option<HexKey>,
    pub source: KillSource,
}

impl ChampionKillContext {
    pub fn new(
        killer: PlayerId,
        victim: PlayerId,
        killed: Vec<Unit>,
        hex: Option<HexKey>,
        source: KillSource,
    ) -> Self {
        let bounty = killed
            .iter()
            .map(Unit::bounty)
            .fold(0u32, u32::saturating_add);
        Self {
            killer,
            victim,
            killed,
            bounty,
            hex,
            source,
        }
    }

    pub fn killed_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.killed.iter().map(|u| u.id)
    }
}

/// Context for card-draw event hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDrawContext {
    pub player: PlayerId,
    pub cards_drawn: u32,
}

/// Context for round-end event hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundEndContext {
    pub round: u32,
}

/// Context for adjacency queries between two cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyContext {
    pub from: HexKey,
    pub to: HexKey,
    pub player: Option<PlayerId>,
}

/// Context for bridge-requirement queries on a board edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeContext {
    pub edge: EdgeKey,
    pub player: Option<PlayerId>,
}

/// Context for movement-range queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveContext {
    pub unit: Unit,
}

/// Context for player-scoped queries (deployments, card choices)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerContext {
    pub player: PlayerId,
}

/// Context for queries about a player's relation to a cell (mines, control)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexPlayerContext {
    pub player: PlayerId,
    pub hex: HexKey,
}
