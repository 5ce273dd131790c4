//! Game log
//!
//! Structured events appended by the resolvers. The log keeps only the most
//! recent `EVENT_LOG_CAPACITY` entries. Events serialize as
//! `{ "type": "combat.round", "payload": { ... } }`.

use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::context::EndReason;
use crate::limits::EVENT_LOG_CAPACITY;
use crate::types::{HexKey, ModifierId, PlayerId, UnitId};

/// Dice rolled by one unit in one round
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitRoll {
    pub unit_id: UnitId,
    pub dice: Vec<u8>,
    /// Highest face that counted as a hit
    pub hit_faces: u8,
    pub hits: u32,
}

/// Everything one side rolled in a round
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SideRoll {
    pub player_id: PlayerId,
    pub rolls: Vec<UnitRoll>,
    pub hits: u32,
}

/// Occupant counts of one side at the end of a battle
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantSummary {
    pub player_id: PlayerId,
    pub forces: u32,
    pub champions: u32,
    pub total: u32,
}

/// A game-log entry
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum LogEvent {
    #[serde(rename = "combat.start", rename_all = "camelCase")]
    CombatStart {
        hex: HexKey,
        attacker_player_id: PlayerId,
        defender_player_id: PlayerId,
        attacker_units: Vec<UnitId>,
        defender_units: Vec<UnitId>,
        siege: bool,
    },
    #[serde(rename = "combat.round", rename_all = "camelCase")]
    CombatRound {
        hex: HexKey,
        round: u32,
        attacker: SideRoll,
        defender: SideRoll,
        casualties: Vec<UnitId>,
    },
    #[serde(rename = "combat.end", rename_all = "camelCase")]
    CombatEnd {
        hex: HexKey,
        reason: EndReason,
        winner_player_id: Option<PlayerId>,
        rounds: u32,
        attacker: OccupantSummary,
        defender: OccupantSummary,
    },
    #[serde(rename = "reward.bounty", rename_all = "camelCase")]
    RewardBounty {
        killer_player_id: PlayerId,
        victim_player_id: PlayerId,
        bounty: u32,
        bonus: u32,
    },
    #[serde(rename = "reward.steal", rename_all = "camelCase")]
    RewardSteal {
        killer_player_id: PlayerId,
        victim_player_id: PlayerId,
        amount: u32,
    },
    #[serde(rename = "reward.marked", rename_all = "camelCase")]
    RewardMarked {
        modifier_id: ModifierId,
        owner_player_id: PlayerId,
        unit_id: UnitId,
        bonus_gold: u32,
    },
    #[serde(rename = "modifier.expired", rename_all = "camelCase")]
    ModifierExpired { modifier_id: ModifierId },
}

impl LogEvent {
    /// The dotted type name used on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            LogEvent::CombatStart { .. } => "combat.start",
            LogEvent::CombatRound { .. } => "combat.round",
            LogEvent::CombatEnd { .. } => "combat.end",
            LogEvent::RewardBounty { .. } => "reward.bounty",
            LogEvent::RewardSteal { .. } => "reward.steal",
            LogEvent::RewardMarked { .. } => "reward.marked",
            LogEvent::ModifierExpired { .. } => "modifier.expired",
        }
    }
}

/// Capped ring of the most recent log events, oldest first
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventLog {
    entries: Vec<LogEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: LogEvent) {
        if self.entries.len() >= EVENT_LOG_CAPACITY {
            let overflow = self.entries.len() + 1 - EVENT_LOG_CAPACITY;
            self.entries.drain(..overflow);
        }
        self.entries.push(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEvent> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogEvent> {
        self.entries.last()
    }

    /// Events of one dotted type, oldest first
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a LogEvent> + 'a {
        self.entries.iter().filter(move |e| e.kind() == kind)
    }
}
