use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

use parity_scale_codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Player identifier
pub type PlayerId = u32;

/// Process-unique identifier for a unit instance
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct UnitId(pub u32);

/// Unique identifier for a registered modifier
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ModifierId(pub u32);

/// Axial coordinate of a board cell.
///
/// Ordering is structural (`q`, then `r`); every batch operation that walks
/// cells uses this order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
pub struct HexKey {
    pub q: i32,
    pub r: i32,
}

impl HexKey {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Geometric adjacency on the axial grid
    pub fn is_neighbor(&self, other: &HexKey) -> bool {
        let dq = other.q - self.q;
        let dr = other.r - self.r;
        matches!(
            (dq, dr),
            (1, 0) | (-1, 0) | (0, 1) | (0, -1) | (1, -1) | (-1, 1)
        )
    }
}

impl fmt::Display for HexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.q, self.r)
    }
}

/// Key of the edge between two cells, stored with the lower cell first
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    MaxEncodedLen,
    TypeInfo,
    Serialize,
    Deserialize,
)]
pub struct EdgeKey {
    pub a: HexKey,
    pub b: HexKey,
}

impl EdgeKey {
    pub fn new(x: HexKey, y: HexKey) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }
}

/// Combat and bounty stats of a champion
#[derive(
    Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct ChampionStats {
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub attack_dice: u32,
    pub hit_faces: u8,
    pub bounty: u32,
    /// Per-round ability use counters, keyed by ability name
    #[serde(default)]
    pub ability_uses: BTreeMap<String, u32>,
}

impl ChampionStats {
    pub fn new(name: &str, hp: i32, attack_dice: u32, hit_faces: u8, bounty: u32) -> Self {
        debug_assert!(hp >= 0, "champion hp must not be negative");
        Self {
            name: name.into(),
            hp,
            max_hp: hp,
            attack_dice,
            hit_faces,
            bounty,
            ability_uses: BTreeMap::new(),
        }
    }

    /// Whether the base stats allow this champion to score a hit at all
    pub fn can_deal_damage(&self) -> bool {
        self.attack_dice > 0 && self.hit_faces > 0
    }

    pub fn uses_of(&self, ability: &str) -> u32 {
        self.ability_uses.get(ability).copied().unwrap_or(0)
    }
}

/// Unit kind and its kind-specific state
#[derive(
    Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum UnitState {
    /// A simple combat unit with a fixed hit chance
    Force,
    /// A named combat unit with persistent stats
    Champion(ChampionStats),
}

/// A unit instance on the board
#[derive(
    Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: UnitId,
    pub owner: PlayerId,
    pub hex: HexKey,
    pub state: UnitState,
}

impl Unit {
    pub fn is_force(&self) -> bool {
        matches!(self.state, UnitState::Force)
    }

    pub fn is_champion(&self) -> bool {
        matches!(self.state, UnitState::Champion(_))
    }

    pub fn champion(&self) -> Option<&ChampionStats> {
        match &self.state {
            UnitState::Champion(stats) => Some(stats),
            UnitState::Force => None,
        }
    }

    pub fn champion_mut(&mut self) -> Option<&mut ChampionStats> {
        match &mut self.state {
            UnitState::Champion(stats) => Some(stats),
            UnitState::Force => None,
        }
    }

    /// A force can always hit; a champion only if its base dice and faces allow it
    pub fn can_deal_damage(&self) -> bool {
        match &self.state {
            UnitState::Force => true,
            UnitState::Champion(stats) => stats.can_deal_damage(),
        }
    }

    pub fn bounty(&self) -> u32 {
        self.champion().map(|c| c.bounty).unwrap_or(0)
    }
}
