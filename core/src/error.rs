//! Error types for state construction
//!
//! The rule primitives never fail: invalid input leaves the state unchanged.
//! These errors only cover building states that could never arise from
//! play, such as a duplicate modifier id or a champion without hp.

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::types::{HexKey, ModifierId, PlayerId, UnitId};

/// Errors raised while constructing or extending a game state
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameError {
    /// No player with this id is seated
    UnknownPlayer { player: PlayerId },
    /// A player with this id is already seated
    DuplicatePlayer { player: PlayerId },
    /// The board has no cell at this key
    UnknownHex { hex: HexKey },
    /// The unit does not exist
    UnknownUnit { unit: UnitId },
    /// Champion hp must be positive and not above max hp
    InvalidChampionStats,
    /// A modifier with this id is already active
    DuplicateModifierId { id: ModifierId },
}

/// Result type alias for construction operations
pub type GameResult<T> = Result<T, GameError>;
