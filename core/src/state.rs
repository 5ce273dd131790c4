use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use parity_scale_codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};
use crate::events::{EventLog, LogEvent};
use crate::modifiers::{Attachment, Modifier};
use crate::rng::RngState;
use crate::types::*;

/// A seated player
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    /// Seat index; sieges against lower seats resolve first
    pub seat: u32,
    pub gold: u32,
}

/// Units of one player on a cell
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantGroup {
    pub player: PlayerId,
    pub units: Vec<UnitId>,
}

/// A board cell
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub key: HexKey,
    /// Set when the cell is this player's capital
    pub capital_of: Option<PlayerId>,
    /// Occupants grouped per player, in order of first arrival
    pub occupants: Vec<OccupantGroup>,
}

impl Cell {
    pub fn new(key: HexKey) -> Self {
        Self {
            key,
            capital_of: None,
            occupants: Vec::new(),
        }
    }

    pub fn capital(key: HexKey, owner: PlayerId) -> Self {
        Self {
            key,
            capital_of: Some(owner),
            occupants: Vec::new(),
        }
    }

    pub fn is_capital(&self) -> bool {
        self.capital_of.is_some()
    }

    /// Distinct players with at least one unit here, in arrival order
    pub fn players(&self) -> Vec<PlayerId> {
        self.occupants
            .iter()
            .filter(|g| !g.units.is_empty())
            .map(|g| g.player)
            .collect()
    }

    pub fn units_of(&self, player: PlayerId) -> Vec<UnitId> {
        self.occupants
            .iter()
            .find(|g| g.player == player)
            .map(|g| g.units.clone())
            .unwrap_or_default()
    }

    pub fn unit_count(&self) -> usize {
        self.occupants.iter().map(|g| g.units.len()).sum()
    }

    fn add_occupant(&mut self, player: PlayerId, unit: UnitId) {
        match self.occupants.iter_mut().find(|g| g.player == player) {
            Some(group) => group.units.push(unit),
            None => self.occupants.push(OccupantGroup {
                player,
                units: alloc::vec![unit],
            }),
        }
    }

    fn remove_occupant(&mut self, unit: UnitId) {
        for group in self.occupants.iter_mut() {
            group.units.retain(|u| *u != unit);
        }
        self.occupants.retain(|g| !g.units.is_empty());
    }
}

/// The complete rules state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Current round number (1-indexed)
    pub round: u32,
    pub players: Vec<Player>,
    pub cells: BTreeMap<HexKey, Cell>,
    pub units: BTreeMap<UnitId, Unit>,
    /// Active modifiers in registration order
    pub modifiers: Vec<Modifier>,
    pub rng: RngState,
    pub log: EventLog,
    next_unit_id: u32,
    next_modifier_id: u32,
}

impl GameState {
    pub fn new(seed: u64) -> Self {
        Self {
            round: 1,
            players: Vec::new(),
            cells: BTreeMap::new(),
            units: BTreeMap::new(),
            modifiers: Vec::new(),
            rng: RngState::seed_from_u64(seed),
            log: EventLog::new(),
            next_unit_id: 1,
            next_modifier_id: 1,
        }
    }

    // ==========================================
    // SETUP
    // ==========================================

    /// Seat a player with a starting purse
    pub fn add_player(&mut self, id: PlayerId, seat: u32, gold: u32) -> GameResult<()> {
        if self.player(id).is_some() {
            return Err(GameError::DuplicatePlayer { player: id });
        }
        self.players.push(Player { id, seat, gold });
        Ok(())
    }

    /// Insert or replace a cell
    pub fn insert_cell(&mut self, cell: Cell) {
        self.cells.insert(cell.key, cell);
    }

    /// Place a new unit on a cell and return its id
    pub fn deploy_unit(
        &mut self,
        owner: PlayerId,
        hex: HexKey,
        state: UnitState,
    ) -> GameResult<UnitId> {
        if self.player(owner).is_none() {
            return Err(GameError::UnknownPlayer { player: owner });
        }
        if !self.cells.contains_key(&hex) {
            return Err(GameError::UnknownHex { hex });
        }
        if let UnitState::Champion(stats) = &state {
            if stats.hp <= 0 || stats.hp > stats.max_hp {
                return Err(GameError::InvalidChampionStats);
            }
        }

        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(
            id,
            Unit {
                id,
                owner,
                hex,
                state,
            },
        );
        if let Some(cell) = self.cells.get_mut(&hex) {
            cell.add_occupant(owner, id);
        }
        Ok(id)
    }

    /// Reserve the next modifier id
    pub fn allocate_modifier_id(&mut self) -> ModifierId {
        let id = ModifierId(self.next_modifier_id);
        self.next_modifier_id += 1;
        id
    }

    // ==========================================
    // LOOKUPS
    // ==========================================

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn gold_of(&self, id: PlayerId) -> u32 {
        self.player(id).map(|p| p.gold).unwrap_or(0)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn cell(&self, key: HexKey) -> Option<&Cell> {
        self.cells.get(&key)
    }

    pub fn modifier(&self, id: ModifierId) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.id == id)
    }

    /// Cells currently held by exactly two players, in key order
    pub fn contested_cells(&self) -> Vec<HexKey> {
        self.cells
            .values()
            .filter(|c| c.players().len() == 2)
            .map(|c| c.key)
            .collect()
    }

    // ==========================================
    // MUTATION HELPERS
    // ==========================================

    pub fn credit_gold(&mut self, id: PlayerId, amount: u32) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
            player.gold = player.gold.saturating_add(amount);
        }
    }

    /// Take up to `amount` gold from a player; returns what was actually taken
    pub fn debit_gold(&mut self, id: PlayerId, amount: u32) -> u32 {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                let taken = amount.min(player.gold);
                player.gold -= taken;
                taken
            }
            None => 0,
        }
    }

    /// Remove a unit from the unit table, its cell, and every modifier anchored to it
    pub fn remove_unit(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        if let Some(cell) = self.cells.get_mut(&unit.hex) {
            cell.remove_occupant(id);
        }
        self.modifiers
            .retain(|m| m.attachment != Some(Attachment::Unit(id)));
        Some(unit)
    }

    pub fn push_event(&mut self, event: LogEvent) {
        self.log.push(event);
    }

    /// Clear per-round ability counters on every champion
    pub fn reset_ability_uses(&mut self) {
        for unit in self.units.values_mut() {
            if let Some(stats) = unit.champion_mut() {
                stats.ability_uses.clear();
            }
        }
    }

    /// Record one use of a champion ability this round; returns the new count
    pub fn record_ability_use(&mut self, unit: UnitId, ability: &str) -> Option<u32> {
        let stats = self.units.get_mut(&unit)?.champion_mut()?;
        let count = stats.ability_uses.entry(ability.into()).or_insert(0);
        *count += 1;
        Some(*count)
    }

    // ==========================================
    // REPLAY
    // ==========================================

    /// SCALE encoding of everything that defines this state except hook code.
    ///
    /// Two states with equal fingerprints replay identically.
    pub fn fingerprint(&self) -> Vec<u8> {
        let modifiers: Vec<_> = self
            .modifiers
            .iter()
            .map(|m| {
                (
                    m.id,
                    &m.source,
                    m.owner,
                    m.attachment,
                    m.duration,
                    &m.data,
                )
            })
            .collect();
        (
            self.round,
            &self.players,
            &self.cells,
            &self.units,
            modifiers,
            self.rng,
            &self.log,
            (self.next_unit_id, self.next_modifier_id),
        )
            .encode()
    }
}
