//! Per-turn observation delivered by the protocol layer
//!
//! The snapshot is already decoded: the game server's text stream is turned
//! into these types before the engine ever sees it.

use serde::{Deserialize, Serialize};

use crate::core::types::{Coord, Item, Turn, UnitId};

/// One visible cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellObservation {
    pub at: Coord,
    /// Ore count, `None` when the cell is not under radar this turn
    #[serde(default)]
    pub ore: Option<u32>,
    #[serde(default)]
    pub hole: bool,
}

impl CellObservation {
    pub fn new(at: Coord, ore: Option<u32>, hole: bool) -> Self {
        Self { at, ore, hole }
    }
}

/// One unit as reported this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitObservation {
    pub id: UnitId,
    /// `None` once the unit is destroyed (reported off-grid)
    pub position: Option<Coord>,
    #[serde(default)]
    pub item: Option<Item>,
}

impl UnitObservation {
    pub fn new(id: UnitId, position: Option<Coord>, item: Option<Item>) -> Self {
        Self { id, position, item }
    }

    pub fn alive(id: UnitId, position: Coord) -> Self {
        Self::new(id, Some(position), None)
    }

    pub fn dead(id: UnitId) -> Self {
        Self::new(id, None, None)
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.position.is_some()
    }
}

/// Everything the agent learns at the start of a turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub turn: Turn,
    #[serde(default)]
    pub my_score: u32,
    #[serde(default)]
    pub opponent_score: u32,
    #[serde(default)]
    pub cells: Vec<CellObservation>,
    #[serde(default)]
    pub units: Vec<UnitObservation>,
    /// Opposing units; accepted but not used for decisions
    #[serde(default)]
    pub opponents: Vec<UnitObservation>,
    /// Positions of our buried radars
    #[serde(default)]
    pub radars: Vec<Coord>,
    #[serde(default)]
    pub radar_cooldown: u32,
    #[serde(default)]
    pub trap_cooldown: u32,
}

impl TurnSnapshot {
    pub fn new(turn: Turn) -> Self {
        Self {
            turn,
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, unit: UnitObservation) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_cell(mut self, at: Coord, ore: Option<u32>, hole: bool) -> Self {
        self.cells.push(CellObservation::new(at, ore, hole));
        self
    }

    pub fn with_radar(mut self, at: Coord) -> Self {
        self.radars.push(at);
        self
    }

    /// Live controlled units in ascending id order
    pub fn live_units(&self) -> Vec<UnitObservation> {
        let mut live: Vec<_> = self.units.iter().copied().filter(|u| u.is_alive()).collect();
        live.sort_by_key(|u| u.id);
        live
    }
}
