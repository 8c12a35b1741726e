//! Actions emitted for controlled units

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::types::{Coord, Item, Turn, UnitId};
use crate::units::roles::{Activity, Role};

/// One unit's order for a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Move toward a cell (the game engine computes the actual step)
    Move(Coord),
    /// Dig at the current or an adjacent cell; buries a held radar
    Dig(Coord),
    /// Ask headquarters for equipment
    Request(Item),
    Wait,
}

impl Action {
    pub fn target(&self) -> Option<Coord> {
        match *self {
            Action::Move(at) | Action::Dig(at) => Some(at),
            Action::Request(_) | Action::Wait => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Action::Move(at) => write!(f, "MOVE {} {}", at.x, at.y),
            Action::Dig(at) => write!(f, "DIG {} {}", at.x, at.y),
            Action::Request(item) => write!(f, "REQUEST {}", item),
            Action::Wait => f.write_str("WAIT"),
        }
    }
}

/// Decision for one unit together with the state it was taken in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAction {
    pub unit: UnitId,
    pub action: Action,
    pub role: Role,
    pub activity: Activity,
}

/// All decisions for a turn, ascending unit id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPlan {
    pub turn: Turn,
    pub actions: Vec<UnitAction>,
    pub carrier: Option<UnitId>,
}

impl TurnPlan {
    pub fn action_for(&self, unit: UnitId) -> Option<Action> {
        self.actions.iter().find(|a| a.unit == unit).map(|a| a.action)
    }

    pub fn get(&self, unit: UnitId) -> Option<&UnitAction> {
        self.actions.iter().find(|a| a.unit == unit)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
