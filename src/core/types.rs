//! Core type definitions used throughout the codebase

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a controlled (or opposing) unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U{}", self.0)
    }
}

/// Turn counter (game time unit)
pub type Turn = u32;

/// Cell coordinates on the game grid
///
/// Ordered by row first, then column, so sorted containers of cells yield
/// the lowest `(y, x)` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Grid-step (Manhattan) distance
    pub fn distance(&self, other: &Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl Ord for Coord {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Coord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Items a unit can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    Radar,
    Trap,
    Ore,
}

impl Item {
    pub const fn label(self) -> &'static str {
        match self {
            Item::Radar => "RADAR",
            Item::Trap => "TRAP",
            Item::Ore => "ORE",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The agent's headquarters
///
/// The whole column at `anchor.x` counts as base for requests and deliveries;
/// the anchor cell itself is what "nearest to base" is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    pub anchor: Coord,
}

impl Base {
    pub const fn new(anchor: Coord) -> Self {
        Self { anchor }
    }

    pub fn column(&self) -> i32 {
        self.anchor.x
    }

    /// Is this position on the base column?
    pub fn contains(&self, pos: Coord) -> bool {
        pos.x == self.anchor.x
    }

    /// Closest base cell to a position (same row, base column)
    pub fn dock_for(&self, pos: Coord) -> Coord {
        Coord::new(self.anchor.x, pos.y)
    }

    pub fn distance(&self, pos: Coord) -> u32 {
        self.anchor.distance(&pos)
    }
}

impl Default for Base {
    fn default() -> Self {
        Self::new(Coord::new(0, 7))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_manhattan_distance() {
        assert_eq!(Coord::new(0, 0).distance(&Coord::new(3, 4)), 7);
        assert_eq!(Coord::new(5, 5).distance(&Coord::new(5, 5)), 0);
        assert_eq!(Coord::new(-1, 2).distance(&Coord::new(1, 0)), 4);
    }

    #[test]
    fn test_coord_orders_by_row_then_column() {
        let cells: BTreeSet<Coord> = [Coord::new(1, 2), Coord::new(9, 1), Coord::new(0, 2)]
            .into_iter()
            .collect();
        let ordered: Vec<_> = cells.into_iter().collect();
        assert_eq!(ordered, vec![Coord::new(9, 1), Coord::new(0, 2), Coord::new(1, 2)]);
    }

    #[test]
    fn test_base_column() {
        let base = Base::default();
        assert!(base.contains(Coord::new(0, 3)));
        assert!(!base.contains(Coord::new(1, 7)));
        assert_eq!(base.dock_for(Coord::new(12, 4)), Coord::new(0, 4));
        assert_eq!(base.distance(Coord::new(2, 9)), 4);
    }
}
