//! Ore target scoring
//!
//! Picking an ore cell is a pure function of the candidate cells, the unit's
//! position and how many other units already committed to each cell. Lower
//! scores win; equal scores fall back to the lowest `(y, x)`.

use serde::{Deserialize, Serialize};

use crate::core::types::Coord;

/// Weights for ranking candidate ore cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetWeights {
    /// Cost per grid step between the unit and the cell
    pub distance: u32,
    /// Cost per other unit already heading to the cell
    pub crowding: u32,
}

impl Default for TargetWeights {
    fn default() -> Self {
        Self {
            distance: 1,
            crowding: 0,
        }
    }
}

impl TargetWeights {
    pub fn with_crowding(crowding: u32) -> Self {
        Self {
            crowding,
            ..Self::default()
        }
    }
}

/// Score of one candidate cell (lower is better)
pub fn score_cell(from: Coord, cell: Coord, committed: u32, weights: &TargetWeights) -> u64 {
    from.distance(&cell) as u64 * weights.distance as u64
        + committed as u64 * weights.crowding as u64
}

/// Best candidate by score, ties broken by lowest `(y, x)`
pub fn pick_best<I, F>(from: Coord, candidates: I, committed: F, weights: &TargetWeights) -> Option<Coord>
where
    I: IntoIterator<Item = Coord>,
    F: Fn(Coord) -> u32,
{
    candidates
        .into_iter()
        .min_by_key(|&cell| (score_cell(from, cell, committed(cell), weights), cell))
}
