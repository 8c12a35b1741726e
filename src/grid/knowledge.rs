//! Persistent belief about the grid
//!
//! Radars only reveal ore under their coverage and the snapshot only lists
//! what is visible this turn, so the engine keeps its own memory of every
//! cell and merges each observation into it.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::types::Coord;
use crate::dispatch::snapshot::{CellObservation, TurnSnapshot};
use crate::grid::scoring::{pick_best, TargetWeights};

/// What the agent believes about one cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellBelief {
    /// Ore count, `None` until observed at least once
    pub ore: Option<u32>,
    /// Someone dug here (sticky)
    pub has_hole: bool,
    /// Inside the coverage of one of our radars (sticky)
    pub radar_covered: bool,
}

impl CellBelief {
    pub fn has_known_ore(&self) -> bool {
        matches!(self.ore, Some(n) if n > 0)
    }
}

/// Belief state for the whole grid
#[derive(Debug, Clone)]
pub struct GridKnowledge {
    width: u32,
    height: u32,
    cells: Vec<CellBelief>,
    /// Cells with known ore > 0
    ore_index: BTreeSet<Coord>,
}

impl GridKnowledge {
    /// Fresh belief: every cell unknown
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![CellBelief::default(); width as usize * height as usize],
            ore_index: BTreeSet::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, at: Coord) -> bool {
        at.x >= 0 && at.y >= 0 && (at.x as u32) < self.width && (at.y as u32) < self.height
    }

    #[inline]
    fn index(&self, at: Coord) -> Option<usize> {
        if self.in_bounds(at) {
            Some(at.y as usize * self.width as usize + at.x as usize)
        } else {
            None
        }
    }

    pub fn cell(&self, at: Coord) -> Option<&CellBelief> {
        self.index(at).map(|i| &self.cells[i])
    }

    pub fn ore_at(&self, at: Coord) -> Option<u32> {
        self.cell(at).and_then(|c| c.ore)
    }

    pub fn has_hole(&self, at: Coord) -> bool {
        self.cell(at).map_or(false, |c| c.has_hole)
    }

    pub fn is_radar_covered(&self, at: Coord) -> bool {
        self.cell(at).map_or(false, |c| c.radar_covered)
    }

    /// Merge one turn's observation into the belief
    pub fn update(&mut self, snapshot: &TurnSnapshot, radar_radius: u32) {
        for observation in &snapshot.cells {
            self.observe_cell(observation);
        }

        for &radar in &snapshot.radars {
            self.mark_radar(radar, radar_radius);
        }
    }

    /// Merge a single cell observation
    ///
    /// Unknown never erases a known count. A count higher than the stored
    /// one contradicts ore depletion; the observation still wins.
    pub fn observe_cell(&mut self, observation: &CellObservation) {
        let at = observation.at;
        let Some(idx) = self.index(at) else {
            tracing::warn!("Ignoring observation of cell {} outside the grid", at);
            return;
        };

        let cell = &mut self.cells[idx];
        if observation.hole {
            cell.has_hole = true;
        }

        match (cell.ore, observation.ore) {
            (_, None) => return,
            (Some(known), Some(seen)) if seen > known => {
                tracing::warn!(
                    "Inconsistent ore at {}: had {}, observed {}; trusting observation",
                    at,
                    known,
                    seen
                );
                cell.ore = Some(seen);
            }
            (_, Some(seen)) => cell.ore = Some(seen),
        }

        if cell.has_known_ore() {
            self.ore_index.insert(at);
        } else {
            self.ore_index.remove(&at);
        }
    }

    /// Mark every cell within `radius` of a radar as covered
    pub fn mark_radar(&mut self, radar: Coord, radius: u32) {
        if !self.in_bounds(radar) {
            tracing::warn!("Radar reported at {} outside the grid", radar);
            return;
        }

        let r = radius as i32;
        for dy in -r..=r {
            let span = r - dy.abs();
            for dx in -span..=span {
                if let Some(idx) = self.index(Coord::new(radar.x + dx, radar.y + dy)) {
                    self.cells[idx].radar_covered = true;
                }
            }
        }
    }

    /// Cells with known ore > 0, lowest `(y, x)` first
    pub fn known_ore_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.ore_index.iter().copied()
    }

    pub fn has_known_ore(&self) -> bool {
        !self.ore_index.is_empty()
    }

    /// Sum of all known ore counts
    pub fn total_known_ore(&self) -> u32 {
        self.ore_index
            .iter()
            .filter_map(|&at| self.ore_at(at))
            .sum()
    }

    /// Closest known ore cell, ties broken by lowest `(y, x)`
    pub fn nearest_known_ore_cell(&self, from: Coord) -> Option<Coord> {
        self.best_ore_cell(from, |_| 0, &TargetWeights::default())
    }

    /// Best known ore cell under the given scoring weights
    ///
    /// `committed` reports how many other units already target a cell.
    pub fn best_ore_cell<F>(&self, from: Coord, committed: F, weights: &TargetWeights) -> Option<Coord>
    where
        F: Fn(Coord) -> u32,
    {
        pick_best(from, self.known_ore_cells(), committed, weights)
    }

    /// Random cell whose ore count is still unknown
    ///
    /// The base column is never a candidate. Undug cells are preferred; dug
    /// cells with unknown ore are used only when nothing else is left.
    pub fn random_unexplored_cell<R>(&self, rng: &mut R, base_column: i32) -> Option<Coord>
    where
        R: Rng + ?Sized,
    {
        let unknown: Vec<(Coord, bool)> = (0..self.height as i32)
            .flat_map(|y| (0..self.width as i32).map(move |x| Coord::new(x, y)))
            .filter(|at| at.x != base_column)
            .filter_map(|at| {
                let cell = self.cell(at)?;
                cell.ore.is_none().then_some((at, cell.has_hole))
            })
            .collect();

        let undug: Vec<Coord> = unknown.iter().filter(|(_, hole)| !hole).map(|(at, _)| *at).collect();
        if !undug.is_empty() {
            return undug.choose(rng).copied();
        }

        let dug: Vec<Coord> = unknown.into_iter().map(|(at, _)| at).collect();
        dug.choose(rng).copied()
    }
}
