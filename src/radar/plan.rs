//! Radar deployment plan
//!
//! Holds the deployment sequence for the whole match together with a cursor,
//! the number of radars buried so far and whether radar duty is suspended.

use crate::core::config::DispatchConfig;
use crate::core::types::Coord;
use crate::radar::pattern::CoveragePattern;

/// Why radar duty is currently suspended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suspension {
    /// Deployment cap reached (permanent)
    CapReached,
    /// Every pattern site has been used (permanent)
    PatternExhausted,
    /// Enough ore is known; lifts if the known total drops again
    EnoughOre,
}

/// Process-wide radar deployment state
///
/// `cursor` is the first pattern site without a radar. Sites can be buried
/// out of order when a radar changes hands, so each site also carries its own
/// flag.
#[derive(Debug, Clone)]
pub struct RadarPlan {
    targets: Vec<Coord>,
    buried: Vec<bool>,
    cursor: usize,
    deployed: u32,
    cap: u32,
    ore_threshold: u32,
    suspension: Option<Suspension>,
}

impl RadarPlan {
    pub fn new(targets: Vec<Coord>, cap: u32, ore_threshold: u32) -> Self {
        let mut plan = Self {
            buried: vec![false; targets.len()],
            targets,
            cursor: 0,
            deployed: 0,
            cap,
            ore_threshold,
            suspension: None,
        };
        plan.suspension = plan.permanent_suspension();
        plan
    }

    /// Build the plan for a configuration using the given pattern
    pub fn from_pattern(pattern: &dyn CoveragePattern, config: &DispatchConfig) -> Self {
        let targets = pattern.targets(
            config.width,
            config.height,
            config.radar_radius,
            config.base.x,
        );
        tracing::debug!(
            "Radar plan from {} pattern: {} sites, cap {}",
            pattern.name(),
            targets.len(),
            config.radar_cap
        );
        Self::new(targets, config.radar_cap, config.ore_threshold)
    }

    fn permanent_suspension(&self) -> Option<Suspension> {
        if self.deployed >= self.cap {
            Some(Suspension::CapReached)
        } else if self.cursor >= self.targets.len() {
            Some(Suspension::PatternExhausted)
        } else {
            None
        }
    }

    /// Re-check suspension against the current known ore total
    ///
    /// Called once per turn before roles are assigned.
    pub fn reevaluate(&mut self, total_known_ore: u32) -> Option<Suspension> {
        let next = self.permanent_suspension().or_else(|| {
            (total_known_ore >= self.ore_threshold).then_some(Suspension::EnoughOre)
        });

        if next != self.suspension {
            match next {
                Some(reason) => tracing::info!(
                    "Radar duty suspended ({:?}) with {} deployed, {} ore known",
                    reason,
                    self.deployed,
                    total_known_ore
                ),
                None => tracing::info!(
                    "Radar duty resumed: {} ore known, below threshold {}",
                    total_known_ore,
                    self.ore_threshold
                ),
            }
        }

        self.suspension = next;
        next
    }

    /// Next undeployed site, `None` while suspended
    pub fn next_target(&self) -> Option<Coord> {
        self.next_free_target(&[])
    }

    /// Next undeployed site nobody has claimed yet
    ///
    /// `claimed` lists sites other units are already bringing a radar to.
    /// Those radars count against the cap, so no new site is handed out once
    /// buried plus in-flight radars reach it.
    pub fn next_free_target(&self, claimed: &[Coord]) -> Option<Coord> {
        if self.suspension.is_some() {
            return None;
        }
        if self.deployed as usize + claimed.len() >= self.cap as usize {
            return None;
        }
        self.peek_free_target(claimed)
    }

    /// Site under the cursor regardless of suspension
    pub fn peek_target(&self) -> Option<Coord> {
        self.targets.get(self.cursor).copied()
    }

    /// First unburied, unclaimed site regardless of suspension
    ///
    /// Used by a unit that already holds a radar and needs somewhere to put it.
    pub fn peek_free_target(&self, claimed: &[Coord]) -> Option<Coord> {
        self.unburied().find(|site| !claimed.contains(site))
    }

    /// Whether a radar has already been buried on this pattern site
    pub fn is_buried(&self, site: Coord) -> bool {
        self.targets
            .iter()
            .zip(&self.buried)
            .any(|(&t, &done)| done && t == site)
    }

    /// A radar was buried at the site under the cursor
    pub fn record_deployed(&mut self) {
        match self.peek_target() {
            Some(site) => {
                self.record_deployed_at(site);
            }
            None => {
                self.deployed += 1;
                self.refresh_permanent();
            }
        }
    }

    /// A radar was buried at `site`
    ///
    /// Returns `false` without counting anything when the site already holds
    /// one of our radars. Sites outside the pattern are counted but not
    /// tracked.
    pub fn record_deployed_at(&mut self, site: Coord) -> bool {
        if let Some(idx) = self.targets.iter().position(|&t| t == site) {
            if self.buried[idx] {
                return false;
            }
            self.buried[idx] = true;
            while self.cursor < self.targets.len() && self.buried[self.cursor] {
                self.cursor += 1;
            }
        }
        self.deployed += 1;
        self.refresh_permanent();
        true
    }

    fn refresh_permanent(&mut self) {
        if let Some(reason) = self.permanent_suspension() {
            self.suspension = Some(reason);
        }
    }

    fn unburied(&self) -> impl Iterator<Item = Coord> + '_ {
        self.targets
            .iter()
            .zip(&self.buried)
            .filter(|(_, done)| !**done)
            .map(|(&t, _)| t)
    }

    pub fn deployed(&self) -> u32 {
        self.deployed
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_suspended(&self) -> bool {
        self.suspension.is_some()
    }

    pub fn suspension(&self) -> Option<Suspension> {
        self.suspension
    }

    pub fn targets(&self) -> &[Coord] {
        &self.targets
    }

    /// Sites not deployed yet, in pattern order
    pub fn remaining(&self) -> Vec<Coord> {
        self.unburied().collect()
    }
}
