//! Unit roles and per-unit dispatch records
//!
//! The radar carrier is chosen from scratch every turn, so there is never a
//! second carrier left over from an earlier turn. Everything else a unit
//! needs to remember between turns (its committed target) lives in a small
//! record keyed by unit id.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{Base, Coord, Item, UnitId};
use crate::dispatch::snapshot::UnitObservation;

/// Long-lived duty of a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Miner,
    RadarCarrier,
}

/// Progress toward the current goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Activity {
    #[default]
    SeekingTarget,
    MovingToTarget,
    ActingAtTarget,
    ReturningToBase,
}

/// What a committed target is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Bury a radar here
    Radar,
    /// Dig known ore here
    Ore,
    /// Probe an unknown cell
    Explore,
}

/// A cell a unit has committed to until it gets there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub at: Coord,
    pub kind: TargetKind,
}

impl Target {
    pub fn new(at: Coord, kind: TargetKind) -> Self {
        Self { at, kind }
    }

    pub fn radar(at: Coord) -> Self {
        Self::new(at, TargetKind::Radar)
    }

    pub fn ore(at: Coord) -> Self {
        Self::new(at, TargetKind::Ore)
    }

    pub fn explore(at: Coord) -> Self {
        Self::new(at, TargetKind::Explore)
    }
}

/// State carried across turns for one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnitRecord {
    pub role: Role,
    pub activity: Activity,
    pub target: Option<Target>,
}

impl UnitRecord {
    pub fn is_carrier(&self) -> bool {
        self.role == Role::RadarCarrier
    }
}

/// Pick the radar carrier for this turn
///
/// A live, current carrier keeps the role while radar duty is active.
/// Otherwise the live unit closest to the base anchor takes it, lowest id on
/// ties. Nobody carries while radar duty is suspended.
pub fn select_carrier(
    units: &[UnitObservation],
    current: Option<UnitId>,
    suspended: bool,
    base: &Base,
) -> Option<UnitId> {
    if suspended {
        return None;
    }

    let live = || units.iter().filter(|u| u.is_alive());

    if let Some(current) = current {
        if live().any(|u| u.id == current) {
            return Some(current);
        }
    }

    live()
        .filter_map(|u| u.position.map(|pos| (base.distance(pos), u.id)))
        .min()
        .map(|(_, id)| id)
}

/// Role and target memory for every controlled unit
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    records: AHashMap<UnitId, UnitRecord>,
    carrier: Option<UnitId>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for a unit, default for ids never seen
    pub fn record(&self, id: UnitId) -> UnitRecord {
        self.records.get(&id).copied().unwrap_or_default()
    }

    pub fn record_mut(&mut self, id: UnitId) -> &mut UnitRecord {
        self.records.entry(id).or_default()
    }

    pub fn carrier(&self) -> Option<UnitId> {
        self.carrier
    }

    pub fn role_of(&self, id: UnitId) -> Role {
        self.record(id).role
    }

    /// Number of records currently holding the carrier role
    pub fn carrier_count(&self) -> usize {
        self.records.values().filter(|r| r.is_carrier()).count()
    }

    /// Recompute the carrier and rewrite every unit's role
    ///
    /// A promoted unit drops any mining target so it heads for radar duty;
    /// a demoted one drops its radar site unless it already holds a radar.
    pub fn assign(&mut self, units: &[UnitObservation], suspended: bool, base: &Base) -> Option<UnitId> {
        let carrier = select_carrier(units, self.carrier, suspended, base);

        if carrier != self.carrier {
            match (self.carrier, carrier) {
                (_, Some(new)) => tracing::info!("{} takes radar duty (was {:?})", new, self.carrier),
                (Some(old), None) => tracing::info!("{} released from radar duty", old),
                (None, None) => {}
            }
        }

        for unit in units {
            let record = self.records.entry(unit.id).or_default();
            let role = if Some(unit.id) == carrier {
                Role::RadarCarrier
            } else {
                Role::Miner
            };

            if role != record.role {
                let keep = match (role, record.target) {
                    (Role::RadarCarrier, Some(t)) => t.kind == TargetKind::Radar,
                    (Role::Miner, Some(t)) => {
                        t.kind != TargetKind::Radar || unit.item == Some(Item::Radar)
                    }
                    (_, None) => true,
                };
                if !keep {
                    record.target = None;
                    record.activity = Activity::SeekingTarget;
                }
                record.role = role;
            }
        }

        // Units missing from the snapshot cannot hold the role either.
        for (id, record) in self.records.iter_mut() {
            if Some(*id) != carrier && record.is_carrier() {
                record.role = Role::Miner;
            }
        }

        self.carrier = carrier;
        carrier
    }

    /// Forget a destroyed unit's goal
    pub fn retire(&mut self, id: UnitId) {
        if let Some(record) = self.records.get_mut(&id) {
            if record.target.is_some() {
                tracing::debug!("{} destroyed, abandoning {:?}", id, record.target);
            }
            record.target = None;
            record.activity = Activity::SeekingTarget;
            record.role = Role::Miner;
        }
        if self.carrier == Some(id) {
            self.carrier = None;
        }
    }

    /// How many units other than `except` are committed to `at`
    pub fn committed_to(&self, at: Coord, except: UnitId) -> u32 {
        self.records
            .iter()
            .filter(|(id, r)| **id != except && r.target.map(|t| t.at) == Some(at))
            .count() as u32
    }

    /// Radar sites already claimed by units other than `except`, in site order
    pub fn radar_claims(&self, except: Option<UnitId>) -> Vec<Coord> {
        let mut sites: Vec<Coord> = self
            .records
            .iter()
            .filter(|(id, _)| Some(**id) != except)
            .filter_map(|(_, r)| r.target.filter(|t| t.kind == TargetKind::Radar).map(|t| t.at))
            .collect();
        sites.sort();
        sites
    }
}
