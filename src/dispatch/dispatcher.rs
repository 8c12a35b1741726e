//! Per-turn dispatcher
//!
//! Owns the grid belief, the radar plan and the role table for the whole
//! match. Each turn it merges the snapshot, re-decides who carries radars and
//! runs every live unit through its state machine in ascending id order, so
//! radar plan effects are applied one unit at a time.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::DispatchConfig;
use crate::core::error::Result;
use crate::core::types::{Base, Coord, Item, Turn, UnitId};
use crate::dispatch::action::{Action, TurnPlan, UnitAction};
use crate::dispatch::snapshot::{TurnSnapshot, UnitObservation};
use crate::grid::knowledge::GridKnowledge;
use crate::grid::scoring::TargetWeights;
use crate::radar::pattern::{CoveragePattern, StridePattern, TunedPattern};
use crate::radar::plan::RadarPlan;
use crate::units::roles::{Activity, Role, RoleTable, Target, TargetKind, UnitRecord};

/// Upper bound on state transitions for one unit in one turn
const MAX_TRANSITIONS: usize = 6;

/// Outcome of running one state of a unit's machine
enum Step {
    /// Emit this action; the unit ends the turn in the given activity
    Emit(Action, Activity),
    /// Re-run the machine from another activity this same turn
    Goto(Activity),
}

/// Turn orchestrator
pub struct Dispatcher {
    config: DispatchConfig,
    base: Base,
    weights: TargetWeights,
    knowledge: GridKnowledge,
    radar: RadarPlan,
    roles: RoleTable,
    turn: Turn,
}

impl Dispatcher {
    /// Create a dispatcher using the tuned radar pattern
    pub fn new(config: DispatchConfig) -> Result<Self> {
        let pattern = TunedPattern::new(StridePattern::new(config.pattern_margin));
        Self::with_pattern(config, &pattern)
    }

    /// Create a dispatcher with a specific radar pattern
    pub fn with_pattern(config: DispatchConfig, pattern: &dyn CoveragePattern) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            base: config.base(),
            weights: TargetWeights::with_crowding(config.crowding_weight),
            knowledge: GridKnowledge::new(config.width, config.height),
            radar: RadarPlan::from_pattern(pattern, &config),
            roles: RoleTable::new(),
            turn: 0,
            config,
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &GridKnowledge {
        &self.knowledge
    }

    pub fn radar(&self) -> &RadarPlan {
        &self.radar
    }

    pub fn roles(&self) -> &RoleTable {
        &self.roles
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// Merge a snapshot into the grid belief without planning
    pub fn observe(&mut self, snapshot: &TurnSnapshot) {
        self.knowledge.update(snapshot, self.config.radar_radius);
    }

    /// Run a full turn: observe, assign roles, decide one action per live unit
    pub fn plan_turn(&mut self, snapshot: &TurnSnapshot) -> TurnPlan {
        self.turn = snapshot.turn;
        self.observe(snapshot);

        for unit in snapshot.units.iter().filter(|u| !u.is_alive()) {
            self.roles.retire(unit.id);
        }

        let known_ore = self.knowledge.total_known_ore();
        self.radar.reevaluate(known_ore);
        // A radar still in another unit's hands keeps its site.
        let claims = self.roles.radar_claims(self.roles.carrier());
        let no_duty = self.radar.next_free_target(&claims).is_none();
        let carrier = self.roles.assign(&snapshot.units, no_duty, &self.base);

        tracing::debug!(
            "Turn {}: score {}-{}, {} ore known, {} radars deployed, carrier {:?}, trap cooldown {}",
            snapshot.turn,
            snapshot.my_score,
            snapshot.opponent_score,
            known_ore,
            self.radar.deployed(),
            carrier,
            snapshot.trap_cooldown
        );

        let actions = snapshot
            .live_units()
            .iter()
            .map(|unit| self.plan_unit(unit, snapshot.radar_cooldown))
            .collect();

        TurnPlan {
            turn: snapshot.turn,
            actions,
            carrier,
        }
    }

    /// Where the unit is in its state machine at the start of the turn
    fn derive_activity(&self, unit: &UnitObservation, record: &UnitRecord) -> Activity {
        let Some(pos) = unit.position else {
            return Activity::SeekingTarget;
        };

        match (unit.item, record.target) {
            (Some(Item::Ore), _) => Activity::ReturningToBase,
            (Some(Item::Radar), None) => Activity::MovingToTarget,
            // still has to fetch the radar from base
            (_, Some(t)) if t.kind == TargetKind::Radar && unit.item != Some(Item::Radar) => {
                Activity::SeekingTarget
            }
            (_, Some(t)) if t.at == pos => Activity::ActingAtTarget,
            (_, Some(_)) => Activity::MovingToTarget,
            (_, None) => Activity::SeekingTarget,
        }
    }

    fn plan_unit(&mut self, unit: &UnitObservation, radar_cooldown: u32) -> UnitAction {
        let mut record = self.roles.record(unit.id);
        let mut activity = self.derive_activity(unit, &record);
        let mut rng = ChaCha8Rng::seed_from_u64(exploration_seed(self.config.seed, self.turn, unit.id));

        let mut decision = None;
        for _ in 0..MAX_TRANSITIONS {
            match self.advance(unit, &mut record, activity, radar_cooldown, &mut rng) {
                Step::Emit(action, next) => {
                    decision = Some((action, next));
                    break;
                }
                Step::Goto(next) => activity = next,
            }
        }

        let (action, activity) = decision.unwrap_or_else(|| {
            tracing::debug!("{} found no usable target, waiting", unit.id);
            record.target = None;
            (Action::Wait, Activity::SeekingTarget)
        });

        record.activity = activity;
        *self.roles.record_mut(unit.id) = record;

        tracing::debug!(
            "{} [{:?}/{:?}] at {:?} holding {:?}: {}",
            unit.id,
            record.role,
            activity,
            unit.position,
            unit.item,
            action
        );

        UnitAction {
            unit: unit.id,
            action,
            role: record.role,
            activity,
        }
    }

    fn advance(
        &mut self,
        unit: &UnitObservation,
        record: &mut UnitRecord,
        activity: Activity,
        radar_cooldown: u32,
        rng: &mut ChaCha8Rng,
    ) -> Step {
        let Some(pos) = unit.position else {
            return Step::Emit(Action::Wait, Activity::SeekingTarget);
        };

        match activity {
            Activity::SeekingTarget => self.seek(unit.id, pos, record, radar_cooldown, rng),
            Activity::MovingToTarget => self.move_to_target(unit, pos, record),
            Activity::ActingAtTarget => self.act_at_target(unit, pos, record),
            Activity::ReturningToBase => {
                if !self.base.contains(pos) {
                    return Step::Emit(Action::Move(self.base.dock_for(pos)), Activity::ReturningToBase);
                }
                // Ore is handed in as soon as the unit reaches the base column.
                record.target = None;
                Step::Goto(Activity::SeekingTarget)
            }
        }
    }

    fn seek(
        &mut self,
        id: UnitId,
        pos: Coord,
        record: &mut UnitRecord,
        radar_cooldown: u32,
        rng: &mut ChaCha8Rng,
    ) -> Step {
        if record.role == Role::RadarCarrier {
            let claims = self.roles.radar_claims(Some(id));
            if let Some(site) = self.radar.next_free_target(&claims) {
                record.target = Some(Target::radar(site));

                if !self.base.contains(pos) {
                    return Step::Emit(Action::Move(self.base.dock_for(pos)), Activity::SeekingTarget);
                }
                if radar_cooldown > 0 {
                    tracing::debug!("{} waiting {} turns for a radar", id, radar_cooldown);
                    return Step::Emit(Action::Wait, Activity::SeekingTarget);
                }
                return Step::Emit(Action::Request(Item::Radar), Activity::MovingToTarget);
            }
        }

        let roles = &self.roles;
        let target = self
            .knowledge
            .best_ore_cell(pos, |cell| roles.committed_to(cell, id), &self.weights)
            .map(Target::ore)
            .or_else(|| {
                self.knowledge
                    .random_unexplored_cell(rng, self.base.column())
                    .map(Target::explore)
            });

        match target {
            Some(target) => {
                record.target = Some(target);
                if target.at == pos {
                    Step::Goto(Activity::ActingAtTarget)
                } else {
                    Step::Goto(Activity::MovingToTarget)
                }
            }
            None => {
                record.target = None;
                Step::Emit(Action::Wait, Activity::SeekingTarget)
            }
        }
    }

    fn move_to_target(&mut self, unit: &UnitObservation, pos: Coord, record: &mut UnitRecord) -> Step {
        let target = match (record.target, unit.item) {
            (Some(t), _) => t,
            // holding a radar without a site: take the plan's current one
            (None, Some(Item::Radar)) => {
                let claims = self.roles.radar_claims(Some(unit.id));
                let site = self
                    .radar
                    .peek_free_target(&claims)
                    .unwrap_or_else(|| self.bury_in_place(pos));
                let target = Target::radar(site);
                record.target = Some(target);
                target
            }
            (None, _) => return Step::Goto(Activity::SeekingTarget),
        };

        if target.kind == TargetKind::Explore && self.knowledge.has_known_ore() {
            tracing::debug!("{} drops exploration of {} for known ore", unit.id, target.at);
            record.target = None;
            return Step::Goto(Activity::SeekingTarget);
        }

        if target.kind == TargetKind::Ore && self.knowledge.ore_at(target.at) == Some(0) {
            tracing::debug!("{} drops {}, mined out on the way", unit.id, target.at);
            record.target = None;
            return Step::Goto(Activity::SeekingTarget);
        }

        if target.at == pos {
            return Step::Goto(Activity::ActingAtTarget);
        }

        Step::Emit(Action::Move(target.at), Activity::MovingToTarget)
    }

    /// Nearest cell off the base column
    fn bury_in_place(&self, pos: Coord) -> Coord {
        if self.base.contains(pos) {
            let step = if self.base.column() + 1 < self.config.width as i32 { 1 } else { -1 };
            Coord::new(pos.x + step, pos.y)
        } else {
            pos
        }
    }

    fn act_at_target(&mut self, unit: &UnitObservation, pos: Coord, record: &mut UnitRecord) -> Step {
        let Some(target) = record.target else {
            return Step::Goto(Activity::SeekingTarget);
        };

        if unit.item == Some(Item::Radar) {
            if !self.radar.record_deployed_at(pos) {
                tracing::warn!("{} reached {} but a radar is already buried there", unit.id, pos);
                record.target = None;
                return Step::Goto(Activity::MovingToTarget);
            }
            tracing::info!(
                "{} buries radar {} of {} at {}",
                unit.id,
                self.radar.deployed(),
                self.radar.cap(),
                pos
            );
            record.target = None;
            return Step::Emit(Action::Dig(pos), Activity::SeekingTarget);
        }

        let hole = self.knowledge.has_hole(pos);
        match (target.kind, self.knowledge.ore_at(pos)) {
            (TargetKind::Radar, _) => {
                record.target = None;
                Step::Goto(Activity::SeekingTarget)
            }
            (_, Some(0)) => {
                tracing::debug!("{} found {} exhausted", unit.id, pos);
                record.target = None;
                Step::Goto(Activity::SeekingTarget)
            }
            (TargetKind::Explore, None) if hole => {
                tracing::debug!("{} finds {} already dug, moving on", unit.id, pos);
                record.target = None;
                Step::Goto(Activity::SeekingTarget)
            }
            (TargetKind::Explore, Some(_)) => {
                record.target = Some(Target::ore(pos));
                Step::Emit(Action::Dig(pos), Activity::ActingAtTarget)
            }
            _ => Step::Emit(Action::Dig(pos), Activity::ActingAtTarget),
        }
    }
}

/// Deterministic per-unit, per-turn seed for exploration choices
fn exploration_seed(seed: u64, turn: Turn, unit: UnitId) -> u64 {
    seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ ((turn as u64) << 32) ^ unit.0 as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::snapshot::UnitObservation;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(DispatchConfig::default()).unwrap()
    }

    fn at(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DispatchConfig {
            radar_radius: 0,
            ..DispatchConfig::default()
        };
        assert!(Dispatcher::new(config).is_err());
    }

    #[test]
    fn test_lone_unit_fetches_first_radar() {
        let mut d = dispatcher();
        let snapshot = TurnSnapshot::new(1).with_unit(UnitObservation::alive(UnitId(1), at(0, 7)));
        let plan = d.plan_turn(&snapshot);

        assert_eq!(plan.carrier, Some(UnitId(1)));
        assert_eq!(plan.action_for(UnitId(1)), Some(Action::Request(Item::Radar)));
        assert_eq!(d.roles().record(UnitId(1)).target, Some(Target::radar(at(7, 3))));

        let snapshot = TurnSnapshot::new(2)
            .with_unit(UnitObservation::alive(UnitId(1), at(0, 7)).with_item(Item::Radar));
        let plan = d.plan_turn(&snapshot);
        assert_eq!(plan.action_for(UnitId(1)), Some(Action::Move(at(7, 3))));
    }

    #[test]
    fn test_carrier_away_from_base_goes_home() {
        let mut d = dispatcher();
        let snapshot = TurnSnapshot::new(1).with_unit(UnitObservation::alive(UnitId(0), at(6, 2)));
        let plan = d.plan_turn(&snapshot);
        assert_eq!(plan.action_for(UnitId(0)), Some(Action::Move(at(0, 2))));
    }

    #[test]
    fn test_carrier_waits_for_cooldown() {
        let mut d = dispatcher();
        let mut snapshot = TurnSnapshot::new(1).with_unit(UnitObservation::alive(UnitId(0), at(0, 4)));
        snapshot.radar_cooldown = 3;
        let plan = d.plan_turn(&snapshot);
        assert_eq!(plan.action_for(UnitId(0)), Some(Action::Wait));
        assert_eq!(d.roles().record(UnitId(0)).target, Some(Target::radar(at(7, 3))));
    }

    #[test]
    fn test_carrier_buries_radar_on_site() {
        let mut d = dispatcher();
        d.plan_turn(&TurnSnapshot::new(1).with_unit(UnitObservation::alive(UnitId(0), at(0, 7))));

        let snapshot = TurnSnapshot::new(2)
            .with_unit(UnitObservation::alive(UnitId(0), at(7, 3)).with_item(Item::Radar));
        let plan = d.plan_turn(&snapshot);

        assert_eq!(plan.action_for(UnitId(0)), Some(Action::Dig(at(7, 3))));
        assert_eq!(d.radar().deployed(), 1);
        assert_eq!(d.radar().next_target(), Some(at(7, 11)));
        assert_eq!(d.roles().record(UnitId(0)).target, None);
    }

    #[test]
    fn test_miner_digs_known_ore_underfoot() {
        let mut d = dispatcher();
        let snapshot = TurnSnapshot::new(1)
            .with_cell(at(5, 5), Some(3), false)
            .with_unit(UnitObservation::alive(UnitId(1), at(0, 7)))
            .with_unit(UnitObservation::alive(UnitId(2), at(5, 5)));
        let plan = d.plan_turn(&snapshot);

        let u2 = plan.get(UnitId(2)).unwrap();
        assert_eq!(u2.role, Role::Miner);
        assert_eq!(u2.activity, Activity::ActingAtTarget);
        assert_eq!(u2.action, Action::Dig(at(5, 5)));
    }

    #[test]
    fn test_miner_with_ore_heads_home() {
        let mut d = dispatcher();
        let snapshot = TurnSnapshot::new(1)
            .with_unit(UnitObservation::alive(UnitId(0), at(0, 7)))
            .with_unit(UnitObservation::alive(UnitId(1), at(9, 2)).with_item(Item::Ore));
        let plan = d.plan_turn(&snapshot);
        let u1 = plan.get(UnitId(1)).unwrap();
        assert_eq!(u1.action, Action::Move(at(0, 2)));
        assert_eq!(u1.activity, Activity::ReturningToBase);
    }

    #[test]
    fn test_exhausted_cell_is_dropped() {
        let mut d = dispatcher();
        let carrier = UnitObservation::alive(UnitId(0), at(0, 7));
        let miner = UnitObservation::alive(UnitId(1), at(5, 5));
        d.plan_turn(
            &TurnSnapshot::new(1)
                .with_cell(at(5, 5), Some(1), false)
                .with_cell(at(8, 5), Some(2), false)
                .with_unit(carrier)
                .with_unit(miner),
        );

        let plan = d.plan_turn(
            &TurnSnapshot::new(2)
                .with_cell(at(5, 5), Some(0), true)
                .with_unit(carrier)
                .with_unit(miner),
        );
        assert_eq!(plan.action_for(UnitId(1)), Some(Action::Move(at(8, 5))));
    }

    #[test]
    fn test_ore_target_mined_out_in_transit_is_dropped() {
        let mut d = dispatcher();
        let carrier = UnitObservation::alive(UnitId(0), at(0, 7));
        let plan = d.plan_turn(
            &TurnSnapshot::new(1)
                .with_cell(at(20, 2), Some(2), false)
                .with_cell(at(10, 2), Some(1), false)
                .with_unit(carrier)
                .with_unit(UnitObservation::alive(UnitId(1), at(16, 2))),
        );
        assert_eq!(plan.action_for(UnitId(1)), Some(Action::Move(at(20, 2))));

        let plan = d.plan_turn(
            &TurnSnapshot::new(2)
                .with_cell(at(20, 2), Some(0), true)
                .with_unit(carrier)
                .with_unit(UnitObservation::alive(UnitId(1), at(17, 2))),
        );
        assert_eq!(plan.action_for(UnitId(1)), Some(Action::Move(at(10, 2))));
        assert_eq!(d.roles().record(UnitId(1)).target, Some(Target::ore(at(10, 2))));
    }

    #[test]
    fn test_radar_not_buried_twice_on_one_site() {
        let mut d = dispatcher();
        d.plan_turn(&TurnSnapshot::new(1).with_unit(UnitObservation::alive(UnitId(0), at(0, 7))));
        d.plan_turn(
            &TurnSnapshot::new(2).with_unit(UnitObservation::alive(UnitId(0), at(7, 3)).with_item(Item::Radar)),
        );
        assert_eq!(d.radar().deployed(), 1);

        // a second radar ends up on the site that is already done
        d.roles.record_mut(UnitId(1)).target = Some(Target::radar(at(7, 3)));
        let plan = d.plan_turn(
            &TurnSnapshot::new(3).with_unit(UnitObservation::alive(UnitId(1), at(7, 3)).with_item(Item::Radar)),
        );

        assert_eq!(plan.action_for(UnitId(1)), Some(Action::Move(at(7, 11))));
        assert_eq!(d.radar().deployed(), 1);
        assert_eq!(d.roles().record(UnitId(1)).target, Some(Target::radar(at(7, 11))));
    }

    #[test]
    fn test_exploration_is_reproducible() {
        let snapshot = TurnSnapshot::new(4)
            .with_unit(UnitObservation::alive(UnitId(0), at(0, 7)))
            .with_unit(UnitObservation::alive(UnitId(1), at(0, 3)));

        let first = dispatcher().plan_turn(&snapshot);
        let second = dispatcher().plan_turn(&snapshot);
        assert_eq!(first, second);
        assert!(matches!(first.action_for(UnitId(1)), Some(Action::Move(_))));
    }

    #[test]
    fn test_exploration_abandoned_when_ore_appears() {
        let mut d = dispatcher();
        let carrier = UnitObservation::alive(UnitId(0), at(0, 7));
        // exploration sites are never on the base column, so this miner is in transit
        let miner = UnitObservation::alive(UnitId(1), at(0, 3));
        d.plan_turn(&TurnSnapshot::new(1).with_unit(carrier).with_unit(miner));
        assert_eq!(
            d.roles().record(UnitId(1)).target.map(|t| t.kind),
            Some(TargetKind::Explore)
        );

        let plan = d.plan_turn(
            &TurnSnapshot::new(2)
                .with_cell(at(6, 6), Some(2), false)
                .with_unit(carrier)
                .with_unit(miner),
        );
        assert_eq!(plan.action_for(UnitId(1)), Some(Action::Move(at(6, 6))));
    }

    #[test]
    fn test_dead_units_get_no_action() {
        let mut d = dispatcher();
        let snapshot = TurnSnapshot::new(1)
            .with_unit(UnitObservation::alive(UnitId(0), at(0, 7)))
            .with_unit(UnitObservation::dead(UnitId(1)));
        let plan = d.plan_turn(&snapshot);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.action_for(UnitId(1)), None);
    }

    #[test]
    fn test_dead_carrier_hands_over() {
        let mut d = dispatcher();
        d.plan_turn(
            &TurnSnapshot::new(1)
                .with_unit(UnitObservation::alive(UnitId(0), at(0, 7)))
                .with_unit(UnitObservation::alive(UnitId(1), at(0, 2))),
        );
        assert_eq!(d.roles().carrier(), Some(UnitId(0)));

        let plan = d.plan_turn(
            &TurnSnapshot::new(2)
                .with_unit(UnitObservation::dead(UnitId(0)))
                .with_unit(UnitObservation::alive(UnitId(1), at(0, 2))),
        );
        assert_eq!(plan.carrier, Some(UnitId(1)));
        assert_eq!(plan.action_for(UnitId(1)), Some(Action::Request(Item::Radar)));
        assert_eq!(d.roles().carrier_count(), 1);
    }

    #[test]
    fn test_nothing_left_to_explore_waits() {
        let config = DispatchConfig {
            width: 2,
            height: 1,
            base: Coord::new(0, 0),
            radar_cap: 0,
            ..DispatchConfig::default()
        };
        let mut d = Dispatcher::new(config).unwrap();
        let snapshot = TurnSnapshot::new(1)
            .with_cell(at(1, 0), Some(0), true)
            .with_unit(UnitObservation::alive(UnitId(0), at(0, 0)));
        let plan = d.plan_turn(&snapshot);
        assert_eq!(plan.action_for(UnitId(0)), Some(Action::Wait));
    }

    #[test]
    fn test_exploration_seed_varies() {
        assert_ne!(exploration_seed(42, 1, UnitId(0)), exploration_seed(42, 1, UnitId(1)));
        assert_ne!(exploration_seed(42, 1, UnitId(0)), exploration_seed(42, 2, UnitId(0)));
    }
}
