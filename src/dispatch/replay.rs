//! Recorded scenarios for offline runs
//!
//! A scenario is a JSON list of already-decoded turn snapshots. Replaying it
//! feeds every snapshot through a dispatcher in order.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::dispatch::action::TurnPlan;
use crate::dispatch::dispatcher::Dispatcher;
use crate::dispatch::snapshot::TurnSnapshot;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub turns: Vec<TurnSnapshot>,
}

impl Scenario {
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }
}

/// Plan every turn of a scenario in order
pub fn replay(dispatcher: &mut Dispatcher, scenario: &Scenario) -> Vec<TurnPlan> {
    scenario
        .turns
        .iter()
        .map(|snapshot| dispatcher.plan_turn(snapshot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DispatchConfig;
    use crate::core::error::DispatchError;
    use crate::core::types::{Coord, Item, UnitId};
    use crate::dispatch::action::Action;

    fn opening() -> Scenario {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/scenarios/opening.json");
        Scenario::load(path).expect("Should load opening scenario")
    }

    #[test]
    fn test_opening_scenario_replays() {
        let scenario = opening();
        let mut dispatcher = Dispatcher::new(DispatchConfig::default()).unwrap();
        let plans = replay(&mut dispatcher, &scenario);

        assert_eq!(plans.len(), scenario.turns.len());
        for (plan, snapshot) in plans.iter().zip(&scenario.turns) {
            assert_eq!(plan.len(), snapshot.live_units().len());
        }

        let first = &plans[0];
        assert_eq!(first.carrier, Some(UnitId(2)));
        assert_eq!(first.action_for(UnitId(2)), Some(Action::Request(Item::Radar)));
        assert_eq!(plans[1].action_for(UnitId(2)), Some(Action::Move(Coord::new(7, 3))));
    }

    #[test]
    fn test_bad_scenario_is_an_error() {
        let result = Scenario::from_json_str("{\"turns\": 3}");
        assert!(matches!(result, Err(DispatchError::SerdeError(_))));
    }
}
