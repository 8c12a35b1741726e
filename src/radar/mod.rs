//! Radar coverage: deployment pattern and match-wide deployment plan

pub mod pattern;
pub mod plan;

pub use pattern::{CoveragePattern, StridePattern, TunedPattern};
pub use plan::{RadarPlan, Suspension};
