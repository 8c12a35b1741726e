//! Grid belief under partial observability

pub mod knowledge;
pub mod scoring;

pub use knowledge::{CellBelief, GridKnowledge};
pub use scoring::{pick_best, score_cell, TargetWeights};
