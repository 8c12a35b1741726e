//! Ore Dispatch - grid knowledge and unit dispatch for a turn-based mining game

pub mod core;
pub mod dispatch;
pub mod grid;
pub mod radar;
pub mod units;
