//! Turn dispatch: snapshot in, one action per live unit out

pub mod action;
pub mod dispatcher;
pub mod replay;
pub mod snapshot;

pub use action::{Action, TurnPlan, UnitAction};
pub use dispatcher::Dispatcher;
pub use snapshot::{CellObservation, TurnSnapshot, UnitObservation};
