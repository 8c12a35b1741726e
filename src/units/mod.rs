//! Controlled units: roles, activities and per-unit memory

pub mod roles;

pub use roles::{select_carrier, Activity, Role, RoleTable, Target, TargetKind, UnitRecord};
