//! Shared type definitions for the Daycycle simulation.
//!
//! Types defined here are consumed by the simulation core and by every
//! presentation adapter. Types that cross into a front-end are exported to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for targets and components
//! - [`enums`] -- Transition kinds, materialization strategies, entry states
//! - [`structs`] -- Hours, phase entries, light rotation, state dumps

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{EntryState, Materialization, TransitionKind};
pub use ids::{ComponentId, TargetId};
pub use structs::{
    EntryStatus, EnvironmentDescriptor, HOURS_PER_DAY, Hour, HourOutOfRange, LightRotation,
    PhaseEntry, StateDump, UNKNOWN_PHASE,
};
