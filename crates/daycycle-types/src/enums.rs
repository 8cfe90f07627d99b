//! Enumeration types shared between the simulation core and its
//! presentation adapters.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Direction of a schedule state change.
///
/// Only emitted when the computed membership differs from the entry's
/// stored state; a steady state produces no value at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TransitionKind {
    /// The object enters its visible window.
    Activate,
    /// The object leaves its visible window.
    Deactivate,
}

impl TransitionKind {
    /// Compute the transition required to move from `current` to `desired`,
    /// or `None` when the two already agree.
    pub const fn between(current: bool, desired: bool) -> Option<Self> {
        match (current, desired) {
            (false, true) => Some(Self::Activate),
            (true, false) => Some(Self::Deactivate),
            _ => None,
        }
    }

    /// Whether the object is active after this transition is applied.
    pub const fn resulting_active(self) -> bool {
        matches!(self, Self::Activate)
    }
}

/// How a scheduled object is materialized when it becomes (in)active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Materialization {
    /// Toggle only the visual renderers; colliders stay enabled so the
    /// object keeps blocking movement while invisible.
    RenderersOnly,
    /// Toggle the whole object, colliders included.
    WholeObject,
}

impl Materialization {
    /// Select the strategy from a "preserve colliders" flag.
    pub const fn from_preserve_colliders(preserve_colliders: bool) -> Self {
        if preserve_colliders {
            Self::RenderersOnly
        } else {
            Self::WholeObject
        }
    }

    /// Whether colliders survive a deactivation under this strategy.
    pub const fn preserves_colliders(self) -> bool {
        matches!(self, Self::RenderersOnly)
    }
}

/// Materialized state of a scheduled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum EntryState {
    /// Hidden (initial state).
    #[default]
    Inactive,
    /// Visible.
    Active,
}

impl EntryState {
    /// Map a boolean activity flag onto the state enum.
    pub const fn from_active(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}
