//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Scene objects are addressed by [`TargetId`], renderer and collider
//! components by [`ComponentId`]. Target ids are derived from the object's
//! configured name (UUID v5) so that schedule entries and the scene
//! registry agree on a handle without sharing any state. Component ids
//! are minted at discovery time (UUID v7).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
        )]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Opaque handle of a world object whose presence is scheduled by hour.
    TargetId
}

define_id! {
    /// Handle of a renderer or collider component belonging to a target.
    ComponentId
}

impl TargetId {
    /// Derive a stable target id from the object's scene name.
    ///
    /// The same name always yields the same id, so configuration can refer
    /// to objects by name on both the schedule side and the scene side.
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
    }
}
