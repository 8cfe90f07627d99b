//! Core value types: the simulated hour, environment descriptors, phase
//! table entries, light orientation and state dumps.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EntryState, Materialization};
use crate::ids::TargetId;

/// Number of whole hours in one simulated day.
pub const HOURS_PER_DAY: u8 = 24;

/// Phase name reported when no phase table entry matches the current hour.
pub const UNKNOWN_PHASE: &str = "Unknown Phase";

// ---------------------------------------------------------------------------
// Hour
// ---------------------------------------------------------------------------

/// A whole simulated hour in `[0, 23]`.
///
/// Construction always validates or clamps, so a held `Hour` is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Hour(u8);

impl Hour {
    /// Hour 0.
    pub const MIDNIGHT: Self = Self(0);

    /// Hour 23.
    pub const LAST: Self = Self(HOURS_PER_DAY - 1);

    /// Build an hour, returning `None` when `value > 23`.
    pub const fn new(value: u8) -> Option<Self> {
        if value < HOURS_PER_DAY {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Build an hour from any integer, clamping into `[0, 23]`.
    pub fn clamped(value: i64) -> Self {
        let bounded = value.clamp(0, i64::from(HOURS_PER_DAY - 1));
        Self(u8::try_from(bounded).unwrap_or(0))
    }

    /// Derive the hour from a fraction of day: `floor(fraction * 24)`.
    ///
    /// Out-of-range and non-finite fractions are clamped to the nearest
    /// valid hour (NaN maps to midnight).
    pub fn from_fraction(fraction: f64) -> Self {
        let raw = (fraction * f64::from(HOURS_PER_DAY)).floor();
        if raw.is_nan() || raw < 0.0 {
            return Self::MIDNIGHT;
        }
        if raw >= f64::from(HOURS_PER_DAY - 1) {
            return Self::LAST;
        }
        // In [0, 23) after the checks above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let hour = raw as u8;
        Self(hour)
    }

    /// The fraction of day at which this hour starts (`hour / 24`).
    pub fn start_fraction(self) -> f64 {
        f64::from(self.0) / f64::from(HOURS_PER_DAY)
    }

    /// Return the raw hour value.
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Whether this is hour 0.
    pub const fn is_midnight(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for Hour {
    type Error = HourOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(HourOutOfRange(value))
    }
}

impl From<Hour> for u8 {
    fn from(hour: Hour) -> Self {
        hour.0
    }
}

impl core::fmt::Display for Hour {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

/// Error returned when a raw value is not a valid hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("hour {0} is outside 0..=23")]
pub struct HourOutOfRange(pub u8);

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// What the presentation side needs to render a phase.
///
/// Opaque to the simulation core except for the `blend` flag, which
/// decides whether blend progress accumulates while the phase is current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EnvironmentDescriptor {
    /// Skybox material identifier to assign while the phase is current.
    pub material: String,
    /// Whether the material supports a transition factor driven by blend
    /// progress.
    #[serde(default)]
    pub blend: bool,
}

/// One row of the phase table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PhaseEntry {
    /// Display name of the phase (e.g. "Dawn").
    pub name: String,
    /// Hour this phase is bound to.
    #[ts(type = "number")]
    pub hour: Hour,
    /// Environment the presentation side applies while the phase is current.
    pub environment: EnvironmentDescriptor,
}

/// Euler rotation (degrees) for the directional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LightRotation {
    /// Rotation about the horizontal axis: `fraction * 360 - 90`.
    pub pitch: f64,
    /// Fixed rotation about the vertical axis.
    pub yaw: f64,
    /// Fixed rotation about the forward axis.
    pub roll: f64,
}

impl LightRotation {
    /// Compute the light orientation for a fraction of day.
    ///
    /// Midnight points the light straight up from below the horizon
    /// (`-90`), noon straight down (`90`).
    pub fn from_fraction(fraction: f64, yaw: f64, roll: f64) -> Self {
        Self {
            pitch: fraction.mul_add(360.0, -90.0),
            yaw,
            roll,
        }
    }
}

// ---------------------------------------------------------------------------
// Introspection
// ---------------------------------------------------------------------------

/// Snapshot of one scheduled entry for the state dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EntryStatus {
    /// Handle of the scheduled object.
    pub target: TargetId,
    /// Human-readable label (the configured object name).
    pub label: String,
    /// First hour of the visible window.
    #[ts(type = "number")]
    pub appear_hour: Hour,
    /// First hour after the visible window.
    #[ts(type = "number")]
    pub disappear_hour: Hour,
    /// Membership computed for the dump's hour.
    pub should_be_active: bool,
    /// State materialized by the last evaluation.
    pub state: EntryState,
    /// Materialization strategy of the entry.
    pub materialization: Materialization,
    /// Whether renderer/collider handles have been discovered.
    pub initialized: bool,
}

/// Full introspection snapshot produced by the dump administrative command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StateDump {
    /// Number of ticks executed so far.
    pub tick: u64,
    /// Current hour.
    #[ts(type = "number")]
    pub hour: Hour,
    /// Current fraction of day.
    pub fraction: f64,
    /// Current phase name, or the unknown-phase sentinel.
    pub phase_name: String,
    /// Current skybox blend progress.
    pub blend_progress: f64,
    /// Current day counter.
    pub day: u64,
    /// Current week counter.
    pub week: u64,
    /// Per-entry schedule state.
    pub entries: Vec<EntryStatus>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hour_new_rejects_out_of_range() {
        assert_eq!(Hour::new(23).map(Hour::value), Some(23));
        assert!(Hour::new(24).is_none());
    }

    #[test]
    fn hour_clamps() {
        assert_eq!(Hour::clamped(-5), Hour::MIDNIGHT);
        assert_eq!(Hour::clamped(99), Hour::LAST);
        assert_eq!(Hour::clamped(7).value(), 7);
    }

    #[test]
    fn hour_from_fraction_floors() {
        assert_eq!(Hour::from_fraction(0.0), Hour::MIDNIGHT);
        assert_eq!(Hour::from_fraction(0.35).value(), 8);
        assert_eq!(Hour::from_fraction(0.999_999).value(), 23);
        assert_eq!(Hour::from_fraction(f64::NAN), Hour::MIDNIGHT);
    }

    #[test]
    fn hour_displays_as_clock_text() {
        assert_eq!(Hour::clamped(7).to_string(), "07:00");
        assert_eq!(Hour::LAST.to_string(), "23:00");
    }

    #[test]
    fn hour_deserialization_validates() {
        let ok: Result<Hour, _> = serde_json::from_str("22");
        assert!(ok.is_ok());
        let bad: Result<Hour, _> = serde_json::from_str("24");
        assert!(bad.is_err_and(|e| e.to_string().contains("hour 24 is outside 0..=23")));
    }

    #[test]
    fn hour_try_from_reports_value() {
        let err = Hour::try_from(30_u8).unwrap_err();
        assert_eq!(err, HourOutOfRange(30));
        assert_eq!(err.to_string(), "hour 30 is outside 0..=23");
        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
    }

    #[test]
    fn light_rotation_matches_fraction() {
        let midnight = LightRotation::from_fraction(0.0, 170.0, 0.0);
        assert!((midnight.pitch + 90.0).abs() < 1e-9);
        let noon = LightRotation::from_fraction(0.5, 170.0, 0.0);
        assert!((noon.pitch - 90.0).abs() < 1e-9);
        assert!((noon.yaw - 170.0).abs() < 1e-9);
    }
}
