//! Per-tick presentation payload: HUD labels, light rotation and skybox.
//!
//! Everything here is a pure function of simulation state. Adapters
//! receive an [`EnvironmentUpdate`] once per tick and render it however
//! they like; none of them feed anything back into the clock or counters.

use daycycle_types::{Hour, LightRotation, PhaseEntry};
use serde::Serialize;

/// Skybox material to show, with its blend factor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkyboxAssignment {
    /// Material identifier of the current phase.
    pub material: String,
    /// Whether the material is a blending transition.
    pub blend: bool,
    /// Blend factor in `[0, 1]`; always 0 for non-blending materials.
    pub blend_progress: f64,
}

/// Everything a presentation adapter needs for one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvironmentUpdate {
    /// Current hour.
    pub hour: Hour,
    /// Current fraction of day.
    pub fraction: f64,
    /// Current phase name, or the unknown-phase sentinel.
    pub phase_name: String,
    /// Clock text, e.g. `"08:00"`.
    pub time_label: String,
    /// Day text, e.g. `"Day 3"`.
    pub day_label: String,
    /// Directional light orientation.
    pub light: LightRotation,
    /// Skybox to show; `None` leaves the current skybox untouched.
    pub skybox: Option<SkyboxAssignment>,
}

impl EnvironmentUpdate {
    /// Assemble the update for the current tick.
    #[allow(clippy::too_many_arguments)]
    pub fn compose(
        hour: Hour,
        fraction: f64,
        phase: Option<&PhaseEntry>,
        phase_name: &str,
        blend_progress: f64,
        day: u64,
        yaw_degrees: f64,
        roll_degrees: f64,
    ) -> Self {
        Self {
            hour,
            fraction,
            phase_name: phase_name.to_owned(),
            time_label: time_label(hour),
            day_label: day_label(day),
            light: LightRotation::from_fraction(fraction, yaw_degrees, roll_degrees),
            skybox: phase.map(|entry| SkyboxAssignment {
                material: entry.environment.material.clone(),
                blend: entry.environment.blend,
                blend_progress: if entry.environment.blend {
                    blend_progress
                } else {
                    0.0
                },
            }),
        }
    }
}

/// Zero-padded clock text for an hour.
pub fn time_label(hour: Hour) -> String {
    hour.to_string()
}

/// HUD text for a day counter.
pub fn day_label(day: u64) -> String {
    format!("Day {day}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use daycycle_types::{EnvironmentDescriptor, UNKNOWN_PHASE};

    use super::*;

    fn dawn() -> PhaseEntry {
        PhaseEntry {
            name: "Dawn".to_owned(),
            hour: Hour::new(6).unwrap(),
            environment: EnvironmentDescriptor {
                material: "sky_dawn".to_owned(),
                blend: true,
            },
        }
    }

    #[test]
    fn labels_are_formatted() {
        assert_eq!(time_label(Hour::new(8).unwrap()), "08:00");
        assert_eq!(time_label(Hour::new(23).unwrap()), "23:00");
        assert_eq!(day_label(3), "Day 3");
    }

    #[test]
    fn compose_with_blending_phase() {
        let entry = dawn();
        let update = EnvironmentUpdate::compose(
            Hour::new(6).unwrap(),
            0.25,
            Some(&entry),
            "Dawn",
            0.4,
            2,
            170.0,
            0.0,
        );
        assert_eq!(update.time_label, "06:00");
        assert_eq!(update.day_label, "Day 2");
        assert!(update.light.pitch.abs() < 1e-9);
        let skybox = update.skybox.unwrap();
        assert_eq!(skybox.material, "sky_dawn");
        assert!((skybox.blend_progress - 0.4).abs() < 1e-12);
    }

    #[test]
    fn compose_without_phase_leaves_skybox_alone() {
        let update = EnvironmentUpdate::compose(
            Hour::new(3).unwrap(),
            0.125,
            None,
            UNKNOWN_PHASE,
            0.0,
            0,
            170.0,
            0.0,
        );
        assert!(update.skybox.is_none());
        assert_eq!(update.phase_name, UNKNOWN_PHASE);
    }

    #[test]
    fn non_blending_phase_reports_zero_blend() {
        let mut entry = dawn();
        entry.environment.blend = false;
        let update = EnvironmentUpdate::compose(
            Hour::new(6).unwrap(),
            0.25,
            Some(&entry),
            "Dawn",
            0.7,
            0,
            170.0,
            0.0,
        );
        assert!(update.skybox.unwrap().blend_progress.abs() < 1e-12);
    }
}
