//! Phase table: hour-keyed environment phases and skybox blend progress.
//!
//! The table is an ordered list of [`PhaseEntry`] rows configured at
//! startup and never mutated afterwards. Lookup is a linear scan that
//! returns the first row bound to the queried hour, so duplicate hours are
//! allowed and resolved by position.
//!
//! Blend progress is tracked separately from phase selection: the table
//! remembers which row is current, and [`PhaseTable::advance_blend`] only
//! accumulates while that row's descriptor requests blending. Hours with no
//! row are valid; they report the unknown-phase sentinel and leave the
//! skybox alone.

use daycycle_types::{Hour, PhaseEntry, UNKNOWN_PHASE};
use tracing::debug;

/// Default blend rate: a full transition in one real second.
pub const DEFAULT_BLEND_RATE_PER_SECOND: f64 = 1.0;

/// Transition progress of the current phase's skybox.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendState {
    /// Progress in `[0, 1]`.
    progress: f64,
}

impl BlendState {
    /// Return the current progress.
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Step progress forward by `amount`, clamped to `[0, 1]`.
    fn step(&mut self, amount: f64) {
        self.progress = (self.progress + amount).clamp(0.0, 1.0);
    }

    /// Drop progress back to zero.
    const fn reset(&mut self) {
        self.progress = 0.0;
    }
}

/// Ordered hour-to-phase table with blend tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    /// Configured rows, in lookup order.
    entries: Vec<PhaseEntry>,

    /// Index of the row matched by the last [`select`](Self::select).
    current: Option<usize>,

    /// Blend progress of the current row.
    blend: BlendState,

    /// Progress gained per real second while blending.
    blend_rate_per_second: f64,
}

impl PhaseTable {
    /// Create a table from configured rows.
    ///
    /// Non-finite or negative blend rates fall back to
    /// [`DEFAULT_BLEND_RATE_PER_SECOND`]; configuration validation rejects
    /// them before they get here.
    pub fn new(entries: Vec<PhaseEntry>, blend_rate_per_second: f64) -> Self {
        let blend_rate_per_second =
            if blend_rate_per_second.is_finite() && blend_rate_per_second >= 0.0 {
                blend_rate_per_second
            } else {
                DEFAULT_BLEND_RATE_PER_SECOND
            };
        Self {
            entries,
            current: None,
            blend: BlendState::default(),
            blend_rate_per_second,
        }
    }

    /// Return the first row bound to `hour`, if any.
    pub fn lookup(&self, hour: Hour) -> Option<&PhaseEntry> {
        self.entries.iter().find(|entry| entry.hour == hour)
    }

    /// Make the first row bound to `hour` the current phase.
    ///
    /// Switching away from a blending row resets blend progress so it
    /// cannot bleed into the next phase. Returns the selected row.
    pub fn select(&mut self, hour: Hour) -> Option<&PhaseEntry> {
        let matched = self.entries.iter().position(|entry| entry.hour == hour);
        if matched != self.current {
            if self.current_entry().is_some_and(|entry| entry.environment.blend) {
                self.blend.reset();
            }
            debug!(
                hour = hour.value(),
                phase = matched
                    .and_then(|idx| self.entries.get(idx))
                    .map_or(UNKNOWN_PHASE, |entry| entry.name.as_str()),
                "Phase changed"
            );
            self.current = matched;
        }
        self.current_entry()
    }

    /// Advance blend progress by `delta_seconds` of real time.
    ///
    /// Progress grows (clamped at 1) only while the current row requests
    /// blending; otherwise it is reset to 0. Returns the new progress.
    pub fn advance_blend(&mut self, delta_seconds: f64) -> f64 {
        let blending = self
            .current_entry()
            .is_some_and(|entry| entry.environment.blend);
        if blending {
            let delta = if delta_seconds.is_finite() {
                delta_seconds.max(0.0)
            } else {
                0.0
            };
            self.blend.step(delta * self.blend_rate_per_second);
        } else {
            self.blend.reset();
        }
        self.blend.progress()
    }

    /// Return the current row, if the current hour has one.
    pub fn current_entry(&self) -> Option<&PhaseEntry> {
        self.current.and_then(|idx| self.entries.get(idx))
    }

    /// Name of the current phase, or the unknown-phase sentinel.
    pub fn current_phase_name(&self) -> &str {
        self.current_entry()
            .map_or(UNKNOWN_PHASE, |entry| entry.name.as_str())
    }

    /// Name of the phase bound to `hour`, or the unknown-phase sentinel.
    pub fn phase_name(&self, hour: Hour) -> &str {
        self.lookup(hour)
            .map_or(UNKNOWN_PHASE, |entry| entry.name.as_str())
    }

    /// Return the current blend progress.
    pub const fn blend_progress(&self) -> f64 {
        self.blend.progress()
    }

    /// Return all configured rows.
    pub fn entries(&self) -> &[PhaseEntry] {
        &self.entries
    }

    /// Return the number of configured rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use daycycle_types::EnvironmentDescriptor;

    use super::*;

    fn hour(value: u8) -> Hour {
        Hour::new(value).unwrap()
    }

    fn entry(name: &str, at: u8, material: &str, blend: bool) -> PhaseEntry {
        PhaseEntry {
            name: name.to_owned(),
            hour: hour(at),
            environment: EnvironmentDescriptor {
                material: material.to_owned(),
                blend,
            },
        }
    }

    fn sample_table() -> PhaseTable {
        PhaseTable::new(
            vec![
                entry("Midnight", 0, "sky_night", false),
                entry("Dawn", 6, "sky_dawn_transition", true),
                entry("Noon", 12, "sky_day", false),
                entry("Dusk", 18, "sky_dusk_transition", true),
                entry("Dawn Duplicate", 6, "sky_unused", false),
            ],
            DEFAULT_BLEND_RATE_PER_SECOND,
        )
    }

    #[test]
    fn lookup_finds_configured_hour() {
        let table = sample_table();
        assert_eq!(table.lookup(hour(12)).map(|e| e.name.as_str()), Some("Noon"));
    }

    #[test]
    fn lookup_miss_returns_none() {
        let table = sample_table();
        assert!(table.lookup(hour(3)).is_none());
        assert_eq!(table.phase_name(hour(3)), UNKNOWN_PHASE);
    }

    #[test]
    fn duplicate_hour_returns_first_match() {
        let table = sample_table();
        let found = table.lookup(hour(6)).unwrap();
        assert_eq!(found.name, "Dawn");
        assert_eq!(found.environment.material, "sky_dawn_transition");
    }

    #[test]
    fn current_phase_name_tracks_selection() {
        let mut table = sample_table();
        assert_eq!(table.current_phase_name(), UNKNOWN_PHASE);
        let _ = table.select(hour(18));
        assert_eq!(table.current_phase_name(), "Dusk");
        let _ = table.select(hour(19));
        assert_eq!(table.current_phase_name(), UNKNOWN_PHASE);
    }

    #[test]
    fn blend_increases_monotonically_and_clamps() {
        let mut table = sample_table();
        let _ = table.select(hour(6));
        let mut last = table.blend_progress();
        for _ in 0..30 {
            let progress = table.advance_blend(0.1);
            assert!(progress >= last);
            assert!(progress <= 1.0);
            last = progress;
        }
        assert!((last - 1.0).abs() < 1e-12);
    }

    #[test]
    fn blend_resets_on_non_blending_phase() {
        let mut table = sample_table();
        let _ = table.select(hour(6));
        let _ = table.advance_blend(0.4);
        assert!(table.blend_progress() > 0.0);

        let _ = table.select(hour(12));
        let progress = table.advance_blend(0.4);
        assert!(progress.abs() < 1e-12);
    }

    #[test]
    fn blend_resets_when_leaving_blending_phase_for_another() {
        let mut table = sample_table();
        let _ = table.select(hour(6));
        let _ = table.advance_blend(0.5);
        let _ = table.select(hour(18));
        assert!(table.blend_progress().abs() < 1e-12);
        let progress = table.advance_blend(0.25);
        assert!((progress - 0.25).abs() < 1e-12);
    }

    #[test]
    fn blend_resets_on_unknown_hour() {
        let mut table = sample_table();
        let _ = table.select(hour(18));
        let _ = table.advance_blend(0.5);
        let _ = table.select(hour(19));
        assert!(table.advance_blend(0.5).abs() < 1e-12);
    }

    #[test]
    fn reselecting_same_phase_keeps_progress() {
        let mut table = sample_table();
        let _ = table.select(hour(6));
        let _ = table.advance_blend(0.3);
        let _ = table.select(hour(6));
        let progress = table.advance_blend(0.3);
        assert!((progress - 0.6).abs() < 1e-9);
    }

    #[test]
    fn blend_rate_scales_progress() {
        let mut table = PhaseTable::new(vec![entry("Dawn", 6, "sky", true)], 0.5);
        let _ = table.select(hour(6));
        let progress = table.advance_blend(1.0);
        assert!((progress - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_table_is_always_unknown() {
        let mut table = PhaseTable::new(Vec::new(), DEFAULT_BLEND_RATE_PER_SECOND);
        assert!(table.is_empty());
        assert!(table.select(hour(0)).is_none());
        assert_eq!(table.current_phase_name(), UNKNOWN_PHASE);
    }
}
