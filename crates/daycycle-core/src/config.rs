//! Configuration loading and typed config structures for the Daycycle
//! simulation.
//!
//! The canonical configuration lives in `daycycle-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure, a loader, and a validation pass that rejects
//! nonsensical values before the simulation starts.

use std::path::Path;

use daycycle_types::{EnvironmentDescriptor, Hour, Materialization, PhaseEntry, TargetId};
use serde::Deserialize;

use crate::schedule::ScheduledEntry;

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `daycycle-config.yaml`. Every section has
/// defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Clock settings.
    #[serde(default)]
    pub time: TimeConfig,

    /// Day/week counter settings.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Directional light orientation.
    #[serde(default)]
    pub lighting: LightingConfig,

    /// Phase table and skybox blending.
    #[serde(default)]
    pub skybox: SkyboxConfig,

    /// Scheduled objects and polling policy.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Objects of the headless scene.
    #[serde(default)]
    pub scene: SceneConfig,

    /// Host loop settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }

    /// Check every numeric setting for range and finiteness.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let time = &self.time;
        if !(time.day_duration_seconds.is_finite() && time.day_duration_seconds > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "time.day_duration_seconds",
                reason: format!("must be > 0 (got {})", time.day_duration_seconds),
            });
        }
        if !(time.initial_fraction.is_finite() && (0.0..1.0).contains(&time.initial_fraction)) {
            return Err(ConfigError::InvalidValue {
                field: "time.initial_fraction",
                reason: format!("must be in [0, 1) (got {})", time.initial_fraction),
            });
        }
        require_non_negative("skybox.blend_rate_per_second", self.skybox.blend_rate_per_second)?;
        require_non_negative(
            "schedule.check_interval_seconds",
            self.schedule.check_interval_seconds,
        )?;
        if let Some(delta) = self.engine.fixed_delta_seconds {
            require_non_negative("engine.fixed_delta_seconds", delta)?;
        }
        require_finite("lighting.yaw_degrees", self.lighting.yaw_degrees)?;
        require_finite("lighting.roll_degrees", self.lighting.roll_degrees)?;
        if self.engine.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.tick_interval_ms",
                reason: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }

    /// Build the phase table rows, in configured order.
    pub fn phase_entries(&self) -> Vec<PhaseEntry> {
        self.skybox
            .phases
            .iter()
            .map(|phase| PhaseEntry {
                name: phase.name.clone(),
                hour: phase.hour,
                environment: EnvironmentDescriptor {
                    material: phase.material.clone(),
                    blend: phase.blend,
                },
            })
            .collect()
    }

    /// Build the schedule entries, in configured order.
    pub fn scheduled_entries(&self) -> Vec<ScheduledEntry> {
        self.schedule
            .entries
            .iter()
            .map(|entry| {
                ScheduledEntry::new(
                    TargetId::from_name(&entry.target),
                    entry.target.clone(),
                    entry.appear_hour,
                    entry.disappear_hour,
                    Materialization::from_preserve_colliders(entry.preserve_colliders),
                )
            })
            .collect()
    }
}

/// Reject NaN and infinities.
fn require_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be finite (got {value})"),
        })
    }
}

/// Reject negative, NaN and infinite values.
fn require_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("must be >= 0 (got {value})"),
        });
    }
    Ok(())
}

/// Clock configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimeConfig {
    /// Real seconds for one full simulated day.
    #[serde(default = "default_day_duration_seconds")]
    pub day_duration_seconds: f64,

    /// Fraction of day at simulation start.
    #[serde(default = "default_initial_fraction")]
    pub initial_fraction: f64,

    /// Credit midnights jumped over by a single oversized step.
    #[serde(default)]
    pub catch_up_skipped_midnights: bool,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            day_duration_seconds: default_day_duration_seconds(),
            initial_fraction: default_initial_fraction(),
            catch_up_skipped_midnights: false,
        }
    }
}

/// Day/week counter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CalendarConfig {
    /// Day counter at simulation start.
    #[serde(default)]
    pub starting_day: u64,

    /// Week counter at simulation start.
    #[serde(default = "default_starting_week")]
    pub starting_week: u64,

    /// Days per week; 0 disables automatic week advance.
    #[serde(default = "default_days_per_week")]
    pub days_per_week: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            starting_day: 0,
            starting_week: default_starting_week(),
            days_per_week: default_days_per_week(),
        }
    }
}

/// Fixed axes of the directional light rotation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LightingConfig {
    /// Rotation about the vertical axis, in degrees.
    #[serde(default = "default_yaw_degrees")]
    pub yaw_degrees: f64,

    /// Rotation about the forward axis, in degrees.
    #[serde(default)]
    pub roll_degrees: f64,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            yaw_degrees: default_yaw_degrees(),
            roll_degrees: 0.0,
        }
    }
}

/// Phase table and skybox blending configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SkyboxConfig {
    /// Blend progress gained per real second while a blending phase is
    /// current.
    #[serde(default = "default_blend_rate_per_second")]
    pub blend_rate_per_second: f64,

    /// Ordered phase rows; the first row for an hour wins.
    #[serde(default = "default_phases")]
    pub phases: Vec<PhaseConfig>,
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self {
            blend_rate_per_second: default_blend_rate_per_second(),
            phases: default_phases(),
        }
    }
}

/// One configured phase row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhaseConfig {
    /// Display name.
    pub name: String,

    /// Hour the phase is bound to.
    pub hour: Hour,

    /// Skybox material identifier.
    pub material: String,

    /// Whether the material blends in via a transition factor.
    #[serde(default)]
    pub blend: bool,
}

/// Scheduled objects and polling policy.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between schedule checks; 0 checks only when the hour changes.
    #[serde(default)]
    pub check_interval_seconds: f64,

    /// Log every per-entry evaluation at debug level.
    #[serde(default)]
    pub debug: bool,

    /// Scheduled objects.
    #[serde(default)]
    pub entries: Vec<ScheduleEntryConfig>,
}

/// One configured scheduled object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleEntryConfig {
    /// Scene name of the target object.
    pub target: String,

    /// First hour of the visible window.
    pub appear_hour: Hour,

    /// First hour after the visible window.
    pub disappear_hour: Hour,

    /// Keep colliders enabled while the object is hidden.
    #[serde(default = "default_true")]
    pub preserve_colliders: bool,
}

/// Objects of the headless scene.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct SceneConfig {
    /// Scene objects.
    #[serde(default)]
    pub objects: Vec<SceneObjectConfig>,
}

/// One configured scene object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SceneObjectConfig {
    /// Unique scene name.
    pub name: String,

    /// Number of renderer components.
    #[serde(default = "default_component_count")]
    pub renderers: u32,

    /// Number of collider components.
    #[serde(default = "default_component_count")]
    pub colliders: u32,

    /// Whether the object is present when the scene loads.
    #[serde(default = "default_true")]
    pub initially_active: bool,
}

/// Host loop configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Fixed frame delta in seconds; measured wall-clock time when absent.
    #[serde(default)]
    pub fixed_delta_seconds: Option<f64>,

    /// Maximum number of ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// Read operator commands from standard input.
    #[serde(default = "default_true")]
    pub console: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            fixed_delta_seconds: None,
            max_ticks: 0,
            max_real_time_seconds: 0,
            console: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_day_duration_seconds() -> f64 {
    24.0
}

const fn default_initial_fraction() -> f64 {
    0.35
}

const fn default_starting_week() -> u64 {
    1
}

const fn default_days_per_week() -> u64 {
    7
}

const fn default_yaw_degrees() -> f64 {
    170.0
}

const fn default_blend_rate_per_second() -> f64 {
    1.0
}

const fn default_component_count() -> u32 {
    1
}

const fn default_tick_interval_ms() -> u64 {
    16
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

/// Default phase rows covering night, dawn, day and dusk.
fn default_phases() -> Vec<PhaseConfig> {
    [
        ("Midnight", 0, "skybox_night", false),
        ("Dawn", 5, "skybox_dawn_transition", true),
        ("Morning", 7, "skybox_morning", false),
        ("Noon", 12, "skybox_day", false),
        ("Dusk", 18, "skybox_dusk_transition", true),
        ("Night", 20, "skybox_night", false),
    ]
    .into_iter()
    .map(|(name, hour, material, blend)| PhaseConfig {
        name: name.to_owned(),
        hour: Hour::clamped(hour),
        material: material.to_owned(),
        blend,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.time.day_duration_seconds - 24.0).abs() < f64::EPSILON);
        assert!((config.time.initial_fraction - 0.35).abs() < f64::EPSILON);
        assert_eq!(config.calendar.starting_week, 1);
        assert_eq!(config.skybox.phases.len(), 6);
        assert!(config.schedule.entries.is_empty());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
time:
  day_duration_seconds: 120.0
  initial_fraction: 0.25
  catch_up_skipped_midnights: true

calendar:
  starting_day: 3
  starting_week: 2
  days_per_week: 5

lighting:
  yaw_degrees: 160.0
  roll_degrees: 5.0

skybox:
  blend_rate_per_second: 0.5
  phases:
    - { name: "Dawn", hour: 6, material: "sky_dawn", blend: true }
    - { name: "Night", hour: 21, material: "sky_night" }

schedule:
  check_interval_seconds: 0.5
  debug: true
  entries:
    - { target: "night_market", appear_hour: 22, disappear_hour: 6 }
    - { target: "farm_cart", appear_hour: 8, disappear_hour: 17, preserve_colliders: false }

scene:
  objects:
    - { name: "night_market", renderers: 3, colliders: 2 }
    - { name: "farm_cart" }

engine:
  tick_interval_ms: 33
  fixed_delta_seconds: 0.033
  max_ticks: 1000

logging:
  level: "debug"
  json: true
"#;

        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok(), "{config:?}");
        let config = config.ok().unwrap_or_default();
        assert!(config.validate().is_ok());

        assert!(config.time.catch_up_skipped_midnights);
        assert_eq!(config.calendar.days_per_week, 5);
        assert_eq!(config.skybox.phases.len(), 2);
        assert_eq!(config.schedule.entries.len(), 2);
        assert_eq!(config.scene.objects.len(), 2);
        assert_eq!(config.engine.max_ticks, 1000);
        assert!(config.logging.json);

        let entries = config.scheduled_entries();
        assert_eq!(
            entries.first().map(ScheduledEntry::materialization),
            Some(Materialization::RenderersOnly)
        );
        assert_eq!(
            entries.get(1).map(ScheduledEntry::materialization),
            Some(Materialization::WholeObject)
        );
        assert_eq!(
            entries.first().map(ScheduledEntry::target),
            Some(TargetId::from_name("night_market"))
        );

        let phases = config.phase_entries();
        assert!(phases.first().is_some_and(|p| p.environment.blend));
        assert!(phases.get(1).is_some_and(|p| !p.environment.blend));

        let cart = config.scene.objects.get(1);
        assert_eq!(cart.map(|o| o.renderers), Some(1));
    }

    #[test]
    fn parse_minimal_yaml() {
        let yaml = "time:\n  day_duration_seconds: 60.0\n";
        let config = SimulationConfig::parse(yaml);
        assert!(config.is_ok());
        let config = config.ok().unwrap_or_default();

        assert!((config.time.day_duration_seconds - 60.0).abs() < f64::EPSILON);
        // Everything else uses defaults
        assert!((config.time.initial_fraction - 0.35).abs() < f64::EPSILON);
        assert_eq!(config.skybox.phases.len(), 6);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn out_of_range_hour_is_rejected() {
        let yaml =
            "schedule:\n  entries:\n    - { target: x, appear_hour: 24, disappear_hour: 3 }\n";
        assert!(matches!(
            SimulationConfig::parse(yaml),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn non_positive_day_duration_is_rejected() {
        for bad in ["0.0", "-5.0"] {
            let yaml = format!("time:\n  day_duration_seconds: {bad}\n");
            let config = SimulationConfig::parse(&yaml).ok().unwrap_or_default();
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidValue {
                    field: "time.day_duration_seconds",
                    ..
                })
            ));
        }
    }

    #[test]
    fn negative_intervals_are_rejected() {
        let mut config = SimulationConfig::default();
        config.schedule.check_interval_seconds = -1.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.skybox.blend_rate_per_second = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.engine.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn initial_fraction_must_be_below_one() {
        let mut config = SimulationConfig::default();
        config.time.initial_fraction = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("daycycle-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            let valid = config.ok().unwrap_or_default().validate();
            assert!(valid.is_ok(), "Project config is invalid: {valid:?}");
        }
    }
}
