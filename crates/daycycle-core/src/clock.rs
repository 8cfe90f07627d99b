//! Simulated clock for the Daycycle simulation.
//!
//! The clock is the single source of truth for simulated time. It
//! accumulates real elapsed seconds into a normalized fraction of a day
//! and derives the whole hour from it.
//!
//! # Design Principles
//!
//! - The fraction is the source of truth; the hour is recomputed on every
//!   mutation and never drifts from `floor(fraction * 24)`.
//! - The fraction always stays in `[0, 1)`. Values that would land on or
//!   above `1.0` wrap (when advancing) or clamp (when set directly).
//! - This is the only component that consumes real elapsed time.

use daycycle_types::Hour;

/// Largest fraction strictly below one day.
const MAX_FRACTION: f64 = 1.0 - f64::EPSILON;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Invalid time configuration (e.g. a non-positive day duration).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// A frame delta was negative or not a finite number.
    #[error("invalid frame delta: {delta_seconds}")]
    InvalidDelta {
        /// The rejected delta.
        delta_seconds: f64,
    },
}

/// Outcome of a single [`Clock::advance`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockAdvance {
    /// Hour before the step.
    pub previous_hour: Hour,
    /// Hour after the step.
    pub hour: Hour,
    /// How many times the fraction wrapped past midnight during the step.
    pub midnights_crossed: u64,
}

impl ClockAdvance {
    /// Whether the step moved the clock into a different hour.
    pub fn hour_changed(&self) -> bool {
        self.previous_hour != self.hour
    }
}

/// Simulated time of day.
#[derive(Debug, Clone, PartialEq)]
pub struct Clock {
    /// Normalized time of day in `[0, 1)`; 0.0 is midnight.
    fraction: f64,

    /// Whole hour derived from `fraction`.
    hour: Hour,

    /// Real seconds for one full simulated day.
    day_duration_seconds: f64,
}

impl Clock {
    /// Create a clock with the given day duration and starting fraction.
    ///
    /// The starting fraction is clamped into `[0, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `day_duration_seconds` is
    /// not a finite positive number.
    pub fn new(day_duration_seconds: f64, initial_fraction: f64) -> Result<Self, ClockError> {
        validate_day_duration(day_duration_seconds)?;
        let fraction = clamp_fraction(initial_fraction);
        Ok(Self {
            fraction,
            hour: Hour::from_fraction(fraction),
            day_duration_seconds,
        })
    }

    /// Advance by `delta_seconds` of real time using the configured day
    /// duration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDelta`] for a negative or non-finite
    /// delta. The clock is left untouched in that case.
    pub fn advance(&mut self, delta_seconds: f64) -> Result<ClockAdvance, ClockError> {
        self.advance_by(delta_seconds, self.day_duration_seconds)
    }

    /// Advance by `delta_seconds` of real time against an explicit day
    /// duration.
    ///
    /// `fraction += delta / duration`, then `fraction -= floor(fraction)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `day_duration_seconds` is
    /// not positive, or [`ClockError::InvalidDelta`] for a bad delta.
    pub fn advance_by(
        &mut self,
        delta_seconds: f64,
        day_duration_seconds: f64,
    ) -> Result<ClockAdvance, ClockError> {
        validate_day_duration(day_duration_seconds)?;
        if !delta_seconds.is_finite() || delta_seconds < 0.0 {
            return Err(ClockError::InvalidDelta { delta_seconds });
        }

        let previous_hour = self.hour;
        let accumulated = self.fraction + delta_seconds / day_duration_seconds;
        if !accumulated.is_finite() {
            return Err(ClockError::InvalidDelta { delta_seconds });
        }

        let whole_days = accumulated.floor();
        let mut wrapped = accumulated - whole_days;
        // Rounding can leave exactly 1.0 behind.
        if wrapped >= 1.0 {
            wrapped = 0.0;
        }

        self.fraction = wrapped;
        self.hour = Hour::from_fraction(wrapped);

        Ok(ClockAdvance {
            previous_hour,
            hour: self.hour,
            midnights_crossed: whole_days_to_count(whole_days),
        })
    }

    /// Return the current hour.
    pub const fn hour(&self) -> Hour {
        self.hour
    }

    /// Return the current fraction of day.
    pub const fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Return the configured real seconds per simulated day.
    pub const fn day_duration_seconds(&self) -> f64 {
        self.day_duration_seconds
    }

    /// Change the day duration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the duration is not a
    /// finite positive number.
    pub fn set_day_duration(&mut self, day_duration_seconds: f64) -> Result<(), ClockError> {
        validate_day_duration(day_duration_seconds)?;
        self.day_duration_seconds = day_duration_seconds;
        Ok(())
    }

    /// Set the fraction of day directly, clamped into `[0, 1)`.
    /// The hour is recomputed immediately.
    pub fn set_fraction(&mut self, fraction: f64) {
        self.fraction = clamp_fraction(fraction);
        self.hour = Hour::from_fraction(self.fraction);
    }

    /// Jump to the start of an hour, clamped into `[0, 23]`.
    /// The fraction is recomputed immediately.
    pub fn set_hour(&mut self, hour: i64) {
        let hour = Hour::clamped(hour);
        let mut fraction = hour.start_fraction();
        if Hour::from_fraction(fraction) < hour {
            // `h / 24` can round to just below the hour boundary.
            fraction += f64::EPSILON;
        }
        self.fraction = fraction;
        self.hour = hour;
    }
}

/// Reject non-positive or non-finite day durations.
fn validate_day_duration(day_duration_seconds: f64) -> Result<(), ClockError> {
    if day_duration_seconds.is_finite() && day_duration_seconds > 0.0 {
        Ok(())
    } else {
        Err(ClockError::InvalidConfig {
            reason: format!("day_duration_seconds must be > 0 (got {day_duration_seconds})"),
        })
    }
}

/// Clamp a fraction into `[0, 1)`; NaN maps to midnight.
fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, MAX_FRACTION)
    }
}

/// Convert the floored day count of an advance into a crossing count.
fn whole_days_to_count(whole_days: f64) -> u64 {
    if whole_days <= 0.0 {
        return 0;
    }
    // Finite and positive here; saturates for absurdly large steps.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = whole_days as u64;
    count
}
