//! Day and week counting driven by the simulated hour.
//!
//! The counter is fed the hour once per tick. A one-shot latch makes the
//! day advance exactly once per entry into hour 0, no matter how many
//! consecutive ticks land on that hour. The latch is cleared by the first
//! tick whose hour is not 0.

use daycycle_types::Hour;
use tracing::info;

/// Result of a rollover check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// No day boundary was crossed on this tick.
    None,
    /// A new day started.
    DayAdvanced {
        /// Day counter after the increment.
        day: u64,
        /// Week counter after the increment.
        week: u64,
    },
}

impl Rollover {
    /// Whether a new day started.
    pub const fn is_day_advanced(self) -> bool {
        matches!(self, Self::DayAdvanced { .. })
    }
}

/// Day/week counter with a midnight latch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCounter {
    /// Days elapsed.
    day: u64,

    /// Current week, starting at 1.
    week: u64,

    /// Days per week; 0 means weeks only advance on request.
    days_per_week: u64,

    /// Set once hour 0 has been counted, cleared when the hour moves on.
    midnight_latched: bool,
}

impl DayCounter {
    /// Create a counter at the given day and week.
    ///
    /// A starting week of 0 is raised to 1.
    pub fn new(day: u64, week: u64, days_per_week: u64) -> Self {
        Self {
            day,
            week: week.max(1),
            days_per_week,
            midnight_latched: false,
        }
    }

    /// Feed the current hour. Returns [`Rollover::DayAdvanced`] on the
    /// first tick at hour 0 after any tick at a different hour.
    pub fn check_rollover(&mut self, hour: Hour) -> Rollover {
        if !hour.is_midnight() {
            self.midnight_latched = false;
            return Rollover::None;
        }
        if self.midnight_latched {
            return Rollover::None;
        }
        self.midnight_latched = true;
        self.advance_day()
    }

    /// Credit `missed` midnights that a single oversized step jumped over
    /// without landing on hour 0. Returns the counters after crediting.
    ///
    /// Runs in constant time however many days are credited.
    pub fn catch_up(&mut self, missed: u64) -> Rollover {
        if missed == 0 {
            return Rollover::None;
        }
        let before = self.day;
        self.day = self.day.saturating_add(missed);
        let weeks_crossed = match (
            self.day.checked_div(self.days_per_week),
            before.checked_div(self.days_per_week),
        ) {
            (Some(weeks_after), Some(weeks_before)) => weeks_after.saturating_sub(weeks_before),
            _ => 0,
        };
        self.week = self.week.saturating_add(weeks_crossed);
        info!(
            credited = self.day.saturating_sub(before),
            day = self.day,
            week = self.week,
            "Missed days credited"
        );
        Rollover::DayAdvanced {
            day: self.day,
            week: self.week,
        }
    }

    /// Advance the week counter by one.
    pub fn advance_week(&mut self) -> u64 {
        self.week = self.week.saturating_add(1);
        info!(week = self.week, "New week");
        self.week
    }

    /// Return the current day.
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// Return the current week.
    pub const fn week(&self) -> u64 {
        self.week
    }

    /// Return the configured days per week.
    pub const fn days_per_week(&self) -> u64 {
        self.days_per_week
    }

    /// Whether the midnight latch is currently set.
    pub const fn is_latched(&self) -> bool {
        self.midnight_latched
    }

    /// Increment the day and roll the week when a week boundary is hit.
    ///
    /// Used by the midnight latch and by the manual day advance command.
    pub fn advance_day(&mut self) -> Rollover {
        self.day = self.day.saturating_add(1);
        info!(day = self.day, "New day");
        let week_boundary = self
            .day
            .checked_rem(self.days_per_week)
            .is_some_and(|rem| rem == 0);
        if week_boundary {
            let _ = self.advance_week();
        }
        Rollover::DayAdvanced {
            day: self.day,
            week: self.week,
        }
    }
}

impl Default for DayCounter {
    fn default() -> Self {
        Self::new(0, 1, 7)
    }
}
