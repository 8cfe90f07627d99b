//! Tick cycle: the per-frame driver of the Daycycle simulation.
//!
//! Each tick runs these steps in a fixed order:
//!
//! 1. **Clock** -- advance the fraction of day by the frame delta and
//!    derive the hour.
//! 2. **Phase** -- select the phase bound to the hour and step skybox
//!    blend progress.
//! 3. **Calendar** -- feed the hour to the day counter; the midnight latch
//!    makes the day advance once per entry into hour 0.
//! 4. **Schedule** -- poll the schedule engine and hand every transition
//!    to the scene host.
//! 5. **Presentation** -- compose the environment update (HUD, light,
//!    skybox) and hand it to the scene host.
//!
//! The environment depends only on the clock and phase steps, but it is
//! emitted last so the HUD day label already reflects a rollover that
//! happened in the same tick.
//!
//! Nothing inside a tick is fatal. A bad frame delta is logged and
//! treated as a zero-length step; a missing scheduled object is logged
//! and skipped. Only setup can fail.

use daycycle_types::{Hour, StateDump};
use tracing::{debug, info, warn};

use crate::calendar::{DayCounter, Rollover};
use crate::clock::{Clock, ClockAdvance, ClockError};
use crate::config::{ConfigError, SimulationConfig};
use crate::operator::AdminCommand;
use crate::phase::PhaseTable;
use crate::presentation::EnvironmentUpdate;
use crate::scene::SceneHost;
use crate::schedule::ScheduleEngine;

/// Errors that can occur while building the simulation state.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// The configuration is invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The clock rejected its configuration.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Hour before the tick.
    pub previous_hour: Hour,
    /// Hour after the tick.
    pub hour: Hour,
    /// Fraction of day after the tick.
    pub fraction: f64,
    /// Current phase name, or the unknown-phase sentinel.
    pub phase_name: String,
    /// Skybox blend progress after the tick.
    pub blend_progress: f64,
    /// Day counter after the tick.
    pub day: u64,
    /// Week counter after the tick.
    pub week: u64,
    /// Whether the day counter advanced during the tick.
    pub day_advanced: bool,
    /// Whether the schedule was evaluated during the tick.
    pub schedule_evaluated: bool,
    /// Objects activated during the tick.
    pub activations: usize,
    /// Objects deactivated during the tick.
    pub deactivations: usize,
    /// Scheduled objects skipped because they were missing.
    pub skipped: usize,
}

impl TickSummary {
    /// Whether the tick moved the clock into a different hour.
    pub fn hour_changed(&self) -> bool {
        self.previous_hour != self.hour
    }
}

/// Result of an administrative command.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminOutcome {
    /// The command was applied.
    Applied,
    /// The command produced a state snapshot.
    Dump(StateDump),
    /// The command was rejected and nothing changed.
    Rejected(String),
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// The simulated clock.
    pub clock: Clock,
    /// The phase table and blend state.
    pub phases: PhaseTable,
    /// The day/week counter.
    pub calendar: DayCounter,
    /// The schedule engine.
    pub schedule: ScheduleEngine,
    /// Fixed light yaw, in degrees.
    pub yaw_degrees: f64,
    /// Fixed light roll, in degrees.
    pub roll_degrees: f64,
    /// Credit midnights that a single oversized step jumps over.
    pub catch_up_skipped_midnights: bool,
    /// Ticks executed so far.
    tick: u64,
}

impl SimulationState {
    /// Build the simulation state from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if the configuration is invalid; a
    /// non-positive day duration is always rejected.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let clock = Clock::new(config.time.day_duration_seconds, config.time.initial_fraction)?;
        let phases = PhaseTable::new(config.phase_entries(), config.skybox.blend_rate_per_second);
        let calendar = DayCounter::new(
            config.calendar.starting_day,
            config.calendar.starting_week,
            config.calendar.days_per_week,
        );
        let mut schedule =
            ScheduleEngine::new(config.schedule.check_interval_seconds, config.schedule.debug);
        for entry in config.scheduled_entries() {
            let _ = schedule.add_entry(entry);
        }

        info!(
            day_duration_seconds = clock.day_duration_seconds(),
            hour = clock.hour().value(),
            phases = phases.len(),
            scheduled = schedule.len(),
            "Simulation state created"
        );

        Ok(Self {
            clock,
            phases,
            calendar,
            schedule,
            yaw_degrees: config.lighting.yaw_degrees,
            roll_degrees: config.lighting.roll_degrees,
            catch_up_skipped_midnights: config.time.catch_up_skipped_midnights,
            tick: 0,
        })
    }

    /// Ticks executed so far.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Compose the environment update for the current state.
    pub fn environment(&self) -> EnvironmentUpdate {
        EnvironmentUpdate::compose(
            self.clock.hour(),
            self.clock.fraction(),
            self.phases.current_entry(),
            self.phases.current_phase_name(),
            self.phases.blend_progress(),
            self.calendar.day(),
            self.yaw_degrees,
            self.roll_degrees,
        )
    }

    /// Full introspection snapshot.
    pub fn dump(&self) -> StateDump {
        let hour = self.clock.hour();
        StateDump {
            tick: self.tick,
            hour,
            fraction: self.clock.fraction(),
            phase_name: self.phases.phase_name(hour).to_owned(),
            blend_progress: self.phases.blend_progress(),
            day: self.calendar.day(),
            week: self.calendar.week(),
            entries: self.schedule.dump(hour),
        }
    }
}

/// Prepare the scene before the first tick.
///
/// Discovers components for every scheduled object and hides them all, so
/// the scene agrees with the schedule's initial inactive state. The first
/// tick then activates whatever belongs to the starting hour.
pub fn start<H>(state: &mut SimulationState, host: &mut H)
where
    H: SceneHost + ?Sized,
{
    let initialized = state.schedule.initialize_all(&*host);
    for transition in state.schedule.reset_all(&*host) {
        host.apply_transition(&transition);
    }
    let _ = state.phases.select(state.clock.hour());
    host.apply_environment(&state.environment());
    info!(
        initialized,
        total = state.schedule.len(),
        hour = state.clock.hour().value(),
        "Scene prepared"
    );
}

/// Execute one tick with `delta_seconds` of real elapsed time.
///
/// Steps run in a fixed order: clock, phase, calendar, schedule,
/// presentation. See the module documentation.
pub fn run_tick<H>(state: &mut SimulationState, delta_seconds: f64, host: &mut H) -> TickSummary
where
    H: SceneHost + ?Sized,
{
    state.tick = state.tick.saturating_add(1);
    let tick = state.tick;

    // --- Clock ---
    let (advance, delta) = match state.clock.advance(delta_seconds) {
        Ok(advance) => (advance, delta_seconds),
        Err(err) => {
            warn!(tick, error = %err, "Frame delta rejected, treating as zero");
            let hour = state.clock.hour();
            let advance = ClockAdvance {
                previous_hour: hour,
                hour,
                midnights_crossed: 0,
            };
            (advance, 0.0)
        }
    };
    let hour = advance.hour;
    if advance.hour_changed() {
        debug!(tick, hour = hour.value(), "Hour changed");
    }

    // --- Phase ---
    let _ = state.phases.select(hour);
    let blend_progress = state.phases.advance_blend(delta);

    // --- Calendar ---
    let rollover = roll_calendar(state, &advance);
    if let Rollover::DayAdvanced { day, week } = rollover {
        host.on_day_advanced(day, week);
    }

    // --- Schedule ---
    let mut activations = 0_usize;
    let mut deactivations = 0_usize;
    let mut skipped = 0_usize;
    let report = state.schedule.poll(hour, delta, &*host);
    let schedule_evaluated = report.is_some();
    if let Some(report) = report {
        skipped = report.skipped.len();
        for transition in &report.transitions {
            if transition.kind.resulting_active() {
                activations = activations.saturating_add(1);
            } else {
                deactivations = deactivations.saturating_add(1);
            }
            host.apply_transition(transition);
        }
    }

    // --- Presentation ---
    host.apply_environment(&state.environment());

    TickSummary {
        tick,
        previous_hour: advance.previous_hour,
        hour,
        fraction: state.clock.fraction(),
        phase_name: state.phases.current_phase_name().to_owned(),
        blend_progress,
        day: state.calendar.day(),
        week: state.calendar.week(),
        day_advanced: rollover.is_day_advanced(),
        schedule_evaluated,
        activations,
        deactivations,
        skipped,
    }
}

/// Feed the hour to the day counter, then credit any midnights the step
/// jumped over when catch-up is enabled.
fn roll_calendar(state: &mut SimulationState, advance: &ClockAdvance) -> Rollover {
    let latched = state.calendar.check_rollover(advance.hour);
    if !state.catch_up_skipped_midnights {
        return latched;
    }
    let counted = u64::from(latched.is_day_advanced());
    let missed = advance.midnights_crossed.saturating_sub(counted);
    if missed == 0 {
        return latched;
    }
    warn!(missed, "Step skipped past midnight, crediting missed days");
    state.calendar.catch_up(missed)
}

/// Apply an administrative command.
///
/// Hour and fraction jumps force a schedule re-check on the next tick.
pub fn apply_admin_command<H>(
    state: &mut SimulationState,
    command: &AdminCommand,
    host: &mut H,
) -> AdminOutcome
where
    H: SceneHost + ?Sized,
{
    info!(?command, "Admin command");
    match *command {
        AdminCommand::ForceCheck => state.schedule.force_check(),
        AdminCommand::ResetSchedules => {
            for transition in state.schedule.reset_all(&*host) {
                host.apply_transition(&transition);
            }
        }
        AdminCommand::ReinitializeComponents => {
            let _ = state.schedule.reinitialize_components(&*host);
        }
        AdminCommand::DumpState => {
            let dump = state.dump();
            match serde_json::to_string(&dump) {
                Ok(json) => info!(dump = json.as_str(), "State dump"),
                Err(err) => warn!(error = %err, "Failed to serialize state dump"),
            }
            return AdminOutcome::Dump(dump);
        }
        AdminCommand::JumpToHour(hour) => {
            state.clock.set_hour(hour);
            state.schedule.force_check();
        }
        AdminCommand::SetFraction(fraction) => {
            state.clock.set_fraction(fraction);
            state.schedule.force_check();
        }
        AdminCommand::SetDayDuration(seconds) => {
            if let Err(err) = state.clock.set_day_duration(seconds) {
                warn!(error = %err, "Day duration rejected");
                return AdminOutcome::Rejected(err.to_string());
            }
        }
        AdminCommand::AdvanceDay => {
            if let Rollover::DayAdvanced { day, week } = state.calendar.advance_day() {
                host.on_day_advanced(day, week);
                host.apply_environment(&state.environment());
            }
        }
        AdminCommand::AdvanceWeek => {
            let _ = state.calendar.advance_week();
        }
    }
    AdminOutcome::Applied
}
