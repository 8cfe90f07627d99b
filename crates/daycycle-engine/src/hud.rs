//! Tick callback that renders the HUD to the log.
//!
//! The headless engine has no screen, so the HUD is a log line emitted
//! whenever the displayed text would change: a new hour, a new day, or a
//! new phase.

use daycycle_core::operator::AdminCommand;
use daycycle_core::presentation::{day_label, time_label};
use daycycle_core::runner::TickCallback;
use daycycle_core::tick::{AdminOutcome, SimulationState, TickSummary};
use tracing::{debug, info, warn};

/// Logs HUD text when it changes.
#[derive(Debug, Default)]
pub struct HudCallback {
    /// Text shown after the last tick.
    shown: Option<HudText>,
}

/// The three strings the HUD displays.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HudText {
    time: String,
    day: String,
    phase: String,
}

impl HudCallback {
    /// Create a callback that has shown nothing yet.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TickCallback for HudCallback {
    fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
        let text = HudText {
            time: time_label(summary.hour),
            day: day_label(summary.day),
            phase: summary.phase_name.clone(),
        };
        if self.shown.as_ref() != Some(&text) {
            info!(
                time = text.time.as_str(),
                day = text.day.as_str(),
                week = summary.week,
                phase = text.phase.as_str(),
                "HUD"
            );
            self.shown = Some(text);
        }
        if summary.activations > 0 || summary.deactivations > 0 {
            debug!(
                tick = summary.tick,
                activations = summary.activations,
                deactivations = summary.deactivations,
                skipped = summary.skipped,
                "Schedule transitions applied"
            );
        }
    }

    fn on_admin(&mut self, command: &AdminCommand, outcome: &AdminOutcome) {
        match outcome {
            AdminOutcome::Applied => info!(?command, "Admin command applied"),
            AdminOutcome::Dump(dump) => info!(
                hour = dump.hour.value(),
                day = dump.day,
                week = dump.week,
                entries = dump.entries.len(),
                "State dumped"
            ),
            AdminOutcome::Rejected(reason) => {
                warn!(?command, reason = reason.as_str(), "Admin command rejected");
            }
        }
        // Redraw on the next tick.
        self.shown = None;
    }
}
