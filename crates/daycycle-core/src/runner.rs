//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives the tick loop with support for:
//!
//! - **Bounded simulation**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Pause/resume**: operator can halt and continue the tick loop
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **Administrative commands**: applied in submission order before a tick
//! - **Operator stop**: immediate clean stop
//!
//! The runner wraps the single-tick [`run_tick`] function and adds the
//! control plane around it. Frame deltas are either fixed or measured
//! with a monotonic clock; time spent paused is never fed to the clock.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use tokio::time::{Duration, Instant};
use tracing::{info, warn};

use crate::operator::{AdminCommand, OperatorState, SimulationEndReason};
use crate::scene::SceneHost;
use crate::tick::{self, AdminOutcome, SimulationState, TickSummary};

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to render a HUD, record summaries, etc.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);

    /// Called after an administrative command was applied.
    fn on_admin(&mut self, _command: &AdminCommand, _outcome: &AdminOutcome) {}
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// # Arguments
///
/// * `state` - Mutable simulation state (clock, phases, calendar, schedule)
/// * `host` - Scene the tick cycle presents into
/// * `operator` - Shared operator control state
/// * `callback` - Called after each tick
/// * `fixed_delta_seconds` - Frame delta to use instead of measured time
pub async fn run_simulation(
    state: &mut SimulationState,
    host: &mut dyn SceneHost,
    operator: &Arc<OperatorState>,
    callback: &mut dyn TickCallback,
    fixed_delta_seconds: Option<f64>,
) -> SimulationResult {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut last_instant = Instant::now();

    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        fixed_delta_seconds,
        "Simulation starting"
    );

    loop {
        // --- Check pause ---
        if operator.is_paused() {
            info!("Simulation paused, waiting for resume...");
            operator.wait_if_paused().await;
            info!("Simulation resumed");
            last_instant = Instant::now();
        }

        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return finish(
                operator,
                SimulationEndReason::OperatorStop,
                last_summary,
                total_ticks,
            )
            .await;
        }

        // --- Check time limit (before tick) ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            return finish(
                operator,
                SimulationEndReason::MaxRealTimeReached,
                last_summary,
                total_ticks,
            )
            .await;
        }

        // --- Administrative commands ---
        for command in operator.drain_commands().await {
            let outcome = tick::apply_admin_command(state, &command, host);
            callback.on_admin(&command, &outcome);
        }

        // --- Execute tick ---
        let now = Instant::now();
        let delta = fixed_delta_seconds
            .unwrap_or_else(|| now.duration_since(last_instant).as_secs_f64());
        last_instant = now;

        let summary = tick::run_tick(state, delta, host);
        total_ticks = total_ticks.saturating_add(1);

        // --- Notify callback ---
        callback.on_tick(&summary, state);

        // --- Check tick limit (after tick) ---
        if operator.tick_limit_reached(summary.tick) {
            info!(
                tick = summary.tick,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return finish(
                operator,
                SimulationEndReason::MaxTicksReached,
                Some(summary),
                total_ticks,
            )
            .await;
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 {
            tokio::time::sleep(Duration::from_millis(interval_ms)).await;
        }
    }
}

/// Record the end reason and build the result.
async fn finish(
    operator: &OperatorState,
    reason: SimulationEndReason,
    final_summary: Option<TickSummary>,
    total_ticks: u64,
) -> SimulationResult {
    operator.set_end_reason(reason.clone()).await;
    SimulationResult {
        end_reason: reason,
        final_summary,
        total_ticks,
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            hour = summary.hour.value(),
            phase = summary.phase_name.as_str(),
            day = summary.day,
            week = summary.week,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use daycycle_types::Hour;

    use super::*;
    use crate::config::{EngineConfig, SimulationConfig};
    use crate::scene::SceneRegistry;

    fn make_state() -> (SimulationState, SceneRegistry) {
        let config = SimulationConfig::default();
        let mut state = SimulationState::from_config(&config).unwrap();
        let mut scene = SceneRegistry::new();
        tick::start(&mut state, &mut scene);
        (state, scene)
    }

    fn make_operator(max_ticks: u64) -> Arc<OperatorState> {
        Arc::new(OperatorState::new(&EngineConfig {
            tick_interval_ms: 1,
            max_ticks,
            ..EngineConfig::default()
        }))
    }

    #[tokio::test]
    async fn bounded_by_max_ticks() {
        let (mut state, mut scene) = make_state();
        let operator = make_operator(5);
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &mut scene, &operator, &mut cb, Some(0.5)).await;

        assert_eq!(result.end_reason, SimulationEndReason::MaxTicksReached);
        assert_eq!(result.total_ticks, 5);
        assert_eq!(
            operator.end_reason().await,
            Some(SimulationEndReason::MaxTicksReached)
        );
    }

    #[tokio::test]
    async fn operator_stop() {
        let (mut state, mut scene) = make_state();
        let operator = make_operator(0);
        operator.request_stop();
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &mut scene, &operator, &mut cb, None).await;

        assert_eq!(result.end_reason, SimulationEndReason::OperatorStop);
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
    }

    #[tokio::test]
    async fn fixed_delta_drives_the_clock() {
        let (mut state, mut scene) = make_state();
        let operator = make_operator(4);
        let mut cb = NoOpCallback;

        // Default day: 24 s, starting at 0.35 (08:24). Four 1.5 s steps = 6 h.
        let result = run_simulation(&mut state, &mut scene, &operator, &mut cb, Some(1.5)).await;

        assert_eq!(result.final_summary.map(|s| s.hour), Hour::new(14));
    }

    #[tokio::test]
    async fn queued_commands_apply_before_tick() {
        let (mut state, mut scene) = make_state();
        let operator = make_operator(1);
        operator.submit_command(AdminCommand::JumpToHour(12)).await;
        let mut cb = NoOpCallback;

        let result = run_simulation(&mut state, &mut scene, &operator, &mut cb, Some(0.0)).await;

        let summary = result.final_summary.unwrap();
        assert_eq!(summary.hour, Hour::new(12).unwrap());
        assert_eq!(summary.phase_name, "Noon");
    }

    #[tokio::test]
    async fn tick_callback_is_called() {
        struct CountCallback {
            ticks: u64,
            admin: u64,
        }
        impl TickCallback for CountCallback {
            fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {
                self.ticks = self.ticks.saturating_add(1);
            }

            fn on_admin(&mut self, _command: &AdminCommand, _outcome: &AdminOutcome) {
                self.admin = self.admin.saturating_add(1);
            }
        }

        let (mut state, mut scene) = make_state();
        let operator = make_operator(3);
        operator.submit_command(AdminCommand::DumpState).await;
        let mut cb = CountCallback { ticks: 0, admin: 0 };

        let _ = run_simulation(&mut state, &mut scene, &operator, &mut cb, Some(0.1)).await;

        assert_eq!(cb.ticks, 3);
        assert_eq!(cb.admin, 1);
    }

    #[test]
    fn variable_speed_changes_interval() {
        let operator = make_operator(0);
        assert_eq!(operator.tick_interval_ms(), 1);
        let _ = operator.set_tick_interval_ms(500);
        assert_eq!(operator.tick_interval_ms(), 500);
    }
}
