//! Operator control state for runtime simulation management.
//!
//! This module provides shared state used by the tick loop and whatever
//! front-end the operator drives it from (the engine's stdin console, a
//! signal handler, tests). The operator can pause/resume, change tick
//! speed, queue administrative commands, and trigger a clean shutdown,
//! all without stopping the process.
//!
//! # Architecture
//!
//! Control flags use [`std::sync::atomic`] types so the tick loop reads
//! them without locks on the hot path. The command queue and end reason
//! sit behind a [`tokio::sync::Mutex`] and are touched once per tick.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::EngineConfig;

/// Smallest accepted tick interval, in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 1;

/// Reason why the simulation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// An operator issued a stop command.
    OperatorStop,
}

/// Administrative command applied at the start of the next tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "snake_case")]
pub enum AdminCommand {
    /// Re-evaluate every schedule on the next tick.
    ForceCheck,
    /// Deactivate every scheduled object.
    ResetSchedules,
    /// Drop cached component handles and discover them again.
    ReinitializeComponents,
    /// Log a full state snapshot.
    DumpState,
    /// Jump to the start of an hour (clamped into `[0, 23]`).
    JumpToHour(i64),
    /// Set the fraction of day (clamped into `[0, 1)`).
    SetFraction(f64),
    /// Change the real seconds per simulated day.
    SetDayDuration(f64),
    /// Start the next day immediately.
    AdvanceDay,
    /// Advance the week counter by one.
    AdvanceWeek,
}

/// Shared operator control state.
///
/// Wrapped in [`std::sync::Arc`] and shared between the tick loop and
/// operator front-ends.
#[derive(Debug)]
pub struct OperatorState {
    /// Whether the simulation is currently paused.
    paused: AtomicBool,

    /// Notification used to wake the tick loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Wall-clock time when the simulation started.
    started_at: DateTime<Utc>,

    /// Maximum number of ticks (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Administrative commands awaiting the next tick.
    commands: Mutex<Vec<AdminCommand>>,

    /// Reason the simulation ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl OperatorState {
    /// Create a new operator state from engine configuration.
    pub fn new(engine: &EngineConfig) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            tick_interval_ms: AtomicU64::new(engine.tick_interval_ms.max(MIN_TICK_INTERVAL_MS)),
            started_at: Utc::now(),
            max_ticks: engine.max_ticks,
            max_real_time_seconds: engine.max_real_time_seconds,
            commands: Mutex::new(Vec::new()),
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the simulation is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the simulation. The tick loop will sleep until resumed.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the simulation and wake the tick loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the simulation is no longer paused.
    ///
    /// Returns immediately if not paused. A stop request also wakes the
    /// waiter so a paused simulation can still shut down.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean simulation stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Record the reason the simulation ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the simulation ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        self.end_reason.lock().await.clone()
    }

    // -----------------------------------------------------------------------
    // Tick Speed
    // -----------------------------------------------------------------------

    /// Get the current tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Set the tick interval in milliseconds.
    ///
    /// Returns the previous interval on success, or `None` if the value
    /// was below [`MIN_TICK_INTERVAL_MS`].
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms < MIN_TICK_INTERVAL_MS {
            return None;
        }
        let prev = self.tick_interval_ms.swap(ms, Ordering::AcqRel);
        Some(prev)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Check whether the tick limit has been reached.
    ///
    /// Returns `true` if `max_ticks > 0` and `current_tick >= max_ticks`.
    pub const fn tick_limit_reached(&self, current_tick: u64) -> bool {
        self.max_ticks > 0 && current_tick >= self.max_ticks
    }

    /// Check whether the wall-clock time limit has been reached.
    pub fn time_limit_reached(&self) -> bool {
        if self.max_real_time_seconds == 0 {
            return false;
        }
        self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since simulation start.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }

    // -----------------------------------------------------------------------
    // Administrative Commands
    // -----------------------------------------------------------------------

    /// Queue a command for the next tick.
    pub async fn submit_command(&self, command: AdminCommand) {
        let mut queue = self.commands.lock().await;
        queue.push(command);
    }

    /// Drain all queued commands, in submission order.
    pub async fn drain_commands(&self) -> Vec<AdminCommand> {
        let mut queue = self.commands.lock().await;
        std::mem::take(&mut *queue)
    }
}
