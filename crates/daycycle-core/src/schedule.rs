//! Hour-scheduled visibility of world objects.
//!
//! The engine owns an arena of [`ScheduledEntry`] records, each describing
//! a target object that should exist only between an appear hour and a
//! disappear hour. Windows may wrap past midnight. Evaluation is
//! edge-triggered: a [`ScheduleTransition`] is produced only when the
//! computed membership differs from the entry's stored state, so a steady
//! hour yields nothing and every boundary crossing yields exactly one
//! activation or deactivation.
//!
//! # Membership
//!
//! | Window | Active when |
//! |---|---|
//! | `appear == disappear` | never (zero-width) |
//! | `appear < disappear` | `appear <= hour < disappear` |
//! | `appear > disappear` | `hour >= appear \|\| hour < disappear` |
//!
//! # Failure isolation
//!
//! A missing target is logged and skipped for that evaluation; the other
//! entries are still evaluated. Renderer/collider handles are discovered
//! lazily the first time an entry needs them and cached afterwards.

use daycycle_types::{
    ComponentId, EntryState, EntryStatus, Hour, Materialization, TargetId, TransitionKind,
};
use tracing::{debug, info, trace, warn};

/// Errors raised by schedule operations.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// The entry's target object does not exist in the scene.
    #[error("target {label} ({target}) is missing from the scene")]
    MissingTarget {
        /// Handle of the missing object.
        target: TargetId,
        /// Configured name of the missing object.
        label: String,
    },

    /// A handle does not refer to an entry of this engine.
    #[error("unknown schedule entry handle {0}")]
    UnknownEntry(usize),
}

/// Read access to the scene the schedule needs: target presence and
/// component discovery.
pub trait TargetResolver {
    /// Whether the target currently exists.
    fn contains(&self, target: TargetId) -> bool;

    /// Collect the renderer and collider handles of a target, or `None`
    /// if the target does not exist.
    fn discover_components(&self, target: TargetId) -> Option<TargetComponents>;
}

/// Renderer and collider handles of one target, collected on discovery.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetComponents {
    /// Visual renderers (toggled by [`Materialization::RenderersOnly`]).
    pub renderers: Vec<ComponentId>,
    /// Physical colliders (left alone by [`Materialization::RenderersOnly`]).
    pub colliders: Vec<ComponentId>,
}

/// Stable index of an entry in the engine's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryHandle(usize);

impl EntryHandle {
    /// Return the arena index.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Discovery state of an entry's component handles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Discovery {
    /// Not discovered yet.
    #[default]
    Pending,
    /// Discovered and cached.
    Ready(TargetComponents),
}

/// One scheduled object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledEntry {
    /// Object whose presence is scheduled.
    target: TargetId,

    /// Configured name, used in logs and dumps.
    label: String,

    /// First hour of the visible window.
    appear: Hour,

    /// First hour after the visible window.
    disappear: Hour,

    /// How the object is toggled.
    materialization: Materialization,

    /// State materialized by the last evaluation. Written only by the engine.
    active: bool,

    /// Cached component handles.
    discovery: Discovery,
}

impl ScheduledEntry {
    /// Create an inactive, undiscovered entry.
    pub fn new(
        target: TargetId,
        label: impl Into<String>,
        appear: Hour,
        disappear: Hour,
        materialization: Materialization,
    ) -> Self {
        Self {
            target,
            label: label.into(),
            appear,
            disappear,
            materialization,
            active: false,
            discovery: Discovery::Pending,
        }
    }

    /// Return the target handle.
    pub const fn target(&self) -> TargetId {
        self.target
    }

    /// Return the configured label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Return the appear hour.
    pub const fn appear(&self) -> Hour {
        self.appear
    }

    /// Return the disappear hour.
    pub const fn disappear(&self) -> Hour {
        self.disappear
    }

    /// Return the materialization strategy.
    pub const fn materialization(&self) -> Materialization {
        self.materialization
    }

    /// Whether the last evaluation left the object active.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Return the materialized state.
    pub const fn state(&self) -> EntryState {
        EntryState::from_active(self.active)
    }

    /// Whether component handles have been discovered.
    pub const fn is_initialized(&self) -> bool {
        matches!(self.discovery, Discovery::Ready(_))
    }

    /// Return the cached component handles, if discovered.
    pub const fn components(&self) -> Option<&TargetComponents> {
        match &self.discovery {
            Discovery::Ready(components) => Some(components),
            Discovery::Pending => None,
        }
    }

    /// Whether the object should be active at `hour`.
    pub fn should_be_active(&self, hour: Hour) -> bool {
        is_hour_in_window(hour, self.appear, self.disappear)
    }

    /// Discover and cache component handles if not done yet.
    ///
    /// Idempotent: once discovery succeeded, later calls return the cache
    /// without touching the resolver.
    fn ensure_initialized<R>(&mut self, resolver: &R) -> Result<&TargetComponents, ScheduleError>
    where
        R: TargetResolver + ?Sized,
    {
        if matches!(self.discovery, Discovery::Pending) {
            let components = resolver.discover_components(self.target).ok_or_else(|| {
                ScheduleError::MissingTarget {
                    target: self.target,
                    label: self.label.clone(),
                }
            })?;
            debug!(
                target_name = self.label.as_str(),
                renderers = components.renderers.len(),
                colliders = components.colliders.len(),
                "Components discovered"
            );
            self.discovery = Discovery::Ready(components);
        }
        match &self.discovery {
            Discovery::Ready(components) => Ok(components),
            Discovery::Pending => Err(ScheduleError::MissingTarget {
                target: self.target,
                label: self.label.clone(),
            }),
        }
    }

    /// Build the status row for a state dump at `hour`.
    fn status(&self, hour: Hour) -> EntryStatus {
        EntryStatus {
            target: self.target,
            label: self.label.clone(),
            appear_hour: self.appear,
            disappear_hour: self.disappear,
            should_be_active: self.should_be_active(hour),
            state: self.state(),
            materialization: self.materialization,
            initialized: self.is_initialized(),
        }
    }
}

/// An activation or deactivation the presentation side must apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTransition {
    /// Entry that changed state.
    pub handle: EntryHandle,
    /// Object to toggle.
    pub target: TargetId,
    /// Configured name of the object.
    pub label: String,
    /// Direction of the change.
    pub kind: TransitionKind,
    /// How to toggle the object.
    pub materialization: Materialization,
    /// Renderers to toggle under [`Materialization::RenderersOnly`];
    /// empty for [`Materialization::WholeObject`].
    pub renderers: Vec<ComponentId>,
}

/// An entry skipped during evaluation because its target was missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Entry that was skipped.
    pub handle: EntryHandle,
    /// Missing object.
    pub target: TargetId,
    /// Configured name of the missing object.
    pub label: String,
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Hour the pass evaluated.
    pub hour: Hour,
    /// State changes, in entry order.
    pub transitions: Vec<ScheduleTransition>,
    /// Entries whose target was missing.
    pub skipped: Vec<SkippedEntry>,
}

/// Wrap-aware hour window membership.
///
/// A zero-width window (`appear == disappear`) is never active.
pub fn is_hour_in_window(hour: Hour, appear: Hour, disappear: Hour) -> bool {
    match appear.cmp(&disappear) {
        std::cmp::Ordering::Equal => false,
        std::cmp::Ordering::Less => hour >= appear && hour < disappear,
        std::cmp::Ordering::Greater => hour >= appear || hour < disappear,
    }
}

/// Arena of scheduled entries with the polling policy that decides when
/// they are re-evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEngine {
    /// Scheduled entries, indexed by [`EntryHandle`].
    entries: Vec<ScheduledEntry>,

    /// Seconds between polls; 0 means poll only when the hour changes.
    check_interval_seconds: f64,

    /// Seconds accumulated since the last interval poll.
    since_last_check: f64,

    /// Hour of the last poll that evaluated.
    last_checked_hour: Option<Hour>,

    /// Next poll evaluates unconditionally.
    force_pending: bool,

    /// Log per-entry evaluation at debug instead of trace.
    verbose: bool,
}

impl ScheduleEngine {
    /// Create an empty engine.
    ///
    /// Non-finite or negative check intervals are treated as 0.
    pub fn new(check_interval_seconds: f64, verbose: bool) -> Self {
        let check_interval_seconds =
            if check_interval_seconds.is_finite() && check_interval_seconds > 0.0 {
                check_interval_seconds
            } else {
                0.0
            };
        Self {
            entries: Vec::new(),
            check_interval_seconds,
            since_last_check: 0.0,
            last_checked_hour: None,
            force_pending: false,
            verbose,
        }
    }

    /// Add an entry and return its handle.
    pub fn add_entry(&mut self, entry: ScheduledEntry) -> EntryHandle {
        let handle = EntryHandle(self.entries.len());
        self.entries.push(entry);
        handle
    }

    /// Return an entry by handle.
    pub fn get(&self, handle: EntryHandle) -> Option<&ScheduledEntry> {
        self.entries.get(handle.0)
    }

    /// Return all entries in handle order.
    pub fn entries(&self) -> &[ScheduledEntry] {
        &self.entries
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are scheduled.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return the configured check interval.
    pub const fn check_interval_seconds(&self) -> f64 {
        self.check_interval_seconds
    }

    /// Evaluate every entry against `hour` and return the transitions.
    ///
    /// Entries whose target is missing are skipped and reported; the
    /// evaluation itself never fails.
    pub fn evaluate<R>(&mut self, hour: Hour, resolver: &R) -> EvaluationReport
    where
        R: TargetResolver + ?Sized,
    {
        let verbose = self.verbose;
        if verbose {
            debug!(hour = hour.value(), "Checking schedules");
        }

        let mut transitions = Vec::new();
        let mut skipped = Vec::new();

        for (index, entry) in self.entries.iter_mut().enumerate() {
            let handle = EntryHandle(index);

            if !resolver.contains(entry.target) {
                warn!(
                    target_name = entry.label.as_str(),
                    target_id = %entry.target,
                    "Scheduled target is missing, skipping"
                );
                skipped.push(SkippedEntry {
                    handle,
                    target: entry.target,
                    label: entry.label.clone(),
                });
                continue;
            }

            let should_be_active = entry.should_be_active(hour);
            if verbose {
                debug!(
                    target_name = entry.label.as_str(),
                    should_be_active,
                    is_active = entry.active,
                    "Evaluated schedule entry"
                );
            } else {
                trace!(
                    target_name = entry.label.as_str(),
                    should_be_active,
                    is_active = entry.active,
                    "Evaluated schedule entry"
                );
            }

            let Some(kind) = TransitionKind::between(entry.active, should_be_active) else {
                continue;
            };

            match transition_for(handle, entry, kind, resolver) {
                Ok(transition) => transitions.push(transition),
                Err(err) => {
                    warn!(error = %err, "Schedule transition skipped");
                    skipped.push(SkippedEntry {
                        handle,
                        target: entry.target,
                        label: entry.label.clone(),
                    });
                }
            }
        }

        EvaluationReport {
            hour,
            transitions,
            skipped,
        }
    }

    /// Evaluate according to the polling policy.
    ///
    /// With a zero check interval, evaluates only when `hour` differs from
    /// the last evaluated hour. With a positive interval, evaluates once
    /// the interval has elapsed. A pending [`force_check`](Self::force_check)
    /// evaluates unconditionally. Returns `None` when nothing was evaluated.
    pub fn poll<R>(
        &mut self,
        hour: Hour,
        delta_seconds: f64,
        resolver: &R,
    ) -> Option<EvaluationReport>
    where
        R: TargetResolver + ?Sized,
    {
        let forced = std::mem::take(&mut self.force_pending);

        if self.check_interval_seconds > 0.0 {
            if delta_seconds.is_finite() && delta_seconds > 0.0 {
                self.since_last_check += delta_seconds;
            }
            if !forced && self.since_last_check < self.check_interval_seconds {
                return None;
            }
            self.since_last_check = 0.0;
        } else if !forced && self.last_checked_hour == Some(hour) {
            return None;
        }

        self.last_checked_hour = Some(hour);
        Some(self.evaluate(hour, resolver))
    }

    /// Make the next [`poll`](Self::poll) evaluate regardless of the hour
    /// or interval.
    pub fn force_check(&mut self) {
        self.force_pending = true;
        self.last_checked_hour = None;
    }

    /// Deactivate every entry whose target exists.
    ///
    /// Emits a deactivation for each such entry, whatever its stored state,
    /// so the presentation side ends up with every object hidden.
    pub fn reset_all<R>(&mut self, resolver: &R) -> Vec<ScheduleTransition>
    where
        R: TargetResolver + ?Sized,
    {
        let mut transitions = Vec::new();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if !resolver.contains(entry.target) {
                continue;
            }
            match transition_for(EntryHandle(index), entry, TransitionKind::Deactivate, resolver) {
                Ok(transition) => transitions.push(transition),
                Err(err) => warn!(error = %err, "Reset skipped entry"),
            }
        }
        info!(count = transitions.len(), "All schedules reset");
        transitions
    }

    /// Discover component handles for every entry that has none yet.
    /// Returns how many entries are initialized afterwards.
    pub fn initialize_all<R>(&mut self, resolver: &R) -> usize
    where
        R: TargetResolver + ?Sized,
    {
        let mut initialized = 0_usize;
        for entry in &mut self.entries {
            match entry.ensure_initialized(resolver) {
                Ok(_) => initialized = initialized.saturating_add(1),
                Err(err) => warn!(error = %err, "Component discovery failed"),
            }
        }
        initialized
    }

    /// Drop every cached discovery and discover again.
    /// Returns how many entries are initialized afterwards.
    pub fn reinitialize_components<R>(&mut self, resolver: &R) -> usize
    where
        R: TargetResolver + ?Sized,
    {
        for entry in &mut self.entries {
            entry.discovery = Discovery::Pending;
        }
        let initialized = self.initialize_all(resolver);
        info!(initialized, total = self.entries.len(), "Components reinitialized");
        initialized
    }

    /// Initialize one entry on demand.
    pub fn initialize_entry<R>(
        &mut self,
        handle: EntryHandle,
        resolver: &R,
    ) -> Result<&TargetComponents, ScheduleError>
    where
        R: TargetResolver + ?Sized,
    {
        let entry = self
            .entries
            .get_mut(handle.0)
            .ok_or(ScheduleError::UnknownEntry(handle.0))?;
        entry.ensure_initialized(resolver)
    }

    /// Status rows for every entry as seen at `hour`.
    pub fn dump(&self, hour: Hour) -> Vec<EntryStatus> {
        self.entries.iter().map(|entry| entry.status(hour)).collect()
    }
}

/// Build the transition for `entry`, discovering renderers inline when the
/// strategy needs them, and record the new state.
fn transition_for<R>(
    handle: EntryHandle,
    entry: &mut ScheduledEntry,
    kind: TransitionKind,
    resolver: &R,
) -> Result<ScheduleTransition, ScheduleError>
where
    R: TargetResolver + ?Sized,
{
    let renderers = match entry.materialization {
        Materialization::RenderersOnly => entry.ensure_initialized(resolver)?.renderers.clone(),
        Materialization::WholeObject => Vec::new(),
    };

    entry.active = kind.resulting_active();
    match kind {
        TransitionKind::Activate => info!(target_name = entry.label.as_str(), "Activated"),
        TransitionKind::Deactivate => info!(target_name = entry.label.as_str(), "Deactivated"),
    }

    Ok(ScheduleTransition {
        handle,
        target: entry.target,
        label: entry.label.clone(),
        kind,
        materialization: entry.materialization,
        renderers,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeMap;

    use super::*;

    fn hour(value: u8) -> Hour {
        Hour::new(value).unwrap()
    }

    /// Resolver backed by a map, counting discovery calls.
    #[derive(Default)]
    struct MapResolver {
        objects: BTreeMap<TargetId, TargetComponents>,
        discoveries: Cell<u32>,
    }

    impl MapResolver {
        fn with(names: &[&str]) -> Self {
            let mut resolver = Self::default();
            for name in names {
                let _ = resolver.objects.insert(
                    TargetId::from_name(name),
                    TargetComponents {
                        renderers: vec![ComponentId::new(), ComponentId::new()],
                        colliders: vec![ComponentId::new()],
                    },
                );
            }
            resolver
        }
    }

    impl TargetResolver for MapResolver {
        fn contains(&self, target: TargetId) -> bool {
            self.objects.contains_key(&target)
        }

        fn discover_components(&self, target: TargetId) -> Option<TargetComponents> {
            self.discoveries.set(self.discoveries.get() + 1);
            self.objects.get(&target).cloned()
        }
    }

    fn entry(
        name: &str,
        appear: u8,
        disappear: u8,
        materialization: Materialization,
    ) -> ScheduledEntry {
        ScheduledEntry::new(
            TargetId::from_name(name),
            name,
            hour(appear),
            hour(disappear),
            materialization,
        )
    }

    fn active_hours(appear: u8, disappear: u8) -> Vec<u8> {
        (0..24)
            .filter(|h| is_hour_in_window(hour(*h), hour(appear), hour(disappear)))
            .collect()
    }

    #[test]
    fn wrapping_window_spans_midnight() {
        assert_eq!(active_hours(22, 6), vec![0, 1, 2, 3, 4, 5, 22, 23]);
        for h in 6..22 {
            assert!(!is_hour_in_window(hour(h), hour(22), hour(6)));
        }
    }

    #[test]
    fn zero_width_window_is_never_active() {
        assert!(active_hours(10, 10).is_empty());
    }

    #[test]
    fn non_wrapping_window_boundaries() {
        assert_eq!(active_hours(8, 17), (8..17).collect::<Vec<u8>>());
        assert!(is_hour_in_window(hour(8), hour(8), hour(17)));
        assert!(!is_hour_in_window(hour(17), hour(8), hour(17)));
        assert!(!is_hour_in_window(hour(7), hour(8), hour(17)));
    }

    #[test]
    fn evaluation_is_edge_triggered() {
        let resolver = MapResolver::with(&["lamp"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let _ = engine.add_entry(entry("lamp", 18, 6, Materialization::WholeObject));

        let first = engine.evaluate(hour(20), &resolver);
        assert_eq!(first.transitions.len(), 1);
        assert_eq!(first.transitions.first().map(|t| t.kind), Some(TransitionKind::Activate));

        let second = engine.evaluate(hour(20), &resolver);
        assert!(second.transitions.is_empty());

        let third = engine.evaluate(hour(7), &resolver);
        assert_eq!(
            third.transitions.first().map(|t| t.kind),
            Some(TransitionKind::Deactivate)
        );
    }

    #[test]
    fn initial_state_is_inactive_and_no_transition_outside_window() {
        let resolver = MapResolver::with(&["stall"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let handle = engine.add_entry(entry("stall", 8, 17, Materialization::WholeObject));
        assert_eq!(engine.get(handle).map(ScheduledEntry::state), Some(EntryState::Inactive));
        let report = engine.evaluate(hour(3), &resolver);
        assert!(report.transitions.is_empty());
    }

    #[test]
    fn missing_target_is_skipped_without_blocking_others() {
        let resolver = MapResolver::with(&["present"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let missing = engine.add_entry(entry("ghost", 0, 12, Materialization::WholeObject));
        let present = engine.add_entry(entry("present", 0, 12, Materialization::WholeObject));

        let report = engine.evaluate(hour(5), &resolver);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped.first().map(|s| s.handle), Some(missing));
        assert_eq!(report.transitions.len(), 1);
        assert_eq!(report.transitions.first().map(|t| t.handle), Some(present));
        assert!(!engine.get(missing).unwrap().is_active());
    }

    #[test]
    fn renderers_only_discovers_lazily_once() {
        let resolver = MapResolver::with(&["tree"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let handle = engine.add_entry(entry("tree", 6, 18, Materialization::RenderersOnly));
        assert!(!engine.get(handle).unwrap().is_initialized());

        let on = engine.evaluate(hour(7), &resolver);
        let transition = on.transitions.first().unwrap();
        assert_eq!(transition.renderers.len(), 2);
        let cached = engine.get(handle).unwrap().components().unwrap();
        assert_eq!(cached.renderers, transition.renderers);

        let _ = engine.evaluate(hour(19), &resolver);
        let _ = engine.evaluate(hour(7), &resolver);
        assert_eq!(resolver.discoveries.get(), 1);
    }

    #[test]
    fn whole_object_never_needs_discovery() {
        let resolver = MapResolver::with(&["cart"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let _ = engine.add_entry(entry("cart", 6, 18, Materialization::WholeObject));
        let report = engine.evaluate(hour(7), &resolver);
        assert!(report.transitions.first().unwrap().renderers.is_empty());
        assert_eq!(resolver.discoveries.get(), 0);
    }

    #[test]
    fn initialize_entry_is_idempotent() {
        let resolver = MapResolver::with(&["tree"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let handle = engine.add_entry(entry("tree", 6, 18, Materialization::RenderersOnly));
        assert!(engine.initialize_entry(handle, &resolver).is_ok());
        assert!(engine.initialize_entry(handle, &resolver).is_ok());
        assert_eq!(resolver.discoveries.get(), 1);
        assert!(matches!(
            engine.initialize_entry(EntryHandle(9), &resolver),
            Err(ScheduleError::UnknownEntry(9))
        ));
    }

    #[test]
    fn initialize_all_reports_missing_targets() {
        let resolver = MapResolver::with(&["a"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let _ = engine.add_entry(entry("a", 1, 2, Materialization::RenderersOnly));
        let _ = engine.add_entry(entry("b", 1, 2, Materialization::RenderersOnly));
        assert_eq!(engine.initialize_all(&resolver), 1);
        // Already discovered entries are not rediscovered.
        assert_eq!(engine.initialize_all(&resolver), 1);
        assert_eq!(resolver.discoveries.get(), 3);
    }

    #[test]
    fn reinitialize_rediscovers_everything() {
        let resolver = MapResolver::with(&["a", "b"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let _ = engine.add_entry(entry("a", 1, 2, Materialization::RenderersOnly));
        let _ = engine.add_entry(entry("b", 1, 2, Materialization::WholeObject));
        assert_eq!(engine.initialize_all(&resolver), 2);
        assert_eq!(engine.reinitialize_components(&resolver), 2);
        assert_eq!(resolver.discoveries.get(), 4);
    }

    #[test]
    fn poll_skips_unchanged_hour() {
        let resolver = MapResolver::with(&["lamp"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let _ = engine.add_entry(entry("lamp", 18, 6, Materialization::WholeObject));

        assert!(engine.poll(hour(19), 0.1, &resolver).is_some());
        assert!(engine.poll(hour(19), 0.1, &resolver).is_none());
        assert!(engine.poll(hour(20), 0.1, &resolver).is_some());
    }

    #[test]
    fn force_check_re_evaluates_same_hour() {
        let resolver = MapResolver::with(&["lamp"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let _ = engine.add_entry(entry("lamp", 18, 6, Materialization::WholeObject));
        let _ = engine.poll(hour(19), 0.1, &resolver);
        engine.force_check();
        let report = engine.poll(hour(19), 0.1, &resolver);
        assert!(report.is_some_and(|r| r.transitions.is_empty()));
    }

    #[test]
    fn invalid_check_interval_means_hour_change_only() {
        assert!(ScheduleEngine::new(-1.0, false).check_interval_seconds().abs() < f64::EPSILON);
        assert!(ScheduleEngine::new(f64::NAN, false).check_interval_seconds().abs() < f64::EPSILON);
        assert!((ScheduleEngine::new(0.5, false).check_interval_seconds() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn poll_with_interval_waits_for_interval() {
        let resolver = MapResolver::with(&["lamp"]);
        let mut engine = ScheduleEngine::new(1.0, false);
        let _ = engine.add_entry(entry("lamp", 18, 6, Materialization::WholeObject));

        assert!(engine.poll(hour(19), 0.4, &resolver).is_none());
        assert!(engine.poll(hour(19), 0.4, &resolver).is_none());
        let report = engine.poll(hour(19), 0.4, &resolver);
        assert!(report.is_some_and(|r| r.transitions.len() == 1));
        assert!(engine.poll(hour(20), 0.1, &resolver).is_none());
    }

    #[test]
    fn reset_all_deactivates_present_targets() {
        let resolver = MapResolver::with(&["a", "b"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let a = engine.add_entry(entry("a", 0, 12, Materialization::RenderersOnly));
        let _ = engine.add_entry(entry("b", 13, 14, Materialization::WholeObject));
        let _ = engine.add_entry(entry("ghost", 0, 12, Materialization::WholeObject));
        let _ = engine.evaluate(hour(3), &resolver);
        assert!(engine.get(a).unwrap().is_active());

        let transitions = engine.reset_all(&resolver);
        assert_eq!(transitions.len(), 2);
        assert!(transitions.iter().all(|t| t.kind == TransitionKind::Deactivate));
        assert!(engine.entries().iter().all(|e| !e.is_active()));

        // Membership still holds at 03:00, so the next evaluation re-activates.
        let report = engine.evaluate(hour(3), &resolver);
        assert_eq!(report.transitions.len(), 1);
    }

    #[test]
    fn dump_reports_membership_and_state() {
        let resolver = MapResolver::with(&["a"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let _ = engine.add_entry(entry("a", 22, 6, Materialization::RenderersOnly));
        let _ = engine.evaluate(hour(23), &resolver);
        let rows = engine.dump(hour(10));
        let row = rows.first().unwrap();
        assert!(!row.should_be_active);
        assert_eq!(row.state, EntryState::Active);
        assert!(row.initialized);
        assert_eq!(row.label, "a");
    }

    #[test]
    fn full_day_sweep_emits_one_pair_per_window() {
        let resolver = MapResolver::with(&["night_market"]);
        let mut engine = ScheduleEngine::new(0.0, false);
        let _ = engine.add_entry(entry("night_market", 22, 6, Materialization::RenderersOnly));
        let mut activations = 0_u32;
        let mut deactivations = 0_u32;
        for _day in 0..3 {
            for h in 0..24 {
                for _ in 0..4 {
                    for t in engine.evaluate(hour(h), &resolver).transitions {
                        match t.kind {
                            TransitionKind::Activate => activations += 1,
                            TransitionKind::Deactivate => deactivations += 1,
                        }
                    }
                }
            }
        }
        // Active from 00:00 on the first day, then re-activated every evening.
        assert_eq!(activations, 4);
        assert_eq!(deactivations, 3);
    }
}
