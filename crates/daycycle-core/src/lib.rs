//! Clock, phase table, day counter, schedule engine and tick cycle for the
//! Daycycle simulation.
//!
//! This crate owns the per-frame tick cycle: Clock, Phase, Calendar,
//! Schedule, then Presentation. Presentation itself lives behind the
//! [`SceneHost`] trait so the core never depends on a renderer.
//!
//! # Modules
//!
//! - [`clock`] -- Fraction-of-day clock and hour derivation.
//! - [`phase`] -- Hour-keyed phase table with skybox blend progress.
//! - [`calendar`] -- Day/week counter with the midnight latch.
//! - [`schedule`] -- Hour-window visibility of scene objects.
//! - [`presentation`] -- HUD labels, light rotation, skybox payload.
//! - [`scene`] -- [`SceneHost`] trait and the in-memory [`SceneRegistry`].
//! - [`config`] -- Configuration loading from `daycycle-config.yaml` into
//!   strongly-typed structs.
//! - [`tick`] -- The tick cycle and administrative commands.
//! - [`operator`] -- Pause, speed, stop and command queue shared with
//!   operator front-ends.
//! - [`runner`] -- The async loop around [`tick::run_tick`].
//!
//! [`SceneHost`]: scene::SceneHost
//! [`SceneRegistry`]: scene::SceneRegistry

pub mod calendar;
pub mod clock;
pub mod config;
pub mod operator;
pub mod phase;
pub mod presentation;
pub mod runner;
pub mod scene;
pub mod schedule;
pub mod tick;
