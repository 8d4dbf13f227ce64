#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core feed state machine (hardware-agnostic).
//!
//! This crate converts a requested tape distance into discrete pip moves and
//! runs the threshold-driven drive sequence for each one. All hardware
//! interactions go through the `feeder_traits` line traits.
//!
//! ## Architecture
//!
//! - **Phases**: calibrated threshold tables, one per direction (`phase`)
//! - **Drive loop**: duty-cycled pulse-until-threshold with wall-clock
//!   timeout (`drive::run_drive_phase`)
//! - **Tension loop**: wind the cover film until the switch trips
//!   (`drive::run_tension_cycle`)
//! - **Sequencer/controller**: per-pip forward/backward sequences and the
//!   public `Feeder` capability (`controller`)
//! - **Assembly**: builder with typed validation errors (`builder`)
//!
//! Execution is single-threaded and fully blocking: a `feed_distance` call
//! busy-waits (drive/pause/sleep) until it reaches a terminal `FeedResult`.
//! There is deliberately no cancellation and no concurrent line access.

pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod drive;
pub mod error;
mod hw_error;
pub mod mocks;
pub mod phase;
pub mod status;
pub mod util;

pub use builder::{FeederBuilder, build_feeder};
pub use config::{FeedCfg, TensionCfg};
pub use controller::{BoxedFeeder, Feeder, IndexFeeder};
pub use drive::{run_drive_phase, run_tension_cycle};
pub use error::{BuildError, FeederError};
pub use phase::{BACKWARD_PROFILE, Comparison, FORWARD_PROFILE, ThresholdPhase};
pub use status::{Direction, FeedResult};
