//! Core library components.
//!
//! Pipeline configuration, environment assembly, secret scoping, service
//! readiness and the stage sequencer itself.

pub mod config;
pub mod constants;
pub mod env;
pub mod readiness;
pub mod report;
pub mod secrets;
pub mod sequencer;
pub mod shell;
pub mod stage;
pub mod trigger;
pub mod types;
