//! GrowZone firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(feature = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod actuators;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod identity;
pub mod pins;
pub mod safety;
pub mod setpoints;
pub mod telemetry;
pub mod topics;

// Hardware-facing layers. The ESP-IDF implementations inside are gated;
// host builds get the generic embedded-hal drivers and simulation backends.
pub mod adapters;
pub mod drivers;
pub mod sensors;
