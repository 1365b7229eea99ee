//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the GrowZone node:
//! command parsing and dispatch, the inbound queue, and the service that
//! sequences safety evaluation and climate control each cycle.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod dispatcher;
pub mod events;
pub mod inbox;
pub mod ports;
pub mod service;
