//! Vehicle Simulation Library
//!
//! A deterministic, time-stepped vehicle state model for automotive test
//! scenarios, plus the harness that scores them.

pub mod harness;
pub mod simulation;
