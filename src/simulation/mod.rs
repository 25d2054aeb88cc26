//! Vehicle state simulation
//!
//! This module contains the simulation engine and everything it owns: the
//! physical state record, the per-class rate tables, the suspension clocks and
//! the cancellation signal.

mod cancel;
mod clock;
mod engine;
mod error;
mod state;
mod types;

pub use cancel::{CancelScope, CancelToken};
pub use clock::{Clock, TokioClock, VirtualClock};
pub use engine::{step_count, MotionOutcome, SimulationEngine, SkipReason};
pub use error::SimError;
pub use state::SimulationState;
pub use types::{
    Location, VehicleClass, VehicleProfile, COLD_START_BATTERY_FACTOR, COLD_START_TEMPERATURE,
    STEP_DT, STEP_DURATION, TRAVEL_UNIT, WARM_UP_DURATION,
};
