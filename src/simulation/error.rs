//! Errors raised by the vehicle simulation

/// Errors raised by the simulation before any step runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Target speed is negative or not a finite number.
    #[error("invalid target speed {target}: must be a finite value >= 0")]
    InvalidTargetSpeed { target: f64 },

    /// Target speed is on the wrong side of the current speed.
    #[error("cannot {operation} from {current} mph to {target} mph")]
    OutOfOrderTarget {
        operation: &'static str,
        current: f64,
        target: f64,
    },

    /// The rate division did not produce a usable step count.
    #[error("cannot derive a step count from delta {delta} at rate {rate}")]
    InvalidStepCount { delta: f64, rate: f64 },

    /// A name did not match any known variant.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

impl SimError {
    /// True for rejected caller input (bad speeds or step counts).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            SimError::InvalidTargetSpeed { .. }
                | SimError::OutOfOrderTarget { .. }
                | SimError::InvalidStepCount { .. }
        )
    }
}
