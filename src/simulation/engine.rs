//! Simulation engine: the single owner of a vehicle's state
//!
//! Motion requests are split into discrete physics steps. Each step is
//! computed on a private copy of the state and published whole, then the
//! engine suspends on its clock before the next step. Operations take the
//! engine's operation lock for their full duration, so concurrent callers are
//! queued and two step loops never touch the same state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{watch, Mutex};

use super::cancel::{CancelScope, CancelToken};
use super::clock::{Clock, TokioClock};
use super::error::SimError;
use super::state::SimulationState;
use super::types::{
    Location, VehicleClass, VehicleProfile, COLD_START_BATTERY_FACTOR, COLD_START_TEMPERATURE,
    STEP_DT, STEP_DURATION, WARM_UP_DURATION,
};

/// How a motion operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    /// Ran to completion after `steps` physics steps
    Completed { steps: u32 },
    /// Stopped at a suspension point after `steps` completed steps
    Cancelled { steps: u32 },
    /// Nothing was executed
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The engine is stopped
    NotRunning,
    /// Speed already equals the requested target
    AlreadyAtTarget,
}

impl MotionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, MotionOutcome::Completed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MotionOutcome::Cancelled { .. })
    }

    /// Physics steps that were applied to the state
    pub fn steps(&self) -> u32 {
        match self {
            MotionOutcome::Completed { steps } | MotionOutcome::Cancelled { steps } => *steps,
            MotionOutcome::Skipped(_) => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Accelerate,
    Brake,
}

impl Direction {
    fn verb(self) -> &'static str {
        match self {
            Direction::Accelerate => "accelerate",
            Direction::Brake => "brake",
        }
    }

    fn rate(self, profile: &VehicleProfile) -> f64 {
        match self {
            Direction::Accelerate => profile.acceleration_rate,
            Direction::Brake => profile.braking_rate,
        }
    }

    /// Distance to cover; negative when the target is on the wrong side
    fn delta(self, current: f64, target: f64) -> f64 {
        match self {
            Direction::Accelerate => target - current,
            Direction::Brake => current - target,
        }
    }

    /// Speed after `step` whole rate increments from `start`, never past `target`
    fn speed_at(self, start: f64, rate: f64, step: u32, target: f64) -> f64 {
        let offset = rate * f64::from(step);
        match self {
            Direction::Accelerate => (start + offset).min(target),
            Direction::Brake => (start - offset).max(target),
        }
    }
}

/// Number of rate increments needed to cover `delta`.
///
/// Rounds up so the final (clamped) step lands on the target. A tiny
/// tolerance keeps float noise such as `11.000000000000002` from adding an
/// empty trailing step.
pub fn step_count(delta: f64, rate: f64) -> Result<u32, SimError> {
    const TOLERANCE: f64 = 1e-9;

    if !delta.is_finite() || delta < 0.0 || !rate.is_finite() || rate <= 0.0 {
        return Err(SimError::InvalidStepCount { delta, rate });
    }
    if delta == 0.0 {
        return Ok(0);
    }

    let steps = (delta / rate - TOLERANCE).ceil().max(1.0);
    if !steps.is_finite() || steps > f64::from(u32::MAX) {
        return Err(SimError::InvalidStepCount { delta, rate });
    }
    Ok(steps as u32)
}

/// Owner of one vehicle's simulation state
pub struct SimulationEngine<C: Clock = TokioClock> {
    vehicle_class: VehicleClass,
    profile: &'static VehicleProfile,
    state: watch::Sender<SimulationState>,
    running: AtomicBool,
    operation: Mutex<()>,
    clock: C,
    cancel: CancelToken,
}

impl SimulationEngine<TokioClock> {
    /// Engine that suspends in wall-clock time
    pub fn new(vehicle_class: VehicleClass) -> Self {
        Self::with_clock(vehicle_class, TokioClock)
    }
}

impl<C: Clock> SimulationEngine<C> {
    pub fn with_clock(vehicle_class: VehicleClass, clock: C) -> Self {
        Self {
            vehicle_class,
            profile: vehicle_class.profile(),
            state: watch::Sender::new(SimulationState::new()),
            running: AtomicBool::new(false),
            operation: Mutex::new(()),
            clock,
            cancel: CancelToken::new(),
        }
    }

    /// Replace the engine's cancellation token with a caller-provided one
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn vehicle_class(&self) -> VehicleClass {
        self.vehicle_class
    }

    pub fn profile(&self) -> &'static VehicleProfile {
        self.profile
    }

    /// Token that cancels whichever operation is currently running.
    ///
    /// Operations that start after a cancel are not affected by it.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn start(&self) {
        if !self.running.swap(true, Ordering::AcqRel) {
            info!("{} simulation started", self.vehicle_class);
        }
    }

    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!("{} simulation stopped", self.vehicle_class);
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Copy of the last fully completed state
    pub fn current_state(&self) -> SimulationState {
        *self.state.borrow()
    }

    /// Receiver that observes every published state
    pub fn subscribe(&self) -> watch::Receiver<SimulationState> {
        self.state.subscribe()
    }

    /// Speed up step-wise until `target_speed` is reached.
    ///
    /// A stopped engine skips the request. Targets below the current speed are
    /// rejected; use [`SimulationEngine::brake`] for those.
    pub async fn accelerate(&self, target_speed: f64) -> Result<MotionOutcome, SimError> {
        self.drive(Direction::Accelerate, target_speed).await
    }

    /// Slow down step-wise until `target_speed` is reached.
    pub async fn brake(&self, target_speed: f64) -> Result<MotionOutcome, SimError> {
        self.drive(Direction::Brake, target_speed).await
    }

    /// Move to `location` and wait out the traffic-scaled travel time.
    ///
    /// Runs whether or not the engine is started. Speed and energy are untouched.
    pub async fn navigate_to(&self, location: Location) -> MotionOutcome {
        let (_operation, scope) = self.begin_operation().await;

        let mut next = self.current_state();
        let from = next.location;
        next.location = location;
        self.publish(next);
        info!(
            "Navigating {} -> {} (traffic x{:.1})",
            from,
            location,
            location.traffic_multiplier()
        );

        if self.suspend(&scope, location.travel_delay()).await {
            MotionOutcome::Completed { steps: 0 }
        } else {
            debug!("Navigation to {} cancelled in traffic", location);
            MotionOutcome::Cancelled { steps: 0 }
        }
    }

    /// Harsh winter start: battery drops and the engine starts frozen, then
    /// one long warm-up suspension.
    pub async fn simulate_cold_start(&self) -> MotionOutcome {
        let (_operation, scope) = self.begin_operation().await;

        let mut next = self.current_state();
        next.battery_level = (next.battery_level * COLD_START_BATTERY_FACTOR).clamp(0.0, 1.0);
        next.engine_temperature = COLD_START_TEMPERATURE;
        self.publish(next);
        info!("Cold start: {}", next.summary());

        if self.suspend(&scope, WARM_UP_DURATION).await {
            MotionOutcome::Completed { steps: 0 }
        } else {
            debug!("Warm-up cancelled");
            MotionOutcome::Cancelled { steps: 0 }
        }
    }

    async fn drive(&self, direction: Direction, target: f64) -> Result<MotionOutcome, SimError> {
        let (_operation, scope) = self.begin_operation().await;

        if !self.is_running() {
            debug!("Ignoring {} to {} mph: engine stopped", direction.verb(), target);
            return Ok(MotionOutcome::Skipped(SkipReason::NotRunning));
        }
        if !target.is_finite() || target < 0.0 {
            warn!("Rejected {} to {} mph", direction.verb(), target);
            return Err(SimError::InvalidTargetSpeed { target });
        }

        let start = self.current_state().speed;
        let delta = direction.delta(start, target);
        if delta < 0.0 {
            warn!("Rejected {} from {} to {} mph", direction.verb(), start, target);
            return Err(SimError::OutOfOrderTarget {
                operation: direction.verb(),
                current: start,
                target,
            });
        }
        if delta == 0.0 {
            return Ok(MotionOutcome::Skipped(SkipReason::AlreadyAtTarget));
        }

        let rate = direction.rate(self.profile);
        let steps = step_count(delta, rate)?;
        info!(
            "{} {} from {:.1} to {:.1} mph in {} steps",
            self.vehicle_class,
            direction.verb(),
            start,
            target,
            steps
        );

        for step in 1..=steps {
            if scope.is_cancelled() {
                return Ok(self.cancelled(direction, step - 1));
            }

            let speed = if step == steps {
                target
            } else {
                direction.speed_at(start, rate, step, target)
            };
            let mut next = self.current_state();
            next.speed = speed;
            next.update(STEP_DT);
            self.publish(next);
            debug!("step {}/{}: {}", step, steps, next.summary());

            if !self.suspend(&scope, STEP_DURATION).await && step < steps {
                return Ok(self.cancelled(direction, step));
            }
        }

        Ok(MotionOutcome::Completed { steps })
    }

    fn cancelled(&self, direction: Direction, steps: u32) -> MotionOutcome {
        info!(
            "{} cancelled after {} steps at {:.1} mph",
            direction.verb(),
            steps,
            self.current_state().speed
        );
        MotionOutcome::Cancelled { steps }
    }

    /// Wait for exclusive access and arm a cancellation scope for the new operation
    async fn begin_operation(&self) -> (tokio::sync::MutexGuard<'_, ()>, CancelScope) {
        let guard = self.operation.lock().await;
        (guard, self.cancel.scope())
    }

    fn publish(&self, next: SimulationState) {
        self.state.send_replace(next);
    }

    /// Returns false if cancelled while suspended
    async fn suspend(&self, scope: &CancelScope, duration: Duration) -> bool {
        tokio::select! {
            biased;
            _ = scope.cancelled() => {}
            _ = self.clock.sleep(duration) => {}
        }
        !scope.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_count_rounds_up() {
        assert_eq!(step_count(70.0, 7.0).unwrap(), 10);
        assert_eq!(step_count(12.0, 5.0).unwrap(), 3);
        assert_eq!(step_count(0.5, 5.0).unwrap(), 1);
        assert_eq!(step_count(0.0, 5.0).unwrap(), 0);
        assert_eq!(step_count(1.1, 0.1).unwrap(), 11);
    }

    #[test]
    fn test_step_count_rejects_bad_input() {
        assert!(step_count(-1.0, 5.0).is_err());
        assert!(step_count(10.0, 0.0).is_err());
        assert!(step_count(f64::INFINITY, 5.0).is_err());
        assert!(step_count(f64::NAN, 5.0).is_err());
        assert!(step_count(1e300, 1e-300).is_err());
    }

    #[test]
    fn test_speed_at_never_overshoots() {
        assert_eq!(Direction::Accelerate.speed_at(0.0, 7.0, 3, 70.0), 21.0);
        assert_eq!(Direction::Accelerate.speed_at(60.0, 7.0, 2, 70.0), 70.0);
        assert_eq!(Direction::Brake.speed_at(50.0, 9.0, 2, 40.0), 40.0);
        assert_eq!(Direction::Brake.speed_at(50.0, 9.0, 1, 10.0), 41.0);
    }
}
