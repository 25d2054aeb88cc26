//! Reliability harness for vehicle systems
//!
//! Runs an async predicate against a system, times it on the wall clock and
//! scores the run against Detroit reliability standards.

mod conditions;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::{Duration, Instant};

use log::{info, warn};

pub use conditions::{
    detroit_traffic_patterns, detroit_weather_conditions, Precipitation, TrafficPattern,
    WeatherCondition,
};

/// Reliability required when none is configured
pub const DEFAULT_EXPECTED_RELIABILITY: f64 = 0.99;

/// Largest share of the score lost to a slow run
pub const DURATION_PENALTY_WEIGHT: f64 = 0.1;

/// Bonus for runs validated on real roads
pub const REAL_WORLD_BONUS: f64 = 0.05;

/// Where a validation run takes place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestEnvironment {
    Laboratory,
    TestTrack,
    RealWorld,
    Simulation,
}

impl FromStr for TestEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "laboratory" | "lab" => Ok(TestEnvironment::Laboratory),
            "testtrack" | "track" => Ok(TestEnvironment::TestTrack),
            "realworld" => Ok(TestEnvironment::RealWorld),
            "simulation" => Ok(TestEnvironment::Simulation),
            _ => Err(format!("unknown test environment '{s}'")),
        }
    }
}

/// Condition of the vehicle under test
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleCondition {
    New,
    Used { mileage: u32 },
    Extreme { temperature: f64 },
    LowBattery { percentage: f64 },
}

/// Limits a validation run is held to
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfiguration {
    pub environment: TestEnvironment,
    pub vehicle_condition: VehicleCondition,
    /// Maximum wall-clock time the predicate may take
    pub duration: Duration,
    pub expected_reliability: f64,
}

impl TestConfiguration {
    pub fn new(
        environment: TestEnvironment,
        vehicle_condition: VehicleCondition,
        duration: Duration,
    ) -> Self {
        Self {
            environment,
            vehicle_condition,
            duration,
            expected_reliability: DEFAULT_EXPECTED_RELIABILITY,
        }
    }

    pub fn with_expected_reliability(mut self, expected_reliability: f64) -> Self {
        self.expected_reliability = expected_reliability;
        self
    }
}

/// Score a run: failures score zero, slow runs lose up to a tenth, real-world
/// runs earn a small bonus.
pub fn reliability_score(
    passed: bool,
    elapsed: Duration,
    configuration: &TestConfiguration,
) -> f64 {
    if !passed {
        return 0.0;
    }

    let max = configuration.duration.as_secs_f64();
    let used = if max > 0.0 {
        (elapsed.as_secs_f64() / max).min(1.0)
    } else {
        1.0
    };
    let environment_bonus = if configuration.environment == TestEnvironment::RealWorld {
        REAL_WORLD_BONUS
    } else {
        0.0
    };

    (1.0 - used * DURATION_PENALTY_WEIGHT + environment_bonus).max(0.0)
}

/// A requirement the run did not meet
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("vehicle system failed validation")]
    PredicateFailed,

    #[error("test exceeded maximum duration ({elapsed:?} > {max:?})")]
    DurationExceeded { elapsed: Duration, max: Duration },

    #[error("reliability {score:.4} below Detroit automotive standard {expected:.4}")]
    BelowReliability { score: f64, expected: f64 },
}

/// Measurements from one validation run
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    pub passed: bool,
    pub elapsed: Duration,
    pub score: f64,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_accepted(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "passed={} elapsed={:.3}s score={:.4}",
            self.passed,
            self.elapsed.as_secs_f64(),
            self.score
        )?;
        for violation in &self.violations {
            write!(f, "; {violation}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The predicate itself returned an error
    #[error(transparent)]
    Predicate(#[from] anyhow::Error),

    /// The run finished but missed at least one requirement
    #[error("vehicle system rejected: {0}")]
    Rejected(ValidationReport),
}

/// Run `test_block` against `system` and hold the run to `configuration`.
///
/// Every violated requirement is collected into the report rather than
/// stopping at the first one.
pub async fn validate_vehicle_system<T, F, Fut>(
    system: T,
    configuration: &TestConfiguration,
    test_block: F,
) -> Result<ValidationReport, HarnessError>
where
    F: FnOnce(T, TestConfiguration) -> Fut,
    Fut: Future<Output = anyhow::Result<bool>>,
{
    let start_time = Instant::now();
    let passed = test_block(system, configuration.clone()).await?;
    let elapsed = start_time.elapsed();

    let score = reliability_score(passed, elapsed, configuration);

    let mut violations = Vec::new();
    if !passed {
        violations.push(Violation::PredicateFailed);
    }
    if elapsed > configuration.duration {
        violations.push(Violation::DurationExceeded {
            elapsed,
            max: configuration.duration,
        });
    }
    if score < configuration.expected_reliability {
        violations.push(Violation::BelowReliability {
            score,
            expected: configuration.expected_reliability,
        });
    }

    let report = ValidationReport {
        passed,
        elapsed,
        score,
        violations,
    };

    if report.is_accepted() {
        info!("Validation accepted: {}", report);
        Ok(report)
    } else {
        warn!("Validation rejected: {}", report);
        Err(HarnessError::Rejected(report))
    }
}
