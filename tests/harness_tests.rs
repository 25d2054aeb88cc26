//! Harness validation tests
//!
//! These run real engines through the reliability harness the same way an
//! automotive test suite would.

use std::sync::Arc;
use std::time::Duration;

use vehicle_sim::harness::{
    detroit_traffic_patterns, detroit_weather_conditions, validate_vehicle_system, HarnessError,
    TestConfiguration, TestEnvironment, VehicleCondition, Violation,
};
use vehicle_sim::simulation::{Location, SimulationEngine, VehicleClass, VirtualClock};

fn virtual_engine(class: VehicleClass) -> Arc<SimulationEngine<VirtualClock>> {
    Arc::new(SimulationEngine::with_clock(class, VirtualClock::new()))
}

fn lab_config(max: Duration) -> TestConfiguration {
    TestConfiguration::new(TestEnvironment::Laboratory, VehicleCondition::New, max)
}

#[tokio::test]
async fn test_highway_run_is_accepted() {
    let engine = virtual_engine(VehicleClass::Electric);
    let configuration = lab_config(Duration::from_secs(60));

    let report = validate_vehicle_system(engine, &configuration, |engine, _| async move {
        engine.start();
        engine.accelerate(70.0).await?;
        engine.navigate_to(Location::I75).await;
        engine.brake(0.0).await?;
        let state = engine.current_state();
        anyhow::Ok(state.speed == 0.0 && state.location == Location::I75)
    })
    .await
    .unwrap();

    assert!(report.passed);
    assert!(report.is_accepted());
    assert!(report.score >= configuration.expected_reliability);
    assert!(report.elapsed <= configuration.duration);
}

#[tokio::test]
async fn test_winter_start_with_low_battery_condition() {
    let engine = virtual_engine(VehicleClass::Hybrid);
    let configuration = TestConfiguration::new(
        TestEnvironment::RealWorld,
        VehicleCondition::LowBattery { percentage: 0.2 },
        Duration::from_secs(60),
    );

    let winter_start = |engine: Arc<SimulationEngine<VirtualClock>>,
                        configuration: TestConfiguration| async move {
        assert_eq!(
            configuration.vehicle_condition,
            VehicleCondition::LowBattery { percentage: 0.2 }
        );
        engine.simulate_cold_start().await;
        anyhow::Ok(engine.current_state().engine_temperature == 32.0)
    };
    let report = validate_vehicle_system(engine, &configuration, winter_start)
        .await
        .unwrap();

    // Real-world runs carry a bonus above a perfect score
    assert!(report.score > 1.0);
}

#[tokio::test]
async fn test_failed_predicate_is_rejected() {
    let engine = virtual_engine(VehicleClass::Truck);
    let configuration = lab_config(Duration::from_secs(60));

    let result = validate_vehicle_system(engine, &configuration, |engine, _| async move {
        // Stopped engine never moves
        engine.accelerate(30.0).await?;
        anyhow::Ok(engine.current_state().speed == 30.0)
    })
    .await;

    let report = match result {
        Err(HarnessError::Rejected(report)) => report,
        other => panic!("expected rejection, got {:?}", other),
    };
    assert!(!report.passed);
    assert_eq!(report.score, 0.0);
    assert!(report.violations.contains(&Violation::PredicateFailed));
    assert!(report
        .violations
        .iter()
        .any(|violation| matches!(violation, Violation::BelowReliability { .. })));
}

#[tokio::test]
async fn test_predicate_error_is_propagated() {
    let engine = virtual_engine(VehicleClass::Sedan);
    let configuration = lab_config(Duration::from_secs(60));

    let result = validate_vehicle_system(engine, &configuration, |engine, _| async move {
        engine.start();
        engine.accelerate(-10.0).await?;
        anyhow::Ok(true)
    })
    .await;

    match result {
        Err(HarnessError::Predicate(err)) => {
            assert!(err.to_string().contains("invalid target speed"));
        }
        other => panic!("expected predicate error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_run_exceeds_duration() {
    let configuration = lab_config(Duration::from_millis(10));

    let result = validate_vehicle_system((), &configuration, |_, _| async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        anyhow::Ok(true)
    })
    .await;

    let report = match result {
        Err(HarnessError::Rejected(report)) => report,
        other => panic!("expected rejection, got {:?}", other),
    };
    assert!(report.passed);
    assert!((report.score - 0.9).abs() < 1e-9);
    assert!(report
        .violations
        .iter()
        .any(|violation| matches!(violation, Violation::DurationExceeded { .. })));
}

#[tokio::test]
async fn test_relaxed_threshold_accepts_slower_runs() {
    let configuration = lab_config(Duration::from_secs(10)).with_expected_reliability(0.5);

    let report = validate_vehicle_system((), &configuration, |_, _| async { anyhow::Ok(true) })
        .await
        .unwrap();

    assert!(report.score >= 0.5);
}

#[test]
fn test_detroit_tables() {
    let weather = detroit_weather_conditions();
    assert_eq!(weather.len(), 4);
    assert_eq!(weather[0].temperature, -10.0);

    let traffic = detroit_traffic_patterns();
    assert_eq!(traffic.len(), 4);
    assert!(traffic.iter().any(|pattern| pattern.location == "M-10 Lodge"
        && pattern.congestion_level == 0.9
        && pattern.time_of_day == 17));
}
