use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::{error, info};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use vehicle_sim::harness::{
    detroit_weather_conditions, validate_vehicle_system, HarnessError, TestConfiguration,
    TestEnvironment, VehicleCondition,
};
use vehicle_sim::simulation::{
    Clock, Location, SimulationEngine, TokioClock, VehicleClass, VirtualClock,
};

#[derive(Parser)]
#[command(name = "vehicle_sim")]
#[command(about = "Headless vehicle state simulation for automotive test scenarios")]
struct Cli {
    /// Vehicle class to simulate
    #[arg(long, default_value = "sedan")]
    vehicle: VehicleClass,

    /// Speed to accelerate to, in mph
    #[arg(long, default_value = "60")]
    target_speed: f64,

    /// Speed to brake down to after the route, in mph
    #[arg(long)]
    brake_to: Option<f64>,

    /// Comma-separated locations to drive through
    #[arg(long, value_delimiter = ',')]
    route: Vec<Location>,

    /// Append this many randomly chosen locations to the route
    #[arg(long)]
    random_route: Option<usize>,

    /// Seed for the random route
    #[arg(long)]
    seed: Option<u64>,

    /// Start the vehicle in winter conditions
    #[arg(long)]
    cold_start: bool,

    /// Suspend in wall-clock time instead of a virtual clock
    #[arg(long)]
    realtime: bool,

    /// Maximum wall-clock duration of the scenario, in seconds
    #[arg(long, default_value = "600")]
    max_duration: f64,

    /// Environment the run is scored for
    #[arg(long, default_value = "simulation")]
    environment: TestEnvironment,
}

/// The steps one scenario run performs
#[derive(Debug, Clone)]
struct ScenarioPlan {
    cold_start: bool,
    target_speed: f64,
    route: Vec<Location>,
    brake_to: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    ensure!(
        cli.max_duration.is_finite() && cli.max_duration > 0.0,
        "--max-duration must be a positive number of seconds"
    );

    let plan = ScenarioPlan {
        cold_start: cli.cold_start,
        target_speed: cli.target_speed,
        route: build_route(cli.route, cli.random_route, cli.seed),
        brake_to: cli.brake_to,
    };

    let condition = if plan.cold_start {
        let coldest = detroit_weather_conditions()
            .into_iter()
            .filter(|weather| weather.is_freezing())
            .map(|weather| weather.temperature)
            .fold(f64::INFINITY, f64::min);
        VehicleCondition::Extreme { temperature: coldest }
    } else {
        VehicleCondition::New
    };
    let max_duration = Duration::try_from_secs_f64(cli.max_duration)
        .context("--max-duration is too large")?;
    let configuration = TestConfiguration::new(cli.environment, condition, max_duration);

    info!("Running {} scenario: {:?}", cli.vehicle, plan);

    let outcome = if cli.realtime {
        let engine = Arc::new(SimulationEngine::with_clock(cli.vehicle, TokioClock));
        validate_vehicle_system(engine, &configuration, |engine, _| run_scenario(engine, plan))
            .await
    } else {
        let clock = VirtualClock::new();
        let engine = Arc::new(SimulationEngine::with_clock(cli.vehicle, clock.clone()));
        let outcome =
            validate_vehicle_system(engine, &configuration, |engine, _| run_scenario(engine, plan))
                .await;
        info!(
            "Simulated time: {:.1}s over {} suspensions",
            clock.elapsed().as_secs_f64(),
            clock.sleeps()
        );
        outcome
    };

    match outcome {
        Ok(report) => {
            info!("=== SCENARIO COMPLETE ===");
            info!("Elapsed time: {:.3}s", report.elapsed.as_secs_f64());
            info!("Reliability score: {:.4}", report.score);
            Ok(())
        }
        Err(HarnessError::Rejected(report)) => {
            error!("=== SCENARIO REJECTED ===");
            for violation in &report.violations {
                error!("{}", violation);
            }
            anyhow::bail!("scenario rejected: {}", report)
        }
        Err(err) => Err(err).context("scenario aborted"),
    }
}

/// Explicit stops first, then any random extras
fn build_route(
    mut route: Vec<Location>,
    random_stops: Option<usize>,
    seed: Option<u64>,
) -> Vec<Location> {
    if let Some(count) = random_stops {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        route.extend((0..count).filter_map(|_| Location::ALL.choose(&mut rng).copied()));
    }
    route
}

/// Drive one plan to completion; true when every target was reached exactly
async fn run_scenario<C: Clock>(
    engine: Arc<SimulationEngine<C>>,
    plan: ScenarioPlan,
) -> Result<bool> {
    engine.start();

    if plan.cold_start {
        engine.simulate_cold_start().await;
        info!("After cold start: {}", engine.current_state().summary());
    }

    engine
        .accelerate(plan.target_speed)
        .await
        .with_context(|| format!("accelerating to {} mph", plan.target_speed))?;
    let mut reached = engine.current_state().speed == plan.target_speed;
    info!("After acceleration: {}", engine.current_state().summary());

    for stop in &plan.route {
        engine.navigate_to(*stop).await;
        info!("Arrived: {}", engine.current_state().summary());
    }

    if let Some(target) = plan.brake_to {
        engine
            .brake(target)
            .await
            .with_context(|| format!("braking to {target} mph"))?;
        reached &= engine.current_state().speed == target;
        info!("After braking: {}", engine.current_state().summary());
    }

    engine.stop();

    let state = engine.current_state();
    let in_bounds = (0.0..=1.0).contains(&state.fuel_level)
        && (0.0..=1.0).contains(&state.battery_level)
        && state.speed >= 0.0;

    info!("Final state: {}", state.summary());
    Ok(reached && in_bounds)
}
