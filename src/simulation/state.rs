//! Physical readings of the simulated vehicle

use super::types::Location;

/// Snapshot of the vehicle's physical state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    /// Miles per hour, never negative
    pub speed: f64,
    /// Fraction of full charge, 0.0 to 1.0
    pub battery_level: f64,
    /// Fraction of a full tank, 0.0 to 1.0
    pub fuel_level: f64,
    /// Fahrenheit
    pub engine_temperature: f64,
    pub location: Location,
    pub is_connected: bool,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            speed: 0.0,
            battery_level: 1.0,
            fuel_level: 1.0,
            engine_temperature: 70.0,
            location: Location::Downtown,
            is_connected: true,
        }
    }

    /// Advance the physics by `delta_secs` of simulated time
    pub fn update(&mut self, delta_secs: f64) {
        if self.speed > 0.0 {
            let consumption = self.speed * delta_secs * 0.001;
            self.fuel_level = (self.fuel_level - consumption).max(0.0);
            self.battery_level = (self.battery_level - consumption * 0.5).max(0.0);
        }

        // First-order lag toward a speed-dependent running temperature
        let target_temperature = 180.0 + self.speed * 0.5;
        self.engine_temperature +=
            (target_temperature - self.engine_temperature) * delta_secs * 0.1;
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        format!(
            "Speed: {:.1} mph | Battery: {:.1}% | Fuel: {:.1}% | Engine: {:.1}F | At: {}",
            self.speed,
            self.battery_level * 100.0,
            self.fuel_level * 100.0,
            self.engine_temperature,
            self.location
        )
    }
}
