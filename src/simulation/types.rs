//! Core types for the vehicle simulation
//!
//! Vehicle classes, locations and the constant tables keyed by them.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::SimError;

/// Simulated time covered by one physics step, in seconds
pub const STEP_DT: f64 = 0.1;

/// Suspension paired with every physics step
pub const STEP_DURATION: Duration = Duration::from_millis(100);

/// Travel delay for one unit of traffic multiplier
pub const TRAVEL_UNIT: Duration = Duration::from_secs(1);

/// Warm-up suspension after a cold start
pub const WARM_UP_DURATION: Duration = Duration::from_secs(5);

/// Battery retained after a cold start
pub const COLD_START_BATTERY_FACTOR: f64 = 0.7;

/// Engine temperature right after a cold start (Fahrenheit)
pub const COLD_START_TEMPERATURE: f64 = 32.0;

/// Class of vehicle being simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleClass {
    Sedan,
    Suv,
    Truck,
    Electric,
    Hybrid,
    Autonomous,
}

/// Acceleration and braking rates for a vehicle class, in mph per step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleProfile {
    pub acceleration_rate: f64,
    pub braking_rate: f64,
}

const SEDAN: VehicleProfile = VehicleProfile {
    acceleration_rate: 5.0,
    braking_rate: 8.0,
};
const SUV: VehicleProfile = VehicleProfile {
    acceleration_rate: 4.0,
    braking_rate: 7.0,
};
const TRUCK: VehicleProfile = VehicleProfile {
    acceleration_rate: 3.0,
    braking_rate: 6.0,
};
// Regenerative braking
const ELECTRIC: VehicleProfile = VehicleProfile {
    acceleration_rate: 7.0,
    braking_rate: 9.0,
};
const HYBRID: VehicleProfile = VehicleProfile {
    acceleration_rate: 5.5,
    braking_rate: 8.5,
};
const AUTONOMOUS: VehicleProfile = VehicleProfile {
    acceleration_rate: 4.5,
    braking_rate: 10.0,
};

impl VehicleClass {
    pub const ALL: [VehicleClass; 6] = [
        VehicleClass::Sedan,
        VehicleClass::Suv,
        VehicleClass::Truck,
        VehicleClass::Electric,
        VehicleClass::Hybrid,
        VehicleClass::Autonomous,
    ];

    /// Static rate table lookup
    pub fn profile(self) -> &'static VehicleProfile {
        match self {
            VehicleClass::Sedan => &SEDAN,
            VehicleClass::Suv => &SUV,
            VehicleClass::Truck => &TRUCK,
            VehicleClass::Electric => &ELECTRIC,
            VehicleClass::Hybrid => &HYBRID,
            VehicleClass::Autonomous => &AUTONOMOUS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VehicleClass::Sedan => "sedan",
            VehicleClass::Suv => "suv",
            VehicleClass::Truck => "truck",
            VehicleClass::Electric => "electric",
            VehicleClass::Hybrid => "hybrid",
            VehicleClass::Autonomous => "autonomous",
        }
    }
}

impl fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VehicleClass {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VehicleClass::ALL
            .into_iter()
            .find(|class| class.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SimError::UnknownVariant {
                kind: "vehicle class",
                value: s.to_string(),
            })
    }
}

/// A place in Detroit the vehicle can travel to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Location {
    #[default]
    Downtown,
    Midtown,
    Corktown,
    Riverfront,
    I75,
    M10Lodge,
    Ambassador,
}

impl Location {
    pub const ALL: [Location; 7] = [
        Location::Downtown,
        Location::Midtown,
        Location::Corktown,
        Location::Riverfront,
        Location::I75,
        Location::M10Lodge,
        Location::Ambassador,
    ];

    /// Scales travel delay; always greater than zero
    pub fn traffic_multiplier(self) -> f64 {
        match self {
            Location::Downtown | Location::Midtown => 1.5,
            Location::I75 | Location::M10Lodge => 2.0,
            Location::Ambassador => 1.8,
            Location::Corktown | Location::Riverfront => 1.2,
        }
    }

    /// Time spent travelling to this location
    pub fn travel_delay(self) -> Duration {
        TRAVEL_UNIT.mul_f64(self.traffic_multiplier())
    }

    pub fn name(self) -> &'static str {
        match self {
            Location::Downtown => "downtown",
            Location::Midtown => "midtown",
            Location::Corktown => "corktown",
            Location::Riverfront => "riverfront",
            Location::I75 => "i75",
            Location::M10Lodge => "m10-lodge",
            Location::Ambassador => "ambassador",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Location {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('_', "-");
        Location::ALL
            .into_iter()
            .find(|location| location.name().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| SimError::UnknownVariant {
                kind: "location",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_are_positive() {
        for class in VehicleClass::ALL {
            let profile = class.profile();
            assert!(profile.acceleration_rate > 0.0, "{class}");
            assert!(profile.braking_rate > 0.0, "{class}");
        }
        assert_eq!(VehicleClass::Electric.profile().acceleration_rate, 7.0);
        assert_eq!(VehicleClass::Autonomous.profile().braking_rate, 10.0);
    }

    #[test]
    fn test_travel_delay_scales_with_multiplier() {
        assert_eq!(Location::I75.travel_delay(), Duration::from_secs(2));
        assert!((Location::Corktown.travel_delay().as_secs_f64() - 1.2).abs() < 1e-6);
        for location in Location::ALL {
            assert!(location.traffic_multiplier() > 0.0);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Electric".parse::<VehicleClass>().unwrap(), VehicleClass::Electric);
        assert_eq!("m10_lodge".parse::<Location>().unwrap(), Location::M10Lodge);
        assert!("hovercraft".parse::<VehicleClass>().is_err());
        for location in Location::ALL {
            assert_eq!(location.name().parse::<Location>().unwrap(), location);
        }
    }
}
