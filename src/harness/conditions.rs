//! Detroit driving conditions used to describe test scenarios

/// Kind of precipitation during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precipitation {
    None,
    Rain,
    Snow,
    Ice,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherCondition {
    /// Celsius
    pub temperature: f64,
    /// 0.0 to 1.0
    pub humidity: f64,
    pub precipitation: Precipitation,
}

impl WeatherCondition {
    pub fn is_freezing(&self) -> bool {
        self.temperature <= 0.0
            || matches!(self.precipitation, Precipitation::Snow | Precipitation::Ice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficPattern {
    pub location: &'static str,
    /// 0.0 to 1.0
    pub congestion_level: f64,
    /// Hour of day, 0-23
    pub time_of_day: u8,
}

/// Seasonal weather a Detroit vehicle is expected to handle
pub fn detroit_weather_conditions() -> Vec<WeatherCondition> {
    vec![
        WeatherCondition {
            temperature: -10.0,
            humidity: 0.8,
            precipitation: Precipitation::Snow,
        },
        WeatherCondition {
            temperature: 35.0,
            humidity: 0.9,
            precipitation: Precipitation::Rain,
        },
        WeatherCondition {
            temperature: 5.0,
            humidity: 0.7,
            precipitation: Precipitation::Ice,
        },
        WeatherCondition {
            temperature: 25.0,
            humidity: 0.6,
            precipitation: Precipitation::None,
        },
    ]
}

/// Peak congestion on the main Detroit corridors
pub fn detroit_traffic_patterns() -> Vec<TrafficPattern> {
    vec![
        TrafficPattern {
            location: "I-75 Southbound",
            congestion_level: 0.8,
            time_of_day: 8,
        },
        TrafficPattern {
            location: "M-10 Lodge",
            congestion_level: 0.9,
            time_of_day: 17,
        },
        TrafficPattern {
            location: "I-94 Downtown",
            congestion_level: 0.7,
            time_of_day: 12,
        },
        TrafficPattern {
            location: "Ambassador Bridge",
            congestion_level: 0.6,
            time_of_day: 14,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_in_range() {
        for weather in detroit_weather_conditions() {
            assert!((0.0..=1.0).contains(&weather.humidity));
        }
        for pattern in detroit_traffic_patterns() {
            assert!((0.0..=1.0).contains(&pattern.congestion_level));
            assert!(pattern.time_of_day < 24);
        }
    }

    #[test]
    fn test_freezing_weather() {
        let freezing: Vec<_> = detroit_weather_conditions()
            .into_iter()
            .filter(WeatherCondition::is_freezing)
            .collect();
        assert_eq!(freezing.len(), 2);
    }
}
