use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, ops::Range};

/// Temperature range in °C, upper bound exclusive.
pub const TEMPERATURE_RANGE: Range<i32> = 10..30;
/// Relative humidity range in percent, upper bound exclusive.
pub const HUMIDITY_RANGE: Range<u8> = 40..100;
/// Wind speed range in km/h, upper bound exclusive.
pub const WIND_SPEED_RANGE: Range<u32> = 0..50;
/// The wind icon is shown for speeds strictly above this value.
pub const WIND_ICON_THRESHOLD_KMH: u32 = 25;

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub city: String,
}

impl WeatherRequest {
    pub fn new(city: impl Into<String>) -> Self {
        Self { city: city.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    Sunny,
    Rainy,
    Cloudy,
    Snowy,
}

impl Condition {
    pub const ALL: [Condition; 4] = [
        Condition::Sunny,
        Condition::Rainy,
        Condition::Cloudy,
        Condition::Snowy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::Sunny => "sunny",
            Condition::Rainy => "rainy",
            Condition::Cloudy => "cloudy",
            Condition::Snowy => "snowy",
        }
    }

    /// Human-facing label shown next to the condition image.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Sunny => "Sunny",
            Condition::Rainy => "Rainy",
            Condition::Cloudy => "Cloudy",
            Condition::Snowy => "Snowy",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<&str> for Condition {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown condition '{value}'. Known conditions: sunny, rainy, cloudy, snowy."
                )
            })
    }
}

/// One synthetic weather data point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature_c: i32,
    pub humidity_pct: u8,
    pub wind_speed_kmh: u32,
    pub condition: Condition,
    pub observed_at: DateTime<Utc>,
}

impl WeatherReading {
    pub fn is_windy(&self) -> bool {
        self.wind_speed_kmh > WIND_ICON_THRESHOLD_KMH
    }

    /// True when every field lies inside its documented range.
    pub fn is_within_ranges(&self) -> bool {
        TEMPERATURE_RANGE.contains(&self.temperature_c)
            && HUMIDITY_RANGE.contains(&self.humidity_pct)
            && WIND_SPEED_RANGE.contains(&self.wind_speed_kmh)
    }
}

#[cfg(test)]
pub(crate) fn reading(condition: Condition, wind_speed_kmh: u32) -> WeatherReading {
    WeatherReading {
        temperature_c: 21,
        humidity_pct: 55,
        wind_speed_kmh,
        condition,
        observed_at: Utc::now(),
    }
}
