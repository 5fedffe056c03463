use async_trait::async_trait;
use chrono::Utc;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use tracing::debug;

use crate::{
    CancelToken, FetchError,
    model::{
        Condition, HUMIDITY_RANGE, TEMPERATURE_RANGE, WIND_SPEED_RANGE, WeatherReading,
        WeatherRequest,
    },
};

use super::WeatherProvider;

/// Artificial latency applied to every reading.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

/// Generates random readings after a fixed delay. The city is accepted but
/// does not influence the result.
#[derive(Debug)]
pub struct MockWeatherProvider {
    delay: Duration,
    failure_rate: f64,
    rng: Mutex<StdRng>,
}

impl MockWeatherProvider {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            failure_rate: 0.0,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Make the sequence of readings reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Probability in `[0, 1]` that a fetch fails; out-of-range values are clamped.
    pub fn with_failure_rate(mut self, rate: f64) -> Self {
        self.failure_rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        self
    }

    fn draw(&self) -> Result<WeatherReading, FetchError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        if self.failure_rate > 0.0 && rng.gen_bool(self.failure_rate) {
            return Err(FetchError::Failure("simulated provider failure".to_string()));
        }

        let condition = Condition::ALL[rng.gen_range(0..Condition::ALL.len())];

        Ok(WeatherReading {
            temperature_c: rng.gen_range(TEMPERATURE_RANGE),
            humidity_pct: rng.gen_range(HUMIDITY_RANGE),
            wind_speed_kmh: rng.gen_range(WIND_SPEED_RANGE),
            condition,
            observed_at: Utc::now(),
        })
    }
}

impl Default for MockWeatherProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn fetch_reading(
        &self,
        request: &WeatherRequest,
        cancel: &CancelToken,
    ) -> Result<WeatherReading, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let outcome = self.draw();
        debug!(
            city = %request.city,
            delay_ms = self.delay.as_millis() as u64,
            "mock reading scheduled"
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(city = %request.city, "mock reading cancelled");
                Err(FetchError::Cancelled)
            }
            _ = tokio::time::sleep(self.delay) => outcome,
        }
    }
}
