use crate::{
    CancelToken, Config, FetchError, WeatherReading, WeatherRequest,
    provider::mock::MockWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod mock;

pub use mock::DEFAULT_DELAY;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Produce a reading for `request`, or fail with [`FetchError::Cancelled`]
    /// once `cancel` fires.
    async fn fetch_reading(
        &self,
        request: &WeatherRequest,
        cancel: &CancelToken,
    ) -> Result<WeatherReading, FetchError>;
}

/// Construct the mock provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    config.validate()?;

    let mut provider =
        MockWeatherProvider::new(config.delay()).with_failure_rate(config.failure_rate);
    if let Some(seed) = config.seed {
        provider = provider.with_seed(seed);
    }

    Ok(Box::new(provider))
}
