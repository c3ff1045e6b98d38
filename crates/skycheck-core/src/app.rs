use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use skycheck_weather::{
    WeatherCache, WeatherCall, WeatherFetcher, WeatherProvider, WeatherRequest, WeatherService,
};

use crate::error::AppError;
use crate::Config;

/// Application state and lifecycle manager.
///
/// Owns the runtime and the one weather cache every request surface shares.
pub struct App {
    config: Arc<Config>,
    runtime: tokio::runtime::Runtime,
    service: Arc<WeatherService>,
}

impl App {
    /// Create an application talking to the configured weather API
    pub fn with_config(config: Config) -> Result<Self> {
        let weather = &config.weather;
        let provider = WeatherProvider::new(
            &weather.api_url,
            weather.effective_api_key(),
            weather.temperature_unit,
            Duration::from_secs(weather.request_timeout_secs),
        )
        .map_err(AppError::from)
        .context("Failed to create weather provider")?;

        Self::with_fetcher(config, Arc::new(provider))
    }

    /// Create an application around any fetcher
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn WeatherFetcher>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("skycheck-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        let cache = Arc::new(WeatherCache::new());
        let service = Arc::new(WeatherService::new(cache, fetcher));

        tracing::info!(
            "Weather service ready (cache max age {:?})",
            service.cache().max_age()
        );

        Ok(Self {
            config: Arc::new(config),
            runtime,
            service,
        })
    }

    /// Blocking lookup surface
    pub fn weather_call(&self) -> WeatherCall {
        WeatherCall::new(self.runtime.handle().clone(), self.service.clone())
    }

    /// Callback-based lookup surface
    pub fn weather_request(&self) -> WeatherRequest {
        WeatherRequest::new(self.runtime.handle().clone(), self.service.clone())
    }

    pub fn cache(&self) -> &Arc<WeatherCache> {
        self.service.cache()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Shut down the runtime, waiting briefly for in-flight lookups
    pub fn shutdown(self) {
        tracing::info!("Shutting down application");
        self.runtime.shutdown_timeout(Duration::from_secs(1));
    }
}
