//! OpenWeatherMap client and the fetcher seam the lookup service calls.

use reqwest::{Client, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::parse::parse_current_weather;
use crate::types::{TemperatureUnit, WeatherError, WeatherRecord};

pub const DEFAULT_API_URL: &str = "http://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub type FetchResult = Result<Vec<WeatherRecord>, WeatherError>;
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = FetchResult> + Send + 'a>>;

/// Anything that can turn a location string into weather records.
pub trait WeatherFetcher: Send + Sync {
    fn fetch<'a>(&'a self, location: &'a str) -> FetchFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_url: Url,
    api_key: Option<String>,
    unit: TemperatureUnit,
}

impl WeatherProvider {
    pub fn new(
        api_url: &str,
        api_key: Option<String>,
        unit: TemperatureUnit,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_url: Url::parse(api_url)?,
            api_key,
            unit,
        })
    }

    /// Build the request URL. The location is percent-encoded by `Url`.
    fn request_url(&self, location: &str) -> Url {
        let mut url = self.api_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("units", self.unit.api_units());
            query.append_pair("q", location);
            if let Some(key) = &self.api_key {
                query.append_pair("appid", key);
            }
        }
        url
    }

    /// Fetch current conditions for `location`.
    pub async fn current_weather(&self, location: &str) -> FetchResult {
        let url = self.request_url(location);
        tracing::debug!("Weather request for {}: {}", location, self.api_url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match status {
            s if s.is_success() => parse_current_weather(&body, location),
            StatusCode::NOT_FOUND => Err(WeatherError::LocationNotFound(location.to_string())),
            StatusCode::UNAUTHORIZED => Err(WeatherError::InvalidApiKey),
            s => Err(WeatherError::Api {
                status: s.as_u16(),
                message: body,
            }),
        }
    }
}

impl WeatherFetcher for WeatherProvider {
    fn fetch<'a>(&'a self, location: &'a str) -> FetchFuture<'a> {
        Box::pin(self.current_weather(location))
    }
}
