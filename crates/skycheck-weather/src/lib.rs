//! Weather lookups for skycheck
//!
//! Fetches current conditions from OpenWeatherMap and keeps recent results
//! in a short-lived in-memory cache keyed by location.

pub mod cache;
pub mod clock;
pub mod parse;
pub mod provider;
pub mod service;
pub mod types;

pub use cache::{WeatherCache, DEFAULT_MAX_AGE_MS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use provider::{WeatherFetcher, WeatherProvider};
pub use service::{
    WeatherCall, WeatherRequest, WeatherResults, WeatherService, WeatherServiceMessage,
};
pub use types::*;
