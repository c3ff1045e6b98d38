use serde::{Deserialize, Serialize};

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Auto,
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Value of the `units` query parameter sent to OpenWeatherMap.
    /// `Auto` keeps the provider's imperial default.
    pub fn api_units(&self) -> &'static str {
        match self {
            Self::Auto | Self::Fahrenheit => "imperial",
            Self::Celsius => "metric",
        }
    }

    /// Short suffix for display
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Auto | Self::Fahrenheit => "°F",
            Self::Celsius => "°C",
        }
    }
}

/// Current conditions for one place, as reported by the weather API.
///
/// A lookup may yield several of these; the first one is the primary match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub name: String,
    /// Wind speed in the requested unit system
    pub speed: f64,
    /// Wind direction in degrees
    pub deg: f64,
    pub temp: f64,
    pub humidity: i64,
    /// Unix seconds
    pub sunrise: i64,
    /// Unix seconds
    pub sunset: i64,
    pub description: String,
    pub country: String,
}

impl WeatherRecord {
    /// One-line human readable summary.
    pub fn summary(&self, unit: TemperatureUnit) -> String {
        let place = if self.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.country)
        };
        format!(
            "{}: {:.1}{} {}, humidity {}%, wind {:.1} @ {:.0}°",
            place,
            self.temp,
            unit.symbol(),
            self.description,
            self.humidity,
            self.speed,
            self.deg
        )
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Location not found: {0}")]
    LocationNotFound(String),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}
