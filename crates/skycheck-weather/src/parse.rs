//! Mapping of OpenWeatherMap "current weather" responses into records.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{WeatherError, WeatherRecord};

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    #[serde(default)]
    name: Option<String>,
    main: Option<MainBlock>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    wind: Option<WindBlock>,
    sys: Option<SysBlock>,
    /// Sometimes a number, sometimes a string ("404")
    cod: Option<Value>,
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    #[serde(default)]
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Default, Deserialize)]
struct SysBlock {
    country: Option<String>,
    #[serde(default)]
    sunrise: i64,
    #[serde(default)]
    sunset: i64,
}

fn status_code(cod: &Value) -> Option<u16> {
    match cod {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a response body into the records it describes.
///
/// The endpoint answers with a single object, so a successful parse yields
/// one record. An embedded non-200 `cod` is reported as an error.
pub fn parse_current_weather(
    body: &str,
    location: &str,
) -> Result<Vec<WeatherRecord>, WeatherError> {
    let response: CurrentWeatherResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;

    if let Some(code) = response.cod.as_ref().and_then(status_code) {
        if code == 404 {
            return Err(WeatherError::LocationNotFound(location.to_string()));
        }
        if code != 200 {
            let message = match response.message {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            return Err(WeatherError::Api { status: code, message });
        }
    }

    let main = response
        .main
        .ok_or_else(|| WeatherError::Parse("missing \"main\" block".to_string()))?;
    let wind = response.wind.unwrap_or_default();
    let sys = response.sys.unwrap_or_default();
    let description = response
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .unwrap_or_default();

    Ok(vec![WeatherRecord {
        name: response.name.unwrap_or_else(|| location.to_string()),
        speed: wind.speed,
        deg: wind.deg,
        temp: main.temp,
        humidity: main.humidity,
        sunrise: sys.sunrise,
        sunset: sys.sunset,
        description,
        country: sys.country.unwrap_or_default(),
    }])
}
