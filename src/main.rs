use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use skycheck_core::{user_message_for, App, AppError, Config, WeatherError};
use skycheck_weather::{TemperatureUnit, WeatherRecord, WeatherServiceMessage};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Units {
    Celsius,
    Fahrenheit,
}

impl From<Units> for TemperatureUnit {
    fn from(u: Units) -> Self {
        match u {
            Units::Celsius => TemperatureUnit::Celsius,
            Units::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

/// Look up current weather for one or more locations
#[derive(Debug, Parser)]
#[command(name = "skycheck", version)]
struct Cli {
    /// Locations to look up, e.g. "Nashville" or "London,GB"
    #[arg(required = true)]
    locations: Vec<String>,

    /// Use the callback-based lookup instead of the blocking one
    #[arg(long = "async")]
    use_async: bool,

    /// Override the configured temperature unit
    #[arg(long, value_enum)]
    units: Option<Units>,

    /// Read configuration from this file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn print_results(location: &str, records: &[WeatherRecord], unit: TemperatureUnit) {
    if records.is_empty() {
        let err = AppError::Weather(WeatherError::NoResults(location.to_string()));
        println!("{}", err.user_message());
        return;
    }
    for record in records {
        println!("{}", record.summary(unit));
    }
}

fn run(cli: Cli) -> Result<()> {
    skycheck_core::init()?;

    let (mut config, _) = match &cli.config {
        Some(path) => Config::load_validated_from(path)?,
        None => Config::load_validated()?,
    };
    if let Some(units) = cli.units {
        config.weather.temperature_unit = units.into();
    }

    let unit = config.weather.temperature_unit;
    let app = App::with_config(config)?;

    if cli.use_async {
        let rx = app.weather_request().get_current_weather_all(cli.locations);
        for WeatherServiceMessage::LookupDone { location, records } in rx {
            print_results(&location, &records, unit);
        }
    } else {
        let call = app.weather_call();
        for location in &cli.locations {
            let records = call.get_current_weather(location);
            print_results(location, &records, unit);
        }
    }

    app.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{}", user_message_for(&e));
            ExitCode::FAILURE
        }
    }
}
