use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use forecast_core::{Config, LocationQuery, WeatherApiClient, WeatherRecord};

use crate::hours;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Forecast CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com key and the forecast day count.
    Configure,

    /// Show current conditions and the day list for a location.
    Show {
        /// Place name or a "lat,lon" coordinate pair.
        location: String,

        /// Also print today's hourly breakdown.
        #[arg(long)]
        hours: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, hours } => show(&location, hours).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("WeatherAPI.com key:")
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_string());

    let days = inquire::Text::new("Forecast days:")
        .with_initial_value(&config.forecast_days.to_string())
        .prompt()
        .context("Failed to read forecast day count")?;
    config.forecast_days = days
        .trim()
        .parse()
        .context("Forecast days must be a small positive integer")?;

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

async fn show(location: &str, with_hours: bool) -> Result<()> {
    let config = Config::load()?;
    let api_key = config.api_key()?.to_owned();
    let client = WeatherApiClient::new(api_key, config.forecast_days);

    let query = LocationQuery::parse(location);
    let snapshot = client.fetch(&query.as_query()).await?;

    println!("{}", render_current(&snapshot.current));
    println!();
    for day in &snapshot.days {
        println!("{}", render_day(day));
    }

    if with_hours {
        let today = snapshot
            .days
            .first()
            .context("Response contained no forecast days")?;
        println!();
        for hour in hours::decode_hours(&today.hours_payload)? {
            println!("  {}  {:<20} {}°C", hour.time, hour.condition.text, hour.temp_c);
        }
    }

    Ok(())
}

/// The current-conditions card: city, condition, and the instantaneous
/// temperature with today's range alongside. A record without a current
/// temperature falls back to showing the range alone.
fn render_current(current: &WeatherRecord) -> String {
    let mut out = format!(
        "{}  (updated {})\n{}, {}",
        current.city,
        current.timestamp,
        current.condition,
        current.display_temp()
    );
    if current.is_current() {
        out.push_str(&format!(
            "  ({}°C / {}°C)",
            current.max_temp, current.min_temp
        ));
    }
    out
}

fn render_day(day: &WeatherRecord) -> String {
    format!(
        "  {}  {:<20} {}",
        day.timestamp,
        day.condition,
        day.display_temp()
    )
}
