use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{PasswordDisplayMode, Select, Text};
use log::info;
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use weather_matrix_core::{
    Config, DisplayMode, OpenWeatherProvider, RenderOutcome, Units, WeatherStation,
    provider_from_config,
};

use crate::terminal::TerminalDisplay;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-matrix", version, about = "Weather station for RGB pixel matrices")]
pub struct Cli {
    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, location and units interactively.
    Configure,

    /// Run the update/display loop with a terminal preview.
    Run {
        /// Stop after this many ticks; runs until Ctrl-C if absent.
        #[arg(long)]
        ticks: Option<u64>,

        /// Milliseconds between ticks.
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,

        /// Matrix width in pixels, overriding the config.
        #[arg(long)]
        width: Option<u32>,

        /// Matrix height in pixels, overriding the config.
        #[arg(long)]
        height: Option<u32>,
    },

    /// Fetch once and render a single screen.
    Show {
        /// weather, hourly_forecast or daily_forecast.
        #[arg(long, value_parser = parse_mode)]
        mode: Option<DisplayMode>,
    },

    /// Fetch once and print the station status as JSON.
    Info,
}

fn parse_mode(value: &str) -> Result<DisplayMode, String> {
    DisplayMode::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.load_config()?;
        let in_place = self.in_place_preview();

        match self.command {
            Command::Configure => configure(config, self.config.as_deref())?,
            Command::Run {
                ticks,
                tick_ms,
                width,
                height,
            } => {
                let mut config = config;
                if let Some(width) = width {
                    config.display.width = width;
                }
                if let Some(height) = height {
                    config.display.height = height;
                }
                run_loop(config, ticks, Duration::from_millis(tick_ms), in_place).await?;
            }
            Command::Show { mode } => show(config, mode).await?,
            Command::Info => print_info(config).await?,
        }

        Ok(())
    }

    /// Default log filter. The live preview redraws in place, so `run` keeps
    /// routine info lines off the terminal unless `--debug` is given.
    pub fn log_level(&self) -> &'static str {
        match (&self.command, self.debug) {
            (_, true) => "debug",
            (Command::Run { .. }, false) => "warn",
            _ => "info",
        }
    }

    /// In-place redraw only while nothing else is expected on the terminal.
    fn in_place_preview(&self) -> bool {
        !self.debug
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Config::load(),
        }
    }
}

fn configure(mut config: Config, path: Option<&std::path::Path>) -> anyhow::Result<()> {
    let key_help = if config.api_key_configured() {
        "Leave empty to keep the current key"
    } else {
        "Get one at https://openweathermap.org/api"
    };
    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message(key_help)
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    config.location.city = Text::new("City:")
        .with_default(&config.location.city)
        .prompt()?;
    config.location.state = Text::new("State:")
        .with_default(&config.location.state)
        .prompt()?;
    config.location.country = Text::new("Country code:")
        .with_default(&config.location.country)
        .prompt()?;

    let current = Units::all()
        .iter()
        .position(|u| *u == config.units)
        .unwrap_or_default();
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(current)
        .prompt()?;

    let saved_to = match path {
        Some(path) => {
            config.save_to(path)?;
            path.to_path_buf()
        }
        None => {
            config.save()?;
            Config::config_file_path()?
        }
    };
    println!("Configuration saved to {}", saved_to.display());
    Ok(())
}

type TerminalStation = WeatherStation<OpenWeatherProvider, TerminalDisplay<std::io::Stdout>>;

fn station(config: Config, provider: OpenWeatherProvider, in_place: bool) -> TerminalStation {
    let display = TerminalDisplay::stdout(config.display.width, config.display.height, in_place);
    WeatherStation::new(config, provider, display)
}

/// Provider that may run without a key; the station reports a missing one.
fn lenient_provider(config: &Config) -> anyhow::Result<OpenWeatherProvider> {
    Ok(OpenWeatherProvider::new(config.api_key.trim().to_owned())?)
}

async fn run_loop(
    config: Config,
    ticks: Option<u64>,
    tick: Duration,
    in_place: bool,
) -> anyhow::Result<()> {
    let provider = lenient_provider(&config)?;
    let mut station = station(config, provider, in_place);
    let mut done = 0u64;

    loop {
        let now = Instant::now();
        station.update(now).await;
        let advance = station.switch_due(now);
        station.display(None, advance, now);

        done += 1;
        if ticks.is_some_and(|n| done >= n) {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(tick) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    station.cleanup();
    Ok(())
}

async fn show(config: Config, mode: Option<DisplayMode>) -> anyhow::Result<()> {
    let provider = provider_from_config(&config)?;
    let mut station = station(config, provider, false);

    let now = Instant::now();
    station.update(now).await;
    match station.display(mode, false, now) {
        RenderOutcome::NoData => anyhow::bail!("No weather data available"),
        RenderOutcome::Failed(mode) => anyhow::bail!("Failed to display {mode}"),
        RenderOutcome::Redrawn(_) | RenderOutcome::Refreshed(_) => Ok(()),
    }
}

async fn print_info(config: Config) -> anyhow::Result<()> {
    let provider = lenient_provider(&config)?;
    let mut station = station(config, provider, false);
    station.update(Instant::now()).await;

    let json = serde_json::to_string_pretty(&station.info())
        .context("Failed to serialize station info")?;
    println!("{json}");
    Ok(())
}
