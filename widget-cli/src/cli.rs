use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use inquire::{InquireError, Password, Select, Text};
use std::sync::Arc;
use tracing::debug;
use weather_widget_core::{
    Config, FixedGeolocator, Geolocator, NoGeolocation, RawPosition, WeatherWidget,
};

use crate::terminal::{self, TerminalAlerts};

/// Typing this at the prompt leaves interactive mode.
const QUIT: &str = ":q";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-widget", version, about = "Current weather in your terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set up the API key (or proxy) and default city.
    Configure,

    /// Show weather once, for a city or for the current position.
    Show {
        /// City name. Without it, the current position or default city is used.
        city: Option<String>,

        #[command(flatten)]
        position: PositionArgs,
    },

    /// Show weather for the current position, then search cities from a prompt.
    Interactive {
        #[command(flatten)]
        position: PositionArgs,
    },
}

/// Device position, overriding `[location]` from the config file.
#[derive(Debug, Args)]
pub struct PositionArgs {
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl PositionArgs {
    /// Out-of-range values are left to the widget, which treats them as a
    /// failed lookup and falls back to the default city.
    fn geolocator(&self, config: &Config) -> Box<dyn Geolocator> {
        let position = match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Some(RawPosition { latitude, longitude }),
            _ => config.location,
        };

        match position {
            Some(position) => Box::new(FixedGeolocator::new(position)),
            None => Box::new(NoGeolocation),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, position } => {
                let widget = build_widget(&position)?;
                match city {
                    Some(city) => widget.submit(&city).await,
                    None => widget.init().await,
                };
                terminal::print_slots(&widget.slots());
                Ok(())
            }
            Command::Interactive { position } => {
                let widget = build_widget(&position)?;
                widget.init().await;
                terminal::print_slots(&widget.slots());
                interactive(&widget).await
            }
        }
    }
}

fn build_widget(position: &PositionArgs) -> anyhow::Result<WeatherWidget> {
    let config = Config::load()?.apply_env();
    let geolocator = position.geolocator(&config);
    WeatherWidget::from_config(&config, geolocator, Arc::new(TerminalAlerts))
}

async fn interactive(widget: &WeatherWidget) -> anyhow::Result<()> {
    loop {
        let input = match Text::new("都市名:").with_help_message(":q で終了").prompt() {
            Ok(input) => input,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => return Err(err.into()),
        };
        if input.trim() == QUIT {
            break;
        }

        let outcome = widget.submit(&input).await;
        debug!(?outcome, "search finished");
        terminal::print_slots(&widget.slots());
    }
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    const DIRECT: &str = "OpenWeather API key";
    const PROXY: &str = "Server-side proxy URL";

    let mut config = Config::load()?;

    match Select::new("How should requests be authorised?", vec![DIRECT, PROXY]).prompt()? {
        DIRECT => {
            let key = Password::new("API key:")
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?;
            config.api_key = Some(key.trim().to_string());
            config.proxy_url = None;
        }
        _ => {
            let url = Text::new("Proxy URL:").prompt().context("Failed to read proxy URL")?;
            config.proxy_url = Some(url.trim().to_string());
        }
    }

    let city = Text::new("Default city:")
        .with_default(config.default_city())
        .prompt()
        .context("Failed to read default city")?;
    config.default_city = Some(city.trim().to_string()).filter(|c| !c.is_empty());

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
