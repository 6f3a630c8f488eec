use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::info;
use weather_core::{Config, DisplayUnit, Session, Status, TogglePolicy, provider};

use crate::{app, logging, output};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather Pro: current conditions and a 3-day forecast")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default `ui` command.
    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the weather window (the default).
    Ui(ViewArgs),

    /// Search once and print the result.
    Show {
        /// City name.
        #[arg(id = "query", value_name = "CITY")]
        city: String,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Store the API key and display preferences.
    Configure,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// City to search for right away.
    #[arg(long)]
    pub city: Option<String>,

    /// Show °F and mph instead of the configured unit.
    #[arg(long)]
    pub fahrenheit: bool,

    /// Start with the 3-day forecast visible.
    #[arg(long)]
    pub forecast: bool,
}

impl ViewArgs {
    fn apply(&self, config: &mut Config) {
        if self.fahrenheit {
            config.unit = DisplayUnit::Fahrenheit;
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let (mut config, config_path) = load_config(self.config.as_deref())?;

        match self.command {
            None => {
                logging::init(self.verbose, logging::Target::File)?;
                run_ui(config, self.view).await
            }
            Some(Command::Ui(view)) => {
                logging::init(self.verbose, logging::Target::File)?;
                run_ui(config, view).await
            }
            Some(Command::Show { city, view }) => {
                logging::init(self.verbose, logging::Target::Stderr)?;
                view.apply(&mut config);
                show(&config, &city, view.forecast).await
            }
            Some(Command::Configure) => {
                logging::init(self.verbose, logging::Target::Stderr)?;
                configure(config, &config_path)
            }
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<(Config, PathBuf)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::config_file_path()?,
    };
    let config = Config::load_from(&path)?;
    Ok((config, path))
}

async fn run_ui(mut config: Config, view: ViewArgs) -> Result<()> {
    view.apply(&mut config);
    let client = provider::client_from_config(&config)?;
    let session = Session::new(Arc::new(client), &config).with_forecast_visible(view.forecast);

    app::run(session, view.city).await
}

async fn show(config: &Config, city: &str, forecast: bool) -> Result<()> {
    let client = provider::client_from_config(config)?;
    let mut session = Session::new(Arc::new(client), config).with_forecast_visible(forecast);

    session.on_search(city).await;

    let screen = session.screen();
    if screen.current.is_none() {
        return Err(anyhow::anyhow!("{}", screen.status.text()));
    }

    print!("{}", output::render_text(screen));
    if let Status::Error(msg) = &screen.status {
        eprintln!("{msg}");
    }
    Ok(())
}

fn configure(mut config: Config, path: &Path) -> Result<()> {
    let api_key = Password::new("WeatherAPI.com API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Get one at https://www.weatherapi.com/my/")
        .prompt()
        .context("API key prompt cancelled")?;

    let units = vec![DisplayUnit::Celsius, DisplayUnit::Fahrenheit];
    let start = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    let unit = Select::new("Default unit:", units)
        .with_starting_cursor(start)
        .prompt()
        .context("Unit prompt cancelled")?;

    let policies = TogglePolicy::all().to_vec();
    let start = policies
        .iter()
        .position(|p| *p == config.toggle_policy)
        .unwrap_or(0);
    let policy = Select::new("On unit toggle:", policies)
        .with_starting_cursor(start)
        .with_help_message("reformat: redraw the last result; refetch: search again")
        .prompt()
        .context("Toggle policy prompt cancelled")?;

    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }
    config.unit = unit;
    config.toggle_policy = policy;
    config.save_to(path)?;

    info!(path = %path.display(), "Configuration saved");
    println!("Saved configuration to {}", path.display());
    Ok(())
}
