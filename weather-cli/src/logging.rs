use anyhow::{Context, Result};
use std::{fs::OpenOptions, sync::Mutex};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use weather_core::Config;

pub const LOG_FILE: &str = "weather.log";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stderr,
    /// `weather.log` in the platform cache dir; keeps the terminal window clean.
    File,
}

/// `RUST_LOG` wins; otherwise the level comes from the `-v` count.
pub fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,weather={level},weather_core={level}")
}

pub fn init(verbosity: u8, target: Target) -> Result<()> {
    let registry = tracing_subscriber::registry().with(filter(verbosity));

    match target {
        Target::Stderr => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("Failed to initialise logging")?,
        Target::File => {
            let dir = Config::log_dir()?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let path = dir.join(LOG_FILE);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;

            registry
                .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
                .try_init()
                .context("Failed to initialise logging")?;
        }
    }

    Ok(())
}
