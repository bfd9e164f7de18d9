//! weather-display: display agent for a home weather station
//!
//! One invocation does one thing: fetch the current reading from the
//! station endpoint, format four lines, write them to the 20x4 LCD.
//! Scheduling is cron's job; the agent itself never loops.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod agent;
mod config;
mod display;
mod frame;
mod light;
mod sensor;

#[derive(Parser)]
#[command(name = "weather-display")]
#[command(about = "Display agent for a home weather station")]
struct Cli {
    /// Config file path (default: ~/.config/weather-display/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the sensor endpoint URL
    #[arg(long)]
    url: Option<String>,

    /// Render to stdout instead of the LCD
    #[arg(long)]
    console: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the config file in your editor
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config) => run_config_command()?,
        None => run_agent(&cli)?,
    }

    Ok(())
}

/// Open config file in user's editor
fn run_config_command() -> anyhow::Result<()> {
    let config_path = config::Config::path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

    // Create config dir if needed
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Create config file from template if it doesn't exist
    if !config_path.exists() {
        let template = include_str!("../config.toml.example");
        std::fs::write(&config_path, template)?;
        println!("Created config file: {}", config_path.display());
    }

    // Get editor from environment or use defaults
    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| "nano".to_string());

    println!("Opening {} with {}", config_path.display(), editor);

    std::process::Command::new(&editor)
        .arg(&config_path)
        .status()?;

    Ok(())
}

/// Run one fetch-and-render cycle
fn run_agent(cli: &Cli) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = config::Config::load(cli.config.as_deref());
    if let Some(url) = &cli.url {
        config.sensor_url = url.clone();
    }

    tracing::info!("fetching sensor data from {}", config.sensor_url);

    let fetcher = sensor::HttpFetcher::new(config.sensor_url.clone());

    let lux_reader = config
        .light
        .command
        .as_ref()
        .map(light::LuxCommand::new);
    let lux_reader = lux_reader
        .as_ref()
        .map(|l| l as &dyn light::LightSensor);

    if cli.console {
        let mut sink = display::ConsoleDisplay;
        agent::run_cycle(&fetcher, &mut sink, lux_reader, &config)?;
    } else {
        #[cfg(feature = "lcd")]
        {
            let mut sink = display::I2cLcd::open(&config.lcd.bus, config.lcd.address)?;
            agent::run_cycle(&fetcher, &mut sink, lux_reader, &config)?;
        }
        #[cfg(not(feature = "lcd"))]
        anyhow::bail!("built without the lcd feature; run with --console");
    }

    tracing::info!("cycle complete");
    Ok(())
}
