use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{Parser, Subcommand};
use fare_core::{Config, FareEstimator, ProviderId, ServiceType};
use inquire::Password;

use crate::{
    render,
    session::{RequestDraft, Session},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "fare", version, about = "Ride fare estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

fn parse_service(value: &str) -> Result<ServiceType, String> {
    ServiceType::try_from(value).map_err(|e| e.to_string())
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict the fare for one ride. Missing details are prompted for.
    Predict {
        /// Source address.
        #[arg(long = "from")]
        source: Option<String>,

        /// Destination address.
        #[arg(long = "to")]
        destination: Option<String>,

        /// Ride service: lyft or uber.
        #[arg(long, value_parser = parse_service)]
        service: Option<ServiceType>,

        /// Cab type offered by the service, e.g. "UberX" or "Lux Black".
        #[arg(long)]
        cab: Option<String>,

        /// Where to write the route map.
        #[arg(long, default_value = "route_map.html", conflicts_with = "no_map")]
        map: PathBuf,

        /// Skip the route map.
        #[arg(long)]
        no_map: bool,
    },

    /// Keep prompting for rides until you are done.
    Interactive {
        /// Where to write the route map for each prediction.
        #[arg(long, default_value = "route_map.html")]
        map: PathBuf,
    },

    /// List the cab types each service offers.
    Cabs {
        #[arg(long, value_parser = parse_service)]
        service: Option<ServiceType>,
    },

    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "opencage", "google" or "openweather".
        provider: String,
    },

    /// Print the location of the config file.
    ConfigPath,
}

fn load_estimator() -> anyhow::Result<FareEstimator> {
    let config = Config::load()?.with_env_overrides();
    tracing::debug!(artifacts = ?config.artifacts, "configuration loaded");
    FareEstimator::from_config(&config).context("Failed to initialise the fare estimator")
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Command::Predict { source, destination, service, cab, map, no_map } => {
                let draft = RequestDraft { source, destination, service, cab };
                let request = draft.complete()?;
                let estimator = load_estimator()?;

                println!("Predicting the fare...");
                match estimator.estimate(&request).await {
                    Ok(quote) => {
                        let map_path = (!no_map).then_some(map);
                        render::quote(&quote, map_path.as_deref())?;
                    }
                    Err(err) => {
                        eprintln!("{err}");
                        return Ok(ExitCode::FAILURE);
                    }
                }
            }
            Command::Interactive { map } => {
                let estimator = load_estimator()?;
                Session::new(&estimator, Some(map)).run().await?;
            }
            Command::Cabs { service } => match service {
                Some(service) => render::cab_catalogue(&[service]),
                None => render::cab_catalogue(ServiceType::all()),
            },
            Command::Configure { provider } => {
                let id = ProviderId::try_from(provider.as_str())?;
                let mut config = Config::load()?;
                if config.is_provider_configured(id) {
                    println!("An API key for {id} is already saved; entering a new one replaces it.");
                }

                let api_key = Password::new(&format!("API key for {id}:"))
                    .without_confirmation()
                    .prompt()?;
                config.upsert_provider_api_key(id, api_key.trim().to_string());
                config.save()?;
                println!("Saved API key for {id} to {}", Config::config_file_path()?.display());
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
