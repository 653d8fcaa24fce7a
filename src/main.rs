use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use weathergen::api::AppState;
use weathergen::view::{CodeView, DashboardView};
use weathergen::{
    ApplicationController, GeminiClient, LocationQuery, WeatherGenConfig, WeatherQueryService,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "AI-generated weather forecasts", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the dashboard and JSON API
    Serve {
        /// Port to listen on, overrides `server.port`
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Generate one forecast and print it
    Forecast {
        #[arg(short, long)]
        location: String,

        /// Print the generated Python script instead of the dashboard
        #[arg(long)]
        code: bool,
    },
}

fn build_service(config: &WeatherGenConfig) -> Result<WeatherQueryService> {
    let client = GeminiClient::from_config(&config.ai)
        .map_err(weathergen::WeatherGenError::from)
        .context("Failed to create model client")?;
    Ok(WeatherQueryService::new(Arc::new(client))
        .with_parallel_requests(config.ai.parallel_requests))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = WeatherGenConfig::load_from_path(args.config)?;
    if args.verbose {
        config.logging.level = "debug".to_string();
    }
    config.logging.init_tracing();

    let service = build_service(&config)?;

    match args.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }

            let controller = ApplicationController::new(service);
            controller.start(&config.defaults.initial_location);

            let state = AppState {
                controller,
                presentation: config.presentation.clone(),
            };
            weathergen::web::run(&config.server, state).await
        }
        Command::Forecast { location, code } => {
            let query = LocationQuery::parse(&location)?;
            info!("Requesting forecast for '{}'", query);

            let result = match service.fetch_forecast(&query).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!("Forecast failed: {e}");
                    anyhow::bail!(e.user_message());
                }
            };

            if code {
                print!("{}", CodeView::from_result(&result, &config.presentation));
            } else {
                print!("{}", DashboardView::from_result(&result));
            }
            Ok(())
        }
    }
}
