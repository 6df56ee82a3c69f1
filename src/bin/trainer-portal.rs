// ABOUTME: Trainer Portal server and maintenance CLI
// ABOUTME: Serves the dashboards or checks connectivity to the Supabase project
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Trainer Portal Contributors

//! # Trainer Portal
//!
//! ## Usage
//!
//! ```bash
//! # Serve the dashboards (default subcommand)
//! cargo run --bin trainer-portal
//!
//! # Override the port, verbose logging
//! cargo run --bin trainer-portal -- -v serve --port 8080
//!
//! # Smoke-test SUPABASE_URL / SUPABASE_KEY
//! cargo run --bin trainer-portal -- check-connection
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use trainer_portal::config::environment::ServerConfig;
use trainer_portal::errors::AppResult;
use trainer_portal::logging;
use trainer_portal::resources::ServerResources;
use trainer_portal::server;
use trainer_portal::services::Services;
use trainer_portal::store::supabase::SupabaseClient;

#[derive(Parser)]
#[command(
    name = "trainer-portal",
    about = "Trainer Portal",
    long_about = "Workout and meal plan dashboards for trainers and their clients"
)]
struct Cli {
    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Port override for HTTP_PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Query the profiles table with the project key and report the result
    CheckConnection,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.message);
            return ExitCode::FAILURE;
        }
    };
    config.logging.verbose = cli.verbose;
    if let Err(e) = logging::init(&config.logging) {
        eprintln!("{}", e.message);
        return ExitCode::FAILURE;
    }

    let result = match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.http_port = port;
            }
            run_server(config).await
        }
        Command::CheckConnection => check_connection(&config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_fatal() => {
            eprintln!("{}", e.message);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(code = e.code.as_str(), "{}", e.message);
            ExitCode::FAILURE
        }
    }
}

fn build_services(config: &ServerConfig) -> AppResult<Services> {
    let client = Arc::new(SupabaseClient::new(&config.supabase)?);
    Ok(Services::new(Arc::clone(&client) as _, client))
}

async fn run_server(config: ServerConfig) -> AppResult<()> {
    info!(
        supabase = %config.supabase.url,
        port = config.http_port,
        "Starting Trainer Portal"
    );
    let services = build_services(&config)?;
    let resources = Arc::new(ServerResources::new(services, config.session));
    server::serve(&config, resources).await
}

async fn check_connection(config: &ServerConfig) -> AppResult<()> {
    let services = build_services(config)?;
    let report = services.check_connection().await?;
    println!(
        "Connected to {} ({} visible profiles, {} ms)",
        config.supabase.url,
        report.visible_profiles,
        report.elapsed.as_millis()
    );
    Ok(())
}
