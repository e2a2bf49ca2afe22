use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::json;

use meownest::config::load_config;
use meownest::http::{Gateway, RequestId};
use meownest::security::scope_allows;

#[derive(Parser)]
#[command(name = "nest-cli")]
#[command(about = "Offline tooling for meownest configs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate a config file
    Check { config: PathBuf },
    /// Show which route a path resolves to
    Resolve { config: PathBuf, path: String },
    /// Test whether a space-separated scope authorizes a URI
    Scope { scope: String, uri: String },
    /// Print a freshly generated request ID
    RequestId,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Check { config } => {
            let config = load_config(&config)?;
            let gateway = Gateway::from_config(&config)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "valid": true,
                    "bind_address": config.listener.bind_address,
                    "prefixes": gateway.table.prefixes(),
                    "auth_enabled": gateway.access.is_enabled(),
                }))?
            );
        }
        Commands::Resolve { config, path } => {
            let config = load_config(&config)?;
            let gateway = Gateway::from_config(&config)?;
            match gateway.table.resolve(&path) {
                Ok(found) => {
                    let kinds: Vec<&str> = found.handlers().iter().map(|t| t.kind).collect();
                    let public = found.handlers().first().is_some_and(|t| t.public);
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "path": path,
                            "prefix": found.prefix(),
                            "public": public,
                            "targets": kinds,
                        }))?
                    );
                }
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Scope { scope, uri } => {
            let allowed = scope_allows(&scope, &uri);
            println!("{}", if allowed { "allowed" } else { "denied" });
            if !allowed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::RequestId => {
            let id = RequestId::generate();
            if id.is_empty() {
                eprintln!("entropy source unavailable");
                return Ok(ExitCode::FAILURE);
            }
            println!("{id}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
