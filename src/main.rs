use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use meownest::lifecycle::{launch, LaunchOptions};

#[derive(Parser, Debug)]
#[command(name = "meownest", version, about = "Prefix-routing HTTP/WebSocket gateway")]
struct Args {
    /// Path to the config file (TOML or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reload routes when the config file changes
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let options = LaunchOptions {
        config: args.config,
        watch: args.watch,
    };

    match launch(options).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialized yet.
            eprintln!("meownest: {e}");
            ExitCode::FAILURE
        }
    }
}
