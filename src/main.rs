mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

pub use revdash::api::HttpGateway;
pub use revdash::config::{load_config, DashboardConfig};

#[derive(Parser)]
#[command(name = "revdash")]
#[command(about = "revdash — restaurant revenue and orders dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive dashboard
    Ui {
        /// Restaurant to show first (overrides the remembered selection)
        #[arg(long)]
        restaurant: Option<i64>,
    },
    /// Print the orders of one restaurant
    Orders {
        /// Restaurant id
        #[arg(long)]
        restaurant: Option<i64>,
        /// Only orders matching this text
        #[arg(long)]
        search: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the chart data shown on the dashboard
    Charts {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Download the orders spreadsheet
    Export {
        /// Directory to save into (overrides config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show config file path
    Path,
    /// Show the effective configuration
    Show,
    /// Write a config file with default settings
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

/// Builds the HTTP gateway from configuration.
fn gateway(cfg: &DashboardConfig) -> anyhow::Result<HttpGateway> {
    Ok(HttpGateway::new(&cfg.api_base_url, cfg.request_timeout())?)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        // Show help when no command provided
        let mut cmd = Cli::command();
        let _ = cmd.print_help();
        std::process::exit(0);
    };

    if !matches!(command, Commands::Ui { .. }) {
        revdash::logging::init_stderr();
    }

    let result = match command {
        Commands::Ui { restaurant } => commands::ui::handle(restaurant).await,
        Commands::Orders {
            restaurant,
            search,
            json,
        } => commands::orders::handle(restaurant, search, json).await,
        Commands::Charts { json } => commands::charts::handle(json).await,
        Commands::Export { dir } => commands::export::handle(dir).await,
        Commands::Config { cmd } => commands::config::handle(cmd),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
