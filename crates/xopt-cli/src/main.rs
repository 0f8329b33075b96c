mod clients;
mod db;
mod report;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use xopt_core::YearMonth;

use crate::clients::ClientsCommands;
use crate::db::DbCommands;

#[derive(Debug, Parser)]
#[command(name = "xopt-cli")]
#[command(about = "X account consulting dashboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage clients and the current selection
    Clients {
        #[command(subcommand)]
        command: ClientsCommands,
    },
    /// Daily performance logs
    Logs {
        #[command(subcommand)]
        command: LogsCommands,
    },
    /// Print the monthly summary, ratings and top-5 rankings
    Report {
        /// Client id (defaults to the selected client)
        #[arg(long)]
        client: Option<Uuid>,
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<YearMonth>,
    },
}

#[derive(Debug, Subcommand)]
enum LogsCommands {
    /// List one month of logs with their ratings
    List {
        /// Client id (defaults to the selected client)
        #[arg(long)]
        client: Option<Uuid>,
        /// Month as YYYY-MM (defaults to the current month)
        #[arg(long)]
        month: Option<YearMonth>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = xopt_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("xopt-cli ready; run with --help to list commands");
        return Ok(());
    };

    // Clearing the selection is the one command that never touches the database.
    if let Commands::Clients {
        command: ClientsCommands::Clear,
    } = command
    {
        return clients::run_clients_clear(&config.state_path);
    }

    let pool = xopt_db::connect_pool_from_config(&config).await?;
    match command {
        Commands::Db { command } => db::run(&pool, &config, command).await,
        Commands::Clients { command } => clients::run(&pool, &config.state_path, command).await,
        Commands::Logs {
            command: LogsCommands::List { client, month },
        } => {
            let client = clients::resolve_client(&pool, &config.state_path, client).await?;
            report::run_logs_list(&pool, &client, month.unwrap_or_else(YearMonth::current)).await
        }
        Commands::Report { client, month } => {
            let client = clients::resolve_client(&pool, &config.state_path, client).await?;
            report::run_report(&pool, &client, month.unwrap_or_else(YearMonth::current)).await
        }
    }
}

#[cfg(test)]
mod tests;
