//! Database maintenance commands.

use clap::Subcommand;
use xopt_core::AppConfig;

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that the database answers
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert the system hooks and templates from the library file
    Seed,
}

pub(crate) async fn run(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: DbCommands,
) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            xopt_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = xopt_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed => {
            let library = xopt_core::load_library(&config.library_path)?;
            let counts = xopt_db::seed_library(pool, &library).await?;
            tracing::info!(path = %config.library_path.display(), "library seeded");
            println!(
                "seeded {} hook(s) and {} template(s)",
                counts.hooks, counts.templates
            );
        }
    }
    Ok(())
}
