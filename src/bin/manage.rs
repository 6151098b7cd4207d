//! Management CLI
//!
//! Operational companion to the HTTP server: schema migration, catalog
//! seeding and bootstrap-admin creation. All subcommands are idempotent and
//! safe to re-run on deploy.

use anyhow::Context;
use clap::{Parser, Subcommand};
use cms_rs::auth::provision;
use cms_rs::config::Config;
use cms_rs::storage::database::Database;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "manage", about = "cms-rs management commands", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or migrate the database schema
    InitDb,
    /// Seed the permission and role catalog (idempotent by name)
    Seed,
    /// Create the bootstrap administrator account if absent
    CreateAdmin,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::InitDb => {
            db.migrate().await.context("Migration failed")?;
            info!("Database schema is up to date");
        }
        Commands::Seed => {
            db.migrate().await.context("Migration failed")?;
            provision::seed_catalog(&db)
                .await
                .context("Seeding failed")?;
            info!("Permission and role catalog seeded");
        }
        Commands::CreateAdmin => {
            db.migrate().await.context("Migration failed")?;
            provision::seed_catalog(&db)
                .await
                .context("Seeding failed")?;
            let created = provision::create_bootstrap_admin(&db)
                .await
                .context("Bootstrap admin creation failed")?;
            if created {
                info!(
                    "Bootstrap administrator created ({})",
                    provision::BOOTSTRAP_ADMIN_EMAIL
                );
            } else {
                info!("Bootstrap administrator already exists, nothing to do");
            }
        }
    }

    Ok(())
}
