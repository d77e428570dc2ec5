use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use coachdesk_db::DbPool;
use coachdesk_seed::{files, seeder};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "coachdesk-seed", about = "Seed skills and translations")]
struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upsert skills from a JSON array of `{name, category, description}`.
    Skills {
        #[arg(long, default_value = "seed-data/skills.json")]
        file: PathBuf,
    },
    /// Upsert translations from a JSON array of `{id, translations}`.
    Translations {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        list_type: String,
    },
    /// Create English translations for skills that have none.
    MissingTranslations,
    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coachdesk_seed=info,coachdesk_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let pool = coachdesk_db::create_pool(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    let result = run(&pool, cli.command).await;

    pool.close().await;
    tracing::info!("Database pool closed");
    result
}

async fn run(pool: &DbPool, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Skills { file } => {
            let records = files::load_skills(&file)?;
            tracing::info!(file = %file.display(), count = records.len(), "Seeding skills");
            let summary = seeder::seed_skills(pool, records).await;
            tracing::info!(%summary, "Skills seeded");
        }
        Command::Translations { file, list_type } => {
            let records = files::load_translations(&file)?;
            tracing::info!(file = %file.display(), list_type = %list_type, count = records.len(), "Seeding translations");
            let summary = seeder::seed_translations(pool, &list_type, records).await;
            tracing::info!(%summary, "Translations seeded");
        }
        Command::MissingTranslations => {
            let report = seeder::seed_missing_translations(pool).await?;
            tracing::info!(
                summary = %report.summary,
                incomplete = report.incomplete.len(),
                "Missing translations handled",
            );
        }
        Command::Migrate => {
            coachdesk_db::run_migrations(pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");
        }
    }
    Ok(())
}
