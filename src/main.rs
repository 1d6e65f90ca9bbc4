use std::path::PathBuf;

use clap::{Parser, Subcommand};
use footyquiz::{
    config::ServerConfig,
    core::contract::StatsUpsert,
    http::build_router,
    ingest::{ImportReport, import_path},
    persist::sqlite::SqliteStore,
    runtime::{QuizServiceHandle, spawn_quiz_service},
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "footyquiz")]
#[command(about = "Football participation records and ranked quizzes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,

        /// Listen address, e.g. 127.0.0.1:8000
        #[arg(long)]
        bind: Option<String>,

        /// Load the database into memory and serve from there
        #[arg(long)]
        in_memory: bool,

        /// Emit JSON log lines
        #[arg(long)]
        log_json: bool,
    },

    /// Import a stats CSV into the database
    Import {
        /// CSV file with person_id, first_name, last_name, season_label,
        /// club_name, role, appearances, goals, assists columns
        csv: PathBuf,

        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = ServerConfig::from_env();

    match cli.command {
        Commands::Serve {
            db,
            bind,
            in_memory,
            log_json,
        } => {
            if let Some(db) = db {
                config.db_path = db;
            }
            if let Some(bind) = bind {
                config.bind = bind;
            }
            config.in_memory |= in_memory;
            config.log_json |= log_json;
            init_tracing(config.log_json);
            serve(config).await
        }
        Commands::Import { csv, db } => {
            init_tracing(config.log_json);
            let db_path = db.unwrap_or(config.db_path);
            let mut store = SqliteStore::open(&db_path)?;
            let report = import_path(&mut store, &csv)?;
            print_summary(&report);
            Ok(())
        }
    }
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let sqlite = SqliteStore::open(&config.db_path)?;
    let service: QuizServiceHandle = if config.in_memory {
        let store = sqlite.load_store()?;
        info!(
            persons = store.person_count(),
            participations = store.participation_count(),
            "loaded store into memory"
        );
        spawn_quiz_service(store, config.service_config())
    } else {
        spawn_quiz_service(sqlite, config.service_config())
    };

    let listener = TcpListener::bind(&config.bind).await?;
    info!(bind = %config.bind, db = %config.db_path.display(), in_memory = config.in_memory, "serving");

    let shutdown_handle = service.clone();
    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await?;
    shutdown_handle.shutdown().await?;
    Ok(())
}

fn print_summary(report: &ImportReport) {
    println!("Import complete.");
    println!("  rows imported:   {}", report.imported());
    println!("  rows skipped:    {}", report.skipped());
    println!("  persons created: {}", report.persons_created());
    println!("  stats created:   {}", report.stats_with(StatsUpsert::Created));
    println!("  stats updated:   {}", report.stats_with(StatsUpsert::Updated));
}
