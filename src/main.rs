use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use screenward::classify::{classify, Detection};
use screenward::config::ScreenwardConfig;
use screenward::identity::VerifiedUser;
use screenward::rollup::{aggregate, Period, RollupStore};

#[derive(Parser)]
#[command(
    name = "screenward",
    about = "Content-severity classification and per-app daily usage statistics",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daemon (API server + rollup store)
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,

        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<String>,
    },

    /// Classify a detection list from a JSON file and print the severity
    Classify {
        /// Path to a JSON array of {label, score} detections
        #[arg(long)]
        file: String,
    },

    /// Query aggregated statistics for a user
    Stats {
        /// Verified user email
        #[arg(long)]
        user: String,

        /// Period: today, 7days, 1month, 3months
        #[arg(long, default_value = "today")]
        period: String,

        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<String>,
    },

    /// Seed dummy historical statistics for a user (dev tooling)
    Seed {
        /// User email to seed
        #[arg(long, default_value = "dummyuser@gmail.com")]
        user: String,

        /// Number of days of history, ending today
        #[arg(long, default_value = "30")]
        days: u32,

        /// SQLite database path (overrides config)
        #[arg(long)]
        db: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ScreenwardConfig::load_or_default();

    match cli.command {
        Commands::Serve { bind, db } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(db) = db {
                config.storage.db_path = db;
            }
            tracing::info!(bind = %config.server.bind, "Starting screenward daemon");
            screenward::serve(config).await?;
        }
        Commands::Classify { file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {file}"))?;
            let detections: Vec<Detection> =
                serde_json::from_str(&content).context("expected a JSON array of detections")?;
            let severity = classify(&detections);
            println!("{} ({})", severity.level(), severity);
        }
        Commands::Stats { user, period, db } => {
            if let Some(db) = db {
                config.storage.db_path = db;
            }
            let user = VerifiedUser::parse(&user)?;
            let period: Period = period.parse()?;

            let pool = screenward::storage::open_pool(&config.storage.db_path)?;
            let store = RollupStore::new(pool);

            let (start, end) = period.date_range(chrono::Local::now());
            let range = store.query_range(&user, start, end)?;
            if range.skipped_days > 0 {
                tracing::warn!(skipped_days = range.skipped_days, "some days were unreadable");
            }

            let view = aggregate(&range.records, period);
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Commands::Seed { user, days, db } => {
            if let Some(db) = db {
                config.storage.db_path = db;
            }
            let user = VerifiedUser::parse(&user)?;
            let pool = screenward::storage::open_pool(&config.storage.db_path)?;
            let written = screenward::seed::seed_history(&pool, &user, days)?;
            println!("Seeded {} days for {}.", written, user.email());
        }
    }

    Ok(())
}
