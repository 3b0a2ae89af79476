//! Amazon product widget CLI - lookups, rendering and cache maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Print product records as JSON (fetched on a cache miss)
//! apw-cli lookup 0132350882 0439136369
//!
//! # Render the widget for a list of ASINs
//! apw-cli render --title "Reading" --list "0132350882
//! 0439136369"
//!
//! # Check the configured AWS credentials
//! apw-cli validate
//!
//! # Drop every cached product record
//! apw-cli cache clear
//!
//! # Apply database migrations (requires APW_DATABASE_URL)
//! apw-cli migrate
//! ```
//!
//! Configuration is read from the environment; see
//! [`amazon_product_widget::config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use amazon_product_widget::config::WidgetConfig;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "apw-cli")]
#[command(author, version, about = "Amazon product widget tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print product records as JSON
    Lookup {
        /// ASINs or ISBN-10s to look up
        #[arg(required = true)]
        asins: Vec<String>,
    },
    /// Render the widget HTML
    Render {
        /// Widget title
        #[arg(short, long, default_value = "")]
        title: String,

        /// ASINs, one per line
        #[arg(short, long, default_value = amazon_product_widget::widget::DEFAULT_ASIN)]
        list: String,

        /// Template file (defaults to the built-in cover shot)
        #[arg(long)]
        template: Option<PathBuf>,
    },
    /// Check the configured AWS credentials
    Validate,
    /// Manage the item cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Run database migrations
    Migrate,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached record
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &WidgetConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    if guard.is_enabled() {
        Some(guard)
    } else {
        None
    }
}

/// Filter tracing events for Sentry: errors and warnings become events.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = WidgetConfig::from_env();

    let sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "amazon_product_widget=info,apw_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            sentry_guard
                .is_some()
                .then(|| sentry_tracing::layer().event_filter(sentry_event_filter)),
        )
        .init();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &WidgetConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Lookup { asins } => commands::lookup::run(config, &asins).await?,
        Commands::Render {
            title,
            list,
            template,
        } => commands::render::run(config, &title, &list, template.as_deref()).await?,
        Commands::Validate => commands::validate::run(config).await?,
        Commands::Cache { action } => match action {
            CacheAction::Clear => commands::cache::clear(config).await?,
        },
        Commands::Migrate => commands::migrate::run(config).await?,
    }
    Ok(())
}
