//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! apw-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `APW_DATABASE_URL` - `PostgreSQL` connection string
//!
//! Migrations live in `crates/widget/migrations/`. Without a database URL
//! options are kept in a JSON file and there is nothing to migrate.

use amazon_product_widget::Result;
use amazon_product_widget::config::WidgetConfig;
use amazon_product_widget::store::OptionBackend;

/// Apply pending migrations to the option store database.
pub async fn run(config: &WidgetConfig) -> Result<()> {
    if config.storage.database_url.is_none() {
        tracing::info!("APW_DATABASE_URL not set; file option store needs no migrations");
        return Ok(());
    }

    tracing::info!("Connecting to option store database...");
    let OptionBackend::Postgres(store) = OptionBackend::connect(&config.storage).await? else {
        return Ok(());
    };

    tracing::info!("Running migrations...");
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
