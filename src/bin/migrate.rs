//! Out-of-band schema lifecycle runner: `migrate up` / `migrate down`.
//! Invoked before normal startup, never by the bootstrapper.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use roost::Settings;
use roost::db::SchemaMigrator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let settings = Settings::load()?;
    let migrator = SchemaMigrator::from_settings(&settings)?;

    match std::env::args().nth(1).as_deref() {
        Some("up") => migrator.up().await?,
        Some("down") => migrator.down().await?,
        other => {
            eprintln!(
                "usage: migrate <up|down> (got `{}`)",
                other.unwrap_or_default()
            );
            std::process::exit(2);
        }
    }
    Ok(())
}
