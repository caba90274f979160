use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use roost::middleware::RequestLog;
use roost::{HttpRuntime, Settings, handlers};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

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
    info!(
        port = %settings.port,
        auth = settings.auth.kind.as_deref().unwrap_or("<none>"),
        mysql = settings.db.mysql.enabled,
        mongodb = settings.db.mongodb.enabled,
        "settings loaded"
    );

    let mut runtime = HttpRuntime::new();
    runtime.push_step(RequestLog);
    runtime.register(handlers::test_handler());
    runtime.register_with_mysql(handlers::user_routes);

    // Blocks serving; only returns on failure.
    roost::bootstrap::run(&settings, runtime).await?;
    Ok(())
}
