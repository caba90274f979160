//! Fixed-order activation sequence.

use tracing::info;

use crate::auth::AuthStrategy;
use crate::config::Settings;
use crate::db;
use crate::error::RoostError;
use crate::runtime::Runtime;

/// Drive the runtime through the fixed sequence: select auth, bind database
/// backends, activate each onto the runtime, set the port, start.
///
/// Every step must succeed before `start`; the runtime is never started in a
/// partially-configured state. All steps run sequentially.
pub async fn run<R: Runtime>(settings: &Settings, mut runtime: R) -> Result<(), RoostError> {
    let strategy = AuthStrategy::select(settings)?;
    let backends = db::bind(settings)?;

    info!(
        auth = strategy.name(),
        backends = backends.len(),
        port = %settings.port,
        "bootstrap sequence resolved"
    );

    runtime.activate_auth(strategy)?;
    for backend in backends {
        runtime.activate_database(backend).await?;
    }
    runtime.set_port(&settings.port);
    runtime.start().await
}
