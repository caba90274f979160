//! The web-service runtime seam.
//!
//! `Runtime` is the capability contract the bootstrapper drives; the
//! routing/dispatch engine behind it is an external collaborator.
//! `HttpRuntime` is the axum-backed implementation shipped with the
//! scaffold: it only wires activated strategies, registered handlers, and
//! the middleware chain onto a `Router` and serves it.

use std::sync::Arc;

use axum::routing::MethodRouter;
use axum::{Router, middleware as axum_middleware};
use sqlx::MySqlPool;
use sqlx::mysql::MySqlPoolOptions;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::AuthStrategy;
use crate::config::DEFAULT_PORT;
use crate::db::{DatabaseBackend, MongoDescriptor};
use crate::error::RoostError;
use crate::middleware::{BasicGuard, MiddlewareChain, Step, run_chain};

/// Activation calls issued by the bootstrapper, in its fixed order.
#[allow(async_fn_in_trait)]
pub trait Runtime {
    fn activate_auth(&mut self, strategy: AuthStrategy) -> Result<(), RoostError>;
    async fn activate_database(&mut self, backend: DatabaseBackend) -> Result<(), RoostError>;
    fn set_port(&mut self, port: &str);
    /// Terminal call: begins serving and only returns on failure.
    async fn start(self) -> Result<(), RoostError>;
}

/// A scaffold handler: one route prefix with per-method bindings, mounted
/// under `/api` by the runtime.
pub struct Handler {
    prefix: String,
    routes: Vec<(String, MethodRouter)>,
}

impl Handler {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            routes: Vec::new(),
        }
    }

    pub fn route(mut self, path: impl Into<String>, methods: MethodRouter) -> Self {
        self.routes.push((path.into(), methods));
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

type MySqlHandlerFactory = Box<dyn FnOnce(MySqlPool) -> Handler + Send>;

pub struct HttpRuntime {
    port: String,
    chain: MiddlewareChain,
    handlers: Vec<Handler>,
    mysql_handlers: Vec<MySqlHandlerFactory>,
    auth: AuthStrategy,
    mysql: Option<MySqlPool>,
    mongodb: Option<MongoDescriptor>,
}

impl HttpRuntime {
    pub fn new() -> Self {
        Self {
            port: DEFAULT_PORT.to_owned(),
            chain: MiddlewareChain::default(),
            handlers: Vec::new(),
            mysql_handlers: Vec::new(),
            auth: AuthStrategy::None,
            mysql: None,
            mongodb: None,
        }
    }

    /// Register a handler by its route prefix.
    pub fn register(&mut self, handler: Handler) {
        self.handlers.push(handler);
    }

    /// Register a handler that needs the relational pool. The factory runs
    /// at `start` once the backend has been activated, and is skipped when
    /// it never is.
    pub fn register_with_mysql(
        &mut self,
        factory: impl FnOnce(MySqlPool) -> Handler + Send + 'static,
    ) {
        self.mysql_handlers.push(Box::new(factory));
    }

    pub fn push_step(&mut self, step: impl Step + 'static) {
        self.chain.push(step);
    }

    pub fn auth(&self) -> &AuthStrategy {
        &self.auth
    }

    pub fn mongodb(&self) -> Option<&MongoDescriptor> {
        self.mongodb.as_ref()
    }

    /// Compose the final router. Exposed separately from `start` so tests
    /// can drive it without binding a socket.
    pub fn into_router(mut self) -> Router {
        if let Some(pool) = &self.mysql {
            for factory in self.mysql_handlers.drain(..) {
                self.handlers.push(factory(pool.clone()));
            }
        }

        let mut router = Router::new();
        for handler in self.handlers {
            let mut sub = Router::new();
            for (path, methods) in handler.routes {
                sub = sub.route(&path, methods);
            }
            router = router.nest(&format!("/api{}", handler.prefix), sub);
        }

        let chain = Arc::new(self.chain);
        router.layer(axum_middleware::from_fn_with_state(chain, run_chain))
    }
}

impl Default for HttpRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime for HttpRuntime {
    fn activate_auth(&mut self, strategy: AuthStrategy) -> Result<(), RoostError> {
        match &strategy {
            AuthStrategy::None => {}
            AuthStrategy::Basic(basic) => {
                self.chain.push(BasicGuard::new(basic));
            }
            AuthStrategy::Jwt(jwt) => {
                // Token verification belongs to the deployment's verifier;
                // the settings are retained for it.
                if let Some(routes) = &jwt.routes {
                    info!(
                        login = %routes.login,
                        signup = %routes.signup,
                        logout = %routes.logout,
                        "jwt auth routes requested"
                    );
                }
            }
        }
        info!(strategy = strategy.name(), "auth strategy activated");
        self.auth = strategy;
        Ok(())
    }

    async fn activate_database(&mut self, backend: DatabaseBackend) -> Result<(), RoostError> {
        match backend {
            DatabaseBackend::MySql(desc) => {
                let pool = MySqlPoolOptions::new()
                    .connect_with(desc.connect_options())
                    .await
                    .map_err(RoostError::Connection)?;
                info!(host = %desc.host, database = %desc.database, "mysql backend activated");
                self.mysql = Some(pool);
            }
            DatabaseBackend::MongoDb(desc) => {
                info!(
                    url = %desc.url,
                    db = %desc.db,
                    collection = %desc.collection,
                    "mongodb descriptor bound"
                );
                self.mongodb = Some(desc);
            }
        }
        Ok(())
    }

    fn set_port(&mut self, port: &str) {
        self.port = port.to_owned();
    }

    async fn start(self) -> Result<(), RoostError> {
        let addr = format!("0.0.0.0:{}", self.port);
        let app = self.into_router();
        let listener = TcpListener::bind(&addr).await?;
        info!("HTTP server listening on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
