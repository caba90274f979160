pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod runtime;

pub use auth::AuthStrategy;
pub use config::Settings;
pub use error::RoostError;
pub use runtime::{Handler, HttpRuntime, Runtime};
