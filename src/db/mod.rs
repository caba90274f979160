//! Storage backends: binding, schema lifecycle, and the user repository.
//!
//! Layout:
//! - `mod.rs`: descriptors and the independent per-backend binder
//! - `schema.rs`: MySQL DDL for the scaffold's user store
//! - `migrate.rs`: idempotent `up`/`down` schema lifecycle
//! - `repository.rs`: CRUD access to the `users` table

pub mod migrate;
pub mod repository;
pub mod schema;

pub use migrate::SchemaMigrator;
pub use repository::{NewUser, User, UserRepository};

use sqlx::mysql::MySqlConnectOptions;
use url::Url;

use crate::config::{DEFAULT_MYSQL_PORT, MongoSettings, MySqlSettings, Settings, require};
use crate::error::RoostError;

/// A validated, ready-to-connect parameter set for one backend instance.
/// The binder's contract ends here; opening connections is the runtime's
/// and driver's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackend {
    MySql(MySqlDescriptor),
    MongoDb(MongoDescriptor),
}

impl DatabaseBackend {
    pub fn kind(&self) -> &'static str {
        match self {
            DatabaseBackend::MySql(_) => "mysql",
            DatabaseBackend::MongoDb(_) => "mongodb",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlDescriptor {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

impl MySqlDescriptor {
    /// Build from settings; `None` when the backend is disabled.
    pub fn from_settings(mysql: &MySqlSettings) -> Result<Option<Self>, RoostError> {
        if !mysql.enabled {
            return Ok(None);
        }
        let host = require("db.mysql.host", &mysql.host)?;
        let user = require("db.mysql.user", &mysql.user)?;
        let password = require("db.mysql.password", &mysql.password)?;
        let database = require("db.mysql.database", &mysql.database)?;
        let port = match mysql.port.as_deref() {
            Some(raw) => raw.parse().map_err(|_| {
                RoostError::config(format!("`db.mysql.port` is not a valid port: `{raw}`"))
            })?,
            None => DEFAULT_MYSQL_PORT,
        };
        Ok(Some(Self {
            host,
            user,
            password,
            database,
            port,
        }))
    }

    /// Driver options with the database selected.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        self.server_connect_options().database(&self.database)
    }

    /// Driver options without selecting a database; the migrator's `up`
    /// connects at this level because the database may not exist yet.
    pub fn server_connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoDescriptor {
    pub url: Url,
    pub db: String,
    pub collection: String,
}

impl MongoDescriptor {
    /// Build from settings; `None` when the backend is disabled.
    pub fn from_settings(mongodb: &MongoSettings) -> Result<Option<Self>, RoostError> {
        if !mongodb.enabled {
            return Ok(None);
        }
        let raw = require("db.mongodb.url", &mongodb.url)?;
        let url = Url::parse(&raw).map_err(|e| {
            RoostError::config(format!("`db.mongodb.url` is not a valid URL: {e}"))
        })?;
        let db = require("db.mongodb.db", &mongodb.db)?;
        let collection = require("db.mongodb.collection", &mongodb.collection)?;
        Ok(Some(Self {
            url,
            db,
            collection,
        }))
    }
}

/// Resolve the set of active backend descriptors. Each backend is toggled
/// independently; zero, one, or both may be enabled at once.
pub fn bind(settings: &Settings) -> Result<Vec<DatabaseBackend>, RoostError> {
    let mut active = Vec::new();
    if let Some(desc) = MySqlDescriptor::from_settings(&settings.db.mysql)? {
        active.push(DatabaseBackend::MySql(desc));
    }
    if let Some(desc) = MongoDescriptor::from_settings(&settings.db.mongodb)? {
        active.push(DatabaseBackend::MongoDb(desc));
    }
    Ok(active)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn mysql_settings() -> MySqlSettings {
        MySqlSettings {
            enabled: true,
            host: Some("localhost".into()),
            user: Some("root".into()),
            password: Some("hunter2".into()),
            database: Some("app".into()),
            port: None,
        }
    }

    fn mongo_settings() -> MongoSettings {
        MongoSettings {
            enabled: true,
            url: Some("mongodb://localhost:27017".into()),
            db: Some("app".into()),
            collection: Some("users".into()),
        }
    }

    #[test]
    fn disabled_backends_bind_nothing() {
        let settings = Settings::default();
        assert!(bind(&settings).unwrap().is_empty());
    }

    #[test]
    fn mysql_port_defaults_to_3306() {
        let desc = MySqlDescriptor::from_settings(&mysql_settings())
            .unwrap()
            .unwrap();
        assert_eq!(desc.port, 3306);
    }

    #[test]
    fn mysql_port_parses_from_string() {
        let mut mysql = mysql_settings();
        mysql.port = Some("3307".into());
        let desc = MySqlDescriptor::from_settings(&mysql).unwrap().unwrap();
        assert_eq!(desc.port, 3307);
    }

    #[test]
    fn mysql_invalid_port_is_a_configuration_error() {
        let mut mysql = mysql_settings();
        mysql.port = Some("not-a-port".into());
        assert!(matches!(
            MySqlDescriptor::from_settings(&mysql),
            Err(RoostError::Configuration(_))
        ));
    }

    #[test]
    fn mysql_missing_host_is_a_configuration_error() {
        let mut mysql = mysql_settings();
        mysql.host = None;
        let err = MySqlDescriptor::from_settings(&mysql).unwrap_err();
        assert!(err.to_string().contains("db.mysql.host"));
    }

    #[test]
    fn mysql_fields_ignored_while_disabled() {
        // Backend off: nothing validated even though fields are missing.
        let mysql = MySqlSettings::default();
        assert!(MySqlDescriptor::from_settings(&mysql).unwrap().is_none());
    }

    #[test]
    fn mongo_invalid_url_is_a_configuration_error() {
        let mut mongo = mongo_settings();
        mongo.url = Some("not a url".into());
        assert!(matches!(
            MongoDescriptor::from_settings(&mongo),
            Err(RoostError::Configuration(_))
        ));
    }

    #[test]
    fn both_backends_may_be_enabled_simultaneously() {
        let mut settings = Settings::default();
        settings.db.mysql = mysql_settings();
        settings.db.mongodb = mongo_settings();
        let active = bind(&settings).unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].kind(), "mysql");
        assert_eq!(active[1].kind(), "mongodb");
    }
}
