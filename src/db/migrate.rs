//! Idempotent forward/reverse schema lifecycle for the relational backend.
//!
//! Invoked out-of-band by `bin/migrate`, never during normal startup. Both
//! operations are no-ops when the backend is disabled, and safe to re-run:
//! every statement carries its own existence check. A query failure
//! propagates to the invoker; there is no partial-failure recovery beyond
//! what the existence checks already provide.

use sqlx::mysql::MySqlDatabaseError;
use sqlx::{Connection, Executor, MySqlConnection};
use tracing::info;

use crate::config::Settings;
use crate::db::MySqlDescriptor;
use crate::db::schema::{CREATE_USER_ROLES, CREATE_USERS, DROP_USER_ROLES, DROP_USERS};
use crate::error::RoostError;

/// MySQL "unknown database" (ER_BAD_DB_ERROR).
const ER_BAD_DB: u16 = 1049;

#[derive(Debug)]
pub struct SchemaMigrator {
    target: Option<MySqlDescriptor>,
}

impl SchemaMigrator {
    /// Descriptor validation happens here; a disabled backend yields a
    /// migrator whose operations do nothing.
    pub fn from_settings(settings: &Settings) -> Result<Self, RoostError> {
        let target = MySqlDescriptor::from_settings(&settings.db.mysql)?;
        if let Some(desc) = &target {
            validate_identifier(&desc.database)?;
        }
        Ok(Self { target })
    }

    /// Create the database (if absent), select it, create `users` and
    /// `user_roles` (if absent).
    pub async fn up(&self) -> Result<(), RoostError> {
        let Some(desc) = &self.target else {
            info!("relational backend disabled; skipping migration");
            return Ok(());
        };

        // The database may not exist yet, so connect at the server level.
        let mut conn = MySqlConnection::connect_with(&desc.server_connect_options())
            .await
            .map_err(RoostError::Connection)?;

        // `USE` is rejected by the prepared-statement protocol; everything
        // here runs as plain text queries.
        for sql in up_statements(&desc.database) {
            conn.execute(sql.as_str())
                .await
                .map_err(RoostError::Migration)?;
        }

        info!(database = %desc.database, "schema migrated up");
        Ok(())
    }

    /// Drop `user_roles`, `users`, then the database, all existence-checked.
    pub async fn down(&self) -> Result<(), RoostError> {
        let Some(desc) = &self.target else {
            info!("relational backend disabled; skipping migration");
            return Ok(());
        };

        let mut conn = match MySqlConnection::connect_with(&desc.connect_options()).await {
            Ok(conn) => conn,
            // Target database already gone: nothing to tear down.
            Err(e) if is_unknown_database(&e) => {
                info!(database = %desc.database, "database absent; nothing to drop");
                return Ok(());
            }
            Err(e) => return Err(RoostError::Connection(e)),
        };

        for sql in down_statements(&desc.database) {
            conn.execute(sql.as_str())
                .await
                .map_err(RoostError::Migration)?;
        }

        info!(database = %desc.database, "schema migrated down");
        Ok(())
    }
}

fn up_statements(database: &str) -> [String; 4] {
    [
        format!("CREATE DATABASE IF NOT EXISTS {database}"),
        format!("USE {database}"),
        CREATE_USERS.to_owned(),
        CREATE_USER_ROLES.to_owned(),
    ]
}

fn down_statements(database: &str) -> [String; 3] {
    [
        DROP_USER_ROLES.to_owned(),
        DROP_USERS.to_owned(),
        format!("DROP DATABASE IF EXISTS {database}"),
    ]
}

fn is_unknown_database(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|mysql| mysql.number() == ER_BAD_DB),
        _ => false,
    }
}

/// The database name is interpolated into DDL (identifiers cannot be bound),
/// so it is restricted to a safe character set.
fn validate_identifier(name: &str) -> Result<(), RoostError> {
    let safe = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_');
    if safe {
        Ok(())
    } else {
        Err(RoostError::config(format!(
            "`db.mysql.database` is not a safe identifier: `{name}`"
        )))
    }
}
