//! CRUD access to the `users` table.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

use crate::error::RoostError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: MySqlPool,
}

impl UserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Insert a user and return its generated id.
    pub async fn create(&self, user: &NewUser) -> Result<u64, RoostError> {
        let result = sqlx::query("INSERT INTO users (name, email, password) VALUES (?, ?, ?)")
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_id())
    }

    pub async fn find_by_id(&self, id: u64) -> Result<Option<User>, RoostError> {
        let user =
            sqlx::query_as::<_, User>("SELECT id, name, email, password FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, RoostError> {
        let users =
            sqlx::query_as::<_, User>("SELECT id, name, email, password FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(users)
    }

    /// Returns whether a row was changed.
    pub async fn update(&self, id: u64, user: &NewUser) -> Result<bool, RoostError> {
        let result = sqlx::query("UPDATE users SET name = ?, email = ?, password = ? WHERE id = ?")
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns whether a row was deleted.
    pub async fn delete(&self, id: u64) -> Result<bool, RoostError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
