//! Repository for the `users` table.

use roomscout_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, telegram_id, first_name, last_name, username, created_at";

/// Provides registration and lookup for users.
pub struct UserRepo;

impl UserRepo {
    /// Register a user on first contact.
    ///
    /// Idempotent: re-registering an existing `telegram_id` is silently
    /// absorbed and returns `None`; the stored row is left untouched.
    pub async fn upsert(pool: &PgPool, user: &CreateUser) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (telegram_id, first_name, last_name, username) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (telegram_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user.telegram_id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by external id.
    pub async fn find_by_telegram_id(
        pool: &PgPool,
        telegram_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE telegram_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(telegram_id)
            .fetch_optional(pool)
            .await
    }
}
