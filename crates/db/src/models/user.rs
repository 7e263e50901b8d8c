//! User entity model and DTOs.

use roomscout_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table: one transport identity, registered on
/// first contact.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    /// External (transport) user id; sessions key on this value.
    pub telegram_id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for registering a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub telegram_id: DbId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}
