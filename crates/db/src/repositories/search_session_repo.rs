//! Repository for the `search_sessions` table.
//!
//! Sessions are append-only. Every mutator is a single UPDATE that sets
//! one logical field group and the new dialog state together, so a
//! session only ever moves forward; there is no field-level rollback.
//! Concurrent commands from the same user are not mutually excluded:
//! [`SearchSessionRepo::latest_for_user`] always returns the newest row,
//! so starting a new command silently abandons an incomplete one.

use chrono::NaiveDate;
use roomscout_core::types::DbId;
use sqlx::PgPool;

use crate::models::search_session::SearchSession;

/// Column list for `search_sessions` queries.
const COLUMNS: &str = "id, user_id, kind, state, destination_id, destination_name, \
     check_in, check_out, day_count, price_min, price_max, \
     distance_min, distance_max, hotel_count, photo_count, results, created_at";

/// Provides append and point-update operations for search sessions.
pub struct SearchSessionRepo;

impl SearchSessionRepo {
    /// Append a new session for a user; every parameter field starts
    /// empty and the state starts at the destination prompt.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        kind: &str,
    ) -> Result<SearchSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO search_sessions (user_id, kind) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(user_id)
            .bind(kind)
            .fetch_one(pool)
            .await
    }

    /// The most recently created session for a user, which is the sole
    /// source of dialog state.
    pub async fn latest_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM search_sessions \
             WHERE user_id = $1 \
             ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Advance the dialog state without committing a field (used when a
    /// prompt changes shape, e.g. entering a choice step).
    pub async fn set_state(
        pool: &PgPool,
        id: DbId,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE search_sessions SET state = $2 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(id)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Commit the selected destination.
    pub async fn set_destination(
        pool: &PgPool,
        id: DbId,
        destination_id: DbId,
        destination_name: &str,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE search_sessions \
             SET destination_id = $2, destination_name = $3, state = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(id)
            .bind(destination_id)
            .bind(destination_name)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Commit the confirmed check-in date.
    pub async fn set_check_in(
        pool: &PgPool,
        id: DbId,
        check_in: NaiveDate,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE search_sessions SET check_in = $2, state = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(id)
            .bind(check_in)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Commit the confirmed check-out date together with the derived day
    /// count; the two always change as one group.
    pub async fn set_check_out(
        pool: &PgPool,
        id: DbId,
        check_out: NaiveDate,
        day_count: i32,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE search_sessions \
             SET check_out = $2, day_count = $3, state = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(id)
            .bind(check_out)
            .bind(day_count)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Commit the minimum nightly price (best-deal only).
    pub async fn set_price_min(
        pool: &PgPool,
        id: DbId,
        value: f64,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        Self::set_numeric(pool, id, "price_min", value, state).await
    }

    /// Commit the maximum nightly price (best-deal only).
    pub async fn set_price_max(
        pool: &PgPool,
        id: DbId,
        value: f64,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        Self::set_numeric(pool, id, "price_max", value, state).await
    }

    /// Commit the minimum distance from the center (best-deal only).
    pub async fn set_distance_min(
        pool: &PgPool,
        id: DbId,
        value: f64,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        Self::set_numeric(pool, id, "distance_min", value, state).await
    }

    /// Commit the maximum distance from the center (best-deal only).
    pub async fn set_distance_max(
        pool: &PgPool,
        id: DbId,
        value: f64,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        Self::set_numeric(pool, id, "distance_max", value, state).await
    }

    async fn set_numeric(
        pool: &PgPool,
        id: DbId,
        column: &'static str,
        value: f64,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE search_sessions SET {column} = $2, state = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(id)
            .bind(value)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Commit the requested number of hotels.
    pub async fn set_hotel_count(
        pool: &PgPool,
        id: DbId,
        hotel_count: i32,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE search_sessions SET hotel_count = $2, state = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(id)
            .bind(hotel_count)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Commit the requested number of photos per hotel.
    pub async fn set_photo_count(
        pool: &PgPool,
        id: DbId,
        photo_count: i32,
        state: &str,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE search_sessions SET photo_count = $2, state = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(id)
            .bind(photo_count)
            .bind(state)
            .fetch_optional(pool)
            .await
    }

    /// Store the serialized candidate list. Called exactly once per
    /// session, after it reaches the completed state.
    pub async fn set_results(
        pool: &PgPool,
        id: DbId,
        results: &serde_json::Value,
    ) -> Result<Option<SearchSession>, sqlx::Error> {
        let query = format!(
            "UPDATE search_sessions SET results = $2 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(id)
            .bind(results)
            .fetch_optional(pool)
            .await
    }

    /// Past sessions for a user, newest first.
    pub async fn list_recent(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<SearchSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM search_sessions \
             WHERE user_id = $1 \
             ORDER BY id DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, SearchSession>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
