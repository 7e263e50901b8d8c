//! Search session entity model.

use chrono::NaiveDate;
use roomscout_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `search_sessions` table: one search command invocation
/// and its progressively collected parameters.
///
/// Rows are append-only: a session is never deleted or overwritten, and
/// each repository mutator sets exactly one logical field group while
/// advancing `state` in the same statement. The newest row per user is
/// the active one; everything before it is history. `state` holds a
/// `DialogState` tag and `kind` a `SearchKind` tag from the core crate.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct SearchSession {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: String,
    pub state: String,
    pub destination_id: Option<DbId>,
    pub destination_name: Option<String>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    /// Nights between check-in and check-out, floored to 1.
    pub day_count: Option<i32>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    pub hotel_count: Option<i32>,
    pub photo_count: Option<i32>,
    /// Serialized `Vec<Candidate>`, written exactly once on completion.
    pub results: Option<serde_json::Value>,
    pub created_at: Timestamp,
}
