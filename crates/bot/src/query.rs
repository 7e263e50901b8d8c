//! Builds and runs the single search request for a completed session.

use chrono::NaiveDate;

use roomscout_core::candidate::{self, Candidate};
use roomscout_core::command::SearchKind;
use roomscout_core::error::CoreError;
use roomscout_core::types::DbId;
use roomscout_db::models::search_session::SearchSession;
use roomscout_hotels::{HotelsApi, PropertySearch};

/// Everything the dialog committed, read back in one structured view.
///
/// The state machine commits every field before a session reaches the
/// completed state, so a gap here is a programming error rather than a
/// user error; the conversion is the single place that checks it.
#[derive(Debug, Clone)]
pub struct CompletedSearch {
    pub kind: SearchKind,
    pub destination_id: DbId,
    pub destination_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub day_count: i32,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub distance_min: Option<f64>,
    pub distance_max: Option<f64>,
    pub hotel_count: i32,
    /// `None` when the user declined photos.
    pub photo_count: Option<i32>,
}

impl CompletedSearch {
    pub fn from_session(session: &SearchSession) -> Result<Self, CoreError> {
        let missing = |field: &'static str| {
            CoreError::Internal(format!(
                "session {} reached completion without {field}",
                session.id
            ))
        };

        let search = Self {
            kind: SearchKind::from_str_db(&session.kind)?,
            destination_id: session.destination_id.ok_or_else(|| missing("a destination"))?,
            destination_name: session
                .destination_name
                .clone()
                .ok_or_else(|| missing("a destination name"))?,
            check_in: session.check_in.ok_or_else(|| missing("a check-in date"))?,
            check_out: session.check_out.ok_or_else(|| missing("a check-out date"))?,
            day_count: session.day_count.ok_or_else(|| missing("a day count"))?,
            price_min: session.price_min,
            price_max: session.price_max,
            distance_min: session.distance_min,
            distance_max: session.distance_max,
            hotel_count: session.hotel_count.ok_or_else(|| missing("a hotel count"))?,
            photo_count: session.photo_count,
        };

        if search.kind.wants_bounds() && search.distance_bounds().is_none() {
            return Err(missing("distance bounds"));
        }
        Ok(search)
    }

    /// Both distance bounds, when the dialog collected them.
    pub fn distance_bounds(&self) -> Option<(f64, f64)> {
        self.distance_min.zip(self.distance_max)
    }
}

/// Run the one search call for a completed session.
///
/// Any transport or format failure from the service degrades to an empty
/// candidate list; the dialog surfaces that as "nothing found" instead
/// of dying. For best-deal searches the price bounds go into the request
/// and the distance bounds are applied as a client-side filter that
/// drops candidates with unknown distance.
pub async fn execute(hotels: &HotelsApi, search: &CompletedSearch) -> Vec<Candidate> {
    let request = PropertySearch {
        destination_id: search.destination_id,
        check_in: search.check_in,
        check_out: search.check_out,
        sort_order: search.kind.sort_order(),
        price_min: search.price_min,
        price_max: search.price_max,
    };

    let found = match hotels.search_properties(&request).await {
        Ok(found) => found,
        Err(error) => {
            tracing::error!(
                destination_id = search.destination_id,
                error = %error,
                "property search failed"
            );
            return Vec::new();
        }
    };

    match search.distance_bounds() {
        Some((min, max)) => candidate::filter_by_distance(found, min, max),
        None => found,
    }
}
