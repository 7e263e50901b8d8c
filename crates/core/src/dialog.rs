//! Dialog state machine vocabulary and input validation.
//!
//! The dialog state is stored on the session row as a string tag, so the
//! next expected input is always derivable from the persisted record and
//! a process restart resumes at the same logical step. States advance
//! only through [`DialogState::next`] after the corresponding field has
//! been committed; validation happens strictly before any commit, and a
//! rejected input leaves both the state and the session untouched.

use crate::command::SearchKind;
use crate::error::CoreError;
use crate::types::DbId;

/// Number of results requested per search (the service page size), and
/// therefore the upper bound for the hotel-count prompt.
pub const SEARCH_PAGE_SIZE: i32 = 15;

/// Upper bound for the photos-per-hotel prompt.
pub const MAX_PHOTOS_PER_HOTEL: i32 = 5;

/// Longest destination label carried in choice callback data; transports
/// cap callback payloads, so the label is truncated on encode.
const DESTINATION_LABEL_MAX: usize = 20;

/// Callback data for accepting the photo prompt.
pub const PHOTO_YES: &str = "photos:yes";

/// Callback data for declining the photo prompt.
pub const PHOTO_NO: &str = "photos:no";

// ---------------------------------------------------------------------------
// Dialog state
// ---------------------------------------------------------------------------

/// The step a search session is waiting on.
///
/// `Completed` doubles as the idle marker: when the latest session for a
/// user is completed, no dialog is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    AwaitingDestination,
    AwaitingDestinationChoice,
    AwaitingCheckIn,
    AwaitingCheckOut,
    AwaitingMinPrice,
    AwaitingMaxPrice,
    AwaitingMinDistance,
    AwaitingMaxDistance,
    AwaitingHotelCount,
    AwaitingPhotoDecision,
    AwaitingPhotoCount,
    Completed,
}

impl DialogState {
    /// Parse a state string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "awaiting_destination" => Ok(Self::AwaitingDestination),
            "awaiting_destination_choice" => Ok(Self::AwaitingDestinationChoice),
            "awaiting_check_in" => Ok(Self::AwaitingCheckIn),
            "awaiting_check_out" => Ok(Self::AwaitingCheckOut),
            "awaiting_min_price" => Ok(Self::AwaitingMinPrice),
            "awaiting_max_price" => Ok(Self::AwaitingMaxPrice),
            "awaiting_min_distance" => Ok(Self::AwaitingMinDistance),
            "awaiting_max_distance" => Ok(Self::AwaitingMaxDistance),
            "awaiting_hotel_count" => Ok(Self::AwaitingHotelCount),
            "awaiting_photo_decision" => Ok(Self::AwaitingPhotoDecision),
            "awaiting_photo_count" => Ok(Self::AwaitingPhotoCount),
            "completed" => Ok(Self::Completed),
            _ => Err(CoreError::Validation(format!("Invalid dialog state '{s}'"))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingDestination => "awaiting_destination",
            Self::AwaitingDestinationChoice => "awaiting_destination_choice",
            Self::AwaitingCheckIn => "awaiting_check_in",
            Self::AwaitingCheckOut => "awaiting_check_out",
            Self::AwaitingMinPrice => "awaiting_min_price",
            Self::AwaitingMaxPrice => "awaiting_max_price",
            Self::AwaitingMinDistance => "awaiting_min_distance",
            Self::AwaitingMaxDistance => "awaiting_max_distance",
            Self::AwaitingHotelCount => "awaiting_hotel_count",
            Self::AwaitingPhotoDecision => "awaiting_photo_decision",
            Self::AwaitingPhotoCount => "awaiting_photo_count",
            Self::Completed => "completed",
        }
    }

    /// The state that follows once the current step's field commits.
    ///
    /// Encodes the fixed collection order: destination before dates,
    /// dates before bounds, bounds (best-deal only) before the hotel
    /// count, photos last. `AwaitingPhotoDecision` branches on the
    /// user's answer and has no single successor; `Completed` is
    /// terminal.
    pub fn next(self, kind: SearchKind) -> Option<DialogState> {
        match self {
            Self::AwaitingDestination => Some(Self::AwaitingDestinationChoice),
            Self::AwaitingDestinationChoice => Some(Self::AwaitingCheckIn),
            Self::AwaitingCheckIn => Some(Self::AwaitingCheckOut),
            Self::AwaitingCheckOut => Some(if kind.wants_bounds() {
                Self::AwaitingMinPrice
            } else {
                Self::AwaitingHotelCount
            }),
            Self::AwaitingMinPrice => Some(Self::AwaitingMaxPrice),
            Self::AwaitingMaxPrice => Some(Self::AwaitingMinDistance),
            Self::AwaitingMinDistance => Some(Self::AwaitingMaxDistance),
            Self::AwaitingMaxDistance => Some(Self::AwaitingHotelCount),
            Self::AwaitingHotelCount => Some(Self::AwaitingPhotoDecision),
            Self::AwaitingPhotoDecision => None,
            Self::AwaitingPhotoCount => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Numeric input validation
// ---------------------------------------------------------------------------

fn parse_number(text: &str, what: &str) -> Result<f64, CoreError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("'{text}' is not a valid {what}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "A {what} must be a non-negative number, got '{text}'"
        )));
    }
    Ok(value)
}

/// Parse a price input in dollars. Rejects non-numeric, negative and
/// non-finite values without touching the session.
pub fn parse_price(text: &str) -> Result<f64, CoreError> {
    parse_number(text, "price")
}

/// Parse a distance input in miles. Same rules as prices.
pub fn parse_distance(text: &str) -> Result<f64, CoreError> {
    parse_number(text, "distance")
}

fn parse_count(text: &str, max: i32, what: &str) -> Result<i32, CoreError> {
    let value: i32 = text
        .trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("'{text}' is not a valid {what}")))?;
    if !(1..=max).contains(&value) {
        return Err(CoreError::Validation(format!(
            "A {what} must lie between 1 and {max}, got {value}"
        )));
    }
    Ok(value)
}

/// Parse the requested hotel count; must lie in `[1, SEARCH_PAGE_SIZE]`.
pub fn parse_hotel_count(text: &str) -> Result<i32, CoreError> {
    parse_count(text, SEARCH_PAGE_SIZE, "hotel count")
}

/// Parse the requested photos-per-hotel count; must lie in
/// `[1, MAX_PHOTOS_PER_HOTEL]`.
pub fn parse_photo_count(text: &str) -> Result<i32, CoreError> {
    parse_count(text, MAX_PHOTOS_PER_HOTEL, "photo count")
}

// ---------------------------------------------------------------------------
// Destination choice encoding
// ---------------------------------------------------------------------------

/// Encode a destination candidate into choice callback data.
///
/// The dialog advances out of the choice state only through data produced
/// here, so the selection is self-contained and survives restarts without
/// persisting the candidate list.
pub fn encode_destination_choice(id: DbId, name: &str) -> String {
    let label: String = name.chars().take(DESTINATION_LABEL_MAX).collect();
    format!("dest:{id}:{label}")
}

/// Decode choice callback data back into a destination id and name.
/// Returns `None` for data this dialog did not produce.
pub fn parse_destination_choice(data: &str) -> Option<(DbId, String)> {
    let rest = data.strip_prefix("dest:")?;
    let (id, name) = rest.split_once(':')?;
    let id: DbId = id.parse().ok()?;
    if name.is_empty() {
        return None;
    }
    Some((id, name.to_string()))
}
