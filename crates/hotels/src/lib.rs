//! Client for the external hotel lookup service.
//!
//! Wraps the three HTTP endpoints the dialog needs (destination lookup,
//! property search, hotel photos) behind typed request and response
//! structs, mapping the service's loosely shaped wire JSON into
//! [`roomscout_core`] candidates.

mod api;

pub use api::{Destination, HotelsApi, HotelsApiError, PropertySearch};
