//! Search command vocabulary.
//!
//! A [`SearchKind`] names the command that opened a session and decides
//! both the sort order sent to the search service and whether the dialog
//! collects price/distance bounds.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The three search commands a user can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Cheapest,
    Priciest,
    BestDeal,
}

impl SearchKind {
    /// Parse a kind string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "cheapest" => Ok(Self::Cheapest),
            "priciest" => Ok(Self::Priciest),
            "best_deal" => Ok(Self::BestDeal),
            _ => Err(CoreError::Validation(format!(
                "Invalid search kind '{s}'. Must be one of: cheapest, priciest, best_deal"
            ))),
        }
    }

    /// Convert to a database-compatible string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cheapest => "cheapest",
            Self::Priciest => "priciest",
            Self::BestDeal => "best_deal",
        }
    }

    /// Human-readable label for prompts and history listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cheapest => "cheapest hotels",
            Self::Priciest => "most expensive hotels",
            Self::BestDeal => "best deal",
        }
    }

    /// The result ordering requested from the search service.
    pub fn sort_order(self) -> SortOrder {
        match self {
            Self::Cheapest | Self::BestDeal => SortOrder::PriceAscending,
            Self::Priciest => SortOrder::PriceDescending,
        }
    }

    /// Whether the dialog collects price and distance bounds for this
    /// command.
    pub fn wants_bounds(self) -> bool {
        matches!(self, Self::BestDeal)
    }
}

/// Result ordering requested from the search service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    PriceAscending,
    PriceDescending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_str_valid() {
        assert_eq!(
            SearchKind::from_str_db("cheapest").unwrap(),
            SearchKind::Cheapest
        );
        assert_eq!(
            SearchKind::from_str_db("priciest").unwrap(),
            SearchKind::Priciest
        );
        assert_eq!(
            SearchKind::from_str_db("best_deal").unwrap(),
            SearchKind::BestDeal
        );
    }

    #[test]
    fn kind_from_str_invalid() {
        assert!(SearchKind::from_str_db("bestdeal").is_err());
        assert!(SearchKind::from_str_db("").is_err());
    }

    #[test]
    fn kind_as_str_roundtrip() {
        for kind in [
            SearchKind::Cheapest,
            SearchKind::Priciest,
            SearchKind::BestDeal,
        ] {
            assert_eq!(SearchKind::from_str_db(kind.as_str()).unwrap(), kind);
        }
    }

    #[test]
    fn sort_order_ascending_for_cheapest_and_best_deal() {
        assert_eq!(
            SearchKind::Cheapest.sort_order(),
            SortOrder::PriceAscending
        );
        assert_eq!(
            SearchKind::BestDeal.sort_order(),
            SortOrder::PriceAscending
        );
    }

    #[test]
    fn sort_order_descending_for_priciest() {
        assert_eq!(
            SearchKind::Priciest.sort_order(),
            SortOrder::PriceDescending
        );
    }

    #[test]
    fn only_best_deal_wants_bounds() {
        assert!(SearchKind::BestDeal.wants_bounds());
        assert!(!SearchKind::Cheapest.wants_bounds());
        assert!(!SearchKind::Priciest.wants_bounds());
    }
}
