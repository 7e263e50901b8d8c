//! Hotel candidates returned by the search service.

use serde::{Deserialize, Serialize};

/// One hotel entry from the search service.
///
/// The service frequently omits prices, addresses or distances; those
/// fields are `None` rather than a sentinel string. Candidates live only
/// inside the session's serialized result list and are never persisted
/// on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Quoted price for the whole stay, in the search currency.
    pub total_price: Option<f64>,
    pub address: Option<String>,
    /// Distance from the city center, in miles.
    pub distance_miles: Option<f64>,
    pub url: String,
}

/// Keep only candidates lying within `[min, max]` miles of the center,
/// bounds inclusive. Candidates with unknown distance are dropped
/// entirely, not deprioritized.
pub fn filter_by_distance(candidates: Vec<Candidate>, min: f64, max: f64) -> Vec<Candidate> {
    candidates
        .into_iter()
        .filter(|c| c.distance_miles.is_some_and(|d| d >= min && d <= max))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, distance: Option<f64>) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: format!("Hotel {id}"),
            total_price: Some(100.0),
            address: None,
            distance_miles: distance,
            url: format!("https://hotels.com/ho{id}"),
        }
    }

    #[test]
    fn filter_keeps_candidates_inside_the_range() {
        let kept = filter_by_distance(
            vec![candidate("a", Some(0.8)), candidate("b", Some(1.5))],
            0.0,
            1.0,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "a");
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let kept = filter_by_distance(
            vec![candidate("lo", Some(0.5)), candidate("hi", Some(2.0))],
            0.5,
            2.0,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn unknown_distance_is_excluded() {
        let kept = filter_by_distance(
            vec![candidate("known", Some(0.3)), candidate("unknown", None)],
            0.0,
            10.0,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "known");
    }

    #[test]
    fn filter_preserves_service_order() {
        let kept = filter_by_distance(
            vec![
                candidate("first", Some(1.0)),
                candidate("second", Some(2.0)),
                candidate("third", Some(3.0)),
            ],
            0.0,
            10.0,
        );
        let ids: Vec<&str> = kept.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }
}
