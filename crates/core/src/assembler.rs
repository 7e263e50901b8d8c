//! Turns a stored candidate list into user-facing output blocks.
//!
//! One header block names the search kind and stay range; one block per
//! hotel follows, in the order the service returned them. Unknown values
//! propagate as the [`UNKNOWN`] marker instead of being dropped or
//! guessed.

use chrono::NaiveDate;

use crate::candidate::Candidate;
use crate::command::SearchKind;

/// Marker shown wherever the service returned no usable value.
pub const UNKNOWN: &str = "n/a";

/// Price for one night, rounded to cents.
pub fn price_per_day(total_price: f64, day_count: i32) -> f64 {
    (total_price / f64::from(day_count) * 100.0).round() / 100.0
}

/// The first `hotel_count` candidates in service order. The stored list
/// may be shorter than the requested count.
pub fn select(candidates: &[Candidate], hotel_count: i32) -> &[Candidate] {
    let take = candidates.len().min(hotel_count.max(0) as usize);
    &candidates[..take]
}

/// Header block for a finished search.
pub fn header(kind: SearchKind, check_in: NaiveDate, check_out: NaiveDate) -> String {
    let what = match kind {
        SearchKind::Cheapest => "Cheapest hotels",
        SearchKind::Priciest => "Most expensive hotels",
        SearchKind::BestDeal => "Best-priced hotels near the center",
    };
    format!("{what} in $, {check_in} to {check_out}")
}

/// One output block per hotel: name, address, distance from the center,
/// per-day and whole-stay price, and the detail link.
pub fn hotel_block(candidate: &Candidate, day_count: i32) -> String {
    let per_day = candidate.total_price.map(|t| price_per_day(t, day_count));
    format!(
        "{}\n{}\nDistance from center: {}\nPrice per day: {}\nPrice for the stay: {}\n{}",
        candidate.name,
        candidate.address.as_deref().unwrap_or(UNKNOWN),
        fmt_miles(candidate.distance_miles),
        fmt_money(per_day),
        fmt_money(candidate.total_price),
        candidate.url,
    )
}

/// Format an optional dollar amount, falling back to [`UNKNOWN`].
pub fn fmt_money(value: Option<f64>) -> String {
    value
        .map(|v| format!("${v:.2}"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Format an optional distance in miles, falling back to [`UNKNOWN`].
pub fn fmt_miles(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1} mi"))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn candidate(id: &str, total_price: Option<f64>) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: format!("Hotel {id}"),
            total_price,
            address: Some(format!("Paris, {id} Rue de Test")),
            distance_miles: Some(0.9),
            url: format!("https://hotels.com/ho{id}"),
        }
    }

    // -- price_per_day --

    #[test]
    fn price_per_day_divides_by_the_night_count() {
        assert_eq!(price_per_day(300.0, 2), 150.0);
        assert_eq!(price_per_day(100.0, 3), 33.33);
    }

    #[test]
    fn price_per_day_rounds_to_cents() {
        assert_eq!(price_per_day(199.99, 2), 100.0);
        assert_eq!(price_per_day(0.01, 2), 0.01);
    }

    // -- select --

    #[test]
    fn select_takes_the_first_n_in_service_order() {
        let all = vec![candidate("a", None), candidate("b", None), candidate("c", None)];
        let picked = select(&all, 2);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0].id, "a");
        assert_eq!(picked[1].id, "b");
    }

    #[test]
    fn select_tolerates_short_lists() {
        let all = vec![candidate("a", None)];
        assert_eq!(select(&all, 15).len(), 1);
        assert_eq!(select(&all, 0).len(), 0);
    }

    // -- blocks --

    #[test]
    fn header_names_the_kind_and_range() {
        let text = header(SearchKind::Cheapest, date(2024, 5, 1), date(2024, 5, 3));
        assert!(text.contains("Cheapest hotels"));
        assert!(text.contains("2024-05-01"));
        assert!(text.contains("2024-05-03"));
    }

    #[test]
    fn hotel_block_shows_per_day_and_stay_price() {
        let block = hotel_block(&candidate("a", Some(301.0)), 2);
        assert!(block.contains("Hotel a"));
        assert!(block.contains("Price per day: $150.50"));
        assert!(block.contains("Price for the stay: $301.00"));
        assert!(block.contains("https://hotels.com/hoa"));
    }

    #[test]
    fn unknown_price_is_propagated_not_computed() {
        let block = hotel_block(&candidate("a", None), 2);
        assert!(block.contains(&format!("Price per day: {UNKNOWN}")));
        assert!(block.contains(&format!("Price for the stay: {UNKNOWN}")));
    }

    #[test]
    fn unknown_address_and_distance_fall_back_to_the_marker() {
        let mut c = candidate("a", Some(100.0));
        c.address = None;
        c.distance_miles = None;
        let block = hotel_block(&c, 1);
        assert!(block.contains(UNKNOWN));
        assert!(!block.contains("mi"));
    }

    // Three hotels over two nights: the per-day price halves the stay
    // price in every block.
    #[test]
    fn two_night_three_hotel_output_shape() {
        let stored = vec![
            candidate("a", Some(200.0)),
            candidate("b", Some(250.0)),
            candidate("c", Some(301.0)),
            candidate("d", Some(400.0)),
        ];
        let day_count = 2;
        let picked = select(&stored, 3);
        assert_eq!(picked.len(), 3);
        let blocks: Vec<String> = picked.iter().map(|c| hotel_block(c, day_count)).collect();
        assert!(blocks[0].contains("Price per day: $100.00"));
        assert!(blocks[1].contains("Price per day: $125.00"));
        assert!(blocks[2].contains("Price per day: $150.50"));
    }
}
