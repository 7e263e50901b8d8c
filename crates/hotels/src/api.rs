//! REST client for the hotel search service.
//!
//! The service speaks a deeply nested JSON dialect and omits fields
//! freely, so every wire struct is lenient (`Option` everywhere) and the
//! mapping into [`Candidate`] decides what survives. Entries without an
//! id or name are dropped; unknown prices and distances become `None`.

use chrono::NaiveDate;
use serde::Deserialize;

use roomscout_core::candidate::Candidate;
use roomscout_core::command::SortOrder;
use roomscout_core::dialog::SEARCH_PAGE_SIZE;
use roomscout_core::types::DbId;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// HTTP client for the hotel search service.
#[derive(Debug, Clone)]
pub struct HotelsApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    api_host: String,
}

/// A destination suggestion: a city or district the user can pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id: DbId,
    pub name: String,
}

/// One property search, built from a completed session.
#[derive(Debug, Clone)]
pub struct PropertySearch {
    pub destination_id: DbId,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub sort_order: SortOrder,
    /// Best-deal only; both bounds or neither.
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

/// Errors from the hotel search service client.
#[derive(Debug, thiserror::Error)]
pub enum HotelsApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Hotel service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl HotelsApi {
    /// Create a new client.
    ///
    /// * `api_key`  - service credential, sent on every request.
    /// * `api_host` - service host, e.g. `hotels4.p.rapidapi.com`.
    pub fn new(api_key: String, api_host: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("https://{api_host}"),
            api_key,
            api_host,
        }
    }

    /// Look up destinations matching free-text input.
    ///
    /// Only entries of the city suggestion group are returned; an
    /// unrecognized city yields an empty list, not an error.
    pub async fn lookup_destinations(
        &self,
        query: &str,
    ) -> Result<Vec<Destination>, HotelsApiError> {
        let response = self
            .client
            .get(format!("{}/locations/v2/search", self.base_url))
            .query(&[
                ("query", query.to_lowercase()),
                ("locale", "en_US".to_string()),
                ("currency", "USD".to_string()),
            ])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?;

        let payload: LocationsResponse = Self::parse_response(response).await?;
        let destinations = map_destinations(payload);
        tracing::debug!(query, found = destinations.len(), "destination lookup");
        Ok(destinations)
    }

    /// Run one property search and map the results into candidates, in
    /// the order the service returned them.
    pub async fn search_properties(
        &self,
        search: &PropertySearch,
    ) -> Result<Vec<Candidate>, HotelsApiError> {
        let mut params = vec![
            ("destinationId", search.destination_id.to_string()),
            ("checkIn", search.check_in.format(DATE_FORMAT).to_string()),
            ("checkOut", search.check_out.format(DATE_FORMAT).to_string()),
            ("sortOrder", sort_param(search.sort_order).to_string()),
            ("pageNumber", "1".to_string()),
            ("pageSize", SEARCH_PAGE_SIZE.to_string()),
            ("adults1", "1".to_string()),
            ("locale", "en_US".to_string()),
            ("currency", "USD".to_string()),
        ];
        if let (Some(min), Some(max)) = (search.price_min, search.price_max) {
            params.push(("priceMin", min.to_string()));
            params.push(("priceMax", max.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/properties/list", self.base_url))
            .query(&params)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?;

        let payload: PropertiesResponse = Self::parse_response(response).await?;
        let candidates = map_properties(payload);
        tracing::debug!(
            destination_id = search.destination_id,
            found = candidates.len(),
            "property search"
        );
        Ok(candidates)
    }

    /// Fetch up to `max_count` photo URLs for one hotel.
    pub async fn fetch_photos(
        &self,
        hotel_id: &str,
        max_count: i32,
    ) -> Result<Vec<String>, HotelsApiError> {
        let response = self
            .client
            .get(format!("{}/properties/get-hotel-photos", self.base_url))
            .query(&[("id", hotel_id)])
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .send()
            .await?;

        let payload: PhotosResponse = Self::parse_response(response).await?;
        Ok(map_photos(payload, max_count))
    }

    // ---- private helpers ----

    /// Parse a successful JSON response body into the expected type, or
    /// surface the status and body text of a failed one.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, HotelsApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(HotelsApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

/// Wire name for a sort order.
fn sort_param(order: SortOrder) -> &'static str {
    match order {
        SortOrder::PriceAscending => "PRICE",
        SortOrder::PriceDescending => "PRICE_HIGHEST_FIRST",
    }
}

// ---------------------------------------------------------------------------
// Wire types and mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    #[serde(default)]
    suggestions: Vec<SuggestionGroup>,
}

#[derive(Debug, Deserialize)]
struct SuggestionGroup {
    #[serde(default)]
    group: String,
    #[serde(default)]
    entities: Vec<SuggestionEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionEntity {
    #[serde(default)]
    destination_id: String,
    #[serde(default)]
    name: String,
}

const CITY_GROUP: &str = "CITY_GROUP";

fn map_destinations(payload: LocationsResponse) -> Vec<Destination> {
    payload
        .suggestions
        .into_iter()
        .filter(|group| group.group == CITY_GROUP)
        .flat_map(|group| group.entities)
        .filter_map(|entity| {
            let id: DbId = entity.destination_id.parse().ok()?;
            if entity.name.is_empty() {
                return None;
            }
            Some(Destination {
                id,
                name: entity.name,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct PropertiesResponse {
    data: Option<PropertiesData>,
}

#[derive(Debug, Deserialize)]
struct PropertiesData {
    body: Option<PropertiesBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertiesBody {
    search_results: Option<SearchResults>,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<PropertyResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertyResult {
    id: Option<i64>,
    name: Option<String>,
    rate_plan: Option<RatePlan>,
    address: Option<Address>,
    #[serde(default)]
    landmarks: Vec<Landmark>,
}

#[derive(Debug, Deserialize)]
struct RatePlan {
    price: Option<Price>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Price {
    exact_current: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Address {
    locality: Option<String>,
    street_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Landmark {
    distance: Option<String>,
}

fn map_properties(payload: PropertiesResponse) -> Vec<Candidate> {
    let results = payload
        .data
        .and_then(|d| d.body)
        .and_then(|b| b.search_results)
        .map(|s| s.results)
        .unwrap_or_default();

    results
        .into_iter()
        .filter_map(|property| {
            let id = property.id?;
            let name = property.name?;
            Some(Candidate {
                id: id.to_string(),
                name,
                total_price: property
                    .rate_plan
                    .and_then(|plan| plan.price)
                    .and_then(|price| price.exact_current),
                address: property.address.and_then(|a| {
                    match (a.locality, a.street_address) {
                        (Some(locality), Some(street)) => Some(format!("{locality}, {street}")),
                        _ => None,
                    }
                }),
                distance_miles: property
                    .landmarks
                    .into_iter()
                    .next()
                    .and_then(|landmark| landmark.distance)
                    .and_then(|text| parse_distance_text(&text)),
                url: format!("https://hotels.com/ho{id}"),
            })
        })
        .collect()
}

/// The service reports distance as display text like `"1.2 miles"`; take
/// the leading number and discard the unit.
fn parse_distance_text(text: &str) -> Option<f64> {
    text.split_whitespace().next()?.parse().ok()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhotosResponse {
    #[serde(default)]
    hotel_images: Vec<HotelImage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HotelImage {
    base_url: String,
}

/// Photo URLs carry a `{size}` placeholder; `b` selects the big
/// rendition.
fn map_photos(payload: PhotosResponse, max_count: i32) -> Vec<String> {
    payload
        .hotel_images
        .into_iter()
        .take(max_count.max(0) as usize)
        .map(|image| image.base_url.replace("{size}", "b"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- destinations --

    #[test]
    fn only_city_group_entities_become_destinations() {
        let payload: LocationsResponse = serde_json::from_str(
            r#"{
                "suggestions": [
                    {
                        "group": "HOTEL_GROUP",
                        "entities": [{"destinationId": "99", "name": "Some Hotel"}]
                    },
                    {
                        "group": "CITY_GROUP",
                        "entities": [
                            {"destinationId": "1506246", "name": "Paris"},
                            {"destinationId": "1503600", "name": "Paris (Orly)"}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let destinations = map_destinations(payload);
        assert_eq!(
            destinations,
            vec![
                Destination {
                    id: 1506246,
                    name: "Paris".to_string()
                },
                Destination {
                    id: 1503600,
                    name: "Paris (Orly)".to_string()
                },
            ]
        );
    }

    #[test]
    fn malformed_destination_entries_are_skipped() {
        let payload: LocationsResponse = serde_json::from_str(
            r#"{
                "suggestions": [
                    {
                        "group": "CITY_GROUP",
                        "entities": [
                            {"destinationId": "not-a-number", "name": "Ghost"},
                            {"destinationId": "7", "name": ""},
                            {"destinationId": "8", "name": "Kept"}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let destinations = map_destinations(payload);
        assert_eq!(destinations.len(), 1);
        assert_eq!(destinations[0].name, "Kept");
    }

    #[test]
    fn empty_lookup_payload_maps_to_no_destinations() {
        let payload: LocationsResponse = serde_json::from_str("{}").unwrap();
        assert!(map_destinations(payload).is_empty());
    }

    // -- properties --

    #[test]
    fn full_property_entry_maps_to_a_candidate() {
        let payload: PropertiesResponse = serde_json::from_str(
            r#"{
                "data": {"body": {"searchResults": {"results": [{
                    "id": 123456,
                    "name": "Hotel du Test",
                    "ratePlan": {"price": {"exactCurrent": 210.4}},
                    "address": {"locality": "Paris", "streetAddress": "1 Rue de Test"},
                    "landmarks": [{"distance": "0.8 miles"}]
                }]}}}
            }"#,
        )
        .unwrap();

        let candidates = map_properties(payload);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.id, "123456");
        assert_eq!(c.name, "Hotel du Test");
        assert_eq!(c.total_price, Some(210.4));
        assert_eq!(c.address.as_deref(), Some("Paris, 1 Rue de Test"));
        assert_eq!(c.distance_miles, Some(0.8));
        assert_eq!(c.url, "https://hotels.com/ho123456");
    }

    #[test]
    fn missing_fields_map_to_unknowns() {
        let payload: PropertiesResponse = serde_json::from_str(
            r#"{
                "data": {"body": {"searchResults": {"results": [{
                    "id": 9,
                    "name": "Bare Hotel",
                    "address": {"locality": "Paris"},
                    "landmarks": [{"distance": "close by"}]
                }]}}}
            }"#,
        )
        .unwrap();

        let candidates = map_properties(payload);
        assert_eq!(candidates.len(), 1);
        let c = &candidates[0];
        assert_eq!(c.total_price, None);
        assert_eq!(c.address, None);
        assert_eq!(c.distance_miles, None);
    }

    #[test]
    fn entries_without_id_or_name_are_dropped() {
        let payload: PropertiesResponse = serde_json::from_str(
            r#"{
                "data": {"body": {"searchResults": {"results": [
                    {"name": "No Id"},
                    {"id": 5},
                    {"id": 6, "name": "Kept"}
                ]}}}
            }"#,
        )
        .unwrap();

        let candidates = map_properties(payload);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "Kept");
    }

    #[test]
    fn truncated_payload_maps_to_no_candidates() {
        for raw in ["{}", r#"{"data": {}}"#, r#"{"data": {"body": {}}}"#] {
            let payload: PropertiesResponse = serde_json::from_str(raw).unwrap();
            assert!(map_properties(payload).is_empty());
        }
    }

    // -- distance text --

    #[test]
    fn distance_text_parses_the_leading_number() {
        assert_eq!(parse_distance_text("1.2 miles"), Some(1.2));
        assert_eq!(parse_distance_text("0.8 miles"), Some(0.8));
        assert_eq!(parse_distance_text("nearby"), None);
        assert_eq!(parse_distance_text(""), None);
    }

    // -- photos --

    #[test]
    fn photos_are_sized_and_truncated() {
        let payload: PhotosResponse = serde_json::from_str(
            r#"{
                "hotelImages": [
                    {"baseUrl": "https://img.example/1_{size}.jpg"},
                    {"baseUrl": "https://img.example/2_{size}.jpg"},
                    {"baseUrl": "https://img.example/3_{size}.jpg"}
                ]
            }"#,
        )
        .unwrap();

        let urls = map_photos(payload, 2);
        assert_eq!(
            urls,
            vec![
                "https://img.example/1_b.jpg".to_string(),
                "https://img.example/2_b.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn photoless_payload_maps_to_no_urls() {
        let payload: PhotosResponse = serde_json::from_str("{}").unwrap();
        assert!(map_photos(payload, 5).is_empty());
    }

    // -- sort order --

    #[test]
    fn sort_params_match_the_wire_names() {
        assert_eq!(sort_param(SortOrder::PriceAscending), "PRICE");
        assert_eq!(sort_param(SortOrder::PriceDescending), "PRICE_HIGHEST_FIRST");
    }
}
