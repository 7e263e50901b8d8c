//! Delivers assembled search results and history listings.

use roomscout_core::assembler;
use roomscout_core::candidate::Candidate;
use roomscout_core::command::SearchKind;
use roomscout_core::types::DbId;
use roomscout_db::models::search_session::SearchSession;
use roomscout_hotels::HotelsApi;

use crate::query::CompletedSearch;
use crate::transport::{Transport, TransportError};

const NOTHING_FOUND: &str = "Unfortunately, nothing matched your search.";
const NO_PHOTOS: &str = "Photos are unavailable for this hotel.";
const EMPTY_HISTORY: &str = "Nothing here yet.";

/// Send the header and per-hotel blocks for a finished search.
///
/// Photos, when requested, are fetched hotel by hotel; a failed fetch
/// marks that one hotel as photo-less and the loop carries on.
pub async fn deliver_results<T: Transport>(
    transport: &T,
    hotels: &HotelsApi,
    user_id: DbId,
    search: &CompletedSearch,
    candidates: &[Candidate],
) -> Result<(), TransportError> {
    if candidates.is_empty() {
        transport.send_prompt(user_id, NOTHING_FOUND, None).await?;
        return Ok(());
    }

    let header = assembler::header(search.kind, search.check_in, search.check_out);
    transport.send_block(user_id, &header, &[]).await?;

    for candidate in assembler::select(candidates, search.hotel_count) {
        let mut text = assembler::hotel_block(candidate, search.day_count);
        let mut media = Vec::new();

        if let Some(count) = search.photo_count {
            match hotels.fetch_photos(&candidate.id, count).await {
                Ok(urls) if !urls.is_empty() => media = urls,
                Ok(_) => {
                    text.push('\n');
                    text.push_str(NO_PHOTOS);
                }
                Err(error) => {
                    tracing::warn!(
                        hotel_id = %candidate.id,
                        error = %error,
                        "photo fetch failed"
                    );
                    text.push('\n');
                    text.push_str(NO_PHOTOS);
                }
            }
        }

        transport.send_block(user_id, &text, &media).await?;
    }
    Ok(())
}

/// Send the recent-searches listing: one block per past session with its
/// request date, command, destination and stored candidates.
pub async fn deliver_history<T: Transport>(
    transport: &T,
    user_id: DbId,
    sessions: &[SearchSession],
) -> Result<(), TransportError> {
    if sessions.is_empty() {
        transport.send_prompt(user_id, EMPTY_HISTORY, None).await?;
        return Ok(());
    }

    for session in sessions {
        let kind = SearchKind::from_str_db(&session.kind)
            .map(SearchKind::label)
            .unwrap_or("search");
        let destination = session.destination_name.as_deref().unwrap_or("-");
        let mut text = format!(
            "{} - {kind} - {destination}",
            session.created_at.date_naive()
        );

        for candidate in stored_candidates(session) {
            text.push_str(&format!(
                "\n{} - {} - {}",
                candidate.name,
                assembler::fmt_money(candidate.total_price),
                candidate.url
            ));
        }

        transport.send_block(user_id, &text, &[]).await?;
    }
    Ok(())
}

/// Decode a session's stored result list; anything unreadable counts as
/// an empty result.
fn stored_candidates(session: &SearchSession) -> Vec<Candidate> {
    session
        .results
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use roomscout_core::dialog::DialogState;

    fn session_with_results(results: Option<serde_json::Value>) -> SearchSession {
        SearchSession {
            id: 1,
            user_id: 7,
            kind: SearchKind::Cheapest.as_str().to_string(),
            state: DialogState::Completed.as_str().to_string(),
            destination_id: Some(1),
            destination_name: Some("Paris".to_string()),
            check_in: None,
            check_out: None,
            day_count: None,
            price_min: None,
            price_max: None,
            distance_min: None,
            distance_max: None,
            hotel_count: None,
            photo_count: None,
            results,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stored_candidates_roundtrip() {
        let candidates = vec![Candidate {
            id: "9".to_string(),
            name: "Hotel Nine".to_string(),
            total_price: Some(120.0),
            address: None,
            distance_miles: None,
            url: "https://hotels.com/ho9".to_string(),
        }];
        let session =
            session_with_results(Some(serde_json::to_value(&candidates).unwrap()));
        assert_eq!(stored_candidates(&session), candidates);
    }

    #[test]
    fn missing_or_garbled_results_count_as_empty() {
        assert!(stored_candidates(&session_with_results(None)).is_empty());
        let garbled = session_with_results(Some(serde_json::json!({"not": "a list"})));
        assert!(stored_candidates(&garbled).is_empty());
    }
}
