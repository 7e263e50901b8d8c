//! The dialog controller: drives prompts, validation and transitions.
//!
//! The controller is invoked once per inbound event and keeps nothing in
//! memory between invocations. It reads the latest session of the user,
//! dispatches on its persisted state, validates the input strictly
//! before committing anything, and answers with the next prompt, or, on
//! a rejection, the same prompt again with the session untouched.
//! Reaching the completed state runs the search and delivers the result
//! blocks in the same invocation.

use chrono::{NaiveDate, Utc};

use roomscout_core::calendar::{self, CalendarEvent, CalendarPage};
use roomscout_core::command::SearchKind;
use roomscout_core::dialog::{self, DialogState};
use roomscout_core::error::CoreError;
use roomscout_core::types::DbId;
use roomscout_db::models::search_session::SearchSession;
use roomscout_db::models::user::CreateUser;
use roomscout_db::repositories::{SearchSessionRepo, UserRepo};
use roomscout_db::DbPool;
use roomscout_hotels::HotelsApi;

use crate::query::{self, CompletedSearch};
use crate::report;
use crate::transport::{
    Choice, EventPayload, InboundEvent, Keyboard, Transport, TransportError,
};

const GREETING: &str = "Hi! I can find you a hotel. Send /help to see what I can do.";
const HELP: &str = "Available commands:\n\
    /cheapest - cheapest hotels in a city\n\
    /priciest - most expensive hotels in a city\n\
    /bestdeal - hotels matching your price and distance from the center\n\
    /history - your recent searches\n\
    /help - this message";
const ASK_DESTINATION: &str = "Which city should I search? Type its name in English:";
const NO_SUCH_CITY: &str = "I couldn't find that city. Try another name:";
const ASK_DISTRICT: &str = "Which area exactly?";
const ASK_CHECK_IN: &str = "Pick a check-in date:";
const ASK_CHECK_OUT: &str = "Pick a check-out date:";
const ASK_MIN_PRICE: &str = "Minimum price per day, in $:";
const ASK_MAX_PRICE: &str = "Maximum price per day, in $:";
const ASK_MIN_DISTANCE: &str = "Minimum distance from the center, in miles:";
const ASK_MAX_DISTANCE: &str = "Maximum distance from the center, in miles:";
const ASK_PHOTOS: &str = "Should I attach photos?";
const FETCHING: &str = "One moment, fetching that for you...";
const FOLLOW_UP: &str = "What else can I do for you?";
const USE_BUTTONS: &str = "Please use the buttons above.";
const RETRY_NUMBER: &str = "That doesn't look like a valid number, try again.";

/// How many past sessions the history command lists.
const HISTORY_LIMIT: i64 = 10;

/// A recognized slash command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    History,
    Search(SearchKind),
}

impl Command {
    /// Parse a leading slash command; `None` for plain dialog text.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "/start" => Some(Self::Start),
            "/help" => Some(Self::Help),
            "/history" => Some(Self::History),
            "/cheapest" => Some(Self::Search(SearchKind::Cheapest)),
            "/priciest" => Some(Self::Search(SearchKind::Priciest)),
            "/bestdeal" => Some(Self::Search(SearchKind::BestDeal)),
            _ => None,
        }
    }
}

/// Errors the event loop has to care about. External-service failures
/// never show up here; they degrade inside the handlers.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Dialog error: {0}")]
    Core(#[from] CoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-user dialog orchestrator.
pub struct DialogController {
    pool: DbPool,
    hotels: HotelsApi,
}

impl DialogController {
    pub fn new(pool: DbPool, hotels: HotelsApi) -> Self {
        Self { pool, hotels }
    }

    /// Handle one inbound event end to end.
    pub async fn handle_event<T: Transport>(
        &self,
        transport: &T,
        event: InboundEvent,
    ) -> Result<(), BotError> {
        let user = CreateUser {
            telegram_id: event.user.id,
            first_name: event.user.first_name.clone(),
            last_name: event.user.last_name.clone(),
            username: event.user.username.clone(),
        };
        if UserRepo::upsert(&self.pool, &user).await?.is_some() {
            tracing::info!(user_id = user.telegram_id, "registered new user");
        }

        match event.payload {
            EventPayload::Text(text) => match Command::parse(&text) {
                Some(command) => self.handle_command(transport, event.user.id, command).await,
                None => self.handle_text(transport, event.user.id, &text).await,
            },
            EventPayload::Choice(data) => {
                self.handle_choice(transport, event.user.id, &data).await
            }
        }
    }

    async fn handle_command<T: Transport>(
        &self,
        transport: &T,
        user_id: DbId,
        command: Command,
    ) -> Result<(), BotError> {
        match command {
            Command::Start => {
                transport.send_prompt(user_id, GREETING, None).await?;
            }
            Command::Help => {
                transport.send_prompt(user_id, HELP, None).await?;
            }
            Command::History => {
                let sessions =
                    SearchSessionRepo::list_recent(&self.pool, user_id, HISTORY_LIMIT).await?;
                report::deliver_history(transport, user_id, &sessions).await?;
                transport.send_prompt(user_id, FOLLOW_UP, None).await?;
                transport.send_prompt(user_id, HELP, None).await?;
            }
            Command::Search(kind) => {
                // The newest row is always the active one, so starting a
                // new command silently abandons an incomplete session.
                let session =
                    SearchSessionRepo::create(&self.pool, user_id, kind.as_str()).await?;
                tracing::info!(
                    user_id,
                    session_id = session.id,
                    kind = kind.as_str(),
                    "search session started"
                );
                transport.send_prompt(user_id, ASK_DESTINATION, None).await?;
            }
        }
        Ok(())
    }

    async fn handle_text<T: Transport>(
        &self,
        transport: &T,
        user_id: DbId,
        text: &str,
    ) -> Result<(), BotError> {
        let Some(session) = SearchSessionRepo::latest_for_user(&self.pool, user_id).await? else {
            transport.send_prompt(user_id, GREETING, None).await?;
            return Ok(());
        };
        let state = DialogState::from_str_db(&session.state)?;
        let kind = SearchKind::from_str_db(&session.kind)?;

        match state {
            DialogState::AwaitingDestination => {
                self.collect_destination(transport, &session, kind, text).await
            }
            DialogState::AwaitingMinPrice => match dialog::parse_price(text) {
                Ok(value) => {
                    SearchSessionRepo::set_price_min(
                        &self.pool,
                        session.id,
                        value,
                        advance(state, kind)?.as_str(),
                    )
                    .await?;
                    transport.send_prompt(user_id, ASK_MAX_PRICE, None).await?;
                    Ok(())
                }
                Err(error) => self.reject(transport, user_id, &error, ASK_MIN_PRICE).await,
            },
            DialogState::AwaitingMaxPrice => match dialog::parse_price(text) {
                Ok(value) => {
                    SearchSessionRepo::set_price_max(
                        &self.pool,
                        session.id,
                        value,
                        advance(state, kind)?.as_str(),
                    )
                    .await?;
                    transport.send_prompt(user_id, ASK_MIN_DISTANCE, None).await?;
                    Ok(())
                }
                Err(error) => self.reject(transport, user_id, &error, ASK_MAX_PRICE).await,
            },
            DialogState::AwaitingMinDistance => match dialog::parse_distance(text) {
                Ok(value) => {
                    SearchSessionRepo::set_distance_min(
                        &self.pool,
                        session.id,
                        value,
                        advance(state, kind)?.as_str(),
                    )
                    .await?;
                    transport.send_prompt(user_id, ASK_MAX_DISTANCE, None).await?;
                    Ok(())
                }
                Err(error) => {
                    self.reject(transport, user_id, &error, ASK_MIN_DISTANCE).await
                }
            },
            DialogState::AwaitingMaxDistance => match dialog::parse_distance(text) {
                Ok(value) => {
                    let updated = committed(
                        SearchSessionRepo::set_distance_max(
                            &self.pool,
                            session.id,
                            value,
                            advance(state, kind)?.as_str(),
                        )
                        .await?,
                        session.id,
                    )?;
                    transport
                        .send_prompt(user_id, &hotel_count_prompt(&updated), None)
                        .await?;
                    Ok(())
                }
                Err(error) => {
                    self.reject(transport, user_id, &error, ASK_MAX_DISTANCE).await
                }
            },
            DialogState::AwaitingHotelCount => match dialog::parse_hotel_count(text) {
                Ok(value) => {
                    SearchSessionRepo::set_hotel_count(
                        &self.pool,
                        session.id,
                        value,
                        advance(state, kind)?.as_str(),
                    )
                    .await?;
                    transport
                        .send_prompt(user_id, ASK_PHOTOS, Some(&photo_keyboard()))
                        .await?;
                    Ok(())
                }
                Err(error) => {
                    self.reject(transport, user_id, &error, &ask_hotel_count()).await
                }
            },
            DialogState::AwaitingPhotoCount => match dialog::parse_photo_count(text) {
                Ok(value) => {
                    let updated = committed(
                        SearchSessionRepo::set_photo_count(
                            &self.pool,
                            session.id,
                            value,
                            advance(state, kind)?.as_str(),
                        )
                        .await?,
                        session.id,
                    )?;
                    self.complete(transport, &updated).await
                }
                Err(error) => {
                    self.reject(transport, user_id, &error, &ask_photo_count()).await
                }
            },
            DialogState::AwaitingDestinationChoice
            | DialogState::AwaitingCheckIn
            | DialogState::AwaitingCheckOut
            | DialogState::AwaitingPhotoDecision => {
                transport.send_prompt(user_id, USE_BUTTONS, None).await?;
                Ok(())
            }
            DialogState::Completed => {
                transport.send_prompt(user_id, GREETING, None).await?;
                Ok(())
            }
        }
    }

    async fn handle_choice<T: Transport>(
        &self,
        transport: &T,
        user_id: DbId,
        data: &str,
    ) -> Result<(), BotError> {
        let Some(session) = SearchSessionRepo::latest_for_user(&self.pool, user_id).await? else {
            transport.send_prompt(user_id, GREETING, None).await?;
            return Ok(());
        };
        let state = DialogState::from_str_db(&session.state)?;
        let kind = SearchKind::from_str_db(&session.kind)?;

        match state {
            DialogState::AwaitingDestinationChoice => {
                // Advanced only by a candidate presented earlier; any
                // other payload is a stale button.
                let Some((destination_id, name)) = dialog::parse_destination_choice(data) else {
                    return Ok(());
                };
                committed(
                    SearchSessionRepo::set_destination(
                        &self.pool,
                        session.id,
                        destination_id,
                        &name,
                        advance(state, kind)?.as_str(),
                    )
                    .await?,
                    session.id,
                )?;
                let (min, max) = calendar::checkin_window(today());
                transport
                    .send_prompt(
                        user_id,
                        ASK_CHECK_IN,
                        Some(&calendar_keyboard(calendar::month_page(min, min, max))),
                    )
                    .await?;
                Ok(())
            }
            DialogState::AwaitingCheckIn => {
                let (min, max) = calendar::checkin_window(today());
                match calendar::parse_event(data) {
                    Some(CalendarEvent::Pick(date)) if date >= min && date <= max => {
                        SearchSessionRepo::set_check_in(
                            &self.pool,
                            session.id,
                            date,
                            advance(state, kind)?.as_str(),
                        )
                        .await?;
                        let (out_min, out_max) = calendar::checkout_window(date);
                        transport
                            .send_prompt(
                                user_id,
                                ASK_CHECK_OUT,
                                Some(&calendar_keyboard(calendar::month_page(
                                    out_min, out_min, out_max,
                                ))),
                            )
                            .await?;
                    }
                    Some(CalendarEvent::Pick(_)) => {
                        // A keyboard rendered yesterday can offer a day
                        // that has slipped out of range.
                        transport
                            .send_prompt(
                                user_id,
                                ASK_CHECK_IN,
                                Some(&calendar_keyboard(calendar::month_page(min, min, max))),
                            )
                            .await?;
                    }
                    Some(CalendarEvent::Page(cursor)) => {
                        transport
                            .send_prompt(
                                user_id,
                                ASK_CHECK_IN,
                                Some(&calendar_keyboard(calendar::month_page(cursor, min, max))),
                            )
                            .await?;
                    }
                    Some(CalendarEvent::Noop) | None => {}
                }
                Ok(())
            }
            DialogState::AwaitingCheckOut => {
                let check_in = session.check_in.ok_or_else(|| {
                    CoreError::Internal(format!(
                        "session {} is awaiting check-out without a check-in",
                        session.id
                    ))
                })?;
                let (min, max) = calendar::checkout_window(check_in);
                match calendar::parse_event(data) {
                    Some(CalendarEvent::Pick(date)) if date >= min && date <= max => {
                        let nights = calendar::day_count(check_in, date);
                        let updated = committed(
                            SearchSessionRepo::set_check_out(
                                &self.pool,
                                session.id,
                                date,
                                nights,
                                advance(state, kind)?.as_str(),
                            )
                            .await?,
                            session.id,
                        )?;
                        if kind.wants_bounds() {
                            transport.send_prompt(user_id, ASK_MIN_PRICE, None).await?;
                        } else {
                            transport
                                .send_prompt(user_id, &hotel_count_prompt(&updated), None)
                                .await?;
                        }
                    }
                    Some(CalendarEvent::Pick(_)) => {
                        transport
                            .send_prompt(
                                user_id,
                                ASK_CHECK_OUT,
                                Some(&calendar_keyboard(calendar::month_page(min, min, max))),
                            )
                            .await?;
                    }
                    Some(CalendarEvent::Page(cursor)) => {
                        transport
                            .send_prompt(
                                user_id,
                                ASK_CHECK_OUT,
                                Some(&calendar_keyboard(calendar::month_page(cursor, min, max))),
                            )
                            .await?;
                    }
                    Some(CalendarEvent::Noop) | None => {}
                }
                Ok(())
            }
            DialogState::AwaitingPhotoDecision => {
                match data {
                    dialog::PHOTO_YES => {
                        SearchSessionRepo::set_state(
                            &self.pool,
                            session.id,
                            DialogState::AwaitingPhotoCount.as_str(),
                        )
                        .await?;
                        transport
                            .send_prompt(user_id, &ask_photo_count(), None)
                            .await?;
                    }
                    dialog::PHOTO_NO => {
                        let updated = committed(
                            SearchSessionRepo::set_state(
                                &self.pool,
                                session.id,
                                DialogState::Completed.as_str(),
                            )
                            .await?,
                            session.id,
                        )?;
                        self.complete(transport, &updated).await?;
                    }
                    _ => {}
                }
                Ok(())
            }
            // A stale button pressed while the dialog expects text (or
            // is idle) changes nothing.
            _ => Ok(()),
        }
    }

    /// Resolve free destination text into a choice of candidates.
    ///
    /// Zero matches (or a failed lookup, which degrades to zero)
    /// re-prompts the same state; one or more advance to the choice
    /// step.
    async fn collect_destination<T: Transport>(
        &self,
        transport: &T,
        session: &SearchSession,
        kind: SearchKind,
        text: &str,
    ) -> Result<(), BotError> {
        let user_id = session.user_id;
        transport.send_prompt(user_id, FETCHING, None).await?;

        let found = match self.hotels.lookup_destinations(text).await {
            Ok(found) => found,
            Err(error) => {
                tracing::error!(user_id, error = %error, "destination lookup failed");
                Vec::new()
            }
        };
        if found.is_empty() {
            transport.send_prompt(user_id, NO_SUCH_CITY, None).await?;
            return Ok(());
        }

        SearchSessionRepo::set_state(
            &self.pool,
            session.id,
            advance(DialogState::AwaitingDestination, kind)?.as_str(),
        )
        .await?;

        let choices = found
            .into_iter()
            .map(|destination| {
                let data =
                    dialog::encode_destination_choice(destination.id, &destination.name);
                Choice {
                    label: destination.name,
                    data,
                }
            })
            .collect();
        transport
            .send_prompt(user_id, ASK_DISTRICT, Some(&Keyboard::single_column(choices)))
            .await?;
        Ok(())
    }

    /// Run the search for a session that just reached the completed
    /// state, store the result list once, and deliver the blocks.
    async fn complete<T: Transport>(
        &self,
        transport: &T,
        session: &SearchSession,
    ) -> Result<(), BotError> {
        let search = CompletedSearch::from_session(session)?;
        transport.send_prompt(session.user_id, FETCHING, None).await?;

        let candidates = query::execute(&self.hotels, &search).await;
        SearchSessionRepo::set_results(
            &self.pool,
            session.id,
            &serde_json::to_value(&candidates)?,
        )
        .await?;
        tracing::info!(
            user_id = session.user_id,
            session_id = session.id,
            results = candidates.len(),
            "search completed"
        );

        report::deliver_results(transport, &self.hotels, session.user_id, &search, &candidates)
            .await?;
        transport.send_prompt(session.user_id, FOLLOW_UP, None).await?;
        transport.send_prompt(session.user_id, HELP, None).await?;
        Ok(())
    }

    /// Re-issue the same prompt after a rejected input; the session is
    /// deliberately left untouched.
    async fn reject<T: Transport>(
        &self,
        transport: &T,
        user_id: DbId,
        error: &CoreError,
        prompt: &str,
    ) -> Result<(), BotError> {
        tracing::debug!(user_id, error = %error, "input rejected");
        transport
            .send_prompt(user_id, &format!("{RETRY_NUMBER}\n{prompt}"), None)
            .await?;
        Ok(())
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn advance(state: DialogState, kind: SearchKind) -> Result<DialogState, CoreError> {
    state.next(kind).ok_or_else(|| {
        CoreError::Internal(format!(
            "dialog state '{}' has no successor",
            state.as_str()
        ))
    })
}

/// A mutator returning no row means the session vanished, which the
/// append-only store makes impossible short of a programming error.
fn committed(updated: Option<SearchSession>, id: DbId) -> Result<SearchSession, CoreError> {
    updated.ok_or(CoreError::NotFound {
        entity: "search_session",
        id,
    })
}

fn ask_hotel_count() -> String {
    format!(
        "How many hotels should I show, 1 to {}?",
        dialog::SEARCH_PAGE_SIZE
    )
}

fn ask_photo_count() -> String {
    format!(
        "How many photos per hotel, 1 to {}?",
        dialog::MAX_PHOTOS_PER_HOTEL
    )
}

fn hotel_count_prompt(session: &SearchSession) -> String {
    let destination = session
        .destination_name
        .as_deref()
        .unwrap_or("your destination");
    match (session.check_in, session.check_out) {
        (Some(check_in), Some(check_out)) => format!(
            "You picked {destination}, {check_in} to {check_out}.\n{}",
            ask_hotel_count()
        ),
        _ => ask_hotel_count(),
    }
}

fn photo_keyboard() -> Keyboard {
    Keyboard {
        rows: vec![vec![
            Choice {
                label: "Yes".to_string(),
                data: dialog::PHOTO_YES.to_string(),
            },
            Choice {
                label: "No".to_string(),
                data: dialog::PHOTO_NO.to_string(),
            },
        ]],
    }
}

fn calendar_keyboard(page: CalendarPage) -> Keyboard {
    Keyboard {
        rows: page
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|button| Choice {
                        label: button.label,
                        data: button.data,
                    })
                    .collect()
            })
            .collect(),
    }
}
