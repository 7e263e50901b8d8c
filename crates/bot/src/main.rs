//! Process bootstrap: configuration, storage, transport, event loop.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roomscout_hotels::HotelsApi;

mod controller;
mod query;
mod report;
mod telegram;
mod transport;

use controller::DialogController;
use telegram::TelegramTransport;
use transport::Transport;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roomscout_bot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let bot_token =
        std::env::var("TELEGRAM_BOT_TOKEN").expect("TELEGRAM_BOT_TOKEN must be set");
    let api_key = std::env::var("HOTELS_API_KEY").expect("HOTELS_API_KEY must be set");
    let api_host = std::env::var("HOTELS_API_HOST")
        .unwrap_or_else(|_| "hotels4.p.rapidapi.com".to_string());

    let pool = roomscout_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    roomscout_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    roomscout_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    let controller = DialogController::new(pool, HotelsApi::new(api_key, api_host));
    let mut transport = TelegramTransport::new(&bot_token);
    tracing::info!("Bot started, polling for events");

    loop {
        let event = match transport.next_event().await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(error = %error, "transport polling failed");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };
        if let Err(error) = controller.handle_event(&transport, event).await {
            tracing::error!(error = %error, "event handling failed");
        }
    }
}
