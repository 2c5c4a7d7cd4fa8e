#[macro_use]
extern crate rocket;

mod actions;
mod analysis;
mod assistant;
mod attribution;
mod error;
mod matcher;
mod mentions;
mod metrics;
mod models;
mod routes;
mod scraper;
mod session;

use assistant::AssistantClient;
use scraper::Scraper;
use session::SessionStore;

#[launch]
fn rocket() -> _ {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    rocket::build()
        .manage(SessionStore::default())
        .manage(AssistantClient::from_env())
        .manage(Scraper::new())
        .mount("/api", routes::api_routes())
}
