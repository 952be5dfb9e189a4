//! Server binary: read the environment, load history, serve.

use parlor::{ParlorError, ParlorServer};
use parlor_store::{MessageStore, key_from_hex};

#[tokio::main]
async fn main() -> Result<(), ParlorError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("PARLOR_ADDR").unwrap_or_else(|_| "0.0.0.0:2052".into());
    let history_path =
        std::env::var("PARLOR_HISTORY_PATH").unwrap_or_else(|_| "history.json".into());
    // With a key, history is sealed at rest; without one it persists
    // in plaintext.
    let key = match std::env::var("PARLOR_HISTORY_KEY") {
        Ok(hex) => Some(key_from_hex(&hex)?),
        Err(_) => None,
    };

    let store = MessageStore::load(history_path, key).await;
    let server = ParlorServer::bind(&addr, store).await?;
    server.run().await
}
