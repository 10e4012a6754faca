use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Serialize;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";
pub const SEND_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("server unreachable")]
    CommunicationError,
    #[error("internal server error")]
    InternalServerError,
    #[error("invalid request")]
    RequestError,
}

type Result<T> = std::result::Result<T, Error>;

/// Delivers reply text to a chat.
#[mockall::automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: i64, text: String) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

pub struct TelegramNotifier {
    url: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    fn new(api_url: &str, token: &str) -> Self {
        Self {
            url: send_message_url(api_url, token),
            client: reqwest::Client::new(),
        }
    }
}

pub fn create(api_url: &str, token: &str) -> impl Notifier {
    TelegramNotifier::new(api_url, token)
}

fn send_message_url(api_url: &str, token: &str) -> String {
    format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), token)
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: i64, text: String) -> Result<()> {
        debug!("Sending {} bytes to chat {}", text.len(), chat_id);
        self.client
            .post(&self.url)
            .timeout(SEND_TIMEOUT)
            .json(&SendMessage {
                chat_id,
                text: &text,
            })
            .send()
            .await
            .map_err(|_| Error::CommunicationError)
            .and_then(|resp| {
                if resp.status().is_client_error() {
                    Err(Error::RequestError)
                } else if resp.status().is_server_error() {
                    Err(Error::InternalServerError)
                } else {
                    Ok(())
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_includes_token_and_method() {
        assert_eq!(
            send_message_url("https://api.telegram.org", "123:abc"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(
            send_message_url("http://localhost:8081/", "t"),
            "http://localhost:8081/bott/sendMessage"
        );
    }

    #[test]
    fn payload_matches_bot_api_shape() {
        let payload = serde_json::to_value(SendMessage {
            chat_id: -100,
            text: "Updated ✅",
        })
        .unwrap();
        assert_eq!(
            payload,
            serde_json::json!({ "chat_id": -100, "text": "Updated ✅" })
        );
    }
}
