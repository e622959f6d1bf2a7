// src/notifier.rs

use crate::domain::alert::Alert;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    ApiError(String),
}

/// Delivery channel for rendered alerts.
pub trait Notifier {
    fn deliver(&self, alert: &Alert) -> Result<(), NotifierError>;
}

/// Writes alerts to the diagnostic log only. Used without credentials and
/// for dry runs.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, alert: &Alert) -> Result<(), NotifierError> {
        info!(link = alert.link.as_deref().unwrap_or(""), "📣 {}", alert.text);
        Ok(())
    }
}

/// Sends alerts to a chat through the Telegram Bot API.
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: String,
    client: Client,
}

#[derive(Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    url: &'a str,
}

#[derive(Serialize)]
struct ReplyMarkup<'a> {
    inline_keyboard: Vec<Vec<InlineButton<'a>>>,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>,
}

#[derive(Serialize)]
struct SendPhoto<'a> {
    chat_id: &'a str,
    photo: &'a str,
    caption: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup<'a>>,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, NotifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotifierError::RequestFailed(e.to_string()))?;

        Ok(Self {
            bot_token,
            chat_id,
            client,
        })
    }

    fn post<T: Serialize>(&self, method: &str, payload: &T) -> Result<(), NotifierError> {
        let url = format!("{TELEGRAM_API}/bot{}/{method}", self.bot_token);

        let resp = self
            .client
            .post(&url)
            .json(payload)
            .send()
            // reqwest errors embed the URL, which carries the token
            .map_err(|e| NotifierError::RequestFailed(e.without_url().to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_else(|_| "(no body)".to_string());
            return Err(NotifierError::ApiError(format!(
                "Telegram {method}: {status} - {body}"
            )));
        }

        Ok(())
    }
}

impl Notifier for TelegramNotifier {
    fn deliver(&self, alert: &Alert) -> Result<(), NotifierError> {
        let (body, parse_mode) = match &alert.rich_text {
            Some(rich) => (rich.as_str(), Some("HTML")),
            None => (alert.text.as_str(), None),
        };

        let reply_markup = alert.link.as_deref().map(|url| ReplyMarkup {
            inline_keyboard: vec![vec![InlineButton {
                text: "View product",
                url,
            }]],
        });

        match &alert.image {
            Some(photo) => self.post(
                "sendPhoto",
                &SendPhoto {
                    chat_id: &self.chat_id,
                    photo,
                    caption: body,
                    parse_mode,
                    reply_markup,
                },
            ),
            None => self.post(
                "sendMessage",
                &SendMessage {
                    chat_id: &self.chat_id,
                    text: body,
                    parse_mode,
                    reply_markup,
                },
            ),
        }
    }
}
