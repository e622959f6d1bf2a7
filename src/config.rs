// src/config.rs

use crate::errors::{MonitorError, MonitorResult};
use crate::scraper::DEFAULT_USER_AGENT;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Watches a shop sitemap and reports new products, restocks, sell-outs and
/// price changes.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Run a single cycle and exit.
    #[arg(long)]
    pub once: bool,

    /// Render and log alerts without delivering them.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub sitemap_url: String,
    /// Seconds between the end of a cycle and the start of the next one.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    #[serde(default = "default_alert_log_file")]
    pub alert_log_file: PathBuf,
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,
    #[serde(default = "default_product_path_filter")]
    pub product_path_filter: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Only the last N alert lines seed the dedup set.
    #[serde(default)]
    pub dedup_window: Option<usize>,
    /// Record every product without alerting when the state is empty.
    #[serde(default)]
    pub silent_bootstrap: bool,
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
}

fn default_poll_interval() -> u64 {
    300
}

fn default_alert_log_file() -> PathBuf {
    PathBuf::from("alerts.log")
}

fn default_state_file() -> PathBuf {
    PathBuf::from("products_state.json")
}

fn default_product_path_filter() -> String {
    "/shop/".to_string()
}

fn default_currency_symbol() -> String {
    "€".to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    pub fn load(path: &Path) -> MonitorResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MonitorError::Config(format!("reading {}: {e}", path.display())))?;
        let config = Self::from_json(&raw)?;
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_json(raw: &str) -> MonitorResult<Self> {
        let config: Config =
            serde_json::from_str(raw).map_err(|e| MonitorError::Config(e.to_string()))?;
        if config.sitemap_url.trim().is_empty() {
            return Err(MonitorError::Config("sitemapUrl is empty".to_string()));
        }
        Ok(config)
    }

    /// `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID` override the file; both are
    /// needed when the file has no telegram section.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup("TELEGRAM_BOT_TOKEN").filter(|s| !s.is_empty());
        let chat_id = lookup("TELEGRAM_CHAT_ID").filter(|s| !s.is_empty());

        self.telegram = match (self.telegram.take(), token, chat_id) {
            (Some(mut tg), token, chat_id) => {
                if let Some(token) = token {
                    tg.bot_token = token;
                }
                if let Some(chat_id) = chat_id {
                    tg.chat_id = chat_id;
                }
                Some(tg)
            }
            (None, Some(bot_token), Some(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            (None, _, _) => None,
        };
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = Config::from_json(r#"{ "sitemapUrl": "https://shop.example/sitemap.xml" }"#)
            .unwrap();
        assert_eq!(config.poll_interval, 300);
        assert_eq!(config.alert_log_file, PathBuf::from("alerts.log"));
        assert_eq!(config.state_file, PathBuf::from("products_state.json"));
        assert_eq!(config.product_path_filter, "/shop/");
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.dedup_window, None);
        assert!(!config.silent_bootstrap);
        assert!(config.telegram.is_none());
    }

    #[test]
    fn reads_camel_case_keys() {
        let config = Config::from_json(
            r#"{
                "sitemapUrl": "https://shop.example/product-sitemap.xml",
                "pollInterval": 60,
                "alertLogFile": "kyo_alerts.log",
                "telegram": { "botToken": "123:abc", "chatId": "-100" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.alert_log_file, PathBuf::from("kyo_alerts.log"));
        assert_eq!(config.telegram.unwrap().chat_id, "-100");
    }

    #[test]
    fn missing_sitemap_is_a_config_error() {
        let err = Config::from_json(r#"{ "pollInterval": 60 }"#).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Config);

        let err = Config::from_json(r#"{ "sitemapUrl": " " }"#).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Config);
    }

    #[test]
    fn env_overrides_credentials() {
        let base = Config::from_json(r#"{ "sitemapUrl": "https://shop.example/s.xml" }"#).unwrap();

        let env = |key: &str| match key {
            "TELEGRAM_BOT_TOKEN" => Some("999:xyz".to_string()),
            "TELEGRAM_CHAT_ID" => Some("77".to_string()),
            _ => None,
        };
        let tg = base.clone().with_env_overrides(env).telegram.unwrap();
        assert_eq!(tg.bot_token, "999:xyz");
        assert_eq!(tg.chat_id, "77");

        let token_only = |key: &str| (key == "TELEGRAM_BOT_TOKEN").then(|| "1:a".to_string());
        assert!(base.with_env_overrides(token_only).telegram.is_none());
    }
}
