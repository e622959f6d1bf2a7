use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}
