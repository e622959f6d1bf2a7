// errors.rs
use crate::notifier::NotifierError;
use crate::scraper::ScraperError;
use crate::store::StoreError;
use thiserror::Error;

/// Errors surfaced by a monitoring cycle. Every variant is logged at the
/// boundary that owns the unit of work (product or cycle); none of them
/// terminates the poll loop.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] ScraperError),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Computation error: {0}")]
    Computation(String),
    #[error("Delivery error: {0}")]
    Delivery(#[from] NotifierError),
    #[error("State store error: {0}")]
    Store(#[from] StoreError),
    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse classification used by callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Retrieval,
    Parse,
    Computation,
    Delivery,
    Store,
    Config,
}

impl MonitorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MonitorError::Retrieval(_) => ErrorKind::Retrieval,
            MonitorError::Parse(_) => ErrorKind::Parse,
            MonitorError::Computation(_) => ErrorKind::Computation,
            MonitorError::Delivery(_) => ErrorKind::Delivery,
            MonitorError::Store(_) => ErrorKind::Store,
            MonitorError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;
