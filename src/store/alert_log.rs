use crate::store::StoreError;
use chrono::{SecondsFormat, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const ERROR_TAG: &str = "] ERROR: ";

/// Append-only log of emitted alerts and cycle errors.
///
/// Alert lines are the plain alert text. Error lines look like
/// `[2026-10-15T08:00:00.000Z] ERROR: ...` and are skipped when the dedup
/// window is rebuilt.
#[derive(Debug, Clone)]
pub struct AlertLog {
    path: PathBuf,
}

impl AlertLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_alert(&self, text: &str) -> Result<(), StoreError> {
        // one alert per line
        let line = text.replace(['\r', '\n'], " ");
        self.append_line(&line)
    }

    pub fn append_error(&self, message: &str) -> Result<(), StoreError> {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = format!("[{ts}{ERROR_TAG}{}", message.replace(['\r', '\n'], " "));
        self.append_line(&line)
    }

    /// Alert lines (error lines excluded), oldest first. With `window`, only
    /// the last `window` alert lines are returned.
    pub fn recent_alerts(&self, window: Option<usize>) -> Result<Vec<String>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        // a torn write must not lock up every later cycle
        let raw = String::from_utf8_lossy(&bytes);

        let alerts: Vec<String> = raw
            .lines()
            .filter(|line| !line.trim().is_empty() && !is_error_line(line))
            .map(str::to_string)
            .collect();

        Ok(match window {
            Some(n) if alerts.len() > n => alerts[alerts.len() - n..].to_vec(),
            _ => alerts,
        })
    }

    fn append_line(&self, line: &str) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        writeln!(file, "{line}").map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

fn is_error_line(line: &str) -> bool {
    line.starts_with('[') && line.contains(ERROR_TAG)
}
