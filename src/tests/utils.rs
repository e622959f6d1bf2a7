use crate::domain::alert::Alert;
use crate::notifier::{Notifier, NotifierError};
use crate::scraper::{ProductSource, RawProduct, ScraperError};
use crate::store::{AlertLog, StateStore};
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Unique file path under the system temp dir; the file is not created.
pub fn temp_path(prefix: &str, ext: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "shop_monitor_{prefix}_{}_{nanos}_{n}.{ext}",
        std::process::id()
    ))
}

/// Fresh state file and alert log for one test.
pub fn temp_stores(prefix: &str) -> (StateStore, AlertLog) {
    (
        StateStore::new(temp_path(&format!("{prefix}_state"), "json")),
        AlertLog::new(temp_path(&format!("{prefix}_alerts"), "log")),
    )
}

pub fn cleanup(state: &StateStore, log: &AlertLog) {
    let _ = std::fs::remove_file(state.path());
    let _ = std::fs::remove_file(log.path());
}

/// A product page as the scraper would hand it over.
pub fn raw_product(name: &str, prices: &[&str], in_stock: bool) -> RawProduct {
    RawProduct {
        url: format!(
            "https://shop.example/shop/{}/",
            name.to_lowercase().replace(' ', "-")
        ),
        name: Some(name.to_string()),
        price_tokens: prices.iter().map(|p| format!("{p}€")).collect(),
        has_add_to_cart: in_stock,
        out_of_stock_marker: !in_stock,
        quantity: None,
        image_url: None,
    }
}

/// In-memory sitemap. `Err` entries simulate pages that fail to download.
#[derive(Default)]
pub struct FakeSource {
    pub sitemap_down: bool,
    pub pages: Vec<(String, Result<RawProduct, String>)>,
}

impl FakeSource {
    pub fn with_products(products: Vec<RawProduct>) -> Self {
        Self {
            sitemap_down: false,
            pages: products.into_iter().map(|p| (p.url.clone(), Ok(p))).collect(),
        }
    }
}

impl ProductSource for FakeSource {
    fn product_urls(&self) -> Result<Vec<String>, ScraperError> {
        if self.sitemap_down {
            return Err(ScraperError::HttpStatus {
                url: "https://shop.example/sitemap.xml".to_string(),
                status: 503,
            });
        }
        Ok(self.pages.iter().map(|(url, _)| url.clone()).collect())
    }

    fn fetch_product(&self, url: &str) -> Result<RawProduct, ScraperError> {
        match self.pages.iter().find(|(u, _)| u == url) {
            Some((_, Ok(raw))) => Ok(raw.clone()),
            Some((_, Err(msg))) => Err(ScraperError::Network(msg.clone())),
            None => Err(ScraperError::HttpStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Keeps every alert it is asked to deliver; optionally fails each delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub delivered: RefCell<Vec<Alert>>,
}

impl RecordingNotifier {
    pub fn texts(&self) -> Vec<String> {
        self.delivered.borrow().iter().map(|a| a.text.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(&self, alert: &Alert) -> Result<(), NotifierError> {
        self.delivered.borrow_mut().push(alert.clone());
        if self.fail {
            return Err(NotifierError::ApiError("429 Too Many Requests".to_string()));
        }
        Ok(())
    }
}
