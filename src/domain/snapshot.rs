// src/domain/snapshot.rs

use crate::domain::price::{parse_price_token, Price};
use crate::scraper::RawProduct;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Placeholder key for pages without a product title.
pub const MISSING_NAME: &str = "N/A";

/// A product as observed in the current cycle, normalized and ready for diffing.
/// The display name doubles as identity, so a renamed product shows up as a
/// brand new one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub key: String,
    pub price: Price,
    pub available: bool,
    pub quantity_hint: Option<String>,
    pub image_url: Option<String>,
    pub source_url: String,
}

/// Last known state of a product, as stored in the state file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub available: bool,
    #[serde(rename = "quantity", default)]
    pub quantity_hint: Option<String>,
}

impl ProductSnapshot {
    /// Canonicalizes a scraped page.
    ///
    /// Returns `None` when the lead price is zero or missing: such pages are
    /// not real listings and must neither alert nor touch stored state.
    pub fn from_raw(raw: RawProduct) -> Option<Self> {
        let amounts = raw
            .price_tokens
            .iter()
            .filter_map(|token| match parse_price_token(token) {
                Ok(amount) => Some(amount),
                Err(e) => {
                    debug!(url = %raw.url, "skipping price token: {e}");
                    None
                }
            })
            .collect();
        let price = Price::from_amounts(amounts);

        if !price.is_listing() {
            return None;
        }

        let available = raw.has_add_to_cart && !raw.out_of_stock_marker && price.is_present();

        let key = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(MISSING_NAME)
            .to_string();

        Some(ProductSnapshot {
            key,
            price,
            available,
            quantity_hint: raw
                .quantity
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty()),
            image_url: raw.image_url,
            source_url: raw.url,
        })
    }

    /// The fields carried over to the next cycle.
    pub fn to_record(&self) -> ProductRecord {
        ProductRecord {
            price: self.price.clone(),
            available: self.available,
            quantity_hint: self.quantity_hint.clone(),
        }
    }
}
