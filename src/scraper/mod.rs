mod models;
mod scraper;
mod scraper_error;

pub use models::RawProduct;
pub use scraper::{ShopScraper, DEFAULT_USER_AGENT};
pub use scraper_error::ScraperError;

/// Where a cycle gets its product pages from.
pub trait ProductSource {
    /// Product page URLs, in sitemap order. A failure aborts the cycle.
    fn product_urls(&self) -> Result<Vec<String>, ScraperError>;

    /// Raw fields of one product page. A failure skips only that product.
    fn fetch_product(&self, url: &str) -> Result<RawProduct, ScraperError>;
}
