// scraper.rs
use crate::scraper::RawProduct;
use crate::scraper::{ProductSource, ScraperError};
use rand::Rng;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; ShopMonitorBot/1.0)";

const MAX_ATTEMPTS: u64 = 3;
const MAX_BACKOFF_SECS: u64 = 10;
const JITTER_MAX_MILLIS: u64 = 1500;

/// Fetches the sitemap and product pages of a WooCommerce shop.
pub struct ShopScraper {
    client: Client,
    sitemap_url: String,
    product_path_filter: String,
}

impl ShopScraper {
    pub fn new(
        sitemap_url: &str,
        product_path_filter: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| ScraperError::Client(e.to_string()))?;

        Ok(Self {
            client,
            sitemap_url: sitemap_url.to_string(),
            product_path_filter: product_path_filter.to_string(),
        })
    }

    /// GET with a few jittered retries.
    pub fn fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        let mut last_err = None;

        for attempt in 1..=MAX_ATTEMPTS {
            let start = Instant::now();

            match self.try_fetch_text(url) {
                Ok(body) => {
                    debug!("fetched {url} on attempt {attempt} in {:?}", start.elapsed());
                    return Ok(body);
                }
                // a 404 won't get better by asking again
                Err(e @ ScraperError::HttpStatus { status: 404, .. }) => return Err(e),
                Err(e) => {
                    warn!(
                        "⚠️ Attempt {attempt}/{MAX_ATTEMPTS} for {url} failed in {:?}: {e}",
                        start.elapsed()
                    );
                    last_err = Some(e);

                    if attempt < MAX_ATTEMPTS {
                        let base = std::cmp::min(2 * attempt, MAX_BACKOFF_SECS);
                        let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_MILLIS);
                        std::thread::sleep(
                            Duration::from_secs(base) + Duration::from_millis(jitter),
                        );
                    }
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| ScraperError::Network(format!("retry loop failed for {url}"))))
    }

    fn try_fetch_text(&self, url: &str) -> Result<String, ScraperError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|e| ScraperError::Network(e.to_string()))
    }
}

impl ProductSource for ShopScraper {
    fn product_urls(&self) -> Result<Vec<String>, ScraperError> {
        info!("🗺️ Downloading sitemap {}", self.sitemap_url);
        let xml = self.fetch_text(&self.sitemap_url)?;
        let urls = extract_product_urls(&xml, &self.product_path_filter)?;
        info!("🔎 Found {} product URLs", urls.len());
        Ok(urls)
    }

    fn fetch_product(&self, url: &str) -> Result<RawProduct, ScraperError> {
        let html = self.fetch_text(url)?;
        extract_product(&html, url)
    }
}

fn selector(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::HtmlParse(format!("{css}: {e}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every `<loc>` pointing at a product page, in sitemap order, without repeats.
pub fn extract_product_urls(xml: &str, path_filter: &str) -> Result<Vec<String>, ScraperError> {
    let document = Html::parse_document(xml);
    let loc = selector("loc")?;

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for el in document.select(&loc) {
        let text = el.text().collect::<String>();
        let text = text.trim();

        let Ok(parsed) = Url::parse(text) else {
            debug!("ignoring sitemap entry {text:?}");
            continue;
        };
        if !matches!(parsed.scheme(), "http" | "https") || !parsed.path().contains(path_filter) {
            continue;
        }
        if seen.insert(text.to_string()) {
            urls.push(text.to_string());
        }
    }

    Ok(urls)
}

/// Pulls the raw product fields out of a WooCommerce product page.
/// Missing elements become empty fields; normalization decides what they mean.
pub fn extract_product(html: &str, page_url: &str) -> Result<RawProduct, ScraperError> {
    let document = Html::parse_document(html);

    let title = selector("h1.product_title")?;
    let price = selector("p.price span.woocommerce-Price-amount bdi")?;
    let add_to_cart = selector("button.single_add_to_cart_button")?;
    let out_of_stock = selector("p.stock.out-of-stock, .summary .out-of-stock")?;
    let qty = selector("input.qty")?;
    let og_image = selector(r#"meta[property="og:image"]"#)?;
    let gallery_image = selector(".woocommerce-product-gallery__image img")?;

    // trimmed only: the title is the product key and must stay byte-for-byte stable
    let name = document
        .select(&title)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty());

    let price_tokens = document
        .select(&price)
        .map(element_text)
        .filter(|s| !s.is_empty())
        .collect();

    let quantity = document
        .select(&qty)
        .next()
        .and_then(|el| el.value().attr("max"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let image = document
        .select(&og_image)
        .next()
        .and_then(|el| el.value().attr("content"))
        .or_else(|| {
            document.select(&gallery_image).next().and_then(|el| {
                el.value()
                    .attr("data-large_image")
                    .or_else(|| el.value().attr("src"))
            })
        })
        .and_then(|src| resolve_url(page_url, src));

    Ok(RawProduct {
        url: page_url.to_string(),
        name,
        price_tokens,
        has_add_to_cart: document.select(&add_to_cart).next().is_some(),
        out_of_stock_marker: document.select(&out_of_stock).next().is_some(),
        quantity,
        image_url: image,
    })
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match Url::parse(href) {
        Ok(u) => Some(u.to_string()),
        Err(_) => Url::parse(base).ok()?.join(href).ok().map(|u| u.to_string()),
    }
}
