// src/domain/alert.rs

use crate::domain::changes::{format_percent, ChangeEvent};
use crate::domain::price::format_amount;
use crate::domain::snapshot::ProductSnapshot;

/// A rendered alert, ready for the alert log and the delivery channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Plain rendering; written to the alert log and used for dedup.
    pub text: String,
    /// Telegram HTML rendering with the same content as `text`.
    pub rich_text: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
}

/// Display name without the site suffix: `"Widget | Shop"` -> `"Widget"`.
pub fn clean_name(name: &str) -> &str {
    name.split('|').next().unwrap_or(name).trim()
}

/// Renders an event. `Unchanged` renders to nothing.
pub fn render(event: &ChangeEvent, currency: &str) -> Option<Alert> {
    let product = event.product();
    let name = clean_name(&product.key);

    // (emoji + label, body after the name) for both renderings
    let (head, tail) = match event {
        ChangeEvent::Unchanged(_) => return None,
        ChangeEvent::New(p) => ("🆕 New product:", priced_tail(p, currency)),
        ChangeEvent::Restock(p) => ("🔄 Restock:", priced_tail(p, currency)),
        ChangeEvent::SoldOut(_) => ("❌ Sold out:", String::new()),
        ChangeEvent::PriceChange {
            old, new, percent, ..
        } => {
            let mut tail = format!(
                " from {} to {}",
                format_amount(*old, currency),
                format_amount(*new, currency)
            );
            if let Some(percent) = percent {
                tail.push_str(&format!(" ({}%)", format_percent(*percent)));
            }
            ("💸 Price changed:", tail)
        }
    };

    let text = format!("{head} {name}{tail}");
    let rich_text = format!("{head} <b>{}</b>{}", escape_html(name), escape_html(&tail));

    Some(Alert {
        text,
        rich_text: Some(rich_text),
        link: Some(product.source_url.clone()).filter(|u| !u.is_empty()),
        image: product.image_url.clone(),
    })
}

fn priced_tail(product: &ProductSnapshot, currency: &str) -> String {
    let mut tail = format!(" ({})", product.price.display(currency));
    if let Some(qty) = &product.quantity_hint {
        tail.push_str(&format!(" · qty {qty}"));
    }
    tail
}

/// Escapes the three characters Telegram's HTML parse mode cares about.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
