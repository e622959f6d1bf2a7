// src/domain/changes.rs

use crate::domain::snapshot::{ProductRecord, ProductSnapshot};
use crate::errors::{MonitorError, MonitorResult};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

/// Outcome of comparing a fresh snapshot with the stored record.
/// At most one event is produced per product per cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    New(ProductSnapshot),
    Restock(ProductSnapshot),
    SoldOut(ProductSnapshot),
    PriceChange {
        product: ProductSnapshot,
        /// Previous scalar price, or previous lead variant.
        old: Decimal,
        /// Current scalar price, or current lead variant.
        new: Decimal,
        /// Rounded to two places; `None` when it can't be computed.
        percent: Option<Decimal>,
    },
    Unchanged(ProductSnapshot),
}

impl ChangeEvent {
    pub fn product(&self) -> &ProductSnapshot {
        match self {
            ChangeEvent::New(p)
            | ChangeEvent::Restock(p)
            | ChangeEvent::SoldOut(p)
            | ChangeEvent::Unchanged(p)
            | ChangeEvent::PriceChange { product: p, .. } => p,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeEvent::New(_) => "new",
            ChangeEvent::Restock(_) => "restock",
            ChangeEvent::SoldOut(_) => "sold_out",
            ChangeEvent::PriceChange { .. } => "price_change",
            ChangeEvent::Unchanged(_) => "unchanged",
        }
    }
}

/// Classifies a snapshot against its prior record.
///
/// Precedence, highest first: new product, restock, sold out, price change.
/// Availability transitions win over a simultaneous price move.
pub fn decide(prior: Option<&ProductRecord>, current: &ProductSnapshot) -> ChangeEvent {
    let Some(prior) = prior else {
        return ChangeEvent::New(current.clone());
    };

    if !prior.available && current.available {
        return ChangeEvent::Restock(current.clone());
    }
    if prior.available && !current.available {
        return ChangeEvent::SoldOut(current.clone());
    }

    if prior.price.differs_from(&current.price) {
        if let (Some(old), Some(new)) = (prior.price.lead(), current.price.lead()) {
            let percent = match percent_change(old, new) {
                Ok(p) => Some(p),
                Err(e) => {
                    debug!(product = %current.key, "reporting price change without percentage: {e}");
                    None
                }
            };
            return ChangeEvent::PriceChange {
                product: current.clone(),
                old,
                new,
                percent,
            };
        }
    }

    ChangeEvent::Unchanged(current.clone())
}

/// `(new - old) / old * 100`, rounded half away from zero to two places.
pub fn percent_change(old: Decimal, new: Decimal) -> MonitorResult<Decimal> {
    let ratio = new
        .checked_sub(old)
        .ok_or_else(|| MonitorError::Computation(format!("difference from {old} to {new}")))?
        .checked_div(old)
        .ok_or_else(|| MonitorError::Computation(format!("percentage from {old} to {new}")))?;
    let percent = ratio
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| MonitorError::Computation(format!("percentage overflow for {ratio}")))?;
    Ok(percent.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Sign-prefixed, two decimal places: `+20.00`, `-20.00`, `+0.00`.
pub fn format_percent(percent: Decimal) -> String {
    let mut percent = percent.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    percent.rescale(2);
    if percent.is_zero() {
        "+0.00".to_string()
    } else if percent.is_sign_negative() {
        percent.to_string()
    } else {
        format!("+{percent}")
    }
}
