// src/domain/price.rs

use crate::errors::{MonitorError, MonitorResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Listed price of a product.
///
/// Serialized untagged so the state file keeps the flat shape
/// `"price": 10.5`, `"price": [10, 12]` or `"price": null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    /// One amount per product variant, in page order.
    Variants(Vec<Decimal>),
    Scalar(Decimal),
    #[default]
    Absent,
}

impl Price {
    /// Builds a price from the parsed amounts of a page: none is `Absent`,
    /// one is `Scalar`, more are `Variants`.
    pub fn from_amounts(mut amounts: Vec<Decimal>) -> Self {
        match amounts.len() {
            0 => Price::Absent,
            1 => Price::Scalar(amounts.remove(0)),
            _ => Price::Variants(amounts),
        }
    }

    /// The scalar amount, or the first (lead) variant.
    pub fn lead(&self) -> Option<Decimal> {
        match self {
            Price::Scalar(amount) => Some(*amount),
            Price::Variants(amounts) => amounts.first().copied(),
            Price::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.lead().is_some()
    }

    /// Zero or missing lead price means the page is not a real listing.
    pub fn is_listing(&self) -> bool {
        self.lead().is_some_and(|amount| !amount.is_zero())
    }

    /// Whether two present prices count as a price change.
    ///
    /// Scalars compare numerically, variant lists compare only their lead
    /// variant, and a scalar against a variant list always differs. Absent
    /// prices never produce a change.
    pub fn differs_from(&self, other: &Price) -> bool {
        match (self, other) {
            (Price::Scalar(a), Price::Scalar(b)) => a != b,
            (Price::Variants(a), Price::Variants(b)) => match (a.first(), b.first()) {
                (Some(a), Some(b)) => a != b,
                _ => false,
            },
            (Price::Scalar(_), Price::Variants(v)) | (Price::Variants(v), Price::Scalar(_)) => {
                !v.is_empty()
            }
            (Price::Absent, _) | (_, Price::Absent) => false,
        }
    }

    /// Human form used in alert text, e.g. `10€` or `10€ / 12.5€`.
    pub fn display(&self, currency: &str) -> String {
        match self {
            Price::Scalar(amount) => format_amount(*amount, currency),
            Price::Variants(amounts) if !amounts.is_empty() => amounts
                .iter()
                .map(|a| format_amount(*a, currency))
                .collect::<Vec<_>>()
                .join(" / "),
            _ => "n/a".to_string(),
        }
    }
}

pub fn format_amount(amount: Decimal, currency: &str) -> String {
    format!("{}{currency}", amount.normalize())
}

/// Parses one raw price token such as `€ 12,50`, `1.234,56 €` or `9.99`.
pub fn parse_price_token(raw: &str) -> MonitorResult<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',' || *c == '-')
        .collect();

    // with both separators present, the last one is the decimal separator
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        _ => cleaned.replace(',', "."),
    };

    let amount = normalized
        .parse::<Decimal>()
        .map_err(|e| MonitorError::Parse(format!("price token {raw:?}: {e}")))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MonitorError::Parse(format!("negative price token {raw:?}")));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_european_tokens() {
        assert_eq!(parse_price_token("12,50€").unwrap(), dec("12.50"));
        assert_eq!(parse_price_token("€\u{a0}1.234,56").unwrap(), dec("1234.56"));
        assert_eq!(parse_price_token(" 9.99 ").unwrap(), dec("9.99"));
        assert_eq!(parse_price_token("10").unwrap(), dec("10"));
        assert_eq!(parse_price_token("1,234.56").unwrap(), dec("1234.56"));
    }

    #[test]
    fn rejects_tokens_without_digits() {
        let err = parse_price_token("Gratis").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Parse);
    }

    #[test]
    fn rejects_negative_amounts() {
        let err = parse_price_token("-5€").unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::Parse);
        assert_eq!(parse_price_token("-0,00").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn shape_follows_amount_count() {
        assert_eq!(Price::from_amounts(vec![]), Price::Absent);
        assert_eq!(Price::from_amounts(vec![dec("5")]), Price::Scalar(dec("5")));
        assert_eq!(
            Price::from_amounts(vec![dec("5"), dec("7")]),
            Price::Variants(vec![dec("5"), dec("7")])
        );
    }

    #[test]
    fn zero_or_absent_lead_is_not_a_listing() {
        assert!(!Price::Absent.is_listing());
        assert!(!Price::Scalar(Decimal::ZERO).is_listing());
        assert!(!Price::Variants(vec![Decimal::ZERO, dec("4")]).is_listing());
        assert!(!Price::Variants(vec![]).is_listing());
        assert!(Price::Variants(vec![dec("4"), Decimal::ZERO]).is_listing());
    }

    #[test]
    fn change_detection_rules() {
        let ten = Price::Scalar(dec("10"));
        assert!(!ten.differs_from(&Price::Scalar(dec("10.00"))));
        assert!(ten.differs_from(&Price::Scalar(dec("11"))));

        let a = Price::Variants(vec![dec("10"), dec("12")]);
        let b = Price::Variants(vec![dec("10"), dec("15")]);
        assert!(!a.differs_from(&b));
        assert!(a.differs_from(&Price::Variants(vec![dec("9"), dec("12")])));

        // scalar vs variants always differs, even with the same lead
        assert!(ten.differs_from(&a));
        assert!(a.differs_from(&ten));

        assert!(!ten.differs_from(&Price::Absent));
        assert!(!Price::Absent.differs_from(&ten));
    }

    #[test]
    fn state_file_shape() {
        let json = serde_json::to_string(&Price::Absent).unwrap();
        assert_eq!(json, "null");

        let back: Price = serde_json::from_str("[10, 12.5]").unwrap();
        assert_eq!(back, Price::Variants(vec![dec("10"), dec("12.5")]));

        let back: Price = serde_json::from_str("10").unwrap();
        assert_eq!(back, Price::Scalar(dec("10")));

        let back: Price = serde_json::from_str("null").unwrap();
        assert_eq!(back, Price::Absent);
    }

    #[test]
    fn display_forms() {
        assert_eq!(Price::Scalar(dec("10.00")).display("€"), "10€");
        assert_eq!(
            Price::Variants(vec![dec("10"), dec("12.5")]).display("€"),
            "10€ / 12.5€"
        );
        assert_eq!(Price::Absent.display("€"), "n/a");
    }
}
