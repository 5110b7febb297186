//! Raw calendar document as produced by the scraper and generator.
//!
//! Every layer is extracted leniently from a `serde_json::Value`: a field with
//! an unexpected shape reads as absent instead of failing the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::normalize::parse_number;

const ID_KEYS: &[&str] = &["id"];
const TICKER_KEYS: &[&str] = &["symbol", "ticker"];
const COMPANY_KEYS: &[&str] = &["company", "companyName"];
const SECTOR_KEYS: &[&str] = &["sector"];
const EVENT_NAME_KEYS: &[&str] = &["eventName"];
const EARNINGS_DATE_KEYS: &[&str] = &["earningsDate"];
const TIME_KEYS: &[&str] = &["time"];
const QUOTE_URL_KEYS: &[&str] = &["quote_url", "quoteUrl"];
const STOCK_PRICE_KEYS: &[&str] = &["stockPrice", "price", "stock_price"];
const PRICE_CHANGE_KEYS: &[&str] = &["priceChange", "surprise_pct"];
const EPS_ESTIMATE_KEYS: &[&str] = &["epsEstimate", "eps_estimate"];
const REVENUE_ESTIMATE_KEYS: &[&str] = &["revenueEstimate", "revenue_estimate"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDocument {
    pub days: Vec<RawDay>,
    pub params: Option<WindowParams>,
    pub updated_at: Option<String>,
    pub generated_at: Option<String>,
    pub source: Option<String>,
}

/// Scrape window the document was built for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowParams {
    pub start_day: Option<String>,
    pub end_day: Option<String>,
}

/// One calendar day bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDay {
    pub day: Option<String>,
    pub rows: Vec<RawRow>,
    pub url: Option<String>,
    pub count: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub id: Option<String>,
    /// `symbol`, then `ticker`.
    pub ticker: Option<String>,
    /// `company`, then `companyName`.
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub event_name: Option<String>,
    pub earnings_date: Option<String>,
    pub time: Option<String>,
    pub quote_url: Option<String>,
    /// `stockPrice`, `price`, then `stock_price`.
    pub stock_price: Option<RawNumber>,
    /// `priceChange`, then `surprise_pct`.
    pub price_change: Option<RawNumber>,
    pub eps_estimate: Option<RawNumber>,
    pub revenue_estimate: Option<RawNumber>,
    pub source: Value,
}

/// Numeric cell that may arrive as a JSON number or as display text like `"12.3M"`.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(RawNumber::Number),
            Value::String(s) => Some(RawNumber::Text(s.clone())),
            _ => None,
        }
    }

    /// Finite value, or `None` when the cell can't be read as a number.
    pub fn value(&self) -> Option<f64> {
        match self {
            RawNumber::Number(n) if n.is_finite() => Some(*n),
            RawNumber::Number(_) => None,
            RawNumber::Text(s) => parse_number(s),
        }
    }
}

impl RawDocument {
    pub fn from_value(value: &Value) -> Self {
        let days = match value.get("days") {
            Some(Value::Array(items)) => items.iter().map(RawDay::from_value).collect(),
            _ => Vec::new(),
        };

        Self {
            days,
            params: value.get("params").filter(|p| p.is_object()).map(|p| WindowParams {
                start_day: text_field(p, &["start_day"]),
                end_day: text_field(p, &["end_day"]),
            }),
            updated_at: text_field(value, &["updated_at"]),
            generated_at: text_field(value, &["generated_at"]),
            source: text_field(value, &["source"]),
        }
    }

    pub fn row_count(&self) -> usize {
        self.days.iter().map(|d| d.rows.len()).sum()
    }
}

impl RawDay {
    pub fn from_value(value: &Value) -> Self {
        let rows = match value.get("rows") {
            Some(Value::Array(items)) => items.iter().map(RawRow::from_value).collect(),
            _ => Vec::new(),
        };

        Self {
            day: text_field(value, &["day"]),
            rows,
            url: text_field(value, &["url"]),
            count: value.get("count").and_then(Value::as_u64),
            error: text_field(value, &["error"]),
        }
    }
}

impl RawRow {
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: text_field(value, ID_KEYS),
            ticker: text_field(value, TICKER_KEYS),
            company_name: text_field(value, COMPANY_KEYS),
            sector: text_field(value, SECTOR_KEYS),
            event_name: text_field(value, EVENT_NAME_KEYS),
            earnings_date: text_field(value, EARNINGS_DATE_KEYS),
            time: text_field(value, TIME_KEYS),
            quote_url: text_field(value, QUOTE_URL_KEYS),
            stock_price: number_field(value, STOCK_PRICE_KEYS),
            price_change: number_field(value, PRICE_CHANGE_KEYS),
            eps_estimate: number_field(value, EPS_ESTIMATE_KEYS),
            revenue_estimate: number_field(value, REVENUE_ESTIMATE_KEYS),
            source: value.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for RawDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|v| Self::from_value(&v))
    }
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|v| Self::from_value(&v))
    }
}

/// First alias holding non-empty text. Numbers are accepted and stringified.
fn text_field(root: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match root.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// First alias that reads as a number; failing that, the first alias that
/// holds something number-like, so the unparsable cell stays visible.
fn number_field(root: &Value, keys: &[&str]) -> Option<RawNumber> {
    let candidates: Vec<RawNumber> = keys
        .iter()
        .filter_map(|key| root.get(*key).and_then(RawNumber::from_json))
        .collect();

    match candidates.iter().position(|c| c.value().is_some()) {
        Some(idx) => candidates.into_iter().nth(idx),
        None => candidates.into_iter().next(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aliases_resolve_in_priority_order() {
        let row = RawRow::from_value(&json!({
            "ticker": "MSFT",
            "symbol": "AAPL",
            "companyName": "Apple Inc.",
            "price": "190.5",
            "stockPrice": "n/a",
        }));

        assert_eq!(row.ticker.as_deref(), Some("AAPL"));
        assert_eq!(row.company_name.as_deref(), Some("Apple Inc."));
        assert_eq!(row.stock_price.and_then(|n| n.value()), Some(190.5));
    }

    #[test]
    fn unreadable_shapes_read_as_absent() {
        let row = RawRow::from_value(&json!({
            "symbol": ["AAPL"],
            "company": "",
            "epsEstimate": true,
            "revenueEstimate": "abc",
        }));

        assert_eq!(row.ticker, None);
        assert_eq!(row.company_name, None);
        assert_eq!(row.eps_estimate, None);
        assert_eq!(row.revenue_estimate, Some(RawNumber::Text("abc".into())));
        assert_eq!(row.revenue_estimate.and_then(|n| n.value()), None);
    }

    #[test]
    fn non_object_rows_and_days_still_count() {
        let doc = RawDocument::from_value(&json!({
            "days": [
                { "day": "2025-01-30", "rows": [null, 7, { "symbol": "AAPL" }] },
                "garbage",
            ]
        }));

        assert_eq!(doc.days.len(), 2);
        assert_eq!(doc.row_count(), 3);
        assert_eq!(doc.days[1].day, None);
    }
}
