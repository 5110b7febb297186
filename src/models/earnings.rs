use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized earnings-call event consumed by the dashboard views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsRecord {
    pub id: String,
    pub ticker: String,
    pub company_name: String,
    pub sector: String,
    pub event_name: String,
    #[serde(default, with = "iso_timestamp")]
    pub earnings_date: Option<DateTime<Utc>>,
    pub stock_price: Option<f64>,
    pub price_change: Option<f64>,
    pub eps_estimate: Option<f64>,
    pub revenue_estimate: Option<f64>,
    pub time: String, // e.g. "Before Open", "After Close"
    pub quote_url: Option<String>,
    /// Source row exactly as it appeared in the calendar document.
    pub raw: Value,
}

/// `YYYY-MM-DDTHH:MM:SSZ`, the shape the calendar files use for timestamps.
mod iso_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|ts| ts.with_timezone(&Utc)))
    }
}
