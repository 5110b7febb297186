use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tracing::debug;

use crate::models::EarningsRecord;
use crate::service::calendar::raw::{RawDay, RawDocument, RawNumber, RawRow};

pub const DEFAULT_SECTOR: &str = "Unknown";
pub const DEFAULT_TIME_LABEL: &str = "Time Not Supplied";

/// When in the trading day a company reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    BeforeOpen,
    AfterClose,
    Unspecified,
}

impl Session {
    pub fn classify(label: &str) -> Self {
        let t = label.trim().to_lowercase();
        if t.contains("before") {
            Session::BeforeOpen
        } else if t.contains("after") {
            Session::AfterClose
        } else {
            Session::Unspecified
        }
    }

    /// UTC time-of-day used for the synthesized timestamp. Unspecified sessions
    /// are placed with after-close reports; there is no exchange calendar here.
    pub fn utc_time(self) -> NaiveTime {
        let time = match self {
            Session::BeforeOpen => NaiveTime::from_hms_opt(9, 0, 0),
            Session::AfterClose | Session::Unspecified => NaiveTime::from_hms_opt(21, 0, 0),
        };
        time.unwrap_or(NaiveTime::MIN)
    }
}

/// Flatten a calendar document into one record per row, day-major then row-minor.
pub fn normalize(document: &RawDocument) -> Vec<EarningsRecord> {
    let mut seen_ids = HashSet::with_capacity(document.row_count());
    let mut records = Vec::with_capacity(document.row_count());

    for day in &document.days {
        for (index, row) in day.rows.iter().enumerate() {
            let mut record = normalize_row(day, index, row);
            record.id = unique_id(&mut seen_ids, record.id);
            records.push(record);
        }
    }

    debug!(
        "normalized {} rows across {} day(s)",
        records.len(),
        document.days.len()
    );
    records
}

fn normalize_row(day: &RawDay, index: usize, row: &RawRow) -> EarningsRecord {
    let day_label = day.day.as_deref().unwrap_or_default();
    let ticker = row.ticker.clone().unwrap_or_default();
    let company_name = row.company_name.clone().unwrap_or_else(|| ticker.clone());
    let time_label = row.time.as_deref().unwrap_or_default();

    let id = row.id.clone().unwrap_or_else(|| {
        let symbol = if ticker.is_empty() { "UNK" } else { ticker.as_str() };
        format!("{symbol}-{day_label}-{index}")
    });

    let earnings_date = row
        .earnings_date
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| earnings_timestamp(day_label, time_label));

    EarningsRecord {
        id,
        event_name: row
            .event_name
            .clone()
            .unwrap_or_else(|| format!("{company_name} Earnings Call")),
        sector: row
            .sector
            .clone()
            .unwrap_or_else(|| DEFAULT_SECTOR.to_string()),
        ticker,
        company_name,
        earnings_date,
        stock_price: number(&row.stock_price),
        price_change: number(&row.price_change),
        eps_estimate: number(&row.eps_estimate),
        revenue_estimate: number(&row.revenue_estimate),
        time: row
            .time
            .clone()
            .unwrap_or_else(|| DEFAULT_TIME_LABEL.to_string()),
        quote_url: row.quote_url.clone(),
        raw: row.source.clone(),
    }
}

fn number(cell: &Option<RawNumber>) -> Option<f64> {
    cell.as_ref().and_then(RawNumber::value)
}

/// Explicit ids can collide with each other or with derived ones; later
/// duplicates get a `-2`, `-3`, ... suffix.
fn unique_id(seen: &mut HashSet<String>, candidate: String) -> String {
    if seen.insert(candidate.clone()) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let next = format!("{candidate}-{n}");
        if seen.insert(next.clone()) {
            return next;
        }
        n += 1;
    }
}

/// Parse display numbers such as `"12,000"`, `"1.5M"` or `"-3.2"`.
///
/// A trailing K/M/B/T scales the prefix by a thousand, million, billion or
/// trillion. Anything that doesn't come out finite is `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned = value.trim().replace(',', "");
    let last = cleaned.chars().last()?;

    let multiplier = match last.to_ascii_uppercase() {
        'K' => Some(1e3),
        'M' => Some(1e6),
        'B' => Some(1e9),
        'T' => Some(1e12),
        _ => None,
    };

    let parsed = match multiplier {
        Some(m) => cleaned[..cleaned.len() - last.len_utf8()]
            .trim()
            .parse::<f64>()
            .ok()
            .map(|n| n * m),
        None => cleaned.parse::<f64>().ok(),
    };

    parsed.filter(|n| n.is_finite())
}

/// ISO-8601 timestamp for a calendar day and a time-of-day label,
/// e.g. `("2025-01-30", "Before Market Open")` -> `"2025-01-30T09:00:00Z"`.
pub fn to_iso_timestamp(day: &str, time_label: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok()?;
    Some(format!(
        "{}T{}Z",
        date.format("%Y-%m-%d"),
        Session::classify(time_label).utc_time().format("%H:%M:%S")
    ))
}

pub fn earnings_timestamp(day: &str, time_label: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(day.trim(), "%Y-%m-%d").ok()?;
    Some(
        date.and_time(Session::classify(time_label).utc_time())
            .and_utc(),
    )
}

/// Accepts RFC 3339, a zone-less `YYYY-MM-DDTHH:MM:SS` (read as UTC), or a
/// bare `YYYY-MM-DD` (midnight UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}
