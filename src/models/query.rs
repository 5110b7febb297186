use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::EarningsRecord;
use crate::service::query::sector_slug;

/// Page sizes offered by the dashboard's "per page" selector.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 25;
/// Look-ahead windows offered by the date filter, in days.
pub const DATE_RANGE_OPTIONS: [u32; 4] = [3, 7, 14, 30];

/// Everything the dashboard needs to derive one view of the record list.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub search_term: String,
    pub date_range: DateRange,
    pub sector: SectorFilter,
    pub sort: Option<SortSpec>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            date_range: DateRange::All,
            sector: SectorFilter::All,
            sort: Some(SortSpec::default()),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryParams {
    /// Drop search, date and sector filters and go back to the first page.
    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.date_range = DateRange::All;
        self.sector = SectorFilter::All;
        self.page = 1;
    }

    /// Change the page size; the current page resets to 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size;
        self.page = 1;
    }

    /// Apply a column-header click: toggles direction on the active key.
    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort = Some(match self.sort {
            Some(current) => current.toggle(key),
            None => SortSpec::ascending(key),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    #[default]
    All,
    /// Today through today + N, inclusive at both ends.
    NextDays(u32),
}

impl DateRange {
    /// Accepts `all` or a day count.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        value.parse::<u32>().ok().map(Self::NextDays)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SectorFilter {
    #[default]
    All,
    Slug(String),
}

impl SectorFilter {
    /// Accepts `all`, a slug, or a sector name as displayed.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Slug(sector_slug(value))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Id,
    Ticker,
    CompanyName,
    Sector,
    EventName,
    EarningsDate,
    StockPrice,
    PriceChange,
    EpsEstimate,
    RevenueEstimate,
    Time,
    QuoteUrl,
}

/// A record's value under some sort key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
    Date(DateTime<Utc>),
}

impl SortKey {
    pub const ALL: [SortKey; 12] = [
        SortKey::Id,
        SortKey::Ticker,
        SortKey::CompanyName,
        SortKey::Sector,
        SortKey::EventName,
        SortKey::EarningsDate,
        SortKey::StockPrice,
        SortKey::PriceChange,
        SortKey::EpsEstimate,
        SortKey::RevenueEstimate,
        SortKey::Time,
        SortKey::QuoteUrl,
    ];

    /// Field name as it appears on the serialized record.
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Ticker => "ticker",
            SortKey::CompanyName => "companyName",
            SortKey::Sector => "sector",
            SortKey::EventName => "eventName",
            SortKey::EarningsDate => "earningsDate",
            SortKey::StockPrice => "stockPrice",
            SortKey::PriceChange => "priceChange",
            SortKey::EpsEstimate => "epsEstimate",
            SortKey::RevenueEstimate => "revenueEstimate",
            SortKey::Time => "time",
            SortKey::QuoteUrl => "quoteUrl",
        }
    }

    /// Accepts camelCase or snake_case field names, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let wanted: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().to_ascii_lowercase() == wanted)
    }

    pub fn value(self, record: &EarningsRecord) -> Option<SortValue<'_>> {
        match self {
            SortKey::Id => Some(SortValue::Text(&record.id)),
            SortKey::Ticker => Some(SortValue::Text(&record.ticker)),
            SortKey::CompanyName => Some(SortValue::Text(&record.company_name)),
            SortKey::Sector => Some(SortValue::Text(&record.sector)),
            SortKey::EventName => Some(SortValue::Text(&record.event_name)),
            SortKey::EarningsDate => record.earnings_date.map(SortValue::Date),
            SortKey::StockPrice => record.stock_price.map(SortValue::Number),
            SortKey::PriceChange => record.price_change.map(SortValue::Number),
            SortKey::EpsEstimate => record.eps_estimate.map(SortValue::Number),
            SortKey::RevenueEstimate => record.revenue_estimate.map(SortValue::Number),
            SortKey::Time => Some(SortValue::Text(&record.time)),
            SortKey::QuoteUrl => record.quote_url.as_deref().map(SortValue::Text),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::ascending(SortKey::EarningsDate)
    }
}

impl SortSpec {
    pub fn ascending(key: SortKey) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }

    /// Ascending on the active key flips to descending; anything else
    /// starts ascending on `key`.
    pub fn toggle(self, key: SortKey) -> Self {
        let direction = if self.key == key && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { key, direction }
    }
}

/// Summary tiles, always computed over the full record list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub this_week: usize,
    pub next_week: usize,
    pub sectors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    /// 1-based index of the first record on the page, 0 when the page is empty.
    pub first_item: usize,
    pub last_item: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

/// One entry of the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PageSlot {
    Page(usize),
    Gap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub page: Vec<EarningsRecord>,
    pub total_count: usize,
    pub stats: Stats,
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectorOption {
    pub value: String,
    pub label: String,
}
