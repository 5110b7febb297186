use std::env;
use std::path::PathBuf;

use chrono_tz::Tz;
use tracing::warn;

use crate::models::{
    DateRange, QueryParams, SectorFilter, SortDirection, SortKey, SortSpec, DEFAULT_PAGE_SIZE,
};

pub const DEFAULT_DATA_PATH: &str = "data/earnings_data.json";
pub const DEFAULT_TZ: Tz = chrono_tz::Asia::Singapore;

/// Runtime configuration, read from the environment (and `.env` via dotenv in `main`).
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_path: PathBuf,
    pub enrichment_path: Option<PathBuf>,
    pub tz: Tz,
    pub query: QueryParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            enrichment_path: None,
            tz: DEFAULT_TZ,
            query: QueryParams::default(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Unusable values fall back to the
    /// defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut settings = Settings::default();

        if let Some(path) = get("EARNINGS_DATA_PATH") {
            settings.data_path = PathBuf::from(path);
        }
        settings.enrichment_path = get("EARNINGS_ENRICHMENT_PATH").map(PathBuf::from);

        if let Some(raw) = get("DASHBOARD_TZ") {
            match raw.parse::<Tz>() {
                Ok(tz) => settings.tz = tz,
                Err(_) => warn!("DASHBOARD_TZ={raw} is not a known time zone; using {DEFAULT_TZ}"),
            }
        }

        let query = &mut settings.query;
        if let Some(term) = get("DASHBOARD_SEARCH") {
            query.search_term = term;
        }
        if let Some(raw) = get("DASHBOARD_DATE_RANGE") {
            match DateRange::parse(&raw) {
                Some(range) => query.date_range = range,
                None => warn!("DASHBOARD_DATE_RANGE={raw} is not `all` or a day count; showing all dates"),
            }
        }
        if let Some(raw) = get("DASHBOARD_SECTOR") {
            query.sector = SectorFilter::parse(&raw);
        }
        if let Some(raw) = get("DASHBOARD_SORT") {
            query.sort = parse_sort(&raw);
        }
        if let Some(raw) = get("DASHBOARD_PAGE") {
            match raw.parse::<usize>() {
                Ok(page) if page > 0 => query.page = page,
                _ => warn!("DASHBOARD_PAGE={raw} is not a page number; using 1"),
            }
        }
        if let Some(raw) = get("DASHBOARD_PAGE_SIZE") {
            match raw.parse::<usize>() {
                Ok(size) if size > 0 => query.page_size = size,
                _ => warn!("DASHBOARD_PAGE_SIZE={raw} is not a positive number; using {DEFAULT_PAGE_SIZE}"),
            }
        }

        settings
    }
}

/// `key` or `key:direction`. An unknown key leaves the records in calendar order.
pub fn parse_sort(raw: &str) -> Option<SortSpec> {
    let (key, direction) = match raw.split_once(':') {
        Some((key, direction)) => (key, Some(direction)),
        None => (raw, None),
    };

    let Some(key) = SortKey::parse(key) else {
        warn!("Unknown sort key {key:?}; keeping calendar order");
        return None;
    };
    let direction = match direction {
        Some(d) => SortDirection::parse(d).unwrap_or_else(|| {
            warn!("Unknown sort direction {d:?}; sorting ascending");
            SortDirection::Asc
        }),
        None => SortDirection::Asc,
    };
    Some(SortSpec { key, direction })
}
