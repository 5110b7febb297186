//! Filter, sort and paginate the normalized record list.
//!
//! Stages run in a fixed order: search, date range, sector, sort, paginate.
//! Nothing here mutates the input slice or reads the wall clock.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use crate::models::{
    DateRange, EarningsRecord, QueryParams, QueryResult, SectorFilter, SectorOption,
    SortDirection, SortSpec, SortValue, Stats,
};
use crate::service::clock::Clock;

pub mod pagination;

pub use pagination::{clamp_page, page_info, visible_pages};

const THIS_WEEK_DAYS: u32 = 7;
const NEXT_WEEK_DAYS: u32 = 14;

/// Derive one dashboard view from `records`.
pub fn query(records: &[EarningsRecord], params: &QueryParams, clock: &Clock) -> QueryResult {
    let filtered = filter_and_sort(records, params, clock);
    let total_count = filtered.len();
    let page = paginate(&filtered, params.page, params.page_size)
        .iter()
        .map(|r| (*r).clone())
        .collect();

    QueryResult {
        page,
        total_count,
        stats: compute_stats(records, clock),
        page_info: page_info(params.page, params.page_size, total_count),
    }
}

/// Every record that survives the filters, in display order.
pub fn filter_and_sort<'a>(
    records: &'a [EarningsRecord],
    params: &QueryParams,
    clock: &Clock,
) -> Vec<&'a EarningsRecord> {
    let needle = params.search_term.to_lowercase();

    let mut filtered: Vec<&EarningsRecord> = records
        .iter()
        .filter(|r| matches_search(r, &needle))
        .filter(|r| matches_date_range(r, params.date_range, clock))
        .filter(|r| matches_sector(r, &params.sector))
        .collect();

    if let Some(spec) = params.sort {
        sort_records(&mut filtered, spec);
    }
    filtered
}

fn matches_search(record: &EarningsRecord, needle: &str) -> bool {
    needle.is_empty()
        || record.ticker.to_lowercase().contains(needle)
        || record.company_name.to_lowercase().contains(needle)
}

fn matches_date_range(record: &EarningsRecord, range: DateRange, clock: &Clock) -> bool {
    match range {
        DateRange::All => true,
        DateRange::NextDays(days) => record
            .earnings_date
            .is_some_and(|ts| clock.within_days(ts, None, days)),
    }
}

fn matches_sector(record: &EarningsRecord, filter: &SectorFilter) -> bool {
    match filter {
        SectorFilter::All => true,
        SectorFilter::Slug(slug) => sector_slug(&record.sector) == *slug,
    }
}

/// Stable sort. Records without a value for the key go last in either direction.
pub fn sort_records(records: &mut [&EarningsRecord], spec: SortSpec) {
    records.sort_by(|a, b| {
        match (spec.key.value(a), spec.key.value(b)) {
            (Some(x), Some(y)) => {
                let ord = compare_values(x, y);
                match spec.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

fn compare_values(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Date(x), SortValue::Date(y)) => x.cmp(&y),
        (SortValue::Number(x), SortValue::Number(y)) => x.total_cmp(&y),
        (SortValue::Text(x), SortValue::Text(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
        // A key always yields one kind of value.
        _ => Ordering::Equal,
    }
}

/// 1-based page slice; out-of-range pages are empty. Page 0 reads as page 1.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page_size == 0 {
        return &[];
    }
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Summary counts over the whole dataset, independent of any filter.
pub fn compute_stats(records: &[EarningsRecord], clock: &Clock) -> Stats {
    let in_window = |after: Option<u32>, through: u32| {
        records
            .iter()
            .filter_map(|r| r.earnings_date)
            .filter(|ts| clock.within_days(*ts, after, through))
            .count()
    };

    Stats {
        total: records.len(),
        this_week: in_window(None, THIS_WEEK_DAYS),
        next_week: in_window(Some(THIS_WEEK_DAYS), NEXT_WEEK_DAYS),
        sectors: records
            .iter()
            .map(|r| r.sector.as_str())
            .collect::<HashSet<_>>()
            .len(),
    }
}

/// Lowercase with every whitespace run replaced by `-`, outer runs included.
/// An empty name is `unknown`.
pub fn sector_slug(sector: &str) -> String {
    if sector.is_empty() {
        return "unknown".to_string();
    }
    let mut slug = String::with_capacity(sector.len());
    let mut in_space = false;
    for c in sector.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    slug
}

/// Options for the sector selector: "All Sectors", then each distinct sector.
pub fn sector_options(records: &[EarningsRecord]) -> Vec<SectorOption> {
    let distinct: BTreeSet<(String, &str)> = records
        .iter()
        .filter(|r| !r.sector.is_empty())
        .map(|r| (r.sector.to_lowercase(), r.sector.as_str()))
        .collect();

    std::iter::once(SectorOption {
        value: "all".to_string(),
        label: "All Sectors".to_string(),
    })
    .chain(distinct.into_iter().map(|(_, label)| SectorOption {
        value: sector_slug(label),
        label: label.to_string(),
    }))
    .collect()
}
