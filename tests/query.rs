use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use earnings_dashboard::models::{
    DateRange, EarningsRecord, QueryParams, SectorFilter, SortDirection, SortKey, SortSpec,
};
use earnings_dashboard::service::clock::Clock;
use earnings_dashboard::service::query::{
    compute_stats, filter_and_sort, paginate, query, sector_options, sector_slug,
};

fn clock() -> Clock {
    Clock::new(
        Utc.with_ymd_and_hms(2025, 1, 23, 3, 0, 0).unwrap(),
        chrono_tz::UTC,
    )
}

fn days_out(days: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 23, 21, 0, 0).unwrap() + Duration::days(days)
}

fn record(ticker: &str, company: &str, sector: &str, days: i64) -> EarningsRecord {
    EarningsRecord {
        id: format!("{ticker}-{days}"),
        ticker: ticker.to_string(),
        company_name: company.to_string(),
        sector: sector.to_string(),
        event_name: format!("{company} Earnings Call"),
        earnings_date: Some(days_out(days)),
        stock_price: None,
        price_change: None,
        eps_estimate: None,
        revenue_estimate: None,
        time: "After Close".to_string(),
        quote_url: None,
        raw: Value::Null,
    }
}

fn unsorted() -> QueryParams {
    QueryParams {
        sort: None,
        ..QueryParams::default()
    }
}

fn ids(records: &[EarningsRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

#[test]
fn search_matches_ticker_or_company_case_insensitively() {
    let records = vec![
        record("AAPL", "Apple Inc.", "Technology", 1),
        record("MSFT", "Microsoft Corporation", "Technology", 1),
    ];

    for term in ["AAPL", "aapl", "apple"] {
        let params = QueryParams {
            search_term: term.to_string(),
            ..unsorted()
        };
        let result = query(&records, &params, &clock());
        assert_eq!(ids(&result.page), ["AAPL-1"], "term {term:?}");
        assert_eq!(result.total_count, 1);
    }
}

#[test]
fn empty_search_keeps_everything() {
    let records = vec![
        record("AAPL", "Apple Inc.", "Technology", 1),
        record("", "", "Unknown", 2),
    ];
    let result = query(&records, &unsorted(), &clock());
    assert_eq!(result.total_count, 2);
}

#[test]
fn date_range_is_inclusive_at_both_ends() {
    let records = vec![
        record("PAST", "Past", "Technology", -1),
        record("TODAY", "Today", "Technology", 0),
        record("SEVEN", "Seven", "Technology", 7),
        record("EIGHT", "Eight", "Technology", 8),
    ];
    let params = QueryParams {
        date_range: DateRange::NextDays(7),
        ..unsorted()
    };

    let result = query(&records, &params, &clock());
    assert_eq!(ids(&result.page), ["TODAY-0", "SEVEN-7"]);
}

#[test]
fn unbounded_date_range_keeps_everything_from_today_on() {
    let records = vec![
        record("PAST", "Past", "Technology", -1),
        record("TODAY", "Today", "Technology", 0),
        record("LATER", "Later", "Technology", 3650),
    ];
    for range in [DateRange::NextDays(u32::MAX), DateRange::parse("1000000000").unwrap()] {
        let params = QueryParams {
            date_range: range,
            ..unsorted()
        };
        let result = query(&records, &params, &clock());
        assert_eq!(ids(&result.page), ["TODAY-0", "LATER-3650"], "range {range:?}");
    }
}

#[test]
fn whitespace_search_is_not_ignored() {
    let records = vec![
        record("AAPL", "Apple Inc.", "Technology", 1),
        record("MSFT", "Microsoft", "Technology", 1),
    ];
    let params = QueryParams {
        search_term: " ".to_string(),
        ..unsorted()
    };
    assert_eq!(ids(&query(&records, &params, &clock()).page), ["AAPL-1"]);
}

#[test]
fn date_range_uses_local_calendar_days() {
    // 21:00 UTC on day 7 is already day 8 in Singapore.
    let records = vec![record("SEVEN", "Seven", "Technology", 7)];
    let singapore = Clock::new(clock().now(), chrono_tz::Asia::Singapore);
    let params = QueryParams {
        date_range: DateRange::NextDays(7),
        ..unsorted()
    };

    assert_eq!(query(&records, &params, &singapore).total_count, 0);
    assert_eq!(query(&records, &params, &clock()).total_count, 1);
}

#[test]
fn records_without_dates_never_match_a_range() {
    let mut undated = record("X", "X Corp", "Technology", 0);
    undated.earnings_date = None;
    let params = QueryParams {
        date_range: DateRange::NextDays(30),
        ..unsorted()
    };

    assert_eq!(query(&[undated], &params, &clock()).total_count, 0);
}

#[test]
fn sector_filter_compares_slugs() {
    let records = vec![
        record("JPM", "JPMorgan", "Financial Services", 1),
        record("AAPL", "Apple", "Technology", 1),
        record("V", "Visa", "financial  services", 2),
    ];
    let params = QueryParams {
        sector: SectorFilter::parse("financial-services"),
        ..unsorted()
    };

    let result = query(&records, &params, &clock());
    assert_eq!(ids(&result.page), ["JPM-1", "V-2"]);

    let by_name = QueryParams {
        sector: SectorFilter::parse("Financial Services"),
        ..unsorted()
    };
    assert_eq!(by_name.sector, SectorFilter::Slug("financial-services".into()));
    assert_eq!(query(&records, &by_name, &clock()).total_count, 2);
}

#[test]
fn filters_narrow_before_pagination() {
    let mut records: Vec<EarningsRecord> = (0..10)
        .map(|i| record(&format!("T{i}"), "Tech Co", "Technology", i))
        .collect();
    records.push(record("BANK", "Bank Co", "Financial Services", 0));

    let params = QueryParams {
        sector: SectorFilter::Slug("technology".into()),
        date_range: DateRange::NextDays(6),
        page: 2,
        page_size: 5,
        ..unsorted()
    };

    let result = query(&records, &params, &clock());
    assert_eq!(result.total_count, 7);
    assert_eq!(ids(&result.page), ["T5-5", "T6-6"]);
    assert_eq!(result.page_info.total_pages, 2);
    assert_eq!(
        (result.page_info.first_item, result.page_info.last_item),
        (6, 7)
    );
}

#[test]
fn pagination_slices_and_past_end_is_empty() {
    let records: Vec<EarningsRecord> = (0..7)
        .map(|i| record(&format!("T{i}"), "Co", "Technology", 1))
        .collect();

    let page = |n| {
        let params = QueryParams {
            page: n,
            page_size: 3,
            ..unsorted()
        };
        query(&records, &params, &clock())
    };

    let first = page(1);
    assert_eq!(first.page, records[0..3].to_vec());
    assert_eq!(first.total_count, 7);

    let third = page(3);
    assert_eq!(third.page, records[6..7].to_vec());
    assert_eq!(third.total_count, 7);

    let fourth = page(4);
    assert!(fourth.page.is_empty());
    assert_eq!(fourth.total_count, 7);
}

#[test]
fn paginate_handles_degenerate_inputs() {
    let items = [1, 2, 3];
    assert_eq!(paginate(&items, 0, 2), &[1, 2]);
    assert!(paginate(&items, 1, 0).is_empty());
    assert!(paginate(&items, usize::MAX, usize::MAX).is_empty());
    assert!(paginate::<i32>(&[], 1, 25).is_empty());
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let records = vec![
        record("B1", "Beta", "Technology", 3),
        record("A1", "alpha", "Technology", 2),
        record("B2", "beta", "Technology", 1),
        record("A2", "Alpha", "Technology", 4),
    ];
    let params = QueryParams {
        sort: Some(SortSpec::ascending(SortKey::CompanyName)),
        ..QueryParams::default()
    };

    let sorted = filter_and_sort(&records, &params, &clock());
    let order: Vec<&str> = sorted.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(order, ["A1", "A2", "B1", "B2"]);

    let desc = QueryParams {
        sort: Some(SortSpec {
            key: SortKey::CompanyName,
            direction: SortDirection::Desc,
        }),
        ..QueryParams::default()
    };
    let sorted = filter_and_sort(&records, &desc, &clock());
    let order: Vec<&str> = sorted.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(order, ["B1", "B2", "A1", "A2"]);
}

#[test]
fn sorts_dates_and_numbers_with_missing_values_last() {
    let mut records = vec![
        record("LATE", "Late", "Technology", 5),
        record("EARLY", "Early", "Technology", 1),
        record("NONE", "None", "Technology", 3),
    ];
    records[0].eps_estimate = Some(10.0);
    records[1].eps_estimate = Some(-2.0);
    records[2].earnings_date = None;

    let by = |key, direction| {
        let params = QueryParams {
            sort: Some(SortSpec { key, direction }),
            ..QueryParams::default()
        };
        filter_and_sort(&records, &params, &clock())
            .iter()
            .map(|r| r.ticker.clone())
            .collect::<Vec<_>>()
    };

    assert_eq!(by(SortKey::EarningsDate, SortDirection::Asc), ["EARLY", "LATE", "NONE"]);
    assert_eq!(by(SortKey::EarningsDate, SortDirection::Desc), ["LATE", "EARLY", "NONE"]);
    assert_eq!(by(SortKey::EpsEstimate, SortDirection::Asc), ["EARLY", "LATE", "NONE"]);
    assert_eq!(by(SortKey::EpsEstimate, SortDirection::Desc), ["LATE", "EARLY", "NONE"]);
}

#[test]
fn default_query_sorts_by_earnings_date() {
    let records = vec![
        record("LATE", "Late", "Technology", 5),
        record("EARLY", "Early", "Technology", 1),
    ];
    let result = query(&records, &QueryParams::default(), &clock());
    assert_eq!(ids(&result.page), ["EARLY-1", "LATE-5"]);
}

#[test]
fn query_never_mutates_input() {
    let records = vec![
        record("B", "Beta", "Technology", 2),
        record("A", "Alpha", "Technology", 1),
    ];
    let before = records.clone();
    let _ = query(&records, &QueryParams::default(), &clock());
    assert_eq!(records, before);
}

#[test]
fn stats_cover_the_unfiltered_set() {
    let records = vec![
        record("PAST", "Past", "Technology", -1),
        record("T0", "Zero", "Technology", 0),
        record("T7", "Seven", "Industrials", 7),
        record("T8", "Eight", "Industrials", 8),
        record("T14", "Fourteen", "Healthcare", 14),
        record("T15", "Fifteen", "Healthcare", 15),
    ];
    let params = QueryParams {
        search_term: "zero".into(),
        ..unsorted()
    };

    let result = query(&records, &params, &clock());
    assert_eq!(result.total_count, 1);
    assert_eq!(result.stats, compute_stats(&records, &clock()));
    assert_eq!(result.stats.total, 6);
    assert_eq!(result.stats.this_week, 2);
    assert_eq!(result.stats.next_week, 2);
    assert_eq!(result.stats.sectors, 3);
}

#[test]
fn empty_dataset_gives_zeroed_result() {
    let result = query(&[], &QueryParams::default(), &clock());
    assert!(result.page.is_empty());
    assert_eq!(result.total_count, 0);
    assert_eq!(result.stats.total, 0);
    assert_eq!(result.page_info.total_pages, 0);
}

#[test]
fn sector_slugs_and_options() {
    assert_eq!(sector_slug("Consumer Cyclical"), "consumer-cyclical");
    assert_eq!(sector_slug("Real   Estate"), "real-estate");
    assert_eq!(sector_slug(" Tech "), "-tech-");
    assert_eq!(sector_slug(""), "unknown");

    let records = vec![
        record("A", "A", "technology", 1),
        record("B", "B", "Basic Materials", 1),
        record("C", "C", "Basic Materials", 1),
        record("D", "D", "Utilities", 1),
    ];
    let options = sector_options(&records);
    let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
    let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();

    assert_eq!(values, ["all", "basic-materials", "technology", "utilities"]);
    assert_eq!(labels, ["All Sectors", "Basic Materials", "technology", "Utilities"]);
}

#[test]
fn toggling_sort_flips_direction_on_same_key() {
    let mut params = QueryParams::default();
    assert_eq!(params.sort, Some(SortSpec::ascending(SortKey::EarningsDate)));

    params.toggle_sort(SortKey::EarningsDate);
    assert_eq!(
        params.sort.map(|s| s.direction),
        Some(SortDirection::Desc)
    );

    params.toggle_sort(SortKey::EarningsDate);
    assert_eq!(params.sort.map(|s| s.direction), Some(SortDirection::Asc));

    params.toggle_sort(SortKey::Ticker);
    assert_eq!(params.sort, Some(SortSpec::ascending(SortKey::Ticker)));
}

#[test]
fn clearing_filters_resets_page() {
    let mut params = QueryParams {
        search_term: "aapl".into(),
        date_range: DateRange::NextDays(3),
        sector: SectorFilter::Slug("technology".into()),
        page: 4,
        ..QueryParams::default()
    };
    params.clear_filters();

    assert_eq!(params.search_term, "");
    assert_eq!(params.date_range, DateRange::All);
    assert_eq!(params.sector, SectorFilter::All);
    assert_eq!(params.page, 1);
}

#[test]
fn sort_keys_parse_from_field_names() {
    assert_eq!(SortKey::parse("earningsDate"), Some(SortKey::EarningsDate));
    assert_eq!(SortKey::parse("revenue_estimate"), Some(SortKey::RevenueEstimate));
    assert_eq!(SortKey::parse("TICKER"), Some(SortKey::Ticker));
    assert_eq!(SortKey::parse("marketCap"), None);
}
