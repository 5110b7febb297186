use tracing::{info, warn};

use crate::models::{EarningsRecord, PageSlot, QueryParams, QueryResult, SortSpec, Stats};
use crate::service::calendar::{CalendarService, Session};
use crate::service::clock::Clock;
use crate::service::query::{self, visible_pages};
use crate::settings::Settings;

/// Load the calendar and render the configured view as text.
pub async fn handle(settings: &Settings, clock: &Clock) -> Result<String, String> {
    let calendar = CalendarService::from_settings(settings);
    let records = calendar.load_records(clock).await.map_err(|e| {
        warn!("Failed to load earnings data: {}", e);
        format!(
            "Unable to load earnings data from {}. Please regenerate it. ({e})",
            calendar.data_path().display()
        )
    })?;

    if records.is_empty() {
        return Err("No earnings data available in the local cache.".to_string());
    }

    let result = query::query(&records, &settings.query, clock);
    info!(
        "Showing page {} of {} ({} matching records)",
        result.page_info.page, result.page_info.total_pages, result.total_count
    );

    Ok(format_output(&result, &settings.query, clock))
}

pub fn format_output(result: &QueryResult, params: &QueryParams, clock: &Clock) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "📊 Earnings Dashboard\nAs of: {} ({})",
        clock.now().with_timezone(&clock.tz()).format("%Y-%m-%d %H:%M"),
        clock.tz()
    ));
    lines.push(format_stats(&result.stats));
    lines.push(String::new());

    if result.total_count == 0 {
        lines.push("No earnings calls found".to_string());
        return lines.join("\n");
    }

    lines.push(format!(
        "Showing {}-{} of {} earnings calls",
        result.page_info.first_item, result.page_info.last_item, result.total_count
    ));
    if let Some(sort) = params.sort {
        lines.push(format_sort(sort));
    }
    lines.push(String::new());

    for record in &result.page {
        lines.push(format_row(record, clock));
    }

    if result.page_info.total_pages > 1 {
        lines.push(String::new());
        lines.push(format_pages(
            result.page_info.page,
            result.page_info.total_pages,
        ));
    }

    lines.join("\n")
}

fn format_stats(stats: &Stats) -> String {
    format!(
        "Companies: {} | This week: {} | Next week: {} | Sectors: {}",
        stats.total, stats.this_week, stats.next_week, stats.sectors
    )
}

fn format_sort(sort: SortSpec) -> String {
    format!("Sorted by {} ({})", sort.key, sort.direction.as_str())
}

fn format_row(record: &EarningsRecord, clock: &Clock) -> String {
    let date_str = record
        .earnings_date
        .map(|ts| clock.local_day(ts).format("%m/%d").to_string())
        .unwrap_or_else(|| "--/--".to_string());
    let symbol = if record.ticker.is_empty() {
        "N/A"
    } else {
        record.ticker.as_str()
    };

    format!(
        "{} {:<5} {} [{}] ({}) EPS est {} | Rev est {} | Price {}",
        date_str,
        symbol,
        record.company_name,
        record.sector,
        session_label(&record.time),
        format_eps(record.eps_estimate),
        format_revenue(record.revenue_estimate),
        format_price(record.stock_price),
    )
}

fn format_pages(current: usize, total_pages: usize) -> String {
    let slots: Vec<String> = visible_pages(current, total_pages)
        .into_iter()
        .map(|slot| match slot {
            PageSlot::Page(p) if p == current => format!("[{p}]"),
            PageSlot::Page(p) => p.to_string(),
            PageSlot::Gap => "…".to_string(),
        })
        .collect();
    format!("Page {} of {}: {}", current, total_pages, slots.join(" "))
}

fn session_label(time: &str) -> &'static str {
    match Session::classify(time) {
        Session::BeforeOpen => "BMO",
        Session::AfterClose => "AMC",
        Session::Unspecified => "TBA",
    }
}

fn format_eps(eps: Option<f64>) -> String {
    eps.map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_price(price: Option<f64>) -> String {
    price
        .map(|v| format!("${:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_revenue(revenue: Option<f64>) -> String {
    match revenue {
        Some(v) => {
            let abs = v.abs();
            if abs >= 1_000_000_000_000.0 {
                format!("{:.1}T", v / 1_000_000_000_000.0)
            } else if abs >= 1_000_000_000.0 {
                format!("{:.1}B", v / 1_000_000_000.0)
            } else if abs >= 1_000_000.0 {
                format!("{:.1}M", v / 1_000_000.0)
            } else {
                format!("{:.0}", v)
            }
        }
        None => "N/A".to_string(),
    }
}
