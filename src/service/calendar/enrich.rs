use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::service::calendar::raw::{RawDocument, RawNumber};

/// Per-ticker quote snapshot written by the enrichment job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickerEnrichment {
    #[serde(default)]
    pub tickers: HashMap<String, TickerQuote>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TickerQuote {
    pub price: Option<f64>,
    pub eps_estimate_curr_q: Option<f64>,
    pub revenue_estimate_curr_q: Option<f64>,
}

/// Overlay quote data onto raw rows. The quote's price wins over the row's;
/// estimates only fill gaps. Returns the number of rows that matched a ticker.
pub fn augment(document: &mut RawDocument, enrichment: &TickerEnrichment) -> usize {
    if enrichment.tickers.is_empty() {
        return 0;
    }

    let mut matched = 0;
    for row in document.days.iter_mut().flat_map(|d| d.rows.iter_mut()) {
        let symbol = row
            .ticker
            .as_deref()
            .map(|s| s.trim().to_uppercase())
            .unwrap_or_default();
        let Some(quote) = enrichment.tickers.get(&symbol) else {
            continue;
        };
        matched += 1;

        if let Some(price) = quote.price {
            row.stock_price = Some(RawNumber::Number(price));
        }
        if missing(&row.eps_estimate) {
            if let Some(eps) = quote.eps_estimate_curr_q {
                row.eps_estimate = Some(RawNumber::Number(eps));
            }
        }
        if missing(&row.revenue_estimate) {
            if let Some(revenue) = quote.revenue_estimate_curr_q {
                row.revenue_estimate = Some(RawNumber::Number(revenue));
            }
        }
    }

    debug!(
        "enrichment matched {} of {} rows",
        matched,
        document.row_count()
    );
    matched
}

fn missing(cell: &Option<RawNumber>) -> bool {
    cell.as_ref().and_then(RawNumber::value).is_none()
}
