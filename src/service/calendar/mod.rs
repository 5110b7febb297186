use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::models::EarningsRecord;
use crate::service::clock::Clock;
use crate::settings::Settings;

pub mod enrich;
pub mod normalize;
pub mod raw;

pub use enrich::{augment, TickerEnrichment, TickerQuote};
pub use normalize::{normalize, parse_number, to_iso_timestamp, Session};
pub use raw::{RawDay, RawDocument, RawNumber, RawRow};

/// Calendar files older than this are reported as stale.
pub const MAX_DOCUMENT_AGE_HOURS: i64 = 24;

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads the bundled earnings calendar and turns it into dashboard records.
#[derive(Debug, Clone)]
pub struct CalendarService {
    data_path: PathBuf,
    enrichment_path: Option<PathBuf>,
}

impl CalendarService {
    pub fn new(data_path: impl Into<PathBuf>, enrichment_path: Option<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            enrichment_path,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.data_path.clone(),
            settings.enrichment_path.clone(),
        )
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Read the calendar document, overlaying enrichment data when configured.
    pub async fn load_document(&self, clock: &Clock) -> Result<RawDocument, CalendarError> {
        let mut document = read_json::<RawDocument>(&self.data_path).await?;

        info!(
            "Loaded {} rows across {} day(s) from {}",
            document.row_count(),
            document.days.len(),
            self.data_path.display()
        );

        if let Some(age) = document_age(&document, clock) {
            if age > Duration::hours(MAX_DOCUMENT_AGE_HOURS) {
                warn!(
                    "Calendar data is {} hours old; regenerate {}",
                    age.num_hours(),
                    self.data_path.display()
                );
            }
        }

        for day in document.days.iter().filter(|d| d.error.is_some()) {
            warn!(
                "Day {} was scraped with an error: {}",
                day.day.as_deref().unwrap_or("?"),
                day.error.as_deref().unwrap_or_default()
            );
        }

        if let Some(enrichment) = self.load_enrichment().await {
            let matched = augment(&mut document, &enrichment);
            info!(
                "Applied enrichment for {} ticker(s) to {} row(s)",
                enrichment.tickers.len(),
                matched
            );
        }

        Ok(document)
    }

    /// Load and normalize in one step.
    pub async fn load_records(&self, clock: &Clock) -> Result<Vec<EarningsRecord>, CalendarError> {
        let document = self.load_document(clock).await?;
        let records = normalize(&document);
        info!("Built {} earnings records", records.len());
        Ok(records)
    }

    /// Enrichment is optional; a bad file is logged and skipped.
    async fn load_enrichment(&self) -> Option<TickerEnrichment> {
        let path = self.enrichment_path.as_ref()?;
        match read_json::<TickerEnrichment>(path).await {
            Ok(enrichment) => Some(enrichment),
            Err(err) => {
                warn!("Skipping enrichment: {}", err);
                None
            }
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CalendarError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CalendarError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_slice(&bytes).map_err(|source| {
        let preview = String::from_utf8_lossy(&bytes[..bytes.len().min(200)]);
        warn!(
            "Failed to parse {}: {}; body preview: {}",
            path.display(),
            source,
            preview
        );
        CalendarError::Json {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Age of the document according to its own `updated_at`/`generated_at`
/// stamps, preferring the newer one.
pub fn document_age(document: &RawDocument, clock: &Clock) -> Option<Duration> {
    [document.updated_at.as_deref(), document.generated_at.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|ts| ts.with_timezone(&Utc))
        .max()
        .map(|stamp| clock.now() - stamp)
}
