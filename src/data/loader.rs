//! CSV ingest, cleaning and the memoized dataset service.
//!
//! Turning the downloaded bytes into a `Dataset`:
//! 1. parse CSV with a header row
//! 2. rename the source (Chinese) headers to canonical column names
//! 3. coerce prices to numbers, bad values become `None`
//! 4. convert local-era dates, bad values become `None`
//! 5. keep the target community only
//! 6. drop rows without a date
//!
//! Whole-file problems (download, missing columns, malformed records) are
//! caught by `DatasetService` and degrade to an empty dataset plus an error.

use csv::StringRecord;
use once_cell::unsync::OnceCell;
use tracing::{debug, error, info};

use crate::data::roc_date;
use crate::data::storage::ObjectStore;
use crate::domain::{Dataset, RawTransactionRow, TransactionRecord};
use crate::error::AppError;

/// Source header → canonical column name.
pub const COLUMN_MAPPING: [(&str, &str); 5] = [
    ("社區簡稱", "community_name"),
    ("交易日期", "date_of_transaction_roc"),
    ("單價(萬元/坪)", "unit_price_per_ping"),
    ("總價(萬元)", "total_price"),
    ("交易標的", "transaction_target"),
];

/// Row counts from one cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows_read: usize,
    pub rows_in_community: usize,
    pub rows_dropped_bad_date: usize,
}

/// Result of a load attempt. `error` is set when the load failed; the dataset
/// is then empty.
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub stats: LoadStats,
    pub error: Option<AppError>,
}

impl LoadedDataset {
    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    fn failed(err: AppError) -> Self {
        Self {
            dataset: Dataset::default(),
            stats: LoadStats::default(),
            error: Some(err),
        }
    }
}

/// Owns the storage client and the once-loaded dataset.
///
/// The first call to [`DatasetService::dataset`] downloads and cleans; later
/// calls return the same value. There is no invalidation.
pub struct DatasetService {
    store: Box<dyn ObjectStore>,
    bucket: String,
    object_path: String,
    target_community: String,
    loaded: OnceCell<LoadedDataset>,
}

impl DatasetService {
    pub fn new(
        store: Box<dyn ObjectStore>,
        bucket: impl Into<String>,
        object_path: impl Into<String>,
        target_community: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            object_path: object_path.into(),
            target_community: target_community.into(),
            loaded: OnceCell::new(),
        }
    }

    pub fn target_community(&self) -> &str {
        &self.target_community
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// Load-if-absent accessor.
    pub fn dataset(&self) -> &LoadedDataset {
        self.loaded.get_or_init(|| match self.load() {
            Ok(loaded) => loaded,
            Err(err) => {
                error!("Failed to download or process dataset: {err}");
                LoadedDataset::failed(err)
            }
        })
    }

    fn load(&self) -> Result<LoadedDataset, AppError> {
        info!(
            "Loading {}/{} for community {}",
            self.bucket, self.object_path, self.target_community
        );
        let bytes = self.store.download(&self.bucket, &self.object_path)?;
        let rows = parse_transactions(&bytes)?;
        let (dataset, stats) = clean_transactions(rows, &self.target_community);
        info!(
            "Loaded {} rows ({} read, {} in community, {} dropped for bad dates)",
            dataset.len(),
            stats.rows_read,
            stats.rows_in_community,
            stats.rows_dropped_bad_date
        );
        Ok(LoadedDataset {
            dataset,
            stats,
            error: None,
        })
    }
}

/// Parse CSV bytes into coerced records (all communities, dates possibly missing).
pub fn parse_transactions(bytes: &[u8]) -> Result<Vec<TransactionRecord>, AppError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        debug!("Source file is empty");
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AppError::runtime(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let renamed = rename_headers(&headers)?;
    reader.set_headers(renamed);

    let mut out = Vec::new();
    for (idx, result) in reader.deserialize::<RawTransactionRow>().enumerate() {
        // +2: 1-based line numbers, plus the header line.
        let raw = result
            .map_err(|e| AppError::runtime(format!("CSV parse error on line {}: {e}", idx + 2)))?;
        out.push(coerce_row(raw));
    }
    Ok(out)
}

/// Apply the community filter and drop rows without a resolvable date.
pub fn clean_transactions(rows: Vec<TransactionRecord>, target_community: &str) -> (Dataset, LoadStats) {
    let mut stats = LoadStats {
        rows_read: rows.len(),
        ..LoadStats::default()
    };

    let records = rows
        .into_iter()
        .filter(|r| r.community_name == target_community)
        .inspect(|_| stats.rows_in_community += 1)
        .filter(|r| r.date_of_transaction.is_some())
        .collect::<Vec<_>>();

    stats.rows_dropped_bad_date = stats.rows_in_community - records.len();
    (Dataset::new(records), stats)
}

fn rename_headers(headers: &StringRecord) -> Result<StringRecord, AppError> {
    let renamed: StringRecord = headers
        .iter()
        .map(|name| {
            let name = normalize_header_name(name);
            COLUMN_MAPPING
                .iter()
                .find(|(source, _)| *source == name)
                .map(|(_, canonical)| canonical.to_string())
                .unwrap_or_else(|| name.to_string())
        })
        .collect();

    for (source, canonical) in COLUMN_MAPPING {
        if !renamed.iter().any(|h| h == canonical) {
            return Err(AppError::runtime(format!(
                "Missing required column: `{source}` ({canonical})"
            )));
        }
    }
    Ok(renamed)
}

fn normalize_header_name(name: &str) -> &str {
    // Excel-exported UTF-8 CSVs often carry a BOM on the first header.
    name.trim().trim_start_matches('\u{feff}').trim()
}

fn coerce_row(raw: RawTransactionRow) -> TransactionRecord {
    TransactionRecord {
        date_of_transaction: roc_date::convert(&raw.date_of_transaction_roc),
        unit_price_per_ping: parse_price(&raw.unit_price_per_ping),
        total_price: parse_price(&raw.total_price),
        community_name: raw.community_name,
        date_of_transaction_roc: raw.date_of_transaction_roc,
        transaction_target: raw.transaction_target,
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    let v = raw.trim().parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}
