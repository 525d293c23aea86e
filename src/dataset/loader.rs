use std::io::Read;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::types::TransactionRecord;

/// Columns the service needs; anything else in the file is ignored.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "timestamp",
    "country",
    "currency",
    "merchant_category",
    "amount_usd",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    country: String,
    currency: String,
    merchant_category: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    amount: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    amount_usd: Option<f64>,
}

impl From<CsvRow> for TransactionRecord {
    fn from(row: CsvRow) -> Self {
        TransactionRecord {
            timestamp: parse_timestamp(&row.timestamp),
            country: row.country,
            currency: row.currency,
            merchant_category: row.merchant_category,
            amount: row.amount.filter(|v| v.is_finite()),
            amount_usd: row.amount_usd.filter(|v| v.is_finite()),
        }
    }
}

/// Read enriched records from CSV, in file order.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(AppError::Dataset(format!(
                "enriched dataset is missing the `{column}` column"
            )));
        }
    }

    let mut records = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        records.push(row?.into());
    }
    Ok(records)
}

/// Parse an ISO-8601 timestamp into timezone-naive wall-clock time.
///
/// Offsets are dropped without converting (`10:00+02:00` stays `10:00`).
/// A bare date is midnight. Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
