pub mod loader;
pub mod range;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::TransactionRecord;

pub use loader::parse_timestamp;
pub use range::DateRange;

/// The enriched dataset, loaded once at startup and never mutated.
#[derive(Debug, Default)]
pub struct Dataset {
    records: Vec<TransactionRecord>,
}

impl Dataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(Self::from_records(loader::read_records(reader)?))
    }

    pub fn from_records(records: Vec<TransactionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Earliest and latest calendar dates among records with a timestamp.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.records
            .iter()
            .filter_map(TransactionRecord::date)
            .fold(None, |acc, d| match acc {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            })
    }

    /// Records inside `range`, in dataset order.
    pub fn filter(&self, range: &DateRange) -> Vec<&TransactionRecord> {
        if range.is_inverted() {
            return Vec::new();
        }
        self.records.iter().filter(|r| range.contains(r)).collect()
    }
}

#[cfg(test)]
pub(crate) mod testkit {
    use chrono::NaiveDateTime;

    use crate::types::TransactionRecord;

    pub fn record(
        timestamp: &str,
        country: &str,
        currency: &str,
        category: &str,
        amount_usd: Option<f64>,
    ) -> TransactionRecord {
        TransactionRecord {
            timestamp: NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").ok(),
            country: country.to_string(),
            currency: currency.to_string(),
            merchant_category: category.to_string(),
            amount: amount_usd,
            amount_usd,
        }
    }
}
