//! Batch job: add an `amount_usd` column to the raw transaction dataset.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use tracing::{info, warn};

use crate::config::{EnrichConfig, ENRICH_PROGRESS_EVERY};
use crate::error::{AppError, Result};
use crate::rates::RateLookup;

pub const AMOUNT_USD_COLUMN: &str = "amount_usd";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnrichSummary {
    pub rows: usize,
    pub converted: usize,
    pub unconverted: usize,
    pub currencies: usize,
}

/// Run the job against the configured input and output files.
///
/// Output goes to a temp file beside the target and replaces it only once
/// every row is written; a failed run leaves the previous file untouched.
pub async fn run<L: RateLookup>(cfg: &EnrichConfig, rates: &L) -> Result<EnrichSummary> {
    let input = File::open(&cfg.raw_dataset_path)?;
    let target = Path::new(&cfg.processed_dataset_path);
    let dir = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    info!(
        "Enriching {} -> {}",
        cfg.raw_dataset_path, cfg.processed_dataset_path
    );

    let summary = enrich_csv(BufReader::new(input), BufWriter::new(&mut staged), rates).await?;
    staged.persist(target).map_err(|e| e.error)?;
    Ok(summary)
}

/// Copy every row from `reader` to `writer`, filling `amount_usd`.
///
/// Rows keep their order and all of their original columns. An existing
/// `amount_usd` column is overwritten, otherwise one is appended. Rows whose
/// currency can't be converted (or whose amount doesn't parse) get an empty
/// `amount_usd`.
pub async fn enrich_csv<R: Read, W: Write, L: RateLookup>(
    reader: R,
    writer: W,
    rates: &L,
) -> Result<EnrichSummary> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut wtr = csv::Writer::from_writer(writer);

    let mut headers = rdr.headers()?.clone();
    let currency_idx = column_index(&headers, "currency")?;
    let amount_idx = column_index(&headers, "amount")?;
    let usd_idx = match headers.iter().position(|h| h == AMOUNT_USD_COLUMN) {
        Some(i) => i,
        None => {
            headers.push_field(AMOUNT_USD_COLUMN);
            headers.len() - 1
        }
    };
    wtr.write_record(&headers)?;

    let mut summary = EnrichSummary::default();
    let mut currencies = HashSet::new();

    for row in rdr.records() {
        let row = row?;
        let currency = row.get(currency_idx).unwrap_or("").trim();
        let amount = row.get(amount_idx).and_then(|a| a.trim().parse::<f64>().ok());
        currencies.insert(currency.to_ascii_uppercase());

        let amount_usd = match amount {
            Some(amount) => rates.get_rate(currency).await.map(|rate| amount * rate),
            None => {
                warn!("row {}: amount is not numeric", summary.rows + 1);
                None
            }
        };

        match amount_usd {
            Some(_) => summary.converted += 1,
            None => summary.unconverted += 1,
        }
        let usd_field = amount_usd.map(|v| v.to_string()).unwrap_or_default();

        let mut out = csv::StringRecord::with_capacity(row.as_slice().len(), headers.len());
        for (i, field) in row.iter().enumerate() {
            if i == usd_idx {
                out.push_field(&usd_field);
            } else {
                out.push_field(field);
            }
        }
        if usd_idx >= row.len() {
            out.push_field(&usd_field);
        }
        wtr.write_record(&out)?;

        summary.rows += 1;
        if summary.rows % ENRICH_PROGRESS_EVERY == 0 {
            info!(
                "Processed {} rows ({} converted, {} currencies seen)",
                summary.rows,
                summary.converted,
                currencies.len()
            );
        }
    }

    wtr.flush()?;
    summary.currencies = currencies.len();
    Ok(summary)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| AppError::Dataset(format!("raw dataset is missing the `{name}` column")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn rates() -> HashMap<String, f64> {
        HashMap::from([("EUR".to_string(), 1.1), ("USD".to_string(), 1.0)])
    }

    async fn enrich_str(input: &str) -> (String, EnrichSummary) {
        let mut out = Vec::new();
        let summary = enrich_csv(input.as_bytes(), &mut out, &rates()).await.unwrap();
        (String::from_utf8(out).unwrap(), summary)
    }

    #[tokio::test]
    async fn converts_known_currencies_and_blanks_failures() {
        let input = "\
transaction_id,timestamp,country,currency,merchant_category,amount
T1,2023-01-01T10:00:00,Germany,EUR,Grocery,10
T2,2023-01-02T10:00:00,Germany,XXX,Grocery,5
";
        let (out, summary) = enrich_str(input).await;
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(
            lines[0],
            "transaction_id,timestamp,country,currency,merchant_category,amount,amount_usd"
        );

        let first: Vec<_> = lines[1].split(',').collect();
        let usd: f64 = first[6].parse().unwrap();
        assert_eq!(usd, 10.0 * 1.1);
        assert!((usd - 11.0).abs() < 1e-9);

        assert_eq!(lines[2], "T2,2023-01-02T10:00:00,Germany,XXX,Grocery,5,");
        assert_eq!(
            summary,
            EnrichSummary { rows: 2, converted: 1, unconverted: 1, currencies: 2 }
        );
    }

    #[tokio::test]
    async fn preserves_row_order_and_count() {
        let mut input = String::from("currency,amount\n");
        for i in 0..50 {
            let cur = if i % 3 == 0 { "zzz" } else { "eur" };
            input.push_str(&format!("{cur},{i}\n"));
        }
        let (out, summary) = enrich_str(&input).await;
        let rows: Vec<_> = out.lines().skip(1).collect();
        assert_eq!(rows.len(), 50);
        assert_eq!(summary.rows, 50);
        for (i, row) in rows.iter().enumerate() {
            let fields: Vec<_> = row.split(',').collect();
            assert_eq!(fields[1], i.to_string());
            if i % 3 == 0 {
                assert_eq!(fields[2], "");
            } else {
                assert_eq!(fields[2].parse::<f64>().unwrap(), i as f64 * 1.1);
            }
        }
    }

    #[tokio::test]
    async fn overwrites_existing_amount_usd_column() {
        let input = "currency,amount_usd,amount\nUSD,999,3\nXXX,999,4\n";
        let (out, _) = enrich_str(input).await;
        assert_eq!(out, "currency,amount_usd,amount\nUSD,3,3\nXXX,,4\n");
    }

    #[tokio::test]
    async fn non_numeric_amount_is_unconverted() {
        let (out, summary) = enrich_str("currency,amount\nEUR,n/a\n").await;
        assert_eq!(out, "currency,amount,amount_usd\nEUR,n/a,\n");
        assert_eq!(summary.unconverted, 1);
    }

    #[tokio::test]
    async fn missing_columns_fail_before_any_row() {
        let mut out = Vec::new();
        let err = enrich_csv("country,amount\nUK,1\n".as_bytes(), &mut out, &rates())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("currency"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn run_reads_and_writes_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.csv");
        let processed = dir.path().join("processed.csv");
        std::fs::write(&raw, "currency,amount\nEUR,2\n").unwrap();

        let cfg = EnrichConfig {
            raw_dataset_path: raw.display().to_string(),
            processed_dataset_path: processed.display().to_string(),
            log_level: "info".to_string(),
            exchange_api_key: "unused".to_string(),
            exchange_api_url: "http://unused".to_string(),
        };
        let summary = run(&cfg, &rates()).await.unwrap();
        assert_eq!(summary.converted, 1);

        let written = std::fs::read_to_string(&processed).unwrap();
        assert_eq!(written, format!("currency,amount,amount_usd\nEUR,2,{}\n", 2.0 * 1.1));
    }

    #[tokio::test]
    async fn failed_run_keeps_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw.csv");
        let processed = dir.path().join("processed.csv");
        let previous = "currency,amount,amount_usd\nEUR,2,2.2\n";
        std::fs::write(&processed, previous).unwrap();

        let cfg = |raw: &std::path::Path| EnrichConfig {
            raw_dataset_path: raw.display().to_string(),
            processed_dataset_path: processed.display().to_string(),
            log_level: "info".to_string(),
            exchange_api_key: "unused".to_string(),
            exchange_api_url: "http://unused".to_string(),
        };

        // Missing currency column.
        std::fs::write(&raw, "country,amount\nUK,1\n").unwrap();
        assert!(run(&cfg(&raw), &rates()).await.is_err());
        assert_eq!(std::fs::read_to_string(&processed).unwrap(), previous);

        // Ragged row halfway through.
        std::fs::write(&raw, "currency,amount\nEUR,1\nEUR,2,extra\n").unwrap();
        assert!(run(&cfg(&raw), &rates()).await.is_err());
        assert_eq!(std::fs::read_to_string(&processed).unwrap(), previous);

        // Only the target file remains; staged files are cleaned up.
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 2);
    }
}
