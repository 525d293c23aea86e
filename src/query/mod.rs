//! Aggregations behind each chart: filter → group → measure → order.

pub mod pipeline;

use crate::config::TOP_CATEGORIES_PER_COUNTRY;
use crate::types::{ChartKind, TransactionRecord};

pub use pipeline::{group_by, sort_by_key, sort_desc, Grouped, Measure};

/// Aggregated values ready for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// One value per label, in display order.
    Series(Vec<(String, f64)>),
    Stacked(StackedBars),
    Matrix(CountMatrix),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub group: usize,
    pub category: usize,
    pub value: f64,
}

/// Per-country bars split into category segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StackedBars {
    pub groups: Vec<String>,
    /// Legend order: first appearance.
    pub categories: Vec<String>,
    /// Sorted by group, then value descending within the group.
    pub segments: Vec<Segment>,
}

impl StackedBars {
    fn category_index(&mut self, name: &str) -> usize {
        match self.categories.iter().position(|c| c == name) {
            Some(i) => i,
            None => {
                self.categories.push(name.to_string());
                self.categories.len() - 1
            }
        }
    }

    /// Height of each group's full stack.
    pub fn totals(&self) -> Vec<f64> {
        let mut totals = vec![0.0; self.groups.len()];
        for s in &self.segments {
            totals[s.group] += s.value;
        }
        totals
    }
}

/// Dense row × column count table; absent combinations are 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountMatrix {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub cells: Vec<Vec<f64>>,
}

impl CountMatrix {
    pub fn max(&self) -> f64 {
        self.cells
            .iter()
            .flatten()
            .copied()
            .fold(0.0, f64::max)
    }

    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.cols.iter().position(|c| c == col)?;
        Some(self.cells[i][j])
    }
}

/// Run the aggregation a chart needs over already-filtered records.
pub fn compute(kind: ChartKind, rows: &[&TransactionRecord]) -> ChartData {
    match kind {
        ChartKind::TransactionsPerCountry => {
            let mut v = series(rows, |r| r.country.as_str(), Measure::Count);
            sort_desc(&mut v);
            ChartData::Series(v)
        }
        ChartKind::CountrySpending => {
            let mut v = series(rows, |r| r.country.as_str(), Measure::Sum);
            sort_desc(&mut v);
            ChartData::Series(v)
        }
        ChartKind::CategoryPopularity => {
            ChartData::Stacked(top_categories(rows, TOP_CATEGORIES_PER_COUNTRY))
        }
        ChartKind::AvgTransaction => {
            let mut v = series(rows, |r| r.country.as_str(), Measure::Mean);
            sort_by_key(&mut v);
            ChartData::Series(v)
        }
        ChartKind::CurrencyDistribution => {
            let mut v = series(rows, |r| r.currency.as_str(), Measure::Count);
            sort_desc(&mut v);
            ChartData::Series(v)
        }
        ChartKind::CategoryHeatmap => ChartData::Matrix(pivot_counts(rows)),
        ChartKind::TopCurrencies => {
            ChartData::Series(series(rows, |r| r.currency.as_str(), Measure::Count))
        }
    }
}

fn series<'a>(
    rows: &[&'a TransactionRecord],
    key: impl Fn(&'a TransactionRecord) -> &'a str,
    measure: Measure,
) -> Vec<(String, f64)> {
    group_by(rows, key)
        .measure(measure)
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Sum by (country, category), keeping the `n` largest categories per country.
pub fn top_categories(rows: &[&TransactionRecord], n: usize) -> StackedBars {
    let mut sums = group_by(rows, |r| (r.country.as_str(), r.merchant_category.as_str()))
        .measure(Measure::Sum);
    sums.sort_by(|a, b| a.0 .0.cmp(&b.0 .0).then(b.1.total_cmp(&a.1)));

    let mut out = StackedBars::default();
    let mut current: Option<&str> = None;
    let mut taken = 0;
    for ((country, category), value) in sums {
        if current != Some(country) {
            current = Some(country);
            taken = 0;
            out.groups.push(country.to_string());
        }
        if taken == n {
            continue;
        }
        taken += 1;
        let category = out.category_index(category);
        out.segments.push(Segment {
            group: out.groups.len() - 1,
            category,
            value,
        });
    }
    out
}

/// Count by (country, category) pivoted into a country × category table.
pub fn pivot_counts(rows: &[&TransactionRecord]) -> CountMatrix {
    let counts = group_by(rows, |r| (r.country.as_str(), r.merchant_category.as_str()))
        .measure(Measure::Count);

    let mut row_keys: Vec<&str> = counts.iter().map(|((c, _), _)| *c).collect();
    row_keys.sort_unstable();
    row_keys.dedup();
    let mut col_keys: Vec<&str> = counts.iter().map(|((_, k), _)| *k).collect();
    col_keys.sort_unstable();
    col_keys.dedup();

    let mut cells = vec![vec![0.0; col_keys.len()]; row_keys.len()];
    for ((country, category), count) in &counts {
        if let (Ok(i), Ok(j)) = (row_keys.binary_search(country), col_keys.binary_search(category)) {
            cells[i][j] = *count;
        }
    }

    CountMatrix {
        rows: row_keys.into_iter().map(str::to_string).collect(),
        cols: col_keys.into_iter().map(str::to_string).collect(),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::testkit::record;

    fn series_of(data: ChartData) -> Vec<(String, f64)> {
        match data {
            ChartData::Series(v) => v,
            other => panic!("expected series, got {other:?}"),
        }
    }

    fn labels(v: &[(String, f64)]) -> Vec<&str> {
        v.iter().map(|(k, _)| k.as_str()).collect()
    }

    fn sample() -> Vec<TransactionRecord> {
        let t = "2023-01-01 12:00:00";
        vec![
            record(t, "Mexico", "MXN", "Travel", Some(50.0)),
            record(t, "Brazil", "BRL", "Retail", Some(30.0)),
            record(t, "Brazil", "BRL", "Travel", Some(40.0)),
            record(t, "Mexico", "XXX", "Retail", None),
            record(t, "Brazil", "EUR", "Retail", Some(5.0)),
            record(t, "Mexico", "MXN", "Dining", Some(1.0)),
        ]
    }

    #[test]
    fn spending_is_sorted_descending() {
        let records = sample();
        let rows: Vec<_> = records.iter().collect();
        let v = series_of(compute(ChartKind::CountrySpending, &rows));
        assert_eq!(v, vec![("Brazil".to_string(), 75.0), ("Mexico".to_string(), 51.0)]);
    }

    #[test]
    fn transactions_per_country_counts_every_row() {
        let records = sample();
        let rows: Vec<_> = records.iter().collect();
        let v = series_of(compute(ChartKind::TransactionsPerCountry, &rows));
        // Tie keeps first-seen order.
        assert_eq!(v, vec![("Mexico".to_string(), 3.0), ("Brazil".to_string(), 3.0)]);
    }

    #[test]
    fn avg_transaction_is_alphabetical() {
        let records = sample();
        let rows: Vec<_> = records.iter().collect();
        let v = series_of(compute(ChartKind::AvgTransaction, &rows));
        assert_eq!(labels(&v), ["Brazil", "Mexico"]);
        assert_eq!(v[0].1, 25.0);
        assert_eq!(v[1].1, 25.5);
    }

    #[test]
    fn currency_charts_differ_only_in_order() {
        let records = sample();
        let rows: Vec<_> = records.iter().collect();
        let dist = series_of(compute(ChartKind::CurrencyDistribution, &rows));
        assert_eq!(labels(&dist), ["MXN", "BRL", "XXX", "EUR"]);
        let top = series_of(compute(ChartKind::TopCurrencies, &rows));
        assert_eq!(labels(&top), ["MXN", "BRL", "XXX", "EUR"]);

        let reversed: Vec<_> = records.iter().rev().collect();
        let dist = series_of(compute(ChartKind::CurrencyDistribution, &reversed));
        assert_eq!(labels(&dist), ["MXN", "BRL", "EUR", "XXX"]);
        let top = series_of(compute(ChartKind::TopCurrencies, &reversed));
        assert_eq!(labels(&top), ["MXN", "EUR", "XXX", "BRL"]);
    }

    #[test]
    fn top_categories_keeps_n_per_country() {
        let records = sample();
        let rows: Vec<_> = records.iter().collect();
        let bars = top_categories(&rows, 2);
        assert_eq!(bars.groups, ["Brazil", "Mexico"]);
        // Brazil: Travel 40, Retail 35. Mexico: Travel 50, Dining 1 (Retail 0 cut).
        let picked: Vec<_> = bars
            .segments
            .iter()
            .map(|s| (bars.groups[s.group].as_str(), bars.categories[s.category].as_str(), s.value))
            .collect();
        assert_eq!(
            picked,
            vec![
                ("Brazil", "Travel", 40.0),
                ("Brazil", "Retail", 35.0),
                ("Mexico", "Travel", 50.0),
                ("Mexico", "Dining", 1.0),
            ]
        );
        assert_eq!(bars.categories, ["Travel", "Retail", "Dining"]);
        assert_eq!(bars.totals(), vec![75.0, 51.0]);
    }

    #[test]
    fn heatmap_fills_missing_cells_with_zero() {
        let records = sample();
        let rows: Vec<_> = records.iter().collect();
        let m = pivot_counts(&rows);
        assert_eq!(m.rows, ["Brazil", "Mexico"]);
        assert_eq!(m.cols, ["Dining", "Retail", "Travel"]);
        assert_eq!(m.get("Brazil", "Dining"), Some(0.0));
        assert_eq!(m.get("Brazil", "Retail"), Some(2.0));
        assert_eq!(m.get("Mexico", "Retail"), Some(1.0));
        assert_eq!(m.max(), 2.0);
    }

    #[test]
    fn unconverted_rows_count_but_do_not_sum() {
        let t = "2023-01-01 12:00:00";
        let records = vec![
            record(t, "Germany", "EUR", "Grocery", Some(11.0)),
            record(t, "Germany", "XXX", "Grocery", None),
        ];
        let rows: Vec<_> = records.iter().collect();
        let spending = series_of(compute(ChartKind::CountrySpending, &rows));
        assert_eq!(spending, vec![("Germany".to_string(), 11.0)]);
        let dist = series_of(compute(ChartKind::CurrencyDistribution, &rows));
        assert_eq!(dist, vec![("EUR".to_string(), 1.0), ("XXX".to_string(), 1.0)]);
    }

    #[test]
    fn empty_input_yields_empty_data() {
        for kind in ChartKind::ALL {
            match compute(kind, &[]) {
                ChartData::Series(v) => assert!(v.is_empty()),
                ChartData::Stacked(s) => assert!(s.groups.is_empty()),
                ChartData::Matrix(m) => assert!(m.rows.is_empty() && m.cols.is_empty()),
            }
        }
    }
}
