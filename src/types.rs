use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// One row of the enriched dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// Timezone-naive wall-clock time; `None` when the source value did not parse.
    pub timestamp: Option<NaiveDateTime>,
    pub country: String,
    pub currency: String,
    pub merchant_category: String,
    pub amount: Option<f64>,
    /// `None` when the currency could not be converted.
    pub amount_usd: Option<f64>,
}

impl TransactionRecord {
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }
}

// ---------------------------------------------------------------------------
// Chart catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    TransactionsPerCountry,
    CountrySpending,
    CategoryPopularity,
    AvgTransaction,
    CurrencyDistribution,
    CategoryHeatmap,
    TopCurrencies,
}

impl ChartKind {
    /// Display order used by the viewer.
    pub const ALL: [ChartKind; 7] = [
        ChartKind::TransactionsPerCountry,
        ChartKind::CountrySpending,
        ChartKind::CategoryPopularity,
        ChartKind::AvgTransaction,
        ChartKind::CurrencyDistribution,
        ChartKind::TopCurrencies,
        ChartKind::CategoryHeatmap,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            ChartKind::TransactionsPerCountry => "transactions_per_country",
            ChartKind::CountrySpending => "country_spending",
            ChartKind::CategoryPopularity => "category_popularity",
            ChartKind::AvgTransaction => "avg_transaction",
            ChartKind::CurrencyDistribution => "currency_distribution",
            ChartKind::CategoryHeatmap => "category_heatmap",
            ChartKind::TopCurrencies => "top_currencies",
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.endpoint())
    }

    pub fn heading(&self) -> &'static str {
        match self {
            ChartKind::TransactionsPerCountry => "Transactions per Country",
            ChartKind::CountrySpending => "Total Spending per Country",
            ChartKind::CategoryPopularity => "Top 5 Merchant Categories by Country",
            ChartKind::AvgTransaction => "Average Transaction Amount by Country",
            ChartKind::CurrencyDistribution => "Transaction Count by Currency",
            ChartKind::CategoryHeatmap => "Transaction Counts by Country and Merchant Category",
            ChartKind::TopCurrencies => "Top Currencies by Transaction Count",
        }
    }

    /// Chart title drawn into the image, suffixed with the requested range.
    pub fn title(&self, start: NaiveDate, end: NaiveDate) -> String {
        let base = match self {
            ChartKind::TransactionsPerCountry => "Number of Transactions per Country",
            ChartKind::CountrySpending => "Total Spending per Country in USD",
            ChartKind::CategoryPopularity => "Top 5 Merchant Categories by Country",
            ChartKind::AvgTransaction => "Average Transaction Amount by Country",
            ChartKind::CurrencyDistribution => "Transaction Count by Currency",
            ChartKind::CategoryHeatmap => "Transaction Counts by Country and Merchant Category",
            ChartKind::TopCurrencies => "Top Currencies by Transaction Count",
        };
        format!("{base} ({start} to {end})")
    }

    pub fn caption(&self) -> &'static str {
        match self {
            ChartKind::TransactionsPerCountry => {
                "This map shows the distribution of transactions across different countries."
            }
            ChartKind::CountrySpending => {
                "This bar chart displays the total spending in USD for each country."
            }
            ChartKind::CategoryPopularity => {
                "This stacked bar chart shows the top 5 merchant categories by total amount spent in USD for each country."
            }
            ChartKind::AvgTransaction => {
                "This scatter plot illustrates the average transaction amount in USD for each country."
            }
            ChartKind::CurrencyDistribution => {
                "This pie chart shows the distribution of transactions across different currencies."
            }
            ChartKind::CategoryHeatmap => {
                "This heatmap visualizes the transaction counts for each combination of country and merchant category."
            }
            ChartKind::TopCurrencies => {
                "This bar chart displays the most frequently used currencies in transactions."
            }
        }
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.endpoint())
    }
}

// ---------------------------------------------------------------------------
// API payloads (shared by the service and the viewer)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatesRangeResponse {
    pub min_date: String,
    pub max_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    /// Base64-encoded PNG.
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub amount: f64,
    pub from_currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResponse {
    pub amount_usd: f64,
    pub rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for kind in ChartKind::ALL {
            assert!(seen.insert(kind.endpoint()), "duplicate endpoint {kind}");
            assert!(kind.path().starts_with('/'));
        }
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn title_carries_range() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        assert_eq!(
            ChartKind::CountrySpending.title(start, end),
            "Total Spending per Country in USD (2023-01-01 to 2023-06-15)"
        );
    }
}
