use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statement row holding the free-cash-flow series used for DCF input.
pub const FREE_CASH_FLOW: &str = "Free Cash Flow";

/// Balance-sheet row holding the shares-outstanding figure used for market cap.
pub const ORDINARY_SHARES_NUMBER: &str = "Ordinary Shares Number";

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A fetched financial statement: monetary values keyed by line item and
/// fiscal period.
///
/// Periods are chronological ascending and every row carries one slot per
/// period (`None` where the provider reported nothing). Immutable once
/// fetched: the pipeline only reads from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialStatement {
    pub symbol: String,
    periods: Vec<NaiveDate>,
    rows: BTreeMap<String, Vec<Option<f64>>>,
}

impl FinancialStatement {
    pub fn new(symbol: impl Into<String>, periods: Vec<NaiveDate>) -> Self {
        Self {
            symbol: symbol.into(),
            periods,
            rows: BTreeMap::new(),
        }
    }

    /// Insert a row, padding or truncating to the period count.
    pub fn insert_row(&mut self, line_item: impl Into<String>, mut values: Vec<Option<f64>>) {
        values.resize(self.periods.len(), None);
        self.rows.insert(line_item.into(), values);
    }

    pub fn periods(&self) -> &[NaiveDate] {
        &self.periods
    }

    pub fn row(&self, line_item: &str) -> Option<&[Option<f64>]> {
        self.rows.get(line_item).map(|v| v.as_slice())
    }

    pub fn line_items(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.rows.is_empty()
    }

    /// The "Free Cash Flow" row in chronological ascending order, with
    /// unreported periods dropped.
    pub fn free_cash_flows(&self) -> Vec<f64> {
        self.row(FREE_CASH_FLOW)
            .map(|row| row.iter().filter_map(|v| *v).collect())
            .unwrap_or_default()
    }

    /// Most recent reported value of a row (reverse-chronological first entry).
    pub fn latest(&self, line_item: &str) -> Option<f64> {
        self.row(line_item)
            .and_then(|row| row.iter().rev().find_map(|v| *v))
    }
}

/// Company metadata from the market-data feed. The listing country drives
/// discount-rate selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: Option<String>,
    pub country: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

/// News article as delivered by the news feed (most-recent-first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub source: Option<String>,
}

/// Sort order accepted by the news feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsSort {
    PublishedAt,
    Relevancy,
    Popularity,
}

impl NewsSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsSort::PublishedAt => "publishedAt",
            NewsSort::Relevancy => "relevancy",
            NewsSort::Popularity => "popularity",
        }
    }
}

/// Discrete trading recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Buy => "Buy",
            Recommendation::Sell => "Sell",
            Recommendation::Hold => "Hold",
        }
    }
}

/// Outcome of comparing DCF intrinsic value against market capitalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationResult {
    pub dcf_value: f64,
    pub market_value: f64,
    pub percent_difference: f64,
    pub recommendation: Recommendation,
    /// Absolute deviation backing the recommendation; 0 for Hold.
    pub magnitude: f64,
}

/// Aggregated news-sentiment signal.
///
/// Carries no magnitude, unlike [`ValuationResult`] — the asymmetry is
/// observable behavior and kept on purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentResult {
    pub aggregate_score: f64,
    pub recommendation: Recommendation,
}

/// Indicator series aligned 1:1 with the input bars. Leading points where a
/// window is not yet filled are `None`, never zero-filled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub sma_20: Vec<Option<f64>>,
    pub sma_50: Vec<Option<f64>>,
    pub rsi_14: Vec<Option<f64>>,
}

/// Fetched statements bundled for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementBundle {
    pub income_statement: FinancialStatement,
    pub balance_sheet: FinancialStatement,
    pub cash_flow_statement: FinancialStatement,
}

/// Everything one analysis run produces, handed to the presentation boundary.
/// Recomputed fresh on every invocation — nothing here is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockReport {
    pub symbol: String,
    pub generated_at: DateTime<Utc>,
    pub latest_close: f64,
    pub profile: CompanyProfile,
    pub discount_rate: f64,
    pub valuation: ValuationResult,
    pub sentiment: SentimentResult,
    pub articles: Vec<NewsArticle>,
    pub bars: Vec<Bar>,
    pub indicators: IndicatorSeries,
    pub statements: StatementBundle,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement() -> FinancialStatement {
        let periods = vec![
            NaiveDate::from_ymd_opt(2020, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2021, 12, 31).unwrap(),
            NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
        ];
        let mut st = FinancialStatement::new("MSFT", periods);
        st.insert_row(FREE_CASH_FLOW, vec![Some(100.0), None, Some(120.0)]);
        st.insert_row(ORDINARY_SHARES_NUMBER, vec![Some(7.5e9), Some(7.4e9), None]);
        st
    }

    #[test]
    fn free_cash_flows_skip_missing_periods() {
        let st = statement();
        assert_eq!(st.free_cash_flows(), vec![100.0, 120.0]);
    }

    #[test]
    fn latest_takes_most_recent_reported_value() {
        let st = statement();
        // 2022 slot is None, so the 2021 figure is the latest reported one
        assert_eq!(st.latest(ORDINARY_SHARES_NUMBER), Some(7.4e9));
    }

    #[test]
    fn insert_row_pads_short_rows() {
        let mut st = statement();
        st.insert_row("Total Revenue", vec![Some(1.0)]);
        assert_eq!(st.row("Total Revenue").unwrap().len(), 3);
    }

    #[test]
    fn missing_row_yields_empty_series() {
        let st = statement();
        assert!(st.row("Net Income").is_none());
        assert_eq!(st.latest("Net Income"), None);
    }
}
