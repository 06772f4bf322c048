use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    Bar, CompanyProfile, FinancialStatement, NewsArticle, NewsSort, ValuationError,
};

/// Trait for market-data feeds (statements, profile, prices)
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    async fn income_statement(&self, symbol: &str) -> Result<FinancialStatement, ValuationError>;

    async fn balance_sheet(&self, symbol: &str) -> Result<FinancialStatement, ValuationError>;

    async fn cash_flow_statement(&self, symbol: &str)
        -> Result<FinancialStatement, ValuationError>;

    async fn profile(&self, symbol: &str) -> Result<CompanyProfile, ValuationError>;

    async fn latest_close(&self, symbol: &str) -> Result<f64, ValuationError>;

    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ValuationError>;
}

/// Trait for news feeds. Articles come back most-recent-first; the aggregator
/// relies on that delivered order and does not re-sort.
#[async_trait]
pub trait NewsGateway: Send + Sync {
    async fn search(
        &self,
        query: &str,
        from: NaiveDate,
        language: &str,
        sort: NewsSort,
    ) -> Result<Vec<NewsArticle>, ValuationError>;
}

/// Trait for sentiment scorers mapping article text to polarity in [-1, 1]
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> f64;
}
