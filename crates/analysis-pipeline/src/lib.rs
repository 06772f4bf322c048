//! Per-request analysis pipeline.
//!
//! One run fetches everything for a ticker, values it two independent ways
//! (DCF vs. market, news sentiment) and assembles a [`StockReport`]. Steps
//! execute sequentially in a fixed order and any failure aborts the whole
//! run — there is no partial report and nothing is cached between runs.

use std::sync::Arc;

use chrono::{Duration, Utc};

use dcf_valuation::{
    DcfValuationEngine, DiscountRateResolver, MarketValuationEngine, ValuationComparator,
};
use news_sentiment::NewsSentimentAggregator;
use technical_indicators::TechnicalIndicatorEngine;
use valuation_core::{
    MarketDataGateway, NewsGateway, NewsSort, SentimentScorer, StatementBundle, StockReport,
    ValuationError, ORDINARY_SHARES_NUMBER,
};

/// Per-request knobs. Neither window changes the per-ticker computation
/// contract, only how much context gets fetched.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Price-history window feeding the display indicators.
    pub history_days: i64,
    /// News look-back window.
    pub news_days: i64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            history_days: 3 * 365,
            news_days: 15,
        }
    }
}

pub struct AnalysisPipeline {
    market_data: Arc<dyn MarketDataGateway>,
    news: Arc<dyn NewsGateway>,
    scorer: Arc<dyn SentimentScorer>,
    discount_rates: DiscountRateResolver,
    dcf_engine: DcfValuationEngine,
    market_engine: MarketValuationEngine,
    comparator: ValuationComparator,
    aggregator: NewsSentimentAggregator,
    indicator_engine: TechnicalIndicatorEngine,
}

impl AnalysisPipeline {
    pub fn new(
        market_data: Arc<dyn MarketDataGateway>,
        news: Arc<dyn NewsGateway>,
        scorer: Arc<dyn SentimentScorer>,
    ) -> Self {
        Self {
            market_data,
            news,
            scorer,
            discount_rates: DiscountRateResolver::new(),
            dcf_engine: DcfValuationEngine::new(),
            market_engine: MarketValuationEngine::new(),
            comparator: ValuationComparator::new(),
            aggregator: NewsSentimentAggregator::new(),
            indicator_engine: TechnicalIndicatorEngine::new(),
        }
    }

    /// Run the full valuation-and-sentiment pass for one ticker.
    pub async fn analyze(
        &self,
        symbol: &str,
        options: &AnalysisOptions,
    ) -> Result<StockReport, ValuationError> {
        tracing::info!(symbol, "starting analysis run");

        let income_statement = self.market_data.income_statement(symbol).await?;
        let balance_sheet = self.market_data.balance_sheet(symbol).await?;
        let cash_flow_statement = self.market_data.cash_flow_statement(symbol).await?;

        let profile = self.market_data.profile(symbol).await?;
        // Unrecognized or absent country is the default-rate case, not an error
        let country = profile.country.clone().unwrap_or_default();
        let discount_rate = self.discount_rates.resolve(&country);
        tracing::info!(symbol, country = %country, discount_rate, "resolved discount rate");

        let free_cash_flows = cash_flow_statement.free_cash_flows();
        let dcf_value = self
            .dcf_engine
            .net_present_value(discount_rate, &free_cash_flows)?;

        let latest_close = self.market_data.latest_close(symbol).await?;
        let shares_outstanding = balance_sheet.latest(ORDINARY_SHARES_NUMBER);
        let market_value = self
            .market_engine
            .market_cap(Some(latest_close), shares_outstanding)?;

        let valuation = self.comparator.compare(dcf_value, market_value)?;
        tracing::info!(
            symbol,
            dcf_value,
            market_value,
            recommendation = valuation.recommendation.as_str(),
            "valuation complete"
        );

        let end = Utc::now().date_naive();
        let start = end - Duration::days(options.history_days);
        let bars = self.market_data.history(symbol, start, end).await?;
        let indicators = self.indicator_engine.compute(&bars);

        let news_from = end - Duration::days(options.news_days);
        let articles = self
            .news
            .search(symbol, news_from, "en", NewsSort::PublishedAt)
            .await?;
        let sentiment = self.aggregator.aggregate(&articles, self.scorer.as_ref());
        tracing::info!(
            symbol,
            articles = articles.len(),
            sentiment = sentiment.recommendation.as_str(),
            "sentiment complete"
        );

        Ok(StockReport {
            symbol: symbol.to_string(),
            generated_at: Utc::now(),
            latest_close,
            profile,
            discount_rate,
            valuation,
            sentiment,
            articles,
            bars,
            indicators,
            statements: StatementBundle {
                income_statement,
                balance_sheet,
                cash_flow_statement,
            },
        })
    }
}
