//! Yahoo Finance market-data gateway.
//!
//! Three public endpoints cover everything the pipeline needs: the chart API
//! for daily bars and the latest close, the fundamentals-timeseries API for
//! statement line items, and quoteSummary for the company profile.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use valuation_core::{
    Bar, CompanyProfile, FinancialStatement, MarketDataGateway, ValuationError,
};

const BASE_URL: &str = "https://query1.finance.yahoo.com";

// Yahoo rejects requests without a browser-like user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

const INCOME_TYPES: &[&str] = &[
    "annualTotalRevenue",
    "annualGrossProfit",
    "annualOperatingIncome",
    "annualNetIncome",
    "annualBasicEPS",
];

const BALANCE_TYPES: &[&str] = &[
    "annualTotalAssets",
    "annualTotalLiabilitiesNetMinorityInterest",
    "annualStockholdersEquity",
    "annualOrdinarySharesNumber",
];

const CASH_FLOW_TYPES: &[&str] = &[
    "annualOperatingCashFlow",
    "annualCapitalExpenditure",
    "annualFreeCashFlow",
];

// Annual statements; five fiscal years is plenty for the NPV input.
const STATEMENT_LOOKBACK_YEARS: i32 = 5;

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
}

impl YahooFinanceClient {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client }
    }

    async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ValuationError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ValuationError::DataUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ValuationError::DataUnavailable(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ValuationError::DataUnavailable(e.to_string()))
    }

    async fn chart(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ChartResult, ValuationError> {
        let url = format!("{}/v8/finance/chart/{}", BASE_URL, symbol);
        let period1 = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();
        let period2 = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default();

        let value = self
            .get_json(
                &url,
                &[
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                    ("interval", "1d".to_string()),
                    ("events", "history".to_string()),
                ],
            )
            .await?;

        let response: ChartResponse = serde_json::from_value(value)
            .map_err(|e| ValuationError::DataUnavailable(e.to_string()))?;

        response
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.swap_remove(0))
                }
            })
            .ok_or_else(|| {
                ValuationError::DataUnavailable(format!("no chart data for {}", symbol))
            })
    }

    async fn fundamentals(
        &self,
        symbol: &str,
        types: &[&str],
    ) -> Result<FinancialStatement, ValuationError> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            BASE_URL, symbol
        );

        let now = Utc::now();
        let period2 = now.timestamp();
        let period1 = now
            .with_year(now.year() - STATEMENT_LOOKBACK_YEARS)
            .map(|dt| dt.timestamp())
            .unwrap_or(0);

        let value = self
            .get_json(
                &url,
                &[
                    ("symbol", symbol.to_string()),
                    ("type", types.join(",")),
                    ("period1", period1.to_string()),
                    ("period2", period2.to_string()),
                ],
            )
            .await?;

        let response: TimeseriesResponse = serde_json::from_value(value)
            .map_err(|e| ValuationError::DataUnavailable(e.to_string()))?;

        let results = response.timeseries.result.ok_or_else(|| {
            ValuationError::DataUnavailable(format!("no fundamentals for {}", symbol))
        })?;

        let statement = statement_from_results(symbol, &results);
        if statement.is_empty() {
            return Err(ValuationError::DataUnavailable(format!(
                "fundamentals response for {} carried no line items",
                symbol
            )));
        }

        Ok(statement)
    }
}

#[async_trait]
impl MarketDataGateway for YahooFinanceClient {
    async fn income_statement(&self, symbol: &str) -> Result<FinancialStatement, ValuationError> {
        self.fundamentals(symbol, INCOME_TYPES).await
    }

    async fn balance_sheet(&self, symbol: &str) -> Result<FinancialStatement, ValuationError> {
        self.fundamentals(symbol, BALANCE_TYPES).await
    }

    async fn cash_flow_statement(
        &self,
        symbol: &str,
    ) -> Result<FinancialStatement, ValuationError> {
        self.fundamentals(symbol, CASH_FLOW_TYPES).await
    }

    async fn profile(&self, symbol: &str) -> Result<CompanyProfile, ValuationError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", BASE_URL, symbol);
        let value = self
            .get_json(&url, &[("modules", "assetProfile,quoteType".to_string())])
            .await?;

        let result = value
            .pointer("/quoteSummary/result/0")
            .ok_or_else(|| {
                ValuationError::DataUnavailable(format!("no profile data for {}", symbol))
            })?;

        let text = |path: &str| {
            result
                .pointer(path)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Ok(CompanyProfile {
            symbol: symbol.to_string(),
            name: text("/quoteType/longName").or_else(|| text("/quoteType/shortName")),
            country: text("/assetProfile/country"),
            sector: text("/assetProfile/sector"),
            industry: text("/assetProfile/industry"),
        })
    }

    async fn latest_close(&self, symbol: &str) -> Result<f64, ValuationError> {
        let end = Utc::now().date_naive();
        let start = end - chrono::Duration::days(7);
        let chart = self.chart(symbol, start, end).await?;

        // Prefer the quote from chart meta, fall back to the last bar close
        let from_meta = chart.meta.regular_market_price;
        let from_bars = bars_from_chart(&chart).last().map(|bar| bar.close);

        from_meta.or(from_bars).ok_or_else(|| {
            ValuationError::DataUnavailable(format!("no close price for {}", symbol))
        })
    }

    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>, ValuationError> {
        let chart = self.chart(symbol, start, end).await?;
        let bars = bars_from_chart(&chart);

        if bars.is_empty() {
            return Err(ValuationError::DataUnavailable(format!(
                "empty price history for {}",
                symbol
            )));
        }

        tracing::debug!(symbol, bars = bars.len(), "fetched price history");
        Ok(bars)
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesEnvelope,
}

#[derive(Debug, Deserialize)]
struct TimeseriesEnvelope {
    result: Option<Vec<Value>>,
}

/// Turn chart arrays into bars, dropping slots with no close (halted days).
fn bars_from_chart(chart: &ChartResult) -> Vec<Bar> {
    let timestamps = match &chart.timestamp {
        Some(ts) => ts,
        None => return Vec::new(),
    };
    let quote = match chart.indicators.quote.first() {
        Some(q) => q,
        None => return Vec::new(),
    };

    let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = at(&quote.close, i)?;
            let timestamp = DateTime::<Utc>::from_timestamp(ts, 0)?;
            Some(Bar {
                timestamp,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume: at(&quote.volume, i).unwrap_or(0.0),
            })
        })
        .collect()
}

/// Build a statement table out of fundamentals-timeseries result objects.
///
/// Each result element describes one line item: `meta.type[0]` names it and a
/// same-named key holds `{asOfDate, reportedValue}` entries (null where the
/// filing had no figure).
fn statement_from_results(symbol: &str, results: &[Value]) -> FinancialStatement {
    let mut by_item: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();

    for result in results {
        let Some(ts_type) = result
            .pointer("/meta/type/0")
            .and_then(Value::as_str)
        else {
            continue;
        };
        let Some(entries) = result.get(ts_type).and_then(Value::as_array) else {
            continue;
        };

        let row = by_item.entry(display_name(ts_type)).or_default();
        for entry in entries {
            let Some(date) = entry
                .get("asOfDate")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            else {
                continue;
            };
            let Some(raw) = entry.pointer("/reportedValue/raw").and_then(Value::as_f64) else {
                continue;
            };
            row.insert(date, raw);
        }
    }

    let mut periods: Vec<NaiveDate> = by_item
        .values()
        .flat_map(|row| row.keys().copied())
        .collect();
    periods.sort_unstable();
    periods.dedup();

    let mut statement = FinancialStatement::new(symbol, periods.clone());
    for (line_item, row) in by_item {
        let values = periods.iter().map(|p| row.get(p).copied()).collect();
        statement.insert_row(line_item, values);
    }
    statement
}

/// Map a timeseries type like `annualFreeCashFlow` to its display line item,
/// "Free Cash Flow". Uppercase runs stay together so `annualBasicEPS`
/// becomes "Basic EPS".
fn display_name(ts_type: &str) -> String {
    let stripped = ts_type
        .strip_prefix("annual")
        .or_else(|| ts_type.strip_prefix("quarterly"))
        .or_else(|| ts_type.strip_prefix("trailing"))
        .unwrap_or(ts_type);

    let chars: Vec<char> = stripped.chars().collect();
    let mut name = String::with_capacity(stripped.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev_lower = chars[i - 1].is_lowercase();
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev_lower || (chars[i - 1].is_uppercase() && next_lower) {
                name.push(' ');
            }
        }
        name.push(c);
    }

    name
}
