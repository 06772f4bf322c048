//! Analysis Routes
//!
//! Single endpoint exposing the full per-ticker report: DCF-vs-market
//! valuation, the independent news-sentiment signal, raw articles and the
//! indicator series for charting.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use analysis_pipeline::AnalysisOptions;
use valuation_core::StockReport;

use crate::{ApiResponse, AppError, AppState};

const MIN_HISTORY_DAYS: i64 = 60;
const MAX_HISTORY_DAYS: i64 = 3650;
const MAX_NEWS_DAYS: i64 = 30;

#[derive(Deserialize)]
pub struct AnalysisQuery {
    /// Price-history window in days (defaults to ~3 years)
    #[serde(default)]
    pub history_days: Option<i64>,
    /// News look-back in days (defaults to 15)
    #[serde(default)]
    pub news_days: Option<i64>,
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new().route("/api/analysis/:symbol", get(get_analysis))
}

async fn get_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<ApiResponse<StockReport>>, AppError> {
    let symbol = validate_symbol(&symbol)?;

    let mut options = AnalysisOptions::default();
    if let Some(days) = query.history_days {
        options.history_days = days.clamp(MIN_HISTORY_DAYS, MAX_HISTORY_DAYS);
    }
    if let Some(days) = query.news_days {
        options.news_days = days.clamp(1, MAX_NEWS_DAYS);
    }

    let report = state.pipeline.analyze(&symbol, &options).await?;
    Ok(Json(ApiResponse::success(report)))
}

/// Tickers are 1-10 characters: letters, digits, dot or dash (class shares
/// like BRK.B). Uppercased before hitting the gateways.
fn validate_symbol(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    let valid = !trimmed.is_empty()
        && trimmed.len() <= 10
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

    if !valid {
        return Err(AppError::BadRequest(format!(
            "invalid ticker symbol: {raw:?}"
        )));
    }

    Ok(trimmed.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_tickers() {
        assert_eq!(validate_symbol("msft").unwrap(), "MSFT");
        assert_eq!(validate_symbol("BRK.B").unwrap(), "BRK.B");
        assert_eq!(validate_symbol(" aapl ").unwrap(), "AAPL");
    }

    #[test]
    fn rejects_garbage() {
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("   ").is_err());
        assert!(validate_symbol("way-too-long-ticker").is_err());
        assert!(validate_symbol("MS FT").is_err());
        assert!(validate_symbol("MSFT;DROP").is_err());
    }
}
