pub mod indicators;


pub use indicators::*;

use valuation_core::{Bar, IndicatorSeries};

pub const SMA_SHORT_PERIOD: usize = 20;
pub const SMA_LONG_PERIOD: usize = 50;
pub const RSI_PERIOD: usize = 14;

/// Computes the display indicators over a daily price series.
///
/// The output feeds chart rendering only; nothing here influences a
/// recommendation.
pub struct TechnicalIndicatorEngine;

impl TechnicalIndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorSeries {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        IndicatorSeries {
            sma_20: sma(&closes, SMA_SHORT_PERIOD),
            sma_50: sma(&closes, SMA_LONG_PERIOD),
            rsi_14: rsi(&closes, RSI_PERIOD),
        }
    }
}

impl Default for TechnicalIndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}
