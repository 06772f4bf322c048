use valuation_core::{Recommendation, ValuationError, ValuationResult};

/// Discount rate applied to listings outside the country table
pub const DEFAULT_DISCOUNT_RATE: f64 = 0.03;

/// Country-specific risk-free rates, exact-match on the listing country as
/// reported by the market-data feed. US rate approximates the 10-year
/// Treasury yield.
const COUNTRY_RATES: &[(&str, f64)] = &[("United States", 0.025)];

/// Maps a listing country to a risk-free discount rate.
///
/// Total function: an empty or unrecognized country is not an error, it is
/// the default-rate case.
pub struct DiscountRateResolver;

impl DiscountRateResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, listing_country: &str) -> f64 {
        COUNTRY_RATES
            .iter()
            .find(|(country, _)| *country == listing_country)
            .map(|(_, rate)| *rate)
            .unwrap_or(DEFAULT_DISCOUNT_RATE)
    }
}

impl Default for DiscountRateResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Discounts a free-cash-flow series to net present value.
pub struct DcfValuationEngine;

impl DcfValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// `NPV = Σ_{t=0}^{n-1} CF_t / (1+r)^t`, with the first observation at
    /// period 0.
    ///
    /// Cash flows arrive chronological ascending, one per fiscal period.
    pub fn net_present_value(
        &self,
        rate: f64,
        cash_flows: &[f64],
    ) -> Result<f64, ValuationError> {
        if cash_flows.is_empty() {
            return Err(ValuationError::InsufficientData(
                "free cash flow series is empty".to_string(),
            ));
        }
        // r <= -1 makes the discount factor blow up; the resolver never
        // produces such a rate but the engine is usable on its own.
        if rate <= -1.0 {
            return Err(ValuationError::InvalidRate(rate));
        }

        let npv = cash_flows
            .iter()
            .enumerate()
            .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
            .sum();

        Ok(npv)
    }
}

impl Default for DcfValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes market capitalization from latest close and shares outstanding.
pub struct MarketValuationEngine;

impl MarketValuationEngine {
    pub fn new() -> Self {
        Self
    }

    /// `market_value = price × shares`. Both inputs must be present and
    /// strictly positive; the shares figure is the most recent reported
    /// "Ordinary Shares Number" from the balance sheet.
    pub fn market_cap(
        &self,
        latest_close: Option<f64>,
        shares_outstanding: Option<f64>,
    ) -> Result<f64, ValuationError> {
        let price = match latest_close {
            Some(p) if p > 0.0 => p,
            _ => {
                return Err(ValuationError::MissingField(
                    "latest close price".to_string(),
                ))
            }
        };
        let shares = match shares_outstanding {
            Some(s) if s > 0.0 => s,
            _ => {
                return Err(ValuationError::MissingField(
                    "ordinary shares number".to_string(),
                ))
            }
        };

        Ok(price * shares)
    }
}

impl Default for MarketValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Recommendation thresholds in percent deviation from DCF value.
/// Design constants: more than 10% above intrinsic value is a Sell, more
/// than 10% below is a Buy.
pub const SELL_THRESHOLD_PCT: f64 = 10.0;
pub const BUY_THRESHOLD_PCT: f64 = -10.0;

/// Compares DCF intrinsic value against observed market capitalization and
/// maps the deviation to a discrete recommendation.
pub struct ValuationComparator;

impl ValuationComparator {
    pub fn new() -> Self {
        Self
    }

    pub fn compare(&self, dcf_value: f64, market_value: f64) -> Result<ValuationResult, ValuationError> {
        if dcf_value == 0.0 {
            return Err(ValuationError::DivisionByZero(
                "DCF value is zero, cannot compute percent difference".to_string(),
            ));
        }

        let percent_difference = (market_value - dcf_value) / dcf_value * 100.0;

        let (recommendation, magnitude) = if percent_difference > SELL_THRESHOLD_PCT {
            (Recommendation::Sell, percent_difference)
        } else if percent_difference < BUY_THRESHOLD_PCT {
            (Recommendation::Buy, percent_difference.abs())
        } else {
            (Recommendation::Hold, 0.0)
        };

        tracing::debug!(
            dcf_value,
            market_value,
            percent_difference,
            recommendation = recommendation.as_str(),
            "valuation comparison"
        );

        Ok(ValuationResult {
            dcf_value,
            market_value,
            percent_difference,
            recommendation,
            magnitude,
        })
    }
}

impl Default for ValuationComparator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolver_knows_united_states() {
        let resolver = DiscountRateResolver::new();
        assert_eq!(resolver.resolve("United States"), 0.025);
    }

    #[test]
    fn resolver_falls_back_to_default() {
        let resolver = DiscountRateResolver::new();
        assert_eq!(resolver.resolve("Elsewhere"), DEFAULT_DISCOUNT_RATE);
        assert_eq!(resolver.resolve(""), DEFAULT_DISCOUNT_RATE);
        // Lookup is exact-match, not case-insensitive
        assert_eq!(resolver.resolve("united states"), DEFAULT_DISCOUNT_RATE);
    }

    #[test]
    fn npv_matches_closed_form() {
        let engine = DcfValuationEngine::new();
        let rate = 0.1;
        let flows = [100.0, 110.0, 121.0];
        let expected = 100.0 + 110.0 / 1.1 + 121.0 / 1.1_f64.powi(2);
        let npv = engine.net_present_value(rate, &flows).unwrap();
        assert!((npv - expected).abs() < 1e-9);
    }

    #[test]
    fn npv_first_flow_is_undiscounted() {
        let engine = DcfValuationEngine::new();
        let npv = engine.net_present_value(0.5, &[42.0]).unwrap();
        assert!((npv - 42.0).abs() < 1e-12);
    }

    #[test]
    fn npv_finite_across_rate_range() {
        let engine = DcfValuationEngine::new();
        for rate in [-0.99, -0.5, 0.0, 0.025, 0.3, 0.99] {
            let npv = engine.net_present_value(rate, &[50.0, -10.0, 80.0]).unwrap();
            assert!(npv.is_finite(), "NPV not finite at rate {rate}");
        }
    }

    #[test]
    fn npv_rejects_empty_series() {
        let engine = DcfValuationEngine::new();
        let err = engine.net_present_value(0.025, &[]).unwrap_err();
        assert!(matches!(err, ValuationError::InsufficientData(_)));
    }

    #[test]
    fn npv_rejects_out_of_domain_rate() {
        let engine = DcfValuationEngine::new();
        let err = engine.net_present_value(-1.0, &[1.0]).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidRate(_)));
        let err = engine.net_present_value(-2.0, &[1.0]).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidRate(_)));
    }

    #[test]
    fn market_cap_multiplies_price_and_shares() {
        let engine = MarketValuationEngine::new();
        let cap = engine.market_cap(Some(250.0), Some(7.5e9)).unwrap();
        assert!((cap - 1.875e12).abs() < 1.0);
    }

    #[test]
    fn market_cap_requires_shares() {
        let engine = MarketValuationEngine::new();
        let err = engine.market_cap(Some(250.0), None).unwrap_err();
        assert!(matches!(err, ValuationError::MissingField(_)));
    }

    #[test]
    fn market_cap_rejects_non_positive_inputs() {
        let engine = MarketValuationEngine::new();
        assert!(engine.market_cap(Some(0.0), Some(1.0e9)).is_err());
        assert!(engine.market_cap(None, Some(1.0e9)).is_err());
        assert!(engine.market_cap(Some(250.0), Some(-1.0)).is_err());
    }

    #[test]
    fn comparator_sell_above_threshold() {
        let result = ValuationComparator::new().compare(100.0, 115.0).unwrap();
        assert!((result.percent_difference - 15.0).abs() < 1e-9);
        assert_eq!(result.recommendation, Recommendation::Sell);
        assert!((result.magnitude - 15.0).abs() < 1e-9);
    }

    #[test]
    fn comparator_buy_below_threshold() {
        let result = ValuationComparator::new().compare(100.0, 85.0).unwrap();
        assert!((result.percent_difference + 15.0).abs() < 1e-9);
        assert_eq!(result.recommendation, Recommendation::Buy);
        assert!((result.magnitude - 15.0).abs() < 1e-9);
    }

    #[test]
    fn comparator_hold_inside_band() {
        let result = ValuationComparator::new().compare(100.0, 105.0).unwrap();
        assert!((result.percent_difference - 5.0).abs() < 1e-9);
        assert_eq!(result.recommendation, Recommendation::Hold);
        assert_eq!(result.magnitude, 0.0);
    }

    #[test]
    fn comparator_rejects_zero_dcf() {
        let err = ValuationComparator::new().compare(0.0, 100.0).unwrap_err();
        assert!(matches!(err, ValuationError::DivisionByZero(_)));
    }
}
