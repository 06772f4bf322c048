/// Simple Moving Average, aligned with the input.
///
/// The result has one slot per input point; the first `period - 1` slots are
/// `None` rather than zero-filled.
pub fn sma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; data.len()];
    }

    let mut result = vec![None; data.len()];
    for i in (period - 1)..data.len() {
        let window = &data[i + 1 - period..=i];
        let sum: f64 = window.iter().sum();
        result[i] = Some(sum / period as f64);
    }
    result
}

/// Relative Strength Index over a simple rolling mean of gains and losses.
///
/// For each point with `period` trailing deltas available,
/// `RS = avg_gain / avg_loss` and `RSI = 100 - 100 / (1 + RS)`. Slots where
/// the window is not yet filled, or where `avg_loss` is zero (the RS division
/// is undefined), stay `None`.
pub fn rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period + 1 {
        return result;
    }

    let mut gains = vec![0.0; data.len()];
    let mut losses = vec![0.0; data.len()];
    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = change.abs();
        }
    }

    for i in period..data.len() {
        let window = i + 1 - period..=i;
        let avg_gain: f64 = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss: f64 = losses[window].iter().sum::<f64>() / period as f64;

        if avg_loss == 0.0 {
            continue;
        }

        let rs = avg_gain / avg_loss;
        result[i] = Some(100.0 - 100.0 / (1.0 + rs));
    }

    result
}
