//! RSI (Relative Strength Index).
//!
//! delta[0] = 0, delta[i] = C[i] - C[i-1]. Gains and losses are averaged with a
//! rolling mean over `window` that accepts partial windows, so every point is
//! defined. RSI = 100 - 100 / (1 + avg_gain / avg_loss).
//!
//! avg_loss == 0: RSI = 100 when there were gains, 50 when the window is flat.

use crate::domain::error::StockLensError;
use crate::domain::indicator::{require_data, require_window};

pub const DEFAULT_RSI_WINDOW: usize = 14;

/// Neutral value for a window with neither gains nor losses.
pub const FLAT_RSI: f64 = 50.0;

pub fn relative_strength_index(closes: &[f64], window: usize) -> Result<Vec<f64>, StockLensError> {
    require_data(closes, "RSI")?;
    require_window("rsi_window", window)?;

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    gains.push(0.0);
    losses.push(0.0);
    for w in closes.windows(2) {
        let change = w[1] - w[0];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let values = (0..closes.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let n = (i + 1 - start) as f64;
            let avg_gain = gains[start..=i].iter().sum::<f64>() / n;
            let avg_loss = losses[start..=i].iter().sum::<f64>() / n;
            rsi_from_averages(avg_gain, avg_loss)
        })
        .collect();

    Ok(values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { FLAT_RSI } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
