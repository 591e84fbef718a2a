//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9. Every EMA is seeded with
//! its first input, so all three lines are defined from the first bar.

use crate::domain::error::StockLensError;
use crate::domain::indicator::{exponential_moving_average, require_data, require_window};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdOutput {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Result<MacdOutput, StockLensError> {
    require_data(closes, "MACD")?;
    require_window("macd_fast", fast)?;
    require_window("macd_slow", slow)?;
    require_window("macd_signal", signal_period)?;

    let ema_fast = exponential_moving_average(closes, fast)?;
    let ema_slow = exponential_moving_average(closes, slow)?;

    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = exponential_moving_average(&macd_line, signal_period)?;
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    Ok(MacdOutput {
        macd_line,
        signal_line,
        histogram,
    })
}

pub fn macd_default(closes: &[f64]) -> Result<MacdOutput, StockLensError> {
    macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
