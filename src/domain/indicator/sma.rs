//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]).
//! Warmup: the first (n-1) values are NaN.

use crate::domain::error::StockLensError;
use crate::domain::indicator::{require_data, require_window};

pub const DEFAULT_SMA_WINDOW: usize = 20;

pub fn simple_moving_average(closes: &[f64], window: usize) -> Result<Vec<f64>, StockLensError> {
    require_data(closes, "SMA")?;
    require_window("sma_window", window)?;

    let values = (0..closes.len())
        .map(|i| {
            if i + 1 < window {
                f64::NAN
            } else {
                let start = i + 1 - window;
                closes[start..=i].iter().sum::<f64>() / window as f64
            }
        })
        .collect();

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CLOSES: [f64; 10] = [10.0, 11.0, 12.0, 11.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0];

    #[test]
    fn sma_known_values() {
        let sma = simple_moving_average(&CLOSES, 3).unwrap();

        assert_eq!(sma.len(), CLOSES.len());
        assert_relative_eq!(sma[2], 11.0);
        assert_relative_eq!(sma[3], 34.0 / 3.0);
        assert_relative_eq!(sma[9], 14.0);
    }

    #[test]
    fn sma_warmup_is_nan() {
        let sma = simple_moving_average(&CLOSES, 3).unwrap();
        assert!(sma[0].is_nan());
        assert!(sma[1].is_nan());
        assert!(!sma[2].is_nan());
    }

    #[test]
    fn sma_window_1_is_identity() {
        let sma = simple_moving_average(&CLOSES, 1).unwrap();
        assert_eq!(sma, CLOSES.to_vec());
    }

    #[test]
    fn sma_window_longer_than_series_is_all_nan() {
        let sma = simple_moving_average(&[1.0, 2.0], 5).unwrap();
        assert!(sma.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn sma_constant_series() {
        let sma = simple_moving_average(&[7.5; 6], 4).unwrap();
        for v in &sma[3..] {
            assert_relative_eq!(*v, 7.5);
        }
    }

    #[test]
    fn sma_empty_input() {
        let result = simple_moving_average(&[], 3);
        assert!(matches!(
            result,
            Err(StockLensError::InsufficientData { .. })
        ));
    }

    #[test]
    fn sma_zero_window() {
        let result = simple_moving_average(&CLOSES, 0);
        assert!(matches!(
            result,
            Err(StockLensError::InvalidParameter { .. })
        ));
    }
}
