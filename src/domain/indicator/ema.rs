//! Exponential Moving Average.
//!
//! alpha = 2/(span+1), seeded with the first value, then
//! EMA[i] = x[i]*alpha + EMA[i-1]*(1-alpha). No bias adjustment, no warmup.

use crate::domain::error::StockLensError;
use crate::domain::indicator::{require_data, require_window};

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

pub fn exponential_moving_average(values: &[f64], span: usize) -> Result<Vec<f64>, StockLensError> {
    require_data(values, "EMA")?;
    require_window("span", span)?;

    let alpha = smoothing_factor(span);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = values[0];
    out.push(ema);

    for &x in &values[1..] {
        ema = x * alpha + ema * (1.0 - alpha);
        out.push(ema);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ema_seeded_with_first_value() {
        let ema = exponential_moving_average(&[10.0, 20.0, 30.0], 3).unwrap();
        assert_relative_eq!(ema[0], 10.0);
    }

    #[test]
    fn ema_recursive_calculation() {
        let ema = exponential_moving_average(&[10.0, 20.0, 30.0, 40.0], 3).unwrap();

        let k = 2.0 / 4.0;
        let e1 = 20.0 * k + 10.0 * (1.0 - k);
        let e2 = 30.0 * k + e1 * (1.0 - k);
        let e3 = 40.0 * k + e2 * (1.0 - k);

        assert_relative_eq!(ema[1], e1);
        assert_relative_eq!(ema[2], e2);
        assert_relative_eq!(ema[3], e3);
    }

    #[test]
    fn ema_span_1_tracks_input() {
        let input = [10.0, 20.0, 15.0];
        let ema = exponential_moving_average(&input, 1).unwrap();
        assert_eq!(ema, input.to_vec());
    }

    #[test]
    fn ema_equal_prices() {
        let ema = exponential_moving_average(&[100.0; 5], 3).unwrap();
        for v in ema {
            assert_relative_eq!(v, 100.0);
        }
    }

    #[test]
    fn ema_smoothing_factor() {
        assert_relative_eq!(smoothing_factor(10), 2.0 / 11.0);
        assert_relative_eq!(smoothing_factor(12), 2.0 / 13.0);
    }

    #[test]
    fn ema_empty_input() {
        assert!(exponential_moving_average(&[], 3).is_err());
    }

    #[test]
    fn ema_zero_span() {
        assert!(matches!(
            exponential_moving_average(&[1.0, 2.0], 0),
            Err(StockLensError::InvalidParameter { .. })
        ));
    }
}
