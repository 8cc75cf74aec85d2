//! Descriptive statistics over `f64` slices.
//!
//! Thin `Option`-returning wrappers around [`statrs`] so callers can use `?`
//! instead of checking for `NaN`. Every function returns `None` for inputs
//! that are too short or contain non-finite values, and for results that
//! overflow `f64`.

use statrs::statistics::Statistics;

/// Arithmetic mean. `None` if `data` is empty, contains non-finite values,
/// or the mean overflows.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    finite(Statistics::mean(data.iter()))
}

/// Sample standard deviation (n - 1 denominator).
///
/// `None` if `data` has fewer than 2 elements, contains non-finite values,
/// or the deviation itself exceeds the `f64` range. Values are rescaled by
/// their largest magnitude first so squaring never overflows.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 || !all_finite(data) {
        return None;
    }
    let scale = data.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
    if scale == 0.0 {
        return Some(0.0);
    }
    let scaled: Vec<f64> = data.iter().map(|x| x / scale).collect();
    finite(Statistics::std_dev(scaled.iter()) * scale)
}

/// Range (max - min). `None` if `data` is empty, contains non-finite values,
/// or the span overflows.
pub fn range(data: &[f64]) -> Option<f64> {
    if data.is_empty() || !all_finite(data) {
        return None;
    }
    let (lo, hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        });
    finite(hi - lo)
}

fn finite(x: f64) -> Option<f64> {
    Some(x).filter(|v| v.is_finite())
}

fn all_finite(data: &[f64]) -> bool {
    data.iter().all(|x| x.is_finite())
}
