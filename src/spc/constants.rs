//! Control chart factor table.
//!
//! All factors (A2, A3, D3, D4, B3, B4, d2, c4) are the standard tabulated
//! values from ASTM E2587 / Montgomery Appendix VI, for subgroup sizes
//! 2 through 12, 15, 20 and 25.
//!
//! # References
//!
//! - ASTM E2587 — Standard Practice for Use of Control Charts
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*,
//!   8th ed., Appendix Table VI.

use log::debug;
use serde::Serialize;

/// Control chart factors for a single subgroup size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlConstants {
    /// X-bar limits from R-bar: CL +/- A2 * R-bar.
    pub a2: f64,
    /// X-bar limits from S-bar: CL +/- A3 * S-bar.
    pub a3: f64,
    /// R chart LCL factor: D3 * R-bar.
    pub d3: f64,
    /// R chart UCL factor: D4 * R-bar.
    pub d4: f64,
    /// S chart LCL factor: B3 * S-bar.
    pub b3: f64,
    /// S chart UCL factor: B4 * S-bar.
    pub b4: f64,
    /// Mean of the relative range distribution; sigma-hat = R-bar / d2.
    pub d2: f64,
    /// Bias correction for S; sigma-hat = S-bar / c4.
    pub c4: f64,
}

#[allow(clippy::too_many_arguments)]
const fn row(
    a2: f64,
    d3: f64,
    d4: f64,
    d2: f64,
    a3: f64,
    b3: f64,
    b4: f64,
    c4: f64,
) -> ControlConstants {
    ControlConstants {
        a2,
        a3,
        d3,
        d4,
        b3,
        b4,
        d2,
        c4,
    }
}

/// Tabulated sizes, ascending. Column order: A2, D3, D4, d2, A3, B3, B4, c4.
static TABLE: [(usize, ControlConstants); 14] = [
    (2, row(1.880, 0.0, 3.267, 1.128, 2.659, 0.0, 3.267, 0.7979)),
    (3, row(1.023, 0.0, 2.574, 1.693, 1.954, 0.0, 2.568, 0.8862)),
    (4, row(0.729, 0.0, 2.282, 2.059, 1.628, 0.0, 2.266, 0.9213)),
    (5, row(0.577, 0.0, 2.114, 2.326, 1.427, 0.0, 2.089, 0.9400)),
    (6, row(0.483, 0.0, 2.004, 2.534, 1.287, 0.030, 1.970, 0.9515)),
    (7, row(0.419, 0.076, 1.924, 2.704, 1.182, 0.118, 1.882, 0.9594)),
    (8, row(0.373, 0.136, 1.864, 2.847, 1.099, 0.185, 1.815, 0.9650)),
    (9, row(0.337, 0.184, 1.816, 2.970, 1.032, 0.239, 1.761, 0.9693)),
    (10, row(0.308, 0.223, 1.777, 3.078, 0.975, 0.284, 1.716, 0.9727)),
    (11, row(0.285, 0.256, 1.744, 3.173, 0.927, 0.321, 1.679, 0.9754)),
    (12, row(0.266, 0.283, 1.717, 3.258, 0.886, 0.354, 1.646, 0.9776)),
    (15, row(0.223, 0.348, 1.652, 3.472, 0.789, 0.428, 1.572, 0.9823)),
    (20, row(0.180, 0.414, 1.586, 3.735, 0.680, 0.510, 1.490, 0.9869)),
    (25, row(0.153, 0.459, 1.541, 3.931, 0.606, 0.565, 1.435, 0.9896)),
];

/// Subgroup sizes present in the factor table, ascending.
pub fn tabulated_sizes() -> impl Iterator<Item = usize> {
    TABLE.iter().map(|&(n, _)| n)
}

/// Looks up the factors for a subgroup size.
///
/// Sizes not in the table resolve to the tabulated size with the smallest
/// absolute distance; equidistant candidates resolve to the smaller size.
/// Sizes below 2 resolve to 2 and sizes above 25 resolve to 25. The lookup
/// never fails.
///
/// Returns `(resolved_size, factors)`.
///
/// # Examples
///
/// ```
/// use u_spc::spc::control_constants;
///
/// let (n, c) = control_constants(3);
/// assert_eq!(n, 3);
/// assert!((c.a2 - 1.023).abs() < 1e-12);
///
/// // 13 is not tabulated; 12 is the nearest key
/// let (n, _) = control_constants(13);
/// assert_eq!(n, 12);
/// ```
pub fn control_constants(size: usize) -> (usize, &'static ControlConstants) {
    let key = nearest_key(tabulated_sizes(), size).unwrap_or(TABLE[0].0);
    if key != size {
        debug!("subgroup size {size} not tabulated; using factors for n={key}");
    }
    let constants = TABLE
        .iter()
        .find(|(n, _)| *n == key)
        .map_or(&TABLE[0].1, |(_, c)| c);
    (key, constants)
}

/// Key with minimum absolute distance to `size`, smaller key on ties.
fn nearest_key(keys: impl Iterator<Item = usize>, size: usize) -> Option<usize> {
    keys.min_by_key(|&n| (n.abs_diff(size), n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        let (n, c) = control_constants(5);
        assert_eq!(n, 5);
        assert!((c.a2 - 0.577).abs() < 1e-12);
        assert!((c.d4 - 2.114).abs() < 1e-12);
        assert!((c.d2 - 2.326).abs() < 1e-12);
        assert!((c.c4 - 0.9400).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_fallback() {
        assert_eq!(control_constants(13).0, 12);
        assert_eq!(control_constants(14).0, 15);
        assert_eq!(control_constants(16).0, 15);
        assert_eq!(control_constants(19).0, 20);
        assert_eq!(control_constants(24).0, 25);
        assert_eq!(control_constants(100).0, 25);
    }

    #[test]
    fn test_ties_resolve_to_smaller_key() {
        assert_eq!(nearest_key([10, 14].into_iter(), 12), Some(10));
        assert_eq!(nearest_key([14, 10].into_iter(), 12), Some(10));
        assert_eq!(nearest_key([10, 14].into_iter(), 13), Some(14));
        assert_eq!(nearest_key(std::iter::empty(), 5), None);
    }

    #[test]
    fn test_gaps_in_table() {
        assert_eq!(control_constants(22).0, 20);
        assert_eq!(control_constants(23).0, 25);
    }

    #[test]
    fn test_small_sizes_resolve_to_two() {
        assert_eq!(control_constants(0).0, 2);
        assert_eq!(control_constants(1).0, 2);
    }

    #[test]
    fn test_table_is_sorted_and_positive() {
        let sizes: Vec<usize> = tabulated_sizes().collect();
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
        for (_, c) in TABLE.iter() {
            assert!(c.a2 > 0.0 && c.a3 > 0.0 && c.d4 > 0.0 && c.b4 > 0.0);
            assert!(c.d2 > 0.0 && c.c4 > 0.0);
            assert!(c.d3 >= 0.0 && c.b3 >= 0.0);
            assert!(c.d3 < 1.0 && c.d4 > 1.0);
            assert!(c.b3 < 1.0 && c.b4 > 1.0);
        }
    }
}
