//! Control limit calculation for X-bar-R and X-bar-S charts.
//!
//! # Algorithm
//!
//! 1. For each subgroup, compute the mean (X-bar), the range (R) and the
//!    sample standard deviation (S) over its present values.
//! 2. Compute the grand mean (X-double-bar) as the average of subgroup means.
//! 3. Resolve the factor set for the subgroup size (nearest-size fallback).
//! 4. X-bar-R: CL_R = R-bar, X-bar limits = CL +/- A2 * R-bar,
//!    R limits = [D3 * R-bar, D4 * R-bar].
//! 5. X-bar-S: CL_S = S-bar, X-bar limits = CL +/- A3 * S-bar,
//!    S limits = [B3 * S-bar, B4 * S-bar].
//!
//! A single subgroup or zero dispersion yields zero-width limits; that is
//! not an error here, capability analysis guards the division instead.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 6: Control Charts for Variables.
//! - ASTM E2587 — Standard Practice for Use of Control Charts

use log::debug;

use super::chart::{ChartFamily, ControlLimitSet, ControlLimits};
use super::constants::control_constants;
use crate::error::{Result, SpcError};
use crate::matrix::SubgroupMatrix;
use crate::stats;

/// Computes X-bar and dispersion chart limits for a subgroup matrix.
///
/// # Errors
///
/// Returns [`SpcError::InvalidInput`] for [`ChartFamily::MeanStdDev`] when no
/// subgroup has at least two present values, since S is then undefined for
/// every subgroup, and for either family when a limit overflows `f64`.
///
/// # Examples
///
/// ```
/// use u_spc::{ChartFamily, SubgroupMatrix};
/// use u_spc::spc::compute_control_limits;
///
/// let matrix = SubgroupMatrix::from_nan_rows(vec![
///     vec![10.2, 10.1, 10.3],
///     vec![10.3, 10.2, 10.4],
///     vec![10.1, 10.0, 10.2],
/// ])
/// .unwrap();
///
/// let limits = compute_control_limits(&matrix, ChartFamily::MeanRange).unwrap();
/// assert!((limits.location.cl - 10.2).abs() < 1e-9);
/// assert!((limits.location.ucl - 10.4046).abs() < 1e-9);
/// assert!((limits.location.lcl - 9.9954).abs() < 1e-9);
/// ```
pub fn compute_control_limits(
    matrix: &SubgroupMatrix,
    family: ChartFamily,
) -> Result<ControlLimitSet> {
    let subgroup_stats = matrix.subgroup_stats();
    let means: Vec<f64> = subgroup_stats.iter().map(|s| s.mean).collect();
    let grand_mean = stats::mean(&means)
        .ok_or_else(|| SpcError::invalid("subgroup means are undefined"))?;

    let subgroup_size = matrix.width();
    let (constants_size, k) = control_constants(subgroup_size);

    let (dispersions, location, dispersion) = match family {
        ChartFamily::MeanRange => {
            let ranges: Vec<f64> = subgroup_stats.iter().map(|s| s.range).collect();
            let r_bar = stats::mean(&ranges)
                .ok_or_else(|| SpcError::invalid("subgroup ranges are undefined"))?;
            (
                ranges.into_iter().map(Some).collect(),
                ControlLimits {
                    ucl: grand_mean + k.a2 * r_bar,
                    cl: grand_mean,
                    lcl: grand_mean - k.a2 * r_bar,
                },
                ControlLimits {
                    ucl: k.d4 * r_bar,
                    cl: r_bar,
                    lcl: k.d3 * r_bar,
                },
            )
        }
        ChartFamily::MeanStdDev => {
            let sds: Vec<Option<f64>> = subgroup_stats.iter().map(|s| s.std_dev).collect();
            let defined: Vec<f64> = sds.iter().flatten().copied().collect();
            let skipped = sds.len() - defined.len();
            if skipped > 0 {
                debug!("{skipped} subgroup(s) have fewer than 2 values; excluded from S-bar");
            }
            let s_bar = stats::mean(&defined).ok_or_else(|| {
                SpcError::invalid(
                    "standard deviation is undefined for every subgroup (need >= 2 values)",
                )
            })?;
            (
                sds,
                ControlLimits {
                    ucl: grand_mean + k.a3 * s_bar,
                    cl: grand_mean,
                    lcl: grand_mean - k.a3 * s_bar,
                },
                ControlLimits {
                    ucl: k.b4 * s_bar,
                    cl: s_bar,
                    lcl: k.b3 * s_bar,
                },
            )
        }
    };

    for (chart, limits) in [("X-bar", &location), (family.dispersion_symbol(), &dispersion)] {
        if !limits.is_finite() {
            return Err(SpcError::invalid(format!(
                "{chart} control limits overflow f64"
            )));
        }
    }

    Ok(ControlLimitSet {
        family,
        subgroup_size,
        constants_size,
        location,
        dispersion,
        means,
        dispersions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> SubgroupMatrix {
        SubgroupMatrix::from_nan_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_xbar_r_basic_limits() {
        let m = matrix(&[
            &[72.0, 84.0, 79.0, 49.0],
            &[56.0, 87.0, 33.0, 42.0],
            &[55.0, 73.0, 22.0, 60.0],
            &[44.0, 80.0, 54.0, 74.0],
            &[97.0, 26.0, 48.0, 58.0],
        ]);
        let limits = compute_control_limits(&m, ChartFamily::MeanRange).unwrap();

        // Subgroup means: 71.0, 54.5, 52.5, 63.0, 57.25
        let expected_grand_mean = (71.0 + 54.5 + 52.5 + 63.0 + 57.25) / 5.0;
        assert!(
            (limits.location.cl - expected_grand_mean).abs() < 1e-9,
            "CL={}, expected {expected_grand_mean}",
            limits.location.cl
        );
        assert!(limits.location.ucl > limits.location.cl);
        assert!(limits.location.cl > limits.location.lcl);
        assert_eq!(limits.constants_size, 4);
    }

    #[test]
    fn test_scenario_three_subgroups() {
        let m = matrix(&[
            &[10.2, 10.1, 10.3],
            &[10.3, 10.2, 10.4],
            &[10.1, 10.0, 10.2],
        ]);
        let limits = compute_control_limits(&m, ChartFamily::MeanRange).unwrap();
        assert!((limits.location.cl - 10.2).abs() < 1e-9);
        assert!((limits.dispersion.cl - 0.2).abs() < 1e-9);
        assert!((limits.location.ucl - 10.4046).abs() < 1e-9);
        assert!((limits.location.lcl - 9.9954).abs() < 1e-9);
        // R chart: D3 = 0, D4 = 2.574
        assert!(limits.dispersion.lcl.abs() < 1e-12);
        assert!((limits.dispersion.ucl - 2.574 * 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_xbar_r_chart_factors_n5() {
        // For n=5: A2=0.577. Subgroup with mean=50, range=10.
        let m = matrix(&[&[45.0, 47.0, 50.0, 53.0, 55.0]]);
        let limits = compute_control_limits(&m, ChartFamily::MeanRange).unwrap();
        assert!((limits.location.cl - 50.0).abs() < 1e-9);
        assert!((limits.dispersion.cl - 10.0).abs() < 1e-9);
        assert!((limits.location.ucl - 55.77).abs() < 1e-9);
        assert!((limits.location.lcl - 44.23).abs() < 1e-9);
    }

    #[test]
    fn test_xbar_s_limits() {
        let m = matrix(&[
            &[72.0, 84.0, 79.0, 49.0],
            &[56.0, 87.0, 33.0, 42.0],
            &[55.0, 73.0, 22.0, 60.0],
            &[44.0, 80.0, 54.0, 74.0],
            &[97.0, 26.0, 48.0, 58.0],
        ]);
        let limits = compute_control_limits(&m, ChartFamily::MeanStdDev).unwrap();
        let sds: Vec<f64> = m
            .subgroup_stats()
            .iter()
            .map(|s| s.std_dev.unwrap())
            .collect();
        let s_bar = sds.iter().sum::<f64>() / sds.len() as f64;
        assert!((limits.dispersion.cl - s_bar).abs() < 1e-9);
        assert!((limits.location.ucl - (limits.location.cl + 1.628 * s_bar)).abs() < 1e-9);
        assert!((limits.dispersion.ucl - 2.266 * s_bar).abs() < 1e-9);
        assert!(limits.dispersion.lcl.abs() < 1e-12);
    }

    #[test]
    fn test_constant_subgroups_collapse_limits() {
        let m = matrix(&[&[10.0, 10.0, 10.0], &[10.0, 10.0, 10.0]]);
        let limits = compute_control_limits(&m, ChartFamily::MeanRange).unwrap();
        assert!((limits.location.cl - 10.0).abs() < f64::EPSILON);
        assert!((limits.location.ucl - 10.0).abs() < f64::EPSILON);
        assert!((limits.location.lcl - 10.0).abs() < f64::EPSILON);
        assert!(limits.dispersion.ucl.abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_value_subgroup_contributes() {
        let m = SubgroupMatrix::new(vec![
            vec![Some(1.0), Some(3.0), None],
            vec![Some(2.0), Some(2.0), Some(2.0)],
        ])
        .unwrap();
        let limits = compute_control_limits(&m, ChartFamily::MeanRange).unwrap();
        assert_eq!(limits.means, vec![2.0, 2.0]);
        assert_eq!(limits.dispersions, vec![Some(2.0), Some(0.0)]);
    }

    #[test]
    fn test_xbar_s_skips_single_value_subgroups() {
        let m = SubgroupMatrix::new(vec![
            vec![Some(1.0), Some(3.0)],
            vec![Some(5.0), None],
        ])
        .unwrap();
        let limits = compute_control_limits(&m, ChartFamily::MeanStdDev).unwrap();
        assert_eq!(limits.dispersions[1], None);
        assert!((limits.dispersion.cl - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_xbar_s_rejects_when_no_std_dev_defined() {
        let m = SubgroupMatrix::new(vec![vec![Some(1.0), None], vec![None, Some(2.0)]]).unwrap();
        assert!(matches!(
            compute_control_limits(&m, ChartFamily::MeanStdDev),
            Err(SpcError::InvalidInput { .. })
        ));
        // The range family is still fine: ranges are zero.
        assert!(compute_control_limits(&m, ChartFamily::MeanRange).is_ok());
    }

    #[test]
    fn test_untabulated_size_uses_nearest_factors() {
        let row: Vec<f64> = (0..13).map(|i| i as f64).collect();
        let m = matrix(&[&row, &row]);
        let limits = compute_control_limits(&m, ChartFamily::MeanRange).unwrap();
        assert_eq!(limits.subgroup_size, 13);
        assert_eq!(limits.constants_size, 12);
        // R-bar = 12, A2(12) = 0.266
        assert!((limits.location.ucl - (6.0 + 0.266 * 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_overflowing_limits_are_rejected() {
        // Every cell and subgroup statistic is finite; CL + A2 * R-bar is not.
        let m = matrix(&[&[1.7e308, 0.7e308], &[1.7e308, 0.7e308]]);
        for family in [ChartFamily::MeanRange, ChartFamily::MeanStdDev] {
            let err = compute_control_limits(&m, family).unwrap_err();
            assert!(
                matches!(err, SpcError::InvalidInput { .. }),
                "{family:?}: {err}"
            );
            assert!(err.to_string().contains("overflow"));
        }
    }

    #[test]
    fn test_large_finite_limits_are_kept() {
        let m = matrix(&[&[1e300, 2e300], &[1.5e300, 2.5e300]]);
        let limits = compute_control_limits(&m, ChartFamily::MeanRange).unwrap();
        assert!(limits.location.is_finite());
        assert!(limits.dispersion.is_finite());
    }

    #[test]
    fn test_recompute_is_bit_identical() {
        let m = matrix(&[&[1.1, 2.3, 0.7], &[3.3, 1.9, 2.2], &[0.4, 1.8, 2.9]]);
        for family in [ChartFamily::MeanRange, ChartFamily::MeanStdDev] {
            let a = compute_control_limits(&m, family).unwrap();
            let b = compute_control_limits(&m, family).unwrap();
            assert_eq!(a.location.ucl.to_bits(), b.location.ucl.to_bits());
            assert_eq!(a.location.lcl.to_bits(), b.location.lcl.to_bits());
            assert_eq!(a.dispersion.ucl.to_bits(), b.dispersion.ucl.to_bits());
            assert_eq!(a, b);
        }
    }
}
