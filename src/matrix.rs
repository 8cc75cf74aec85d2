//! Subgroup measurement matrix.
//!
//! A [`SubgroupMatrix`] is the validated input to every analysis in this
//! crate: rows are subgroups (one sampling occasion each), columns are the
//! individual measurements taken within a subgroup. Cells may be missing,
//! represented explicitly as `None` rather than coerced to zero.
//!
//! # Invariants
//!
//! - Every row has the same width `m >= 1`.
//! - Every present value is finite.
//! - At least one subgroup remains, and every retained subgroup has at
//!   least one present value (all-missing rows are dropped on construction).
//! - Every subgroup's mean, range and standard deviation are finite.

use log::debug;
use serde::Serialize;

use crate::error::{Result, SpcError};
use crate::stats;

/// Validated, immutable matrix of subgroup measurements.
///
/// # Examples
///
/// ```
/// use u_spc::SubgroupMatrix;
///
/// let matrix = SubgroupMatrix::new(vec![
///     vec![Some(10.2), Some(10.1), Some(10.3)],
///     vec![Some(10.3), None, Some(10.4)],
///     vec![None, None, None], // dropped
/// ])
/// .unwrap();
///
/// assert_eq!(matrix.width(), 3);
/// assert_eq!(matrix.num_subgroups(), 2);
/// assert_eq!(matrix.dropped(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgroupMatrix {
    width: usize,
    rows: Vec<Vec<Option<f64>>>,
    dropped: usize,
    #[serde(skip)]
    stats: Vec<SubgroupStats>,
}

/// Statistics of a single subgroup, computed over its present values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubgroupStats {
    /// Number of present (non-missing) values.
    pub present: usize,
    /// Subgroup mean.
    pub mean: f64,
    /// Subgroup range (max - min). Zero for a single present value.
    pub range: f64,
    /// Sample standard deviation; `None` with fewer than 2 present values.
    pub std_dev: Option<f64>,
}

impl SubgroupStats {
    /// Statistics over the present values of a row. `None` if the row has no
    /// present value or a statistic overflows.
    fn of(row: &[Option<f64>]) -> Option<Self> {
        let values: Vec<f64> = row.iter().flatten().copied().collect();
        let std_dev = if values.len() >= 2 {
            Some(stats::std_dev(&values)?)
        } else {
            None
        };
        Some(Self {
            present: values.len(),
            mean: stats::mean(&values)?,
            range: stats::range(&values)?,
            std_dev,
        })
    }
}

impl SubgroupMatrix {
    /// Builds a matrix from rows of optional measurements.
    ///
    /// # Errors
    ///
    /// Returns [`SpcError::InvalidInput`] if:
    /// - there are no rows, or the first row has zero columns
    /// - rows differ in width
    /// - any present value is NaN or infinite
    /// - every row is entirely missing
    /// - a subgroup's statistics overflow `f64` (values near `f64::MAX`)
    pub fn new(rows: Vec<Vec<Option<f64>>>) -> Result<Self> {
        let width = match rows.first() {
            Some(first) => first.len(),
            None => return Err(SpcError::invalid("matrix has no subgroups")),
        };
        if width == 0 {
            return Err(SpcError::invalid("subgroups have zero measurements"));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(SpcError::invalid(format!(
                    "ragged matrix: subgroup {} has {} measurements, expected {width}",
                    i + 1,
                    row.len()
                )));
            }
            if row.iter().flatten().any(|x| !x.is_finite()) {
                return Err(SpcError::invalid(format!(
                    "subgroup {} contains a non-finite measurement",
                    i + 1
                )));
            }
        }

        let total = rows.len();
        let rows: Vec<Vec<Option<f64>>> = rows
            .into_iter()
            .filter(|row| row.iter().any(Option::is_some))
            .collect();
        let dropped = total - rows.len();
        if dropped > 0 {
            debug!("dropped {dropped} all-missing subgroup(s) out of {total}");
        }
        if rows.is_empty() {
            return Err(SpcError::invalid("every subgroup is entirely missing"));
        }

        let subgroup_stats = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                SubgroupStats::of(row).ok_or_else(|| {
                    SpcError::invalid(format!(
                        "statistics of retained subgroup {} overflow f64",
                        i + 1
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            width,
            rows,
            dropped,
            stats: subgroup_stats,
        })
    }

    /// Builds a matrix from plain `f64` rows where `NaN` marks a missing cell.
    ///
    /// Infinite values are still rejected.
    ///
    /// ```
    /// use u_spc::SubgroupMatrix;
    ///
    /// let matrix = SubgroupMatrix::from_nan_rows(vec![
    ///     vec![1.0, f64::NAN],
    ///     vec![2.0, 3.0],
    /// ])
    /// .unwrap();
    /// assert_eq!(matrix.subgroups()[0], vec![Some(1.0), None]);
    /// ```
    pub fn from_nan_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|x| if x.is_nan() { None } else { Some(x) })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    /// Subgroup size `m` (number of columns), used for coefficient lookup.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of retained subgroups (always at least 1).
    pub fn num_subgroups(&self) -> usize {
        self.rows.len()
    }

    /// Number of all-missing subgroups removed during construction.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// The retained subgroups, in input order.
    pub fn subgroups(&self) -> &[Vec<Option<f64>>] {
        &self.rows
    }

    /// Per-subgroup mean, range, and standard deviation, in subgroup order.
    pub fn subgroup_stats(&self) -> &[SubgroupStats] {
        &self.stats
    }

    /// All present measurements pooled across subgroups, in row-major order.
    pub fn pooled_values(&self) -> Vec<f64> {
        self.rows.iter().flatten().flatten().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(rows: &[&[f64]]) -> Vec<Vec<Option<f64>>> {
        rows.iter()
            .map(|r| r.iter().map(|&x| Some(x)).collect())
            .collect()
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            SubgroupMatrix::new(vec![]),
            Err(SpcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_width() {
        assert!(SubgroupMatrix::new(vec![vec![], vec![]]).is_err());
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let rows = vec![vec![Some(1.0), Some(2.0)], vec![Some(1.0)]];
        let err = SubgroupMatrix::new(rows).unwrap_err();
        assert!(err.to_string().contains("ragged"));
    }

    #[test]
    fn test_rejects_infinite_values() {
        let rows = vec![vec![Some(1.0), Some(f64::INFINITY)]];
        assert!(SubgroupMatrix::new(rows).is_err());
        assert!(SubgroupMatrix::from_nan_rows(vec![vec![1.0, f64::NEG_INFINITY]]).is_err());
    }

    #[test]
    fn test_rejects_all_missing() {
        let rows = vec![vec![None, None], vec![None, None]];
        assert!(matches!(
            SubgroupMatrix::new(rows),
            Err(SpcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_drops_all_missing_rows() {
        let rows = vec![
            vec![Some(1.0), Some(2.0)],
            vec![None, None],
            vec![Some(3.0), Some(4.0)],
        ];
        let m = SubgroupMatrix::new(rows).unwrap();
        assert_eq!(m.num_subgroups(), 2);
        assert_eq!(m.dropped(), 1);
        assert_eq!(m.width(), 2);
    }

    #[test]
    fn test_stats_ignore_missing_cells() {
        let rows = vec![vec![Some(10.0), None, Some(14.0)]];
        let m = SubgroupMatrix::new(rows).unwrap();
        let s = m.subgroup_stats()[0];
        assert_eq!(s.present, 2);
        assert!((s.mean - 12.0).abs() < 1e-12);
        assert!((s.range - 4.0).abs() < 1e-12);
        assert!((s.std_dev.unwrap() - 8.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_single_present_value_has_no_std_dev() {
        let rows = vec![vec![None, Some(5.0), None]];
        let m = SubgroupMatrix::new(rows).unwrap();
        let s = m.subgroup_stats()[0];
        assert_eq!(s.present, 1);
        assert!((s.mean - 5.0).abs() < f64::EPSILON);
        assert!(s.range.abs() < f64::EPSILON);
        assert!(s.std_dev.is_none());
    }

    #[test]
    fn test_pooled_values_skip_missing() {
        let rows = vec![vec![Some(1.0), None], vec![Some(2.0), Some(3.0)]];
        let m = SubgroupMatrix::new(rows).unwrap();
        assert_eq!(m.pooled_values(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_nan_rows_map_to_missing() {
        let m = SubgroupMatrix::from_nan_rows(vec![vec![f64::NAN, f64::NAN], vec![1.0, 2.0]])
            .unwrap();
        assert_eq!(m.num_subgroups(), 1);
        assert_eq!(m.dropped(), 1);
    }

    #[test]
    fn test_scenario_subgroup_stats() {
        let m = SubgroupMatrix::new(full(&[
            &[10.2, 10.1, 10.3],
            &[10.3, 10.2, 10.4],
            &[10.1, 10.0, 10.2],
        ]))
        .unwrap();
        let s = m.subgroup_stats();
        let means: Vec<f64> = s.iter().map(|x| x.mean).collect();
        let ranges: Vec<f64> = s.iter().map(|x| x.range).collect();
        for (got, want) in means.iter().zip([10.2, 10.3, 10.1]) {
            assert!((got - want).abs() < 1e-9, "mean {got} != {want}");
        }
        for r in ranges {
            assert!((r - 0.2).abs() < 1e-9, "range {r}");
        }
    }

    #[test]
    fn test_rejects_overflowing_subgroup() {
        // Finite cells whose mean and range overflow.
        let err = SubgroupMatrix::from_nan_rows(vec![vec![1.7e308, -1.7e308]]).unwrap_err();
        assert!(matches!(err, SpcError::InvalidInput { .. }));
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_large_but_representable_values_are_accepted() {
        let m = SubgroupMatrix::from_nan_rows(vec![vec![1.7e308, 0.7e308]; 2]).unwrap();
        for s in m.subgroup_stats() {
            assert!(s.mean.is_finite() && s.range.is_finite());
            assert!(s.std_dev.is_some_and(f64::is_finite));
        }
    }
}
