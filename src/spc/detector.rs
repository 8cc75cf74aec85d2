//! Out-of-control point detection.
//!
//! Flags the subgroups whose statistic lies strictly outside its control
//! limits. Applied independently to the X-bar series and to the R or S
//! series.

use super::chart::ControlLimits;

/// Indices (0-based, ascending) of values strictly above UCL or below LCL.
///
/// # Examples
///
/// ```
/// use u_spc::ControlLimits;
/// use u_spc::spc::detect_out_of_control;
///
/// let limits = ControlLimits { ucl: 30.0, cl: 25.0, lcl: 20.0 };
/// let flagged = detect_out_of_control(&[25.0, 31.0, 30.0, 19.5], &limits);
/// assert_eq!(flagged, vec![1, 3]);
/// ```
pub fn detect_out_of_control(values: &[f64], limits: &ControlLimits) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| limits.is_beyond(v))
        .map(|(i, _)| i)
        .collect()
}

/// Same as [`detect_out_of_control`] over a series with undefined entries.
///
/// `None` entries (e.g. the standard deviation of a single-value subgroup)
/// are never flagged but keep their index position.
pub fn detect_out_of_control_opt(values: &[Option<f64>], limits: &ControlLimits) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|&(_, v)| v.is_some_and(|v| limits.is_beyond(v)))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ControlLimits {
        ControlLimits {
            ucl: 30.0,
            cl: 25.0,
            lcl: 20.0,
        }
    }

    #[test]
    fn test_flags_above_and_below() {
        let flagged = detect_out_of_control(&[31.0, 25.0, 19.0, 26.0], &limits());
        assert_eq!(flagged, vec![0, 2]);
    }

    #[test]
    fn test_boundary_is_in_control() {
        assert!(detect_out_of_control(&[30.0, 20.0, 25.0], &limits()).is_empty());
    }

    #[test]
    fn test_empty_series() {
        assert!(detect_out_of_control(&[], &limits()).is_empty());
    }

    #[test]
    fn test_zero_width_limits_flag_any_deviation() {
        let collapsed = ControlLimits {
            ucl: 10.0,
            cl: 10.0,
            lcl: 10.0,
        };
        assert_eq!(
            detect_out_of_control(&[10.0, 10.1, 10.0, 9.9], &collapsed),
            vec![1, 3]
        );
    }

    #[test]
    fn test_optional_series_skips_undefined() {
        let flagged = detect_out_of_control_opt(&[Some(31.0), None, Some(19.0), None], &limits());
        assert_eq!(flagged, vec![0, 2]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn indices_ascending_and_exact(
            values in proptest::collection::vec(0.0_f64..50.0, 0..=60)
        ) {
            let l = ControlLimits { ucl: 30.0, cl: 25.0, lcl: 20.0 };
            let flagged = detect_out_of_control(&values, &l);
            prop_assert!(flagged.windows(2).all(|w| w[0] < w[1]));
            for (i, &v) in values.iter().enumerate() {
                prop_assert_eq!(flagged.contains(&i), v > 30.0 || v < 20.0);
            }
        }
    }
}
