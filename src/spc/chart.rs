//! Core control chart types.
//!
//! Defines the building blocks shared by the limit calculator, the
//! out-of-control detector and the run-rule engine: the chart family
//! selector, control limit triples, and violation records.
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which dispersion statistic accompanies the X-bar chart.
///
/// Selects both the per-subgroup dispersion statistic and the factor set
/// that drives the limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartFamily {
    /// X-bar and Range chart (A2, D3, D4; sigma-hat = R-bar / d2).
    #[default]
    #[serde(alias = "XR")]
    MeanRange,
    /// X-bar and Standard Deviation chart (A3, B3, B4; sigma-hat = S-bar / c4).
    #[serde(alias = "XS")]
    MeanStdDev,
}

impl ChartFamily {
    /// Short name of the dispersion statistic: `"R"` or `"S"`.
    pub fn dispersion_symbol(self) -> &'static str {
        match self {
            Self::MeanRange => "R",
            Self::MeanStdDev => "S",
        }
    }
}

/// Control limits for a chart.
///
/// Represents the upper control limit (UCL), center line (CL), and lower
/// control limit (LCL) computed from the process data.
///
/// # Invariants
///
/// - `lcl <= cl <= ucl`
/// - All values are finite
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlLimits {
    /// Upper control limit.
    pub ucl: f64,
    /// Center line.
    pub cl: f64,
    /// Lower control limit.
    pub lcl: f64,
}

impl ControlLimits {
    /// Whether `value` lies strictly outside `[lcl, ucl]`.
    ///
    /// Values exactly on a limit are in control.
    pub fn is_beyond(&self, value: f64) -> bool {
        value > self.ucl || value < self.lcl
    }

    /// Whether all three limits and the band width `UCL - LCL` are finite.
    pub fn is_finite(&self) -> bool {
        self.ucl.is_finite()
            && self.cl.is_finite()
            && self.lcl.is_finite()
            && (self.ucl - self.lcl).is_finite()
    }

    /// One-sigma zone width, `(UCL - CL) / 3`.
    pub fn sigma(&self) -> f64 {
        (self.ucl - self.cl) / 3.0
    }
}

/// Control limits for both charts of an X-bar-R or X-bar-S pair, together
/// with the per-subgroup series they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlLimitSet {
    /// Chart family the limits were computed for.
    pub family: ChartFamily,
    /// Subgroup size `m` of the input matrix.
    pub subgroup_size: usize,
    /// Tabulated size whose factors were used (differs from `subgroup_size`
    /// when the nearest-size fallback applied).
    pub constants_size: usize,
    /// X-bar chart limits.
    pub location: ControlLimits,
    /// R or S chart limits, depending on `family`.
    pub dispersion: ControlLimits,
    /// Subgroup means, in subgroup order.
    pub means: Vec<f64>,
    /// Subgroup ranges or standard deviations. `None` where the standard
    /// deviation is undefined (fewer than 2 present values).
    pub dispersions: Vec<Option<f64>>,
}

/// Western Electric zone rules, numbered 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WesternElectricRule {
    /// One point beyond the 3-sigma control limits.
    BeyondLimits,
    /// 2 of 3 consecutive points beyond 2 sigma, same side.
    TwoOfThreeBeyond2Sigma,
    /// 4 of 5 consecutive points beyond 1 sigma, same side.
    FourOfFiveBeyond1Sigma,
    /// 8 consecutive points strictly on one side of the center line.
    EightOneSide,
    /// 6 consecutive points steadily increasing or decreasing.
    SixTrend,
}

impl WesternElectricRule {
    /// All rules in evaluation order.
    pub const ALL: [Self; 5] = [
        Self::BeyondLimits,
        Self::TwoOfThreeBeyond2Sigma,
        Self::FourOfFiveBeyond1Sigma,
        Self::EightOneSide,
        Self::SixTrend,
    ];

    /// Rule number, 1..=5.
    pub fn id(self) -> u8 {
        match self {
            Self::BeyondLimits => 1,
            Self::TwoOfThreeBeyond2Sigma => 2,
            Self::FourOfFiveBeyond1Sigma => 3,
            Self::EightOneSide => 4,
            Self::SixTrend => 5,
        }
    }

    /// Number of consecutive points the rule inspects.
    pub fn window(self) -> usize {
        match self {
            Self::BeyondLimits => 1,
            Self::TwoOfThreeBeyond2Sigma => 3,
            Self::FourOfFiveBeyond1Sigma => 5,
            Self::EightOneSide => 8,
            Self::SixTrend => 6,
        }
    }
}

impl fmt::Display for WesternElectricRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rule {}", self.id())
    }
}

/// Direction of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Above the center line (or above the UCL for rule 1).
    Above,
    /// Below the center line (or below the LCL for rule 1).
    Below,
    /// Increasing trend.
    Ascending,
    /// Decreasing trend.
    Descending,
    /// No meaningful direction.
    Unspecified,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::Unspecified => "unspecified",
        };
        f.write_str(s)
    }
}

/// A run-rule violation detected on the X-bar chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Rule that fired.
    pub rule: WesternElectricRule,
    /// Zero-based index of the first subgroup in the window.
    pub start: usize,
    /// Zero-based index of the last subgroup in the window (inclusive).
    pub end: usize,
    /// Direction of the pattern.
    pub side: Side,
    /// The triggering value, for single-point rules.
    pub value: Option<f64>,
    /// Human-readable description using 1-based subgroup numbers.
    pub message: String,
}
