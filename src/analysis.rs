//! End-to-end SPC analysis of a subgroup matrix.
//!
//! [`analyze`] runs the whole pipeline: control limits, out-of-control
//! detection on both charts, Western Electric rules on the X-bar series,
//! capability indices, and a list of [`Recommendation`]s derived from the
//! findings.
//!
//! # Examples
//!
//! ```
//! use u_spc::{analyze, AnalysisConfig, ChartFamily, SubgroupMatrix};
//!
//! let matrix = SubgroupMatrix::from_nan_rows(vec![
//!     vec![10.2, 10.1, 10.3],
//!     vec![10.3, 10.2, 10.4],
//!     vec![10.1, 10.0, 10.2],
//! ])
//! .unwrap();
//! let config = AnalysisConfig::new(ChartFamily::MeanRange);
//!
//! let report = analyze(&matrix, &config).unwrap();
//! assert!(report.is_in_control());
//! assert!(report.capability.is_some());
//! ```

use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::capability::{analyze_capability, CapabilityResult, SpecLimits, ADEQUATE, MARGINAL};
use crate::error::{Result, SpcError};
use crate::matrix::SubgroupMatrix;
use crate::spc::{
    compute_control_limits, detect_out_of_control, detect_out_of_control_opt,
    detect_pattern_violations, ChartFamily, ControlLimitSet, Violation, WesternElectricRule,
};

/// Cpu/Cpl gap above which the process is reported as off-center.
const CENTERING_TOLERANCE: f64 = 0.2;

/// Analysis parameters.
///
/// Deserializes from `{"family": ..., "usl": ..., "lsl": ...}` where both
/// limits are optional. A single limit is ignored; two limits are validated
/// as in [`SpecLimits::new`].
///
/// # Examples
///
/// ```
/// use u_spc::{AnalysisConfig, ChartFamily};
///
/// let config = AnalysisConfig::new(ChartFamily::MeanStdDev)
///     .with_spec_limits(110.0, 90.0)
///     .unwrap();
/// assert_eq!(config.spec_limits.unwrap().usl(), 110.0);
///
/// assert!(AnalysisConfig::default().with_spec_limits(1.0, 2.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawConfig", into = "RawConfig")]
pub struct AnalysisConfig {
    /// Chart family (X-bar-R or X-bar-S).
    pub family: ChartFamily,
    /// Specification limits for Cpk/Pp/Ppk, if known.
    pub spec_limits: Option<SpecLimits>,
}

impl AnalysisConfig {
    /// Creates a configuration without specification limits.
    pub fn new(family: ChartFamily) -> Self {
        Self {
            family,
            spec_limits: None,
        }
    }

    /// Sets the specification limits.
    ///
    /// # Errors
    ///
    /// Returns [`SpcError::InvalidInput`] if the limits are non-finite or
    /// `usl <= lsl`.
    pub fn with_spec_limits(mut self, usl: f64, lsl: f64) -> Result<Self> {
        self.spec_limits = Some(SpecLimits::new(usl, lsl)?);
        Ok(self)
    }
}

/// Wire form of [`AnalysisConfig`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawConfig {
    #[serde(default)]
    family: ChartFamily,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    usl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lsl: Option<f64>,
}

impl TryFrom<RawConfig> for AnalysisConfig {
    type Error = SpcError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        Ok(Self {
            family: raw.family,
            spec_limits: SpecLimits::from_optional(raw.usl, raw.lsl)?,
        })
    }
}

impl From<AnalysisConfig> for RawConfig {
    fn from(config: AnalysisConfig) -> Self {
        Self {
            family: config.family,
            usl: config.spec_limits.map(|s| s.usl()),
            lsl: config.spec_limits.map(|s| s.lsl()),
        }
    }
}

/// Corrective action suggested by an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// At least one subgroup is beyond the X-bar or R/S limits.
    InvestigateSpecialCauses,
    /// Rule 1 fired.
    ExtremeEvent,
    /// Rule 2 fired.
    ExcessiveVariation,
    /// Rule 3 fired.
    SustainedShift,
    /// Rule 4 fired.
    CenteringBias,
    /// Rule 5 fired.
    ContinuousTrend,
    /// Cpk < 1.0.
    CapabilityInadequate,
    /// 1.0 <= Cpk < 1.33.
    CapabilityMarginal,
    /// Ppk < Cpk.
    BetweenSubgroupVariation,
    /// |Cpu - Cpl| > 0.2.
    OffCenter,
    /// Nothing else applies.
    ProcessStable,
}

impl Recommendation {
    /// Recommendation associated with a run rule.
    pub fn for_rule(rule: WesternElectricRule) -> Self {
        match rule {
            WesternElectricRule::BeyondLimits => Self::ExtremeEvent,
            WesternElectricRule::TwoOfThreeBeyond2Sigma => Self::ExcessiveVariation,
            WesternElectricRule::FourOfFiveBeyond1Sigma => Self::SustainedShift,
            WesternElectricRule::EightOneSide => Self::CenteringBias,
            WesternElectricRule::SixTrend => Self::ContinuousTrend,
        }
    }

    /// Human-readable advice.
    pub fn message(self) -> &'static str {
        match self {
            Self::InvestigateSpecialCauses => {
                "Investigate special causes at points beyond the control limits: \
                 check gauge calibration, operator or method changes, raw material \
                 and environmental conditions"
            }
            Self::ExtremeEvent => "Rule 1: extreme event - look for an immediate assignable cause",
            Self::ExcessiveVariation => "Rule 2: excessive variation - review process stability",
            Self::SustainedShift => "Rule 3: sustained shift - verify process adjustments",
            Self::CenteringBias => "Rule 4: bias detected - verify process centering",
            Self::ContinuousTrend => "Rule 5: continuous trend - check for tool wear",
            Self::CapabilityInadequate => {
                "Cpk < 1.0: process is inadequate - reduce variation or widen the specification"
            }
            Self::CapabilityMarginal => "Cpk is marginal - apply continuous improvement",
            Self::BetweenSubgroupVariation => {
                "Ppk < Cpk: high between-subgroup variation - review process consistency"
            }
            Self::OffCenter => "Process is off-center - adjust toward the nominal value",
            Self::ProcessStable => {
                "Process is stable and in control - keep monitoring and document current \
                 conditions as the standard"
            }
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of [`analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpcReport {
    /// Control limits and per-subgroup series.
    pub limits: ControlLimitSet,
    /// Subgroups whose mean is beyond the X-bar limits.
    pub location_out_of_control: Vec<usize>,
    /// Subgroups whose R or S is beyond the dispersion limits.
    pub dispersion_out_of_control: Vec<usize>,
    /// Run-rule violations on the X-bar series.
    pub violations: Vec<Violation>,
    /// Capability indices; `None` when the data shows no variation.
    pub capability: Option<CapabilityResult>,
    /// Suggested actions, never empty.
    pub recommendations: Vec<Recommendation>,
}

impl SpcReport {
    /// No out-of-control points on either chart and no rule violations.
    pub fn is_in_control(&self) -> bool {
        self.location_out_of_control.is_empty()
            && self.dispersion_out_of_control.is_empty()
            && self.violations.is_empty()
    }
}

/// Runs the complete analysis.
///
/// # Errors
///
/// Propagates [`SpcError::InvalidInput`] from the control limit
/// computation. A capability [`SpcError::NotComputable`] is not an error
/// here; it yields `capability: None`.
pub fn analyze(matrix: &SubgroupMatrix, config: &AnalysisConfig) -> Result<SpcReport> {
    let limits = compute_control_limits(matrix, config.family)?;

    let location_out_of_control = detect_out_of_control(&limits.means, &limits.location);
    let dispersion_out_of_control =
        detect_out_of_control_opt(&limits.dispersions, &limits.dispersion);
    let violations = detect_pattern_violations(&limits.means, &limits.location);

    let capability = match analyze_capability(
        matrix,
        &limits.location,
        config.spec_limits.as_ref(),
        config.family,
    ) {
        Ok(c) => Some(c),
        Err(SpcError::NotComputable { reason }) => {
            debug!("skipping capability: {reason}");
            None
        }
        Err(e) => return Err(e),
    };

    let recommendations = recommend(
        !location_out_of_control.is_empty() || !dispersion_out_of_control.is_empty(),
        &violations,
        capability.as_ref(),
    );

    Ok(SpcReport {
        limits,
        location_out_of_control,
        dispersion_out_of_control,
        violations,
        capability,
        recommendations,
    })
}

fn recommend(
    out_of_control: bool,
    violations: &[Violation],
    capability: Option<&CapabilityResult>,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if out_of_control {
        out.push(Recommendation::InvestigateSpecialCauses);
    }

    let fired: BTreeSet<WesternElectricRule> = violations.iter().map(|v| v.rule).collect();
    out.extend(fired.into_iter().map(Recommendation::for_rule));

    if let Some(cap) = capability.filter(|c| c.has_spec_limits) {
        if let (Some(cpk), Some(ppk), Some(cpu), Some(cpl)) = (cap.cpk, cap.ppk, cap.cpu, cap.cpl)
        {
            if cpk < MARGINAL {
                out.push(Recommendation::CapabilityInadequate);
            } else if cpk < ADEQUATE {
                out.push(Recommendation::CapabilityMarginal);
            }
            if ppk < cpk {
                out.push(Recommendation::BetweenSubgroupVariation);
            }
            if (cpu - cpl).abs() > CENTERING_TOLERANCE {
                out.push(Recommendation::OffCenter);
            }
        }
    }

    if out.is_empty() {
        out.push(Recommendation::ProcessStable);
    }
    out
}
