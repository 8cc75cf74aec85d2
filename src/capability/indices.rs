//! Process capability indices (Cp, Cpk, Pp, Ppk).
//!
//! Short-term indices (Cp, Cpk) use the within-subgroup sigma estimated from
//! the control chart (R-bar / d2 or S-bar / c4); long-term indices (Pp, Ppk)
//! use the sample standard deviation of all individual measurements pooled
//! across subgroups.
//!
//! Without specification limits only a control-limit based
//! `Cp = (UCL - LCL) / (6 * sigma_within)` is reported.
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//!   Chapter 8.
//! - Kane (1986), "Process Capability Indices", *Journal of Quality Technology*
//!   18(1), pp. 41--52.

use log::debug;
use serde::Serialize;

use super::interpretation::CapabilityBand;
use crate::error::{Result, SpcError};
use crate::matrix::SubgroupMatrix;
use crate::spc::{control_constants, ChartFamily, ControlLimits};
use crate::stats;

/// Two-sided specification limits.
///
/// # Examples
///
/// ```
/// use u_spc::SpecLimits;
///
/// let spec = SpecLimits::new(110.0, 90.0).unwrap();
/// assert!((spec.tolerance() - 20.0).abs() < 1e-12);
///
/// assert!(SpecLimits::new(90.0, 110.0).is_err());
/// assert!(SpecLimits::new(f64::NAN, 90.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpecLimits {
    usl: f64,
    lsl: f64,
}

impl SpecLimits {
    /// Creates validated specification limits.
    ///
    /// # Errors
    ///
    /// Returns [`SpcError::InvalidInput`] if either limit is non-finite,
    /// `usl <= lsl`, or the tolerance `usl - lsl` overflows.
    pub fn new(usl: f64, lsl: f64) -> Result<Self> {
        if !usl.is_finite() {
            return Err(SpcError::invalid("USL must be finite"));
        }
        if !lsl.is_finite() {
            return Err(SpcError::invalid("LSL must be finite"));
        }
        if usl <= lsl {
            return Err(SpcError::invalid("USL must be greater than LSL"));
        }
        if !(usl - lsl).is_finite() {
            return Err(SpcError::invalid("USL - LSL overflows f64"));
        }
        Ok(Self { usl, lsl })
    }

    /// Resolves a pair of optional limits.
    ///
    /// Both present: validated limits. Otherwise `None`; a one-sided
    /// specification is analyzed as if no specification were given.
    pub fn from_optional(usl: Option<f64>, lsl: Option<f64>) -> Result<Option<Self>> {
        match (usl, lsl) {
            (Some(u), Some(l)) => Self::new(u, l).map(Some),
            (None, None) => Ok(None),
            _ => {
                debug!("only one specification limit given; capability uses control limits");
                Ok(None)
            }
        }
    }

    /// Upper specification limit.
    pub fn usl(&self) -> f64 {
        self.usl
    }

    /// Lower specification limit.
    pub fn lsl(&self) -> f64 {
        self.lsl
    }

    /// Tolerance width, `USL - LSL`.
    pub fn tolerance(&self) -> f64 {
        self.usl - self.lsl
    }
}

/// Computed capability and performance indices.
///
/// The `Option` fields are `Some` only when specification limits were
/// supplied (`has_spec_limits`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapabilityResult {
    /// Within-subgroup sigma (R-bar / d2 or S-bar / c4).
    pub sigma_within: f64,
    /// Sample standard deviation of all pooled measurements.
    pub sigma_total: f64,
    /// Mean of the subgroup means.
    pub process_mean: f64,
    /// Cp from specification limits, or from control limits when absent.
    pub cp: f64,
    /// Band of `cp`.
    pub cp_band: CapabilityBand,
    /// Cpk = min(Cpu, Cpl).
    pub cpk: Option<f64>,
    /// Cpu = (USL - mean) / (3 * sigma_within).
    pub cpu: Option<f64>,
    /// Cpl = (mean - LSL) / (3 * sigma_within).
    pub cpl: Option<f64>,
    /// Pp = (USL - LSL) / (6 * sigma_total).
    pub pp: Option<f64>,
    /// Ppk = min(Ppu, Ppl).
    pub ppk: Option<f64>,
    /// Ppu = (USL - mean) / (3 * sigma_total).
    pub ppu: Option<f64>,
    /// Ppl = (mean - LSL) / (3 * sigma_total).
    pub ppl: Option<f64>,
    /// Band of `cpk`.
    pub cpk_band: Option<CapabilityBand>,
    /// Band of `pp`.
    pub pp_band: Option<CapabilityBand>,
    /// Band of `ppk`.
    pub ppk_band: Option<CapabilityBand>,
    /// Whether both specification limits were supplied.
    pub has_spec_limits: bool,
}

impl CapabilityResult {
    fn is_finite(&self) -> bool {
        let optional = [
            self.cpk, self.cpu, self.cpl, self.pp, self.ppk, self.ppu, self.ppl,
        ];
        [self.sigma_within, self.sigma_total, self.process_mean, self.cp]
            .into_iter()
            .chain(optional.into_iter().flatten())
            .all(f64::is_finite)
    }

    /// Label for `cp`: the detailed wording with specification limits, the
    /// coarse wording for the control-limit based Cp.
    pub fn cp_label(&self) -> &'static str {
        if self.has_spec_limits {
            self.cp_band.description()
        } else {
            self.cp_band.short_label()
        }
    }
}

/// Computes capability indices for a subgroup matrix.
///
/// `limits` are the X-bar chart limits, used only when `spec` is `None`.
///
/// # Errors
///
/// Returns [`SpcError::NotComputable`] if the within-subgroup or total sigma
/// is zero or undefined (no variation, or fewer than two measurements), or
/// if a sigma or an index overflows `f64`.
///
/// # Examples
///
/// ```
/// use u_spc::{analyze_capability, compute_control_limits, ChartFamily, SpecLimits, SubgroupMatrix};
///
/// let matrix = SubgroupMatrix::from_nan_rows(vec![
///     vec![10.2, 10.1, 10.3],
///     vec![10.3, 10.2, 10.4],
///     vec![10.1, 10.0, 10.2],
/// ])
/// .unwrap();
/// let limits = compute_control_limits(&matrix, ChartFamily::MeanRange).unwrap();
/// let spec = SpecLimits::new(10.8, 9.6).unwrap();
///
/// let cap = analyze_capability(&matrix, &limits.location, Some(&spec), ChartFamily::MeanRange)
///     .unwrap();
/// assert!(cap.has_spec_limits);
/// assert!(cap.cpk.unwrap() <= cap.cp);
/// ```
pub fn analyze_capability(
    matrix: &SubgroupMatrix,
    limits: &ControlLimits,
    spec: Option<&SpecLimits>,
    family: ChartFamily,
) -> Result<CapabilityResult> {
    let subgroup_stats = matrix.subgroup_stats();
    let means: Vec<f64> = subgroup_stats.iter().map(|s| s.mean).collect();
    let process_mean = stats::mean(&means)
        .ok_or_else(|| SpcError::invalid("subgroup means are undefined"))?;

    let (_, k) = control_constants(matrix.width());
    let sigma_within = match family {
        ChartFamily::MeanRange => {
            let ranges: Vec<f64> = subgroup_stats.iter().map(|s| s.range).collect();
            stats::mean(&ranges).map(|r_bar| r_bar / k.d2)
        }
        ChartFamily::MeanStdDev => {
            let sds: Vec<f64> = subgroup_stats.iter().filter_map(|s| s.std_dev).collect();
            stats::mean(&sds).map(|s_bar| s_bar / k.c4)
        }
    }
    .ok_or_else(|| not_computable("within-subgroup sigma is undefined"))?;

    let sigma_total = stats::std_dev(&matrix.pooled_values())
        .ok_or_else(|| not_computable("need at least 2 measurements for total sigma"))?;

    for (name, sigma) in [("within-subgroup", sigma_within), ("total", sigma_total)] {
        if sigma == 0.0 {
            return Err(not_computable(&format!("{name} sigma is zero")));
        }
        // 6 sigma is the widest denominator below.
        if !(6.0 * sigma).is_finite() {
            return Err(not_computable(&format!("{name} sigma overflows f64")));
        }
    }

    let result = match spec {
        Some(spec) => with_spec_limits(spec, process_mean, sigma_within, sigma_total),
        None => {
            let cp = (limits.ucl - limits.lcl) / (6.0 * sigma_within);
            CapabilityResult {
                sigma_within,
                sigma_total,
                process_mean,
                cp,
                cp_band: CapabilityBand::classify(cp),
                cpk: None,
                cpu: None,
                cpl: None,
                pp: None,
                ppk: None,
                ppu: None,
                ppl: None,
                cpk_band: None,
                pp_band: None,
                ppk_band: None,
                has_spec_limits: false,
            }
        }
    };
    if !result.is_finite() {
        return Err(not_computable("capability indices overflow f64"));
    }
    Ok(result)
}

fn not_computable(reason: &str) -> SpcError {
    debug!("capability not computable: {reason}");
    SpcError::not_computable(reason)
}

/// Full index set from specification limits.
fn with_spec_limits(
    spec: &SpecLimits,
    x_bar: f64,
    sigma_within: f64,
    sigma_total: f64,
) -> CapabilityResult {
    // Short-term indices (within-group sigma)
    let cp = spec.tolerance() / (6.0 * sigma_within);
    let cpu = (spec.usl - x_bar) / (3.0 * sigma_within);
    let cpl = (x_bar - spec.lsl) / (3.0 * sigma_within);
    let cpk = cpu.min(cpl);

    // Long-term indices (overall sigma)
    let pp = spec.tolerance() / (6.0 * sigma_total);
    let ppu = (spec.usl - x_bar) / (3.0 * sigma_total);
    let ppl = (x_bar - spec.lsl) / (3.0 * sigma_total);
    let ppk = ppu.min(ppl);

    CapabilityResult {
        sigma_within,
        sigma_total,
        process_mean: x_bar,
        cp,
        cp_band: CapabilityBand::classify(cp),
        cpk: Some(cpk),
        cpu: Some(cpu),
        cpl: Some(cpl),
        pp: Some(pp),
        ppk: Some(ppk),
        ppu: Some(ppu),
        ppl: Some(ppl),
        cpk_band: Some(CapabilityBand::classify(cpk)),
        pp_band: Some(CapabilityBand::classify(pp)),
        ppk_band: Some(CapabilityBand::classify(ppk)),
        has_spec_limits: true,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn cpk_never_exceeds_cp(
            mean in 80.0_f64..120.0,
            sigma_within in 0.1_f64..10.0,
            sigma_total in 0.1_f64..10.0,
        ) {
            let spec = SpecLimits::new(110.0, 90.0).unwrap();
            let r = with_spec_limits(&spec, mean, sigma_within, sigma_total);
            prop_assert!(r.cpk.unwrap() <= r.cp + 1e-12);
            prop_assert!(r.ppk.unwrap() <= r.pp.unwrap() + 1e-12);
            prop_assert_eq!(r.cp_band, CapabilityBand::classify(r.cp));
        }
    }
}
