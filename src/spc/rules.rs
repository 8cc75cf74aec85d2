//! Western Electric zone rules for detecting non-random patterns.
//!
//! Every rule is evaluated over every sliding window of its size; each
//! window reports at most one violation per side. Overlapping windows of
//! the same rule fire independently, so a long run produces one violation
//! per window position.
//!
//! Zones are derived from the X-bar limits: `sigma = (UCL - CL) / 3`,
//! zone 2 boundaries at `CL +/- 2 sigma`, zone 1 boundaries at
//! `CL +/- sigma`.
//!
//! | Rule | Window | Condition |
//! |------|--------|-----------|
//! | 1 | 1 | point beyond UCL or LCL |
//! | 2 | 3 | >= 2 of 3 beyond 2 sigma, same side |
//! | 3 | 5 | >= 4 of 5 beyond 1 sigma, same side |
//! | 4 | 8 | all 8 strictly on one side of CL |
//! | 5 | 6 | 5 consecutive strictly increasing or decreasing steps |
//!
//! # References
//!
//! - Western Electric (1956). *Statistical Quality Control Handbook*.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

use std::collections::HashSet;

use log::trace;

use super::chart::{ControlLimits, Side, Violation, WesternElectricRule};

/// Trait for applying run rules to a chart series.
///
/// Run rules detect non-random patterns that indicate special causes of
/// variation even when individual points remain within control limits.
pub trait RunRule {
    /// Check `values` against this rule set.
    ///
    /// Violations are ordered by rule, then by window start.
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<Violation>;
}

/// The five Western Electric zone rules used for X-bar charts.
#[derive(Debug, Clone, Copy, Default)]
pub struct WesternElectricRules;

impl RunRule for WesternElectricRules {
    fn check(&self, values: &[f64], limits: &ControlLimits) -> Vec<Violation> {
        let zones = Zones::new(limits);
        let mut log = ViolationLog::default();
        check_rule1(values, limits, &mut log);
        check_rule2(values, &zones, &mut log);
        check_rule3(values, &zones, &mut log);
        check_rule4(values, &zones, &mut log);
        check_rule5(values, &mut log);
        log.into_violations()
    }
}

/// Runs the Western Electric rules over a sequence of subgroup means.
///
/// # Examples
///
/// ```
/// use u_spc::ControlLimits;
/// use u_spc::spc::detect_pattern_violations;
///
/// let limits = ControlLimits { ucl: 28.0, cl: 25.0, lcl: 22.0 };
/// let means = [25.5, 24.8, 29.0, 25.1];
///
/// let violations = detect_pattern_violations(&means, &limits);
/// assert_eq!(violations.len(), 1);
/// assert_eq!(violations[0].rule.id(), 1);
/// assert_eq!(violations[0].start, 2);
/// ```
pub fn detect_pattern_violations(means: &[f64], limits: &ControlLimits) -> Vec<Violation> {
    WesternElectricRules.check(means, limits)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Zone boundaries derived from the control limits.
struct Zones {
    cl: f64,
    upper_2s: f64,
    lower_2s: f64,
    upper_1s: f64,
    lower_1s: f64,
}

impl Zones {
    fn new(limits: &ControlLimits) -> Self {
        let sigma = limits.sigma();
        Self {
            cl: limits.cl,
            upper_2s: limits.cl + 2.0 * sigma,
            lower_2s: limits.cl - 2.0 * sigma,
            upper_1s: limits.cl + sigma,
            lower_1s: limits.cl - sigma,
        }
    }
}

/// Ordered violation list, deduplicated by (rule, window start, side).
#[derive(Default)]
struct ViolationLog {
    seen: HashSet<(WesternElectricRule, usize, Side)>,
    violations: Vec<Violation>,
}

impl ViolationLog {
    fn record(
        &mut self,
        rule: WesternElectricRule,
        start: usize,
        side: Side,
        value: Option<f64>,
        message: String,
    ) {
        if !self.seen.insert((rule, start, side)) {
            return;
        }
        trace!("{message}");
        self.violations.push(Violation {
            rule,
            start,
            end: start + rule.window() - 1,
            side,
            value,
            message,
        });
    }

    fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

/// 1-based, human-readable span of a window.
fn span(start: usize, rule: WesternElectricRule) -> String {
    format!("subgroups {}-{}", start + 1, start + rule.window())
}

/// Rule 1: a single point beyond the control limits.
fn check_rule1(values: &[f64], limits: &ControlLimits, log: &mut ViolationLog) {
    let rule = WesternElectricRule::BeyondLimits;
    for (i, &v) in values.iter().enumerate() {
        if !limits.is_beyond(v) {
            continue;
        }
        let side = if v > limits.ucl { Side::Above } else { Side::Below };
        let message = format!(
            "{rule}: subgroup {} beyond control limits (3σ) - value: {v:.4}",
            i + 1
        );
        log.record(rule, i, side, Some(v), message);
    }
}

/// Rule 2: at least 2 of 3 consecutive points beyond 2 sigma, same side.
fn check_rule2(values: &[f64], zones: &Zones, log: &mut ViolationLog) {
    let rule = WesternElectricRule::TwoOfThreeBeyond2Sigma;
    for (start, window) in values.windows(rule.window()).enumerate() {
        let above = window.iter().filter(|&&v| v > zones.upper_2s).count();
        let below = window.iter().filter(|&&v| v < zones.lower_2s).count();
        for (count, side) in [(above, Side::Above), (below, Side::Below)] {
            if count >= 2 {
                let message = format!(
                    "{rule}: {} - 2 of 3 beyond 2σ ({side})",
                    span(start, rule)
                );
                log.record(rule, start, side, None, message);
            }
        }
    }
}

/// Rule 3: at least 4 of 5 consecutive points beyond 1 sigma, same side.
fn check_rule3(values: &[f64], zones: &Zones, log: &mut ViolationLog) {
    let rule = WesternElectricRule::FourOfFiveBeyond1Sigma;
    for (start, window) in values.windows(rule.window()).enumerate() {
        let above = window.iter().filter(|&&v| v > zones.upper_1s).count();
        let below = window.iter().filter(|&&v| v < zones.lower_1s).count();
        for (count, side) in [(above, Side::Above), (below, Side::Below)] {
            if count >= 4 {
                let message = format!(
                    "{rule}: {} - 4 of 5 beyond 1σ ({side})",
                    span(start, rule)
                );
                log.record(rule, start, side, None, message);
            }
        }
    }
}

/// Rule 4: 8 consecutive points strictly on one side of the center line.
///
/// A point exactly on the center line belongs to neither side.
fn check_rule4(values: &[f64], zones: &Zones, log: &mut ViolationLog) {
    let rule = WesternElectricRule::EightOneSide;
    for (start, window) in values.windows(rule.window()).enumerate() {
        let side = if window.iter().all(|&v| v > zones.cl) {
            Side::Above
        } else if window.iter().all(|&v| v < zones.cl) {
            Side::Below
        } else {
            continue;
        };
        let message = format!(
            "{rule}: {} - 8 consecutive {side} center line",
            span(start, rule)
        );
        log.record(rule, start, side, None, message);
    }
}

/// Rule 5: 6 points with 5 consecutive strictly increasing or decreasing
/// steps. Equal neighbours break the trend.
fn check_rule5(values: &[f64], log: &mut ViolationLog) {
    let rule = WesternElectricRule::SixTrend;
    for (start, window) in values.windows(rule.window()).enumerate() {
        let side = if window.windows(2).all(|w| w[0] < w[1]) {
            Side::Ascending
        } else if window.windows(2).all(|w| w[0] > w[1]) {
            Side::Descending
        } else {
            continue;
        };
        let message = format!("{rule}: {} - continuous {side} trend", span(start, rule));
        log.record(rule, start, side, None, message);
    }
}
