//! Statistical Process Control (SPC) charts.
//!
//! Control limits for subgroup data, out-of-control detection, and
//! Western Electric run rules.
//!
//! # Variables Charts
//!
//! - [`ChartFamily::MeanRange`] — X-bar and Range chart
//! - [`ChartFamily::MeanStdDev`] — X-bar and Standard Deviation chart
//!
//! Factors are tabulated for subgroup sizes 2–12, 15, 20 and 25; other
//! sizes use the nearest tabulated size ([`control_constants`]).
//!
//! # Run Rules
//!
//! - [`WesternElectricRules`] — 5 zone rules over the X-bar series
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.
//! - ASTM E2587 — Standard Practice for Use of Control Charts
//! - Western Electric (1956). *Statistical Quality Control Handbook*.

mod chart;
mod constants;
mod detector;
mod limits;
mod rules;

pub use chart::{ChartFamily, ControlLimitSet, ControlLimits, Side, Violation, WesternElectricRule};
pub use constants::{control_constants, tabulated_sizes, ControlConstants};
pub use detector::{detect_out_of_control, detect_out_of_control_opt};
pub use limits::compute_control_limits;
pub use rules::{detect_pattern_violations, RunRule, WesternElectricRules};
