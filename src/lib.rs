//! # u-spc
//!
//! Statistical process control (SPC) for subgroup data: control limits,
//! out-of-control detection, Western Electric run rules, and process
//! capability analysis.
//!
//! This crate is domain-agnostic — it operates on raw `f64` measurements
//! arranged as subgroups, without knowledge of any specific product or
//! consumer domain. It is a pure computational core; charts, tables and
//! file import belong to the presentation layer.
//!
//! ## Modules
//!
//! - [`matrix`] — Validated subgroup matrix with missing-cell support
//! - [`spc`] — X̄-R / X̄-S control limits, out-of-control detection, run rules
//! - [`capability`] — Process capability indices (Cp, Cpk, Pp, Ppk)
//! - [`analysis`] — End-to-end report with recommendations
//! - [`error`] — Error taxonomy
//!
//! ## Example
//!
//! ```
//! use u_spc::{compute_control_limits, detect_pattern_violations, ChartFamily, SubgroupMatrix};
//!
//! let matrix = SubgroupMatrix::from_nan_rows(vec![
//!     vec![10.2, 10.1, 10.3],
//!     vec![10.3, 10.2, 10.4],
//!     vec![10.1, 10.0, 10.2],
//! ])
//! .unwrap();
//!
//! let limits = compute_control_limits(&matrix, ChartFamily::MeanRange).unwrap();
//! assert!((limits.location.cl - 10.2).abs() < 1e-9);
//! assert!((limits.location.ucl - 10.4046).abs() < 1e-9);
//! assert!(detect_pattern_violations(&limits.means, &limits.location).is_empty());
//! ```
//!
//! ## Design Philosophy
//!
//! - **Explicit missing data**: `None` cells, never coerced to zero
//! - **Total lookups**: unsupported subgroup sizes fall back to the nearest
//!   tabulated factors instead of failing
//! - **Research-backed**: factors and rules follow Montgomery and the
//!   Western Electric handbook

pub mod analysis;
pub mod capability;
pub mod error;
pub mod matrix;
pub mod spc;
mod stats;

pub use analysis::{analyze, AnalysisConfig, Recommendation, SpcReport};
pub use capability::{analyze_capability, CapabilityBand, CapabilityResult, SpecLimits};
pub use error::{Result, SpcError};
pub use matrix::{SubgroupMatrix, SubgroupStats};
pub use spc::{
    compute_control_limits, detect_out_of_control, detect_pattern_violations, ChartFamily,
    ControlLimitSet, ControlLimits, Violation, WesternElectricRule,
};
