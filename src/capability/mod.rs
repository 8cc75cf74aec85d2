//! Process capability analysis.
//!
//! Computes standard capability indices for assessing how well a process
//! meets specification limits.
//!
//! # Indices
//!
//! - **Cp** — Potential capability (spread vs tolerance)
//! - **Cpk** — Actual capability (centering considered)
//! - **Pp**, **Ppk** — Long-term performance indices
//!
//! Each index is classified into a [`CapabilityBand`].
//!
//! # References
//!
//! - Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.

mod indices;
mod interpretation;

pub use indices::{analyze_capability, CapabilityResult, SpecLimits};
pub use interpretation::{CapabilityBand, ADEQUATE, MARGINAL, WORLD_CLASS};
