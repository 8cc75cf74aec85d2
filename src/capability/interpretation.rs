//! Qualitative bands for capability indices.
//!
//! | Index value | Band |
//! |-------------|------|
//! | >= 2.0 | world-class |
//! | >= 1.33 | adequate |
//! | >= 1.0 | marginal |
//! | < 1.0 | inadequate |

use std::fmt;

use serde::Serialize;

/// Lower bound of the world-class band.
pub const WORLD_CLASS: f64 = 2.0;
/// Lower bound of the adequate band.
pub const ADEQUATE: f64 = 1.33;
/// Lower bound of the marginal band.
pub const MARGINAL: f64 = 1.0;

/// Qualitative band of a capability or performance index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityBand {
    /// Index < 1.0.
    Inadequate,
    /// 1.0 <= index < 1.33.
    Marginal,
    /// 1.33 <= index < 2.0.
    Adequate,
    /// Index >= 2.0.
    WorldClass,
}

impl CapabilityBand {
    /// Classifies an index value. NaN falls into [`CapabilityBand::Inadequate`].
    ///
    /// ```
    /// use u_spc::capability::CapabilityBand;
    ///
    /// assert_eq!(CapabilityBand::classify(1.667), CapabilityBand::Adequate);
    /// assert_eq!(CapabilityBand::classify(2.0), CapabilityBand::WorldClass);
    /// ```
    pub fn classify(index: f64) -> Self {
        if index >= WORLD_CLASS {
            Self::WorldClass
        } else if index >= ADEQUATE {
            Self::Adequate
        } else if index >= MARGINAL {
            Self::Marginal
        } else {
            Self::Inadequate
        }
    }

    /// Detailed label, used when specification limits are known.
    pub fn description(self) -> &'static str {
        match self {
            Self::WorldClass => "world-class",
            Self::Adequate => "adequate",
            Self::Marginal => "marginal, needs improvement",
            Self::Inadequate => "inadequate, immediate action",
        }
    }

    /// Coarse label, used for the control-limit based Cp.
    pub fn short_label(self) -> &'static str {
        match self {
            Self::WorldClass => "excellent",
            Self::Adequate => "adequate",
            Self::Marginal => "marginal",
            Self::Inadequate => "inadequate",
        }
    }
}

impl fmt::Display for CapabilityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
