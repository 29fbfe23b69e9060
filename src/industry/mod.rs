//! Supported industry verticals.
//!
//! The set is closed: adding a vertical means adding a variant, a template
//! file under `templates/`, and an arm in [`templates::raw_template`]. The
//! compiler enforces the last step.

pub mod templates;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use templates::{TemplateError, TemplateRegistry};

/// A vertical with its own default site template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Industry {
    MobileDetailing,
    MaidService,
    Lawncare,
    PetGrooming,
}

impl Industry {
    /// Every supported industry.
    pub const ALL: [Industry; 4] = [
        Industry::MobileDetailing,
        Industry::MaidService,
        Industry::Lawncare,
        Industry::PetGrooming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Industry::MobileDetailing => "mobile-detailing",
            Industry::MaidService => "maid-service",
            Industry::Lawncare => "lawncare",
            Industry::PetGrooming => "pet-grooming",
        }
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no supported industry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIndustry(pub String);

impl fmt::Display for UnknownIndustry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown industry `{}`", self.0)
    }
}

impl std::error::Error for UnknownIndustry {}

impl FromStr for Industry {
    type Err = UnknownIndustry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Industry::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| UnknownIndustry(s.to_string()))
    }
}
