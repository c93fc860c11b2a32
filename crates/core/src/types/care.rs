//! Plant care classification enums.
//!
//! Serialized with capitalized variant names ("Easy", "Medium", ...) to match
//! the public API and the values stored in the catalog.

use core::fmt;

use serde::{Deserialize, Serialize};

/// How demanding a plant is to keep alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CareLevel {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl CareLevel {
    /// The database/text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Parse from the text representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Easy" => Some(Self::Easy),
            "Medium" => Some(Self::Medium),
            "Hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for CareLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A low/medium/high scale, used for both water and light needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MoistureLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl MoistureLevel {
    /// The database/text representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Parse from the text representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for MoistureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
