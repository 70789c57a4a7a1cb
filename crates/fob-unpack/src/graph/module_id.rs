use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a module inside a bundle's module table.
///
/// Ids are assigned by the bundler and are only meaningful within one bundle.
/// They order numerically, which is also the order a JavaScript engine
/// enumerates the integer keys of the table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ModuleId(u32);

impl ModuleId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// Interpret a numeric literal as a module id.
    ///
    /// Only non-negative integers that fit in `u32` qualify; `1.5`, `-1` and
    /// `NaN` do not.
    pub fn from_literal(value: f64) -> Option<Self> {
        if value.is_finite() && value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64 {
            Some(Self(value as u32))
        } else {
            None
        }
    }
}

impl From<u32> for ModuleId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl FromStr for ModuleId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
