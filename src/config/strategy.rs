// ABOUTME: Deployment strategy label carried through to reports.
// ABOUTME: Only blue-green has an implementation; other labels are informational.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    BlueGreen,
    Canary,
    Rolling,
}

impl Strategy {
    /// Whether this label has its own traffic-shifting implementation.
    pub fn is_implemented(self) -> bool {
        matches!(self, Strategy::BlueGreen)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::BlueGreen => "blue-green",
            Strategy::Canary => "canary",
            Strategy::Rolling => "rolling",
        })
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blue-green" => Ok(Strategy::BlueGreen),
            "canary" => Ok(Strategy::Canary),
            "rolling" => Ok(Strategy::Rolling),
            _ => Err(format!(
                "unknown strategy '{}' (expected blue-green, canary, or rolling)",
                s
            )),
        }
    }
}
