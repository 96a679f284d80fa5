use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decides what happens when a confirmation brings a transaction to its threshold.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPolicy {
    /// Reaching the threshold only authorizes; someone must call `execute`.
    #[default]
    Explicit,

    /// The confirmation that reaches the threshold also executes, atomically.
    AutoOnThreshold,
}

impl FromStr for ExecutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explicit" => Ok(ExecutionPolicy::Explicit),
            "auto_on_threshold" | "auto" => Ok(ExecutionPolicy::AutoOnThreshold),
            other => Err(format!(
                "Unsupported execution policy: {}. Valid values: explicit, auto_on_threshold",
                other
            )),
        }
    }
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionPolicy::Explicit => write!(f, "explicit"),
            ExecutionPolicy::AutoOnThreshold => write!(f, "auto_on_threshold"),
        }
    }
}
