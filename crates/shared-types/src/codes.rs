//! Outcome classification codes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome classification carried by acknowledgements and results.
///
/// Serialised as the string codes existing peers exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ResultCode {
    #[serde(rename = "200")]
    Ok,
    #[serde(rename = "202")]
    Accepted,
    #[serde(rename = "204")]
    NoContent,
    #[serde(rename = "400")]
    Invalid,
    #[serde(rename = "404")]
    NotFound,
    #[serde(rename = "408")]
    Timeout,
    #[serde(rename = "500")]
    Error,
    #[serde(rename = "503")]
    NotAvailable,
    #[default]
    #[serde(rename = "9999")]
    Unknown,
}

impl ResultCode {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "200",
            Self::Accepted => "202",
            Self::NoContent => "204",
            Self::Invalid => "400",
            Self::NotFound => "404",
            Self::Timeout => "408",
            Self::Error => "500",
            Self::NotAvailable => "503",
            Self::Unknown => "9999",
        }
    }

    /// Whether the code reports a failed execution.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error | Self::Timeout | Self::Invalid)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
