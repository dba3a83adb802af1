use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Authentic,
    Expired,
    Counterfeit,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Authentic => "AUTHENTIC",
            VerificationStatus::Expired => "EXPIRED",
            VerificationStatus::Counterfeit => "COUNTERFEIT",
        }
    }

    /// Match a logged status, ignoring case. Anything else is `None`.
    pub fn from_logged(status: &str) -> Option<Self> {
        let s = status.trim();
        [Self::Authentic, Self::Expired, Self::Counterfeit]
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
