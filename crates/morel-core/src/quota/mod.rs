//! Plan-based sync quota policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Subscription tier governing how many observations may sync to the cloud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    Free,
    Plus,
    PlusPlus,
}

impl Tier {
    /// Maximum number of observations this tier may sync.
    pub const fn limit(self) -> usize {
        match self {
            Self::Free => 0,
            Self::Plus => 100,
            Self::PlusPlus => 1000,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Plus => write!(f, "plus"),
            Self::PlusPlus => write!(f, "plusPlus"),
        }
    }
}

impl FromStr for Tier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "plus" => Ok(Self::Plus),
            "plusplus" => Ok(Self::PlusPlus),
            other => Err(Error::InvalidInput(format!("Unknown tier: {other}"))),
        }
    }
}

/// Outcome of a quota check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaDecision {
    /// Whether the upload phase may proceed
    pub allowed: bool,
    /// The tier's item limit
    pub limit: usize,
    /// Human-readable denial reason
    pub message: Option<String>,
}

/// Decide whether `item_count` observations may be uploaded on `tier`.
///
/// Pure and deterministic. Denial is advisory: callers block the upload
/// phase only, since pulling remote state down is quota-exempt.
pub fn check_quota(tier: Tier, item_count: usize) -> QuotaDecision {
    let limit = tier.limit();

    if tier == Tier::Free {
        return QuotaDecision {
            allowed: false,
            limit,
            message: Some("Cloud sync is not included in the free plan".to_string()),
        };
    }

    if item_count > limit {
        return QuotaDecision {
            allowed: false,
            limit,
            message: Some(format!(
                "{item_count} observations exceed the {tier} plan limit of {limit}"
            )),
        };
    }

    QuotaDecision {
        allowed: true,
        limit,
        message: None,
    }
}
