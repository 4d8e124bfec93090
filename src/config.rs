//! Engine configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who absorbs a non-zero `sum(net)` after aggregation.
///
/// A residual only appears when some amount was never attributed to a member
/// (items without splits, rows naming inactive members). Either policy
/// records the adjustment on the affected member rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResidualPolicy {
    /// The first active member in store order takes the whole adjustment.
    #[default]
    FirstMember,
    /// The adjustment is spread across members in proportion to |net|.
    ///
    /// Every member moves in the same direction, the opposite of the
    /// residual's sign. A positive residual lowers creditors and pushes
    /// debtors further negative; a negative residual does the reverse.
    /// Members with a zero net are untouched.
    Proportional,
}

impl fmt::Display for ResidualPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResidualPolicy::FirstMember => write!(f, "first"),
            ResidualPolicy::Proportional => write!(f, "proportional"),
        }
    }
}

impl FromStr for ResidualPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" | "first_member" => Ok(ResidualPolicy::FirstMember),
            "proportional" => Ok(ResidualPolicy::Proportional),
            other => Err(format!(
                "unknown residual policy '{other}' (expected 'first' or 'proportional')"
            )),
        }
    }
}

/// Tunables for [`BalanceService`](crate::service::BalanceService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lifetime of a cached [`GroupBalances`](crate::balance::GroupBalances).
    pub cache_ttl_secs: i64,
    /// How rounding residuals are absorbed.
    pub residual_policy: ResidualPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            residual_policy: ResidualPolicy::FirstMember,
        }
    }
}

impl EngineConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache_ttl_secs.max(0))
    }
}
