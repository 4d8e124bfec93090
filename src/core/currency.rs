use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO 4217-style currency code.
///
/// The engine never converts between currencies: every amount in a group is
/// already expressed in the group's reporting currency. The code is carried
/// through to [`GroupBalances`](crate::balance::GroupBalances) so callers can
/// render amounts correctly.
///
/// # Examples
///
/// ```
/// use settle_engine::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let jpy = CurrencyCode::new("JPY");
/// assert_ne!(usd, jpy);
/// assert_eq!(jpy.minor_unit_scale(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of decimal places in this currency's minor unit.
    ///
    /// Zero-decimal and three-decimal ISO currencies are recognised; every
    /// other code is treated as having cents.
    pub fn minor_unit_scale(&self) -> u32 {
        match self.0.to_ascii_uppercase().as_str() {
            "JPY" | "KRW" | "VND" | "CLP" | "ISK" | "UGX" | "XAF" | "XOF" | "PYG" => 0,
            "BHD" | "KWD" | "OMR" | "JOD" | "TND" | "IQD" | "LYD" => 3,
            _ => 2,
        }
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
