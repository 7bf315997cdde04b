use serde::{Deserialize, Serialize};

/// Engine-facing order status carried by normalized order events.
///
/// Collapses the brokerage's trade-update vocabulary into the transitions the
/// engine acts on:
/// - `Submitted`: the brokerage accepted the order (pending_new or new)
/// - `PartiallyFilled`: some quantity executed, order still working
/// - `Filled`: order completely executed
/// - `Canceled`: order terminated without completing (canceled or expired)
/// - `Invalid`: order rejected by the brokerage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Submitted,
    PartiallyFilled,
    Filled,
    Canceled,
    Invalid,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "SUBMITTED",
            Self::PartiallyFilled => "PARTIALLY_FILLED",
            Self::Filled => "FILLED",
            Self::Canceled => "CANCELED",
            Self::Invalid => "INVALID",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
