//! Service dues on claimed winnings

use ethers::types::{Address, U256};

/// Share of a payout taken as dues (payout / 50 = 2%)
pub const DUES_DIVISOR: u64 = 50;

/// 0.01 native token in wei
pub const DEFAULT_MIN_DUES_WEI: u128 = 10_000_000_000_000_000;

/// Fee policy: divisor, floor and the fixed recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuesCalculator {
    minimum: U256,
    recipient: Address,
}

impl DuesCalculator {
    pub fn new(minimum: U256, recipient: Address) -> Self {
        Self { minimum, recipient }
    }

    pub fn minimum(&self) -> U256 {
        self.minimum
    }

    pub fn recipient(&self) -> Address {
        self.recipient
    }

    /// Fee owed on a realized payout; unknown payouts owe the floor
    pub fn compute_fee(&self, payout: Option<U256>) -> U256 {
        match payout {
            Some(amount) => (amount / U256::from(DUES_DIVISOR)).max(self.minimum),
            None => self.minimum,
        }
    }
}
