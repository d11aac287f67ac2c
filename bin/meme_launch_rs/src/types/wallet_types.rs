use std::fmt;

use ethers::types::{Address, U256};
use rust_decimal::Decimal;

/// One parsed wallet line. Immutable after parsing, consumed by one workflow run.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletRecord {
    pub line_number: usize,
    pub declared_address: Address,
    pub derived_address: Address,
    pub private_key: String,
    pub purchase_amount: Decimal,
    pub purchase_amount_wei: U256,
    pub sell_percentage: Decimal,
}

impl WalletRecord {
    pub fn address_matches(&self) -> bool {
        self.declared_address == self.derived_address
    }
}

impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("line_number", &self.line_number)
            .field("declared_address", &self.declared_address)
            .field("derived_address", &self.derived_address)
            .field("private_key", &"***")
            .field("purchase_amount", &self.purchase_amount)
            .field("sell_percentage", &self.sell_percentage)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletLineWarning {
    pub line_number: usize,
    pub message: String,
    /// The line was dropped, as opposed to kept with a warning.
    pub skipped: bool,
}

#[derive(Debug, Clone, Default)]
pub struct WalletFile {
    pub records: Vec<WalletRecord>,
    pub warnings: Vec<WalletLineWarning>,
}
