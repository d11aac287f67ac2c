use ethers::types::{Address, H256, U256, U64};
use meme_launch_utils::utils::format_lower_hex;
use strum_macros::Display;

use crate::types::ChainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TxKind {
    CreateToken,
    BuyToken,
    Approve,
    Transfer,
    SellToken,
}

/// Built -> Signed -> Submitted -> Pending -> Confirmed | Failed | TimedOut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TxStage {
    Built,
    Signed,
    Submitted,
    Pending,
    Confirmed,
    Failed,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub kind: TxKind,
    pub stage: TxStage,
    pub tx_hash: Option<H256>,
    pub block_number: Option<U64>,
    /// Present once mined, reverted transactions included.
    pub gas_used: Option<U256>,
    /// Only set for creation, from the `TokenCreate` event.
    pub token_address: Option<Address>,
    pub error: Option<ChainError>,
}

impl TransactionOutcome {
    pub fn new(kind: TxKind) -> Self {
        Self {
            kind,
            stage: TxStage::Built,
            tx_hash: None,
            block_number: None,
            gas_used: None,
            token_address: None,
            error: None,
        }
    }

    pub fn success(&self) -> bool {
        self.stage == TxStage::Confirmed && self.error.is_none()
    }

    /// The error to report for a failed outcome.
    pub fn failure(&self) -> Option<ChainError> {
        if self.success() {
            return None;
        }
        Some(self.error.clone().unwrap_or_else(|| {
            ChainError::Rpc(format!("{} stopped at stage {}", self.kind, self.stage))
        }))
    }

    pub fn tx_hash_hex(&self) -> String {
        self.tx_hash
            .map(|hash| format_lower_hex(&hash))
            .unwrap_or_default()
    }
}

/// Sum of the gas values that are present. Unmined transactions add nothing.
pub fn sum_gas_used<'a>(outcomes: impl IntoIterator<Item = &'a TransactionOutcome>) -> U256 {
    outcomes
        .into_iter()
        .filter_map(|outcome| outcome.gas_used)
        .fold(U256::zero(), |total, gas| total + gas)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStatus {
    Trading,
    Completed,
    Halted,
    AddingLiquidity,
    Unknown,
}

/// Status codes as published by the platform contract's `STATUS_*` getters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenStatusConstants {
    pub trading: U256,
    pub completed: U256,
    pub halt: U256,
    pub adding_liquidity: U256,
}

impl TokenStatusConstants {
    pub fn classify(&self, status_code: U256) -> TokenStatus {
        if status_code == self.trading {
            TokenStatus::Trading
        } else if status_code == self.completed {
            TokenStatus::Completed
        } else if status_code == self.halt {
            TokenStatus::Halted
        } else if status_code == self.adding_liquidity {
            TokenStatus::AddingLiquidity
        } else {
            TokenStatus::Unknown
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenStatusInfo {
    pub status_code: U256,
    pub status: TokenStatus,
}

impl TokenStatusInfo {
    pub fn can_trade(&self) -> bool {
        self.status == TokenStatus::Trading
    }
}

/// Approval plus sell. Succeeds only when both transactions confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellOutcome {
    pub token_address: Address,
    pub balance: U256,
    pub decimals: u8,
    pub sell_amount: U256,
    pub approve: Option<TransactionOutcome>,
    pub sell: Option<TransactionOutcome>,
    /// Set when the sell could not be built after a confirmed approval.
    pub error: Option<ChainError>,
}

impl SellOutcome {
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionOutcome> {
        self.approve.iter().chain(self.sell.iter())
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
            && matches!(&self.approve, Some(outcome) if outcome.success())
            && matches!(&self.sell, Some(outcome) if outcome.success())
    }

    pub fn failure(&self) -> Option<ChainError> {
        if self.success() {
            return None;
        }
        if let Some(err) = &self.error {
            return Some(err.clone());
        }
        self.transactions()
            .find_map(TransactionOutcome::failure)
            .or_else(|| Some(ChainError::Rpc("sell transaction missing".to_string())))
    }

    pub fn gas_used(&self) -> U256 {
        sum_gas_used(self.transactions())
    }
}
