use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use strum_macros::Display;

use crate::types::{
    sum_gas_used, SellOutcome, SessionToken, TokenCreationRequest, TransactionOutcome,
    WorkflowError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    BalanceCheck,
    TokenCreated,
    TokenBought,
    TokenSold,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageSource {
    /// Let the platform use its default logo.
    #[default]
    None,
    /// Already hosted, used as is.
    Url(String),
    /// Local file, uploaded before creation.
    File(PathBuf),
}

impl ImageSource {
    pub fn label(&self) -> Option<String> {
        match self {
            ImageSource::None => None,
            ImageSource::Url(url) => Some(url.clone()),
            ImageSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
        }
    }
}

/// Everything one wallet's run needs besides the wallet itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub token: TokenCreationRequest,
    pub image: ImageSource,
    pub purchase_amount: U256,
    pub sell_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base_url: String,
    pub rpc_url: String,
}

/// Per-wallet state threaded through the workflow steps.
#[derive(Debug, Clone)]
pub struct WorkflowContext {
    pub index: usize,
    pub total: usize,
    pub wallet_address: Address,
    pub session: Option<SessionToken>,
    pub endpoints: Endpoints,
    pub exit: Arc<AtomicBool>,
    label: String,
}

impl WorkflowContext {
    pub fn new(
        index: usize,
        total: usize,
        wallet_address: Address,
        endpoints: Endpoints,
        exit: Arc<AtomicBool>,
    ) -> Self {
        let address = format!("{:#x}", wallet_address);
        let label = format!(
            "wallet {}/{} {}...{}",
            index,
            total,
            &address[..10],
            &address[address.len() - 6..]
        );
        Self {
            index,
            total,
            wallet_address,
            session: None,
            endpoints,
            exit,
            label,
        }
    }

    /// Prefix for this wallet's log lines.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_cancelled(&self) -> bool {
        self.exit.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowResult {
    pub index: usize,
    pub wallet_address: Address,
    pub token: TokenCreationRequest,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub steps_completed: Vec<WorkflowStep>,
    pub create_tx: Option<TransactionOutcome>,
    pub buy_tx: Option<TransactionOutcome>,
    pub sell: Option<SellOutcome>,
    pub token_address: Option<Address>,
    pub error: Option<WorkflowError>,
}

impl WorkflowResult {
    pub fn new(index: usize, wallet_address: Address, plan: &LaunchPlan) -> Self {
        Self {
            index,
            wallet_address,
            token: plan.token.clone(),
            image: plan.image.label(),
            image_url: None,
            steps_completed: Vec::new(),
            create_tx: None,
            buy_tx: None,
            sell: None,
            token_address: None,
            error: None,
        }
    }

    pub fn success(&self) -> bool {
        self.error.is_none()
    }

    pub fn mark(&mut self, step: WorkflowStep) {
        self.steps_completed.push(step);
    }

    pub fn transactions(&self) -> impl Iterator<Item = &TransactionOutcome> {
        self.create_tx
            .iter()
            .chain(self.buy_tx.iter())
            .chain(self.sell.iter().flat_map(|sell| sell.transactions()))
    }

    pub fn total_gas_used(&self) -> U256 {
        sum_gas_used(self.transactions())
    }

    pub fn error_kind(&self) -> Option<&'static str> {
        self.error.as_ref().map(WorkflowError::kind)
    }
}
