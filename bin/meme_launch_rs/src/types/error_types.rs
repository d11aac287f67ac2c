use ethers::types::{H256, U256, U64};
use meme_launch_utils::{units::UnitsError, utils::SignerError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::TokenStatus;

/// Rejected input: a wallet line field or a token metadata field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors for launch platform API requests.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request failed at the transport level.
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    /// The service answered with a non-success code.
    #[error("api error code {code}: {message}")]
    Api { code: String, message: String },
    /// Login was rejected or the challenge could not be signed.
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("image upload failed: {0}")]
    Upload(String),
    /// Token creation was refused, `raw` keeps the full response body.
    #[error("token creation request failed: {message}")]
    CreationRequest { message: String, raw: String },
    /// The response could not be deserialized.
    #[error("Deserialization error: {err}. Response: {text}")]
    ResponseSerdeJson {
        err: serde_json::Error,
        text: String,
    },
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Connection failures, timeouts and 5xx answers; everything else is final.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Request(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().map_or(false, |status| status.is_server_error())
            }
            _ => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("contract error: {0}")]
    Contract(String),
    #[error(transparent)]
    Signing(#[from] SignerError),
    #[error("broadcast failed: {0}")]
    Broadcast(String),
    #[error("transaction {tx_hash:#x} reverted")]
    TransactionReverted {
        tx_hash: H256,
        block_number: Option<U64>,
        gas_used: Option<U256>,
    },
    #[error("transaction {tx_hash:#x} not mined within {timeout_secs}s")]
    Timeout { tx_hash: H256, timeout_secs: u64 },
    #[error("cancelled while waiting for {tx_hash:?}")]
    Cancelled { tx_hash: Option<H256> },
    #[error("insufficient token balance {balance}")]
    InsufficientBalance { balance: U256 },
    #[error("sell percentage {0} outside (0, 100]")]
    InvalidPercentage(Decimal),
    #[error("token not tradable, status {0:?}")]
    NotTradable(TokenStatus),
    #[error("creation receipt {tx_hash:#x} has no TokenCreate event")]
    MissingCreateEvent { tx_hash: H256 },
    #[error(transparent)]
    Units(#[from] UnitsError),
}

impl ChainError {
    pub fn kind(&self) -> &'static str {
        match self {
            ChainError::Rpc(_) => "RpcError",
            ChainError::Contract(_) => "ContractError",
            ChainError::Signing(_) => "SigningError",
            ChainError::Broadcast(_) => "BroadcastError",
            ChainError::TransactionReverted { .. } => "TransactionReverted",
            ChainError::Timeout { .. } => "Timeout",
            ChainError::Cancelled { .. } => "Cancelled",
            ChainError::InsufficientBalance { .. } => "InsufficientBalance",
            ChainError::InvalidPercentage(_) => "InvalidPercentage",
            ChainError::NotTradable(_) => "NotTradable",
            ChainError::MissingCreateEvent { .. } => "MissingCreateEvent",
            ChainError::Units(_) => "UnitsError",
        }
    }
}

/// Terminal error of one wallet's workflow. Never escapes the batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("insufficient funds: balance {balance} below required {required}")]
    InsufficientFunds { balance: String, required: String },
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("image upload failed: {0}")]
    Upload(String),
    #[error("creation request failed: {0}")]
    CreationRequest(String),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error("cancelled")]
    Cancelled,
}

impl WorkflowError {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Validation(_) => "ValidationError",
            WorkflowError::InsufficientFunds { .. } => "InsufficientFunds",
            WorkflowError::Auth(_) => "AuthError",
            WorkflowError::Api(_) => "ApiError",
            WorkflowError::Upload(_) => "UploadError",
            WorkflowError::CreationRequest(_) => "CreationRequestError",
            WorkflowError::Chain(err) => err.kind(),
            WorkflowError::Cancelled => "Cancelled",
        }
    }
}

impl From<ApiError> for WorkflowError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(message) => WorkflowError::Auth(message),
            ApiError::Upload(message) => WorkflowError::Upload(message),
            ApiError::CreationRequest { message, .. } => WorkflowError::CreationRequest(message),
            other => WorkflowError::Api(other.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum WalletFileError {
    #[error("cannot read wallet file {path:?}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("wallet file {0:?} has no usable wallet lines")]
    Empty(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_workflow_kinds() {
        let auth: WorkflowError = ApiError::Auth("bad signature".into()).into();
        assert_eq!(auth.kind(), "AuthError");

        let create: WorkflowError = ApiError::CreationRequest {
            message: "code 1001".into(),
            raw: "{}".into(),
        }
        .into();
        assert_eq!(create.kind(), "CreationRequestError");

        let api: WorkflowError = ApiError::Api {
            code: "500".into(),
            message: "busy".into(),
        }
        .into();
        assert_eq!(api.kind(), "ApiError");
    }

    #[test]
    fn chain_kind_passes_through() {
        let err = WorkflowError::from(ChainError::MissingCreateEvent {
            tx_hash: H256::zero(),
        });
        assert_eq!(err.kind(), "MissingCreateEvent");
    }
}
