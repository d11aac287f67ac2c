use std::{fmt::LowerHex, str::FromStr};

use ethers::{
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, Bytes, Signature, TransactionRequest, H256,
    },
    utils::keccak256,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("malformed transaction: missing {0}")]
    MalformedTransaction(&'static str),
    #[error("signing failed: {0}")]
    Signing(String),
}

pub fn compute_transaction_hash(raw_tx: &Bytes) -> H256 {
    H256::from(keccak256(raw_tx))
}

pub fn to_legacy_tx(tx: TypedTransaction) -> TypedTransaction {
    match tx {
        TypedTransaction::Eip1559(inner) => {
            let tx: TransactionRequest = inner.into();
            TypedTransaction::Legacy(tx)
        }
        other => other,
    }
}

/// Sign `tx` and return its raw RLP encoding.
///
/// Nonce, gas, gas price and chain id must already be set, the result is then
/// fully determined by the transaction fields and the key.
pub async fn to_signed_tx(wallet: &LocalWallet, tx: &TypedTransaction) -> Result<Bytes, SignerError> {
    if tx.nonce().is_none() {
        return Err(SignerError::MalformedTransaction("nonce"));
    }
    if tx.gas().is_none() {
        return Err(SignerError::MalformedTransaction("gas"));
    }
    if tx.gas_price().is_none() {
        return Err(SignerError::MalformedTransaction("gas_price"));
    }
    if tx.chain_id().is_none() {
        return Err(SignerError::MalformedTransaction("chain_id"));
    }
    let signature = wallet
        .sign_transaction(tx)
        .await
        .map_err(|err| SignerError::Signing(err.to_string()))?;
    Ok(tx.rlp_signed(&signature))
}

/// Prefix `0x` when missing; keys and addresses in wallet files often lack it.
pub fn with_hex_prefix(value: &str) -> String {
    let value = value.trim();
    if value.starts_with("0x") || value.starts_with("0X") {
        value.to_string()
    } else {
        format!("0x{}", value)
    }
}

pub fn load_private_key_wallet(private_key: &str) -> Result<LocalWallet, SignerError> {
    LocalWallet::from_str(private_key.trim()).map_err(|err| SignerError::InvalidKey(err.to_string()))
}

pub fn derive_address(private_key: &str) -> Result<Address, SignerError> {
    Ok(load_private_key_wallet(private_key)?.address())
}

/// EIP-191 personal message signature, so it can never be replayed as a transaction.
pub async fn sign_text(wallet: &LocalWallet, message: &str) -> Result<Signature, SignerError> {
    wallet
        .sign_message(message)
        .await
        .map_err(|err| SignerError::Signing(err.to_string()))
}

pub fn format_signature(signature: &Signature) -> String {
    format!("0x{}", hex::encode(signature.to_vec()))
}

pub fn format_lower_hex(hash: &impl LowerHex) -> String {
    format!("{:#x}", hash)
}
