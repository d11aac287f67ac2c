use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use ethers::{
    abi::{AbiParser, Token},
    contract::parse_log,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{
        transaction::eip2718::TypedTransaction, Address, BlockId, BlockNumber, TransactionReceipt,
        TransactionRequest, H256, U256, U64,
    },
};
use meme_launch_utils::{
    abi::{
        Erc20Abigen, TokenCreateFilter, TokenManager2Abigen, TOKEN_INFOS_SIGNATURE,
        TOKEN_INFOS_STATUS_INDEX,
    },
    constants::SELL_AMOUNT_QUANTUM_18_DECIMALS,
    utils::{compute_transaction_hash, to_legacy_tx, to_signed_tx},
};
use provider_utils::http_providers::HttpProviders;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use tokio::time;
use tokio_stream::{wrappers::IntervalStream, StreamExt};

use crate::{
    constants::Env,
    core::GasPrice,
    types::{
        ChainError, CreationAuthorization, SellOutcome, TokenStatusConstants, TokenStatusInfo,
        TransactionOutcome, TxKind, TxStage,
    },
};

/// On-chain operations the launch workflow depends on.
#[async_trait]
pub trait LaunchChain: Send + Sync {
    fn wallet_address(&self) -> Address;

    /// Native balance of the signing wallet.
    async fn get_balance(&self) -> Result<U256, ChainError>;

    async fn submit_create_token(&self, authorization: &CreationAuthorization)
        -> TransactionOutcome;

    async fn buy_token(&self, token: Address, funds: U256) -> TransactionOutcome;

    /// Poll the wallet's token balance until it is non-zero.
    async fn wait_for_token_balance(
        &self,
        token: Address,
        timeout: Duration,
    ) -> Result<U256, ChainError>;

    /// Status check, approve and sell `percentage` of the held balance.
    async fn sell_token_complete(&self, token: Address, percentage: Decimal) -> SellOutcome;
}

#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub gas_price_markup_percent: u64,
    pub create_gas_markup_percent: u64,
    pub default_create_gas: U256,
    pub buy_gas: U256,
    pub approve_gas: U256,
    pub sell_gas: U256,
    pub transfer_gas: U256,
    pub receipt_timeout: Duration,
    pub poll_interval: Duration,
    pub balance_poll_interval: Duration,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            gas_price_markup_percent: 110,
            create_gas_markup_percent: 120,
            default_create_gas: U256::from(500_000),
            buy_gas: U256::from(300_000),
            approve_gas: U256::from(100_000),
            sell_gas: U256::from(1_000_000),
            transfer_gas: U256::from(100_000),
            receipt_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(3),
            balance_poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChainService<M: Middleware + 'static> {
    client: Arc<M>,
    wallet: LocalWallet,
    chain_id: U64,
    token_manager_address: Address,
    settings: ChainSettings,
    exit: Arc<AtomicBool>,
}

impl ChainService<Provider<Http>> {
    pub async fn from_env(env: &Env, wallet: LocalWallet) -> anyhow::Result<Self> {
        let http_provider = HttpProviders::get_healthy_provider(
            &env.listen_network,
            false,
            env.rpc_url.as_deref(),
        )
        .await?;
        let settings = ChainSettings {
            receipt_timeout: env.receipt_timeout,
            ..ChainSettings::default()
        };

        Ok(Self::new(
            Arc::new(http_provider),
            wallet,
            env.chain_id,
            env.token_manager_address,
            settings,
            env.exit.clone(),
        ))
    }
}

impl<M: Middleware + 'static> ChainService<M> {
    pub fn new(
        client: Arc<M>,
        wallet: LocalWallet,
        chain_id: U64,
        token_manager_address: Address,
        settings: ChainSettings,
        exit: Arc<AtomicBool>,
    ) -> Self {
        let wallet = wallet.with_chain_id(chain_id.as_u64());
        Self {
            client,
            wallet,
            chain_id,
            token_manager_address,
            settings,
            exit,
        }
    }

    pub async fn balance_of(&self, address: Address) -> Result<U256, ChainError> {
        self.client
            .get_balance(address, None)
            .await
            .map_err(|err| ChainError::Rpc(format!("balance of {:#x}: {}", address, err)))
    }

    /// Estimated gas with the creation markup, or `fallback` when estimation fails.
    pub async fn estimate_gas(&self, tx: &TypedTransaction, fallback: U256) -> U256 {
        match self.client.estimate_gas(tx, None).await {
            Ok(estimated) => GasPrice::with_markup(estimated, self.settings.create_gas_markup_percent),
            Err(err) => {
                log::warn!(
                    "[ChainService] estimate gas failed, using {}: {}",
                    fallback,
                    err
                );
                fallback
            }
        }
    }

    pub async fn get_gas_price(&self) -> Result<U256, ChainError> {
        GasPrice::fetch(self.client.as_ref(), self.settings.gas_price_markup_percent).await
    }

    pub async fn nonce(&self, pending: bool) -> Result<U256, ChainError> {
        let block = if pending {
            BlockNumber::Pending
        } else {
            BlockNumber::Latest
        };
        self.client
            .get_transaction_count(self.wallet.address(), Some(BlockId::Number(block)))
            .await
            .map_err(|err| ChainError::Rpc(format!("nonce: {}", err)))
    }

    async fn prepare_tx(
        &self,
        mut tx: TypedTransaction,
        pending_nonce: bool,
        gas: U256,
    ) -> Result<TypedTransaction, ChainError> {
        let nonce = self.nonce(pending_nonce).await?;
        let gas_price = self.get_gas_price().await?;

        tx.set_chain_id(self.chain_id);
        tx.set_from(self.wallet.address());
        tx.set_nonce(nonce);
        tx.set_gas(gas);
        tx.set_gas_price(gas_price);
        Ok(to_legacy_tx(tx))
    }

    /// Sign, broadcast and wait for `tx`; every failure is captured in the outcome.
    pub async fn send_and_confirm(&self, kind: TxKind, tx: TypedTransaction) -> TransactionOutcome {
        self.send_and_confirm_receipt(kind, tx).await.0
    }

    pub async fn send_and_confirm_receipt(
        &self,
        kind: TxKind,
        tx: TypedTransaction,
    ) -> (TransactionOutcome, Option<TransactionReceipt>) {
        let mut outcome = TransactionOutcome::new(kind);

        let signed_tx = match to_signed_tx(&self.wallet, &tx).await {
            Ok(signed_tx) => signed_tx,
            Err(err) => {
                outcome.stage = TxStage::Failed;
                outcome.error = Some(err.into());
                return (outcome, None);
            }
        };
        outcome.stage = TxStage::Signed;
        let tx_hash = compute_transaction_hash(&signed_tx);
        outcome.tx_hash = Some(tx_hash);

        if let Err(err) = self.client.send_raw_transaction(signed_tx).await {
            log::error!("[ChainService] {} broadcast failed: {}", kind, err);
            outcome.stage = TxStage::Failed;
            outcome.error = Some(ChainError::Broadcast(err.to_string()));
            return (outcome, None);
        }
        outcome.stage = TxStage::Submitted;
        log::info!("[ChainService] {} submitted {:#x}", kind, tx_hash);

        outcome.stage = TxStage::Pending;
        match self.wait_for_receipt(tx_hash).await {
            Ok(receipt) => {
                outcome.stage = TxStage::Confirmed;
                outcome.block_number = receipt.block_number;
                outcome.gas_used = receipt.gas_used;
                log::info!(
                    "[ChainService] {} {:#x} confirmed in block {:?}",
                    kind,
                    tx_hash,
                    receipt.block_number
                );
                (outcome, Some(receipt))
            }
            Err(err) => {
                log::error!("[ChainService] {} {:#x}: {}", kind, tx_hash, err);
                // a cancelled wait leaves the transaction in flight
                outcome.stage = match err {
                    ChainError::Timeout { .. } => TxStage::TimedOut,
                    ChainError::Cancelled { .. } => TxStage::Pending,
                    _ => TxStage::Failed,
                };
                if let ChainError::TransactionReverted {
                    block_number,
                    gas_used,
                    ..
                } = &err
                {
                    outcome.block_number = *block_number;
                    outcome.gas_used = *gas_used;
                }
                outcome.error = Some(err);
                (outcome, None)
            }
        }
    }

    pub async fn wait_for_receipt(&self, tx_hash: H256) -> Result<TransactionReceipt, ChainError> {
        let started = Instant::now();
        let mut stream = IntervalStream::new(time::interval(self.settings.poll_interval));
        while stream.next().await.is_some() {
            if self.exit.load(Ordering::Relaxed) {
                return Err(ChainError::Cancelled {
                    tx_hash: Some(tx_hash),
                });
            }

            match self.client.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    if receipt.status == Some(U64::zero()) {
                        return Err(ChainError::TransactionReverted {
                            tx_hash,
                            block_number: receipt.block_number,
                            gas_used: receipt.gas_used,
                        });
                    }
                    return Ok(receipt);
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("[ChainService] receipt {:#x}: {}", tx_hash, err);
                }
            }

            if started.elapsed() >= self.settings.receipt_timeout {
                break;
            }
        }

        Err(ChainError::Timeout {
            tx_hash,
            timeout_secs: self.settings.receipt_timeout.as_secs(),
        })
    }

    pub async fn get_status_constants(&self) -> Result<TokenStatusConstants, ChainError> {
        let token_manager = TokenManager2Abigen::new(self.token_manager_address, self.client.clone());
        let contract_err = |err: ethers::contract::ContractError<M>| {
            ChainError::Contract(format!("status constants: {}", err))
        };

        Ok(TokenStatusConstants {
            trading: token_manager.status_trading().call().await.map_err(contract_err)?,
            completed: token_manager.status_completed().call().await.map_err(contract_err)?,
            halt: token_manager.status_halt().call().await.map_err(contract_err)?,
            adding_liquidity: token_manager
                .status_adding_liquidity()
                .call()
                .await
                .map_err(contract_err)?,
        })
    }

    pub async fn get_token_status(&self, token: Address) -> Result<TokenStatusInfo, ChainError> {
        let function = AbiParser::default()
            .parse_function(TOKEN_INFOS_SIGNATURE)
            .map_err(|err| ChainError::Contract(err.to_string()))?;
        let data = function
            .encode_input(&[Token::Address(token)])
            .map_err(|err| ChainError::Contract(err.to_string()))?;
        let call: TypedTransaction = TransactionRequest::new()
            .to(self.token_manager_address)
            .data(data)
            .into();

        let output = self
            .client
            .call(&call, None)
            .await
            .map_err(|err| ChainError::Rpc(format!("token infos: {}", err)))?;
        let tokens = function
            .decode_output(&output)
            .map_err(|err| ChainError::Contract(format!("token infos: {}", err)))?;
        let status_code = tokens
            .get(TOKEN_INFOS_STATUS_INDEX)
            .cloned()
            .and_then(Token::into_uint)
            .ok_or_else(|| ChainError::Contract("token infos missing status".to_string()))?;

        let constants = self.get_status_constants().await?;

        Ok(TokenStatusInfo {
            status_code,
            status: constants.classify(status_code),
        })
    }

    pub async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ChainError> {
        Erc20Abigen::new(token, self.client.clone())
            .balance_of(owner)
            .call()
            .await
            .map_err(|err| ChainError::Contract(format!("balance of {:#x}: {}", token, err)))
    }

    pub async fn token_decimals(&self, token: Address) -> Result<u8, ChainError> {
        Erc20Abigen::new(token, self.client.clone())
            .decimals()
            .call()
            .await
            .map_err(|err| ChainError::Contract(format!("decimals of {:#x}: {}", token, err)))
    }

    pub async fn approve(&self, token: Address, spender: Address, amount: U256) -> TransactionOutcome {
        let tx = Erc20Abigen::new(token, self.client.clone())
            .approve(spender, amount)
            .tx;
        match self.prepare_tx(tx, true, self.settings.approve_gas).await {
            Ok(tx) => self.send_and_confirm(TxKind::Approve, tx).await,
            Err(err) => failed_outcome(TxKind::Approve, err),
        }
    }

    pub async fn transfer_token(&self, token: Address, to: Address, amount: U256) -> TransactionOutcome {
        let tx = Erc20Abigen::new(token, self.client.clone())
            .transfer(to, amount)
            .tx;
        match self.prepare_tx(tx, true, self.settings.transfer_gas).await {
            Ok(tx) => self.send_and_confirm(TxKind::Transfer, tx).await,
            Err(err) => failed_outcome(TxKind::Transfer, err),
        }
    }

    async fn sell(&self, token: Address, amount: U256) -> TransactionOutcome {
        let tx = TokenManager2Abigen::new(self.token_manager_address, self.client.clone())
            .sell_token(token, amount)
            .tx;
        match self.prepare_tx(tx, true, self.settings.sell_gas).await {
            Ok(tx) => self.send_and_confirm(TxKind::SellToken, tx).await,
            Err(err) => failed_outcome(TxKind::SellToken, err),
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> LaunchChain for ChainService<M> {
    fn wallet_address(&self) -> Address {
        self.wallet.address()
    }

    async fn get_balance(&self) -> Result<U256, ChainError> {
        self.balance_of(self.wallet.address()).await
    }

    async fn submit_create_token(
        &self,
        authorization: &CreationAuthorization,
    ) -> TransactionOutcome {
        let mut tx = TokenManager2Abigen::new(self.token_manager_address, self.client.clone())
            .create_token(
                authorization.create_arg.clone(),
                authorization.signature.clone(),
            )
            .tx;
        tx.set_from(self.wallet.address());
        tx.set_value(U256::zero());

        let gas = self.estimate_gas(&tx, self.settings.default_create_gas).await;
        let tx = match self.prepare_tx(tx, false, gas).await {
            Ok(tx) => tx,
            Err(err) => return failed_outcome(TxKind::CreateToken, err),
        };

        let (mut outcome, receipt) = self.send_and_confirm_receipt(TxKind::CreateToken, tx).await;
        let Some(receipt) = receipt else {
            return outcome;
        };

        match parse_created_token_address(&receipt, self.token_manager_address) {
            Ok(token_address) => {
                log::info!("[ChainService] token created {:#x}", token_address);
                outcome.token_address = Some(token_address);
            }
            Err(err) => {
                log::error!("[ChainService] {}", err);
                outcome.error = Some(err);
            }
        }
        outcome
    }

    async fn buy_token(&self, token: Address, funds: U256) -> TransactionOutcome {
        let mut tx = TokenManager2Abigen::new(self.token_manager_address, self.client.clone())
            .buy_token_amap(token, funds, U256::zero())
            .tx;
        tx.set_value(funds);
        match self.prepare_tx(tx, true, self.settings.buy_gas).await {
            Ok(tx) => self.send_and_confirm(TxKind::BuyToken, tx).await,
            Err(err) => failed_outcome(TxKind::BuyToken, err),
        }
    }

    async fn wait_for_token_balance(
        &self,
        token: Address,
        timeout: Duration,
    ) -> Result<U256, ChainError> {
        let started = Instant::now();
        let mut stream = IntervalStream::new(time::interval(self.settings.balance_poll_interval));
        while stream.next().await.is_some() {
            if self.exit.load(Ordering::Relaxed) {
                return Err(ChainError::Cancelled { tx_hash: None });
            }
            match self.token_balance(token, self.wallet.address()).await {
                Ok(balance) if !balance.is_zero() => return Ok(balance),
                Ok(_) => {}
                Err(err) => log::warn!("[ChainService] {}", err),
            }
            if started.elapsed() >= timeout {
                break;
            }
        }
        Err(ChainError::InsufficientBalance {
            balance: U256::zero(),
        })
    }

    async fn sell_token_complete(&self, token: Address, percentage: Decimal) -> SellOutcome {
        let mut outcome = SellOutcome {
            token_address: token,
            balance: U256::zero(),
            decimals: 0,
            sell_amount: U256::zero(),
            approve: None,
            sell: None,
            error: None,
        };

        if let Err(err) = validate_sell_percentage(percentage) {
            outcome.error = Some(err);
            return outcome;
        }

        match self.get_token_status(token).await {
            Ok(status) if status.can_trade() => {}
            Ok(status) => {
                outcome.error = Some(ChainError::NotTradable(status.status));
                return outcome;
            }
            Err(err) => {
                outcome.error = Some(err);
                return outcome;
            }
        }

        let balance = match self.token_balance(token, self.wallet.address()).await {
            Ok(balance) => balance,
            Err(err) => {
                outcome.error = Some(err);
                return outcome;
            }
        };
        outcome.balance = balance;
        if balance.is_zero() {
            outcome.error = Some(ChainError::InsufficientBalance { balance });
            return outcome;
        }
        let decimals = match self.token_decimals(token).await {
            Ok(decimals) => decimals,
            Err(err) => {
                outcome.error = Some(err);
                return outcome;
            }
        };
        outcome.decimals = decimals;

        let sell_amount = match compute_sell_amount(balance, percentage, decimals) {
            Ok(sell_amount) => sell_amount,
            Err(err) => {
                outcome.error = Some(err);
                return outcome;
            }
        };
        outcome.sell_amount = sell_amount;
        log::info!(
            "[ChainService] selling {} of {} ({}%) of {:#x}",
            sell_amount,
            balance,
            percentage,
            token
        );

        let approve = self
            .approve(token, self.token_manager_address, sell_amount)
            .await;
        let approved = approve.success();
        outcome.approve = Some(approve);
        if !approved {
            return outcome;
        }

        outcome.sell = Some(self.sell(token, sell_amount).await);
        outcome
    }
}

fn failed_outcome(kind: TxKind, err: ChainError) -> TransactionOutcome {
    log::error!("[ChainService] {} not sent: {}", kind, err);
    TransactionOutcome {
        stage: TxStage::Failed,
        error: Some(err),
        ..TransactionOutcome::new(kind)
    }
}

/// Token address from the `TokenCreate` event emitted by `token_manager`.
pub fn parse_created_token_address(
    receipt: &TransactionReceipt,
    token_manager: Address,
) -> Result<Address, ChainError> {
    receipt
        .logs
        .iter()
        .filter(|log| log.address == token_manager)
        .find_map(|log| parse_log::<TokenCreateFilter>(log.clone()).ok())
        .map(|event| event.token)
        .ok_or(ChainError::MissingCreateEvent {
            tx_hash: receipt.transaction_hash,
        })
}

pub fn validate_sell_percentage(percentage: Decimal) -> Result<(), ChainError> {
    if percentage <= Decimal::ZERO || percentage > Decimal::ONE_HUNDRED {
        return Err(ChainError::InvalidPercentage(percentage));
    }
    Ok(())
}

/// Floor `amount` to what the platform accepts for a token with `decimals`.
pub fn quantize_sell_amount(amount: U256, decimals: u8) -> U256 {
    if decimals != 18 {
        return amount;
    }
    let quantum = U256::from(SELL_AMOUNT_QUANTUM_18_DECIMALS);
    amount / quantum * quantum
}

/// `percentage` of `balance`, at basis point precision, quantized.
pub fn compute_sell_amount(
    balance: U256,
    percentage: Decimal,
    decimals: u8,
) -> Result<U256, ChainError> {
    validate_sell_percentage(percentage)?;
    let basis_points = (percentage * Decimal::ONE_HUNDRED)
        .trunc()
        .to_u64()
        .ok_or(ChainError::InvalidPercentage(percentage))?;

    let raw_amount = if basis_points >= 10_000 {
        balance
    } else {
        balance
            .checked_mul(U256::from(basis_points))
            .map(|amount| amount / U256::from(10_000))
            .ok_or(ChainError::InsufficientBalance { balance })?
    };
    let sell_amount = quantize_sell_amount(raw_amount, decimals);
    if sell_amount.is_zero() {
        return Err(ChainError::InsufficientBalance { balance });
    }
    Ok(sell_amount)
}
