use std::{sync::Arc, time::Duration};

use ethers::{signers::LocalWallet, types::U256};
use meme_launch_utils::units::from_base_units;
use rust_decimal::Decimal;

use crate::{
    constants::{Env, NATIVE_DECIMALS},
    core::{ImageUpload, LaunchApi, LaunchChain},
    types::{
        ChainError, ImageSource, LaunchPlan, TransactionOutcome, WorkflowContext, WorkflowError,
        WorkflowResult, WorkflowStep,
    },
};

#[derive(Debug, Clone)]
pub struct WorkflowSettings {
    pub min_native_balance: U256,
    /// Upper bound for a bought token to show up in the wallet's balance.
    pub settle_timeout: Duration,
}

impl WorkflowSettings {
    pub fn from_env(env: &Env) -> Self {
        Self {
            min_native_balance: env.min_native_balance,
            ..Self::default()
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            min_native_balance: U256::exp10(16),
            settle_timeout: Duration::from_secs(30),
        }
    }
}

/// Runs the launch steps for one wallet: balance check, login, image,
/// creation authorization, create, optional buy, optional sell.
pub struct WorkflowService<A: LaunchApi + ?Sized, C: LaunchChain> {
    api: Arc<A>,
    chain: C,
    settings: WorkflowSettings,
}

impl<A: LaunchApi + ?Sized, C: LaunchChain> WorkflowService<A, C> {
    pub fn new(api: Arc<A>, chain: C, settings: WorkflowSettings) -> Self {
        Self {
            api,
            chain,
            settings,
        }
    }

    /// Never fails: every error ends up in the returned result next to the
    /// outcomes of the steps that did complete.
    pub async fn run(
        &self,
        ctx: &mut WorkflowContext,
        wallet: &LocalWallet,
        plan: &LaunchPlan,
    ) -> WorkflowResult {
        let mut result = WorkflowResult::new(ctx.index, ctx.wallet_address, plan);
        log::info!(
            "[WorkflowService] {} launching {} ({})",
            ctx.label(),
            plan.token.name,
            plan.token.symbol
        );

        match self.execute(ctx, wallet, plan, &mut result).await {
            Ok(()) => log::info!(
                "[WorkflowService] {} done, steps {:?}",
                ctx.label(),
                result.steps_completed
            ),
            Err(err) => {
                log::error!(
                    "[WorkflowService] {} failed [{}]: {}",
                    ctx.label(),
                    err.kind(),
                    err
                );
                result.error = Some(err);
            }
        }
        result
    }

    async fn execute(
        &self,
        ctx: &mut WorkflowContext,
        wallet: &LocalWallet,
        plan: &LaunchPlan,
        result: &mut WorkflowResult,
    ) -> Result<(), WorkflowError> {
        plan.token.validate()?;
        ensure_active(ctx)?;

        let balance = self.chain.get_balance().await?;
        let required = self.settings.min_native_balance.max(plan.purchase_amount);
        if balance < required {
            return Err(WorkflowError::InsufficientFunds {
                balance: display_native(balance),
                required: display_native(required),
            });
        }
        result.mark(WorkflowStep::BalanceCheck);

        ensure_active(ctx)?;
        let session = self.api.authenticate(wallet).await?;
        ctx.session = Some(session.clone());

        let image_url = match &plan.image {
            ImageSource::None => None,
            ImageSource::Url(url) => Some(url.clone()),
            ImageSource::File(path) => {
                ensure_active(ctx)?;
                let image = ImageUpload::from_path(path)?;
                Some(self.api.upload_image(&session, image).await?)
            }
        };
        result.image_url = image_url.clone();
        let token = plan.token.clone().with_image_url(image_url);
        token.validate()?;

        ensure_active(ctx)?;
        let authorization = self.api.request_token_creation(&session, &token).await?;

        ensure_active(ctx)?;
        let create = self.chain.submit_create_token(&authorization).await;
        let token_address = create.token_address;
        let tx_hash = create.tx_hash;
        record(&mut result.create_tx, create)?;
        let token_address = token_address.ok_or_else(|| ChainError::MissingCreateEvent {
            tx_hash: tx_hash.unwrap_or_default(),
        })?;
        result.token_address = Some(token_address);
        result.mark(WorkflowStep::TokenCreated);

        let sell_requested = plan.sell_percentage > Decimal::ZERO;
        if !plan.purchase_amount.is_zero() {
            ensure_active(ctx)?;
            let buy = self.chain.buy_token(token_address, plan.purchase_amount).await;
            record(&mut result.buy_tx, buy)?;
            result.mark(WorkflowStep::TokenBought);

            if sell_requested {
                let settled = self
                    .chain
                    .wait_for_token_balance(token_address, self.settings.settle_timeout)
                    .await?;
                log::info!("[WorkflowService] {} holds {} base units", ctx.label(), settled);
            }
        }

        if sell_requested {
            ensure_active(ctx)?;
            let sell = self
                .chain
                .sell_token_complete(token_address, plan.sell_percentage)
                .await;
            let failure = sell.failure();
            result.sell = Some(sell);
            if let Some(err) = failure {
                return Err(err.into());
            }
            result.mark(WorkflowStep::TokenSold);
        }

        Ok(())
    }
}

fn ensure_active(ctx: &WorkflowContext) -> Result<(), WorkflowError> {
    if ctx.is_cancelled() {
        return Err(WorkflowError::Cancelled);
    }
    Ok(())
}

/// Store `outcome` in `slot`, then surface its failure.
fn record(
    slot: &mut Option<TransactionOutcome>,
    outcome: TransactionOutcome,
) -> Result<(), WorkflowError> {
    let failure = outcome.failure();
    *slot = Some(outcome);
    match failure {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn display_native(amount: U256) -> String {
    from_base_units(amount, NATIVE_DECIMALS)
        .map(|amount| amount.to_string())
        .unwrap_or_else(|_| amount.to_string())
}

#[cfg(test)]
mod tests {
    use std::{
        str::FromStr,
        sync::{
            atomic::{AtomicBool, Ordering},
            Mutex,
        },
    };

    use async_trait::async_trait;
    use ethers::{
        signers::Signer,
        types::{Address, Bytes, H256, U64},
    };
    use meme_launch_utils::utils::load_private_key_wallet;

    use super::*;
    use crate::types::{
        ApiError, CreationAuthorization, Endpoints, SellOutcome, SessionToken, TokenCreationRequest,
        TxKind, TxStage,
    };

    const FIXTURE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[derive(Default)]
    struct FakeApi {
        reject_creation: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeApi {
        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LaunchApi for FakeApi {
        async fn request_challenge(&self, _address: Address) -> Result<String, ApiError> {
            self.calls.lock().unwrap().push("challenge");
            Ok("123456".to_string())
        }

        async fn login(&self, _address: Address, _signature: &str) -> Result<SessionToken, ApiError> {
            self.calls.lock().unwrap().push("login");
            Ok(SessionToken::new("session"))
        }

        async fn upload_image(
            &self,
            _session: &SessionToken,
            _image: ImageUpload,
        ) -> Result<String, ApiError> {
            self.calls.lock().unwrap().push("upload");
            Ok("https://static.four.meme/market/image.png".to_string())
        }

        async fn request_token_creation(
            &self,
            _session: &SessionToken,
            _request: &TokenCreationRequest,
        ) -> Result<CreationAuthorization, ApiError> {
            self.calls.lock().unwrap().push("create");
            if self.reject_creation {
                return Err(ApiError::CreationRequest {
                    message: "code 5005: symbol already used".to_string(),
                    raw: r#"{"code":5005}"#.to_string(),
                });
            }
            Ok(CreationAuthorization {
                create_arg: Bytes::from(vec![1, 2, 3]),
                signature: Bytes::from(vec![4, 5, 6]),
            })
        }
    }

    struct FakeChain {
        balance: U256,
        emit_create_event: bool,
        fail_buy: bool,
        exit_after_create: Option<Arc<AtomicBool>>,
        calls: Mutex<Vec<TxKind>>,
    }

    impl Default for FakeChain {
        fn default() -> Self {
            Self {
                balance: U256::exp10(16) * U256::from(2),
                emit_create_event: true,
                fail_buy: false,
                exit_after_create: None,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    fn token() -> Address {
        Address::repeat_byte(0x42)
    }

    fn confirmed(kind: TxKind, byte: u8) -> TransactionOutcome {
        TransactionOutcome {
            stage: TxStage::Confirmed,
            tx_hash: Some(H256::repeat_byte(byte)),
            block_number: Some(U64::from(100)),
            gas_used: Some(U256::from(50_000)),
            ..TransactionOutcome::new(kind)
        }
    }

    #[async_trait]
    impl LaunchChain for Arc<FakeChain> {
        fn wallet_address(&self) -> Address {
            Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
        }

        async fn get_balance(&self) -> Result<U256, ChainError> {
            Ok(self.balance)
        }

        async fn submit_create_token(
            &self,
            _authorization: &CreationAuthorization,
        ) -> TransactionOutcome {
            self.calls.lock().unwrap().push(TxKind::CreateToken);
            if let Some(exit) = &self.exit_after_create {
                exit.store(true, Ordering::Relaxed);
            }
            let mut outcome = confirmed(TxKind::CreateToken, 1);
            if self.emit_create_event {
                outcome.token_address = Some(token());
            } else {
                outcome.error = Some(ChainError::MissingCreateEvent {
                    tx_hash: H256::repeat_byte(1),
                });
            }
            outcome
        }

        async fn buy_token(&self, _token: Address, _funds: U256) -> TransactionOutcome {
            self.calls.lock().unwrap().push(TxKind::BuyToken);
            if self.fail_buy {
                return TransactionOutcome {
                    stage: TxStage::Failed,
                    tx_hash: Some(H256::repeat_byte(2)),
                    gas_used: Some(U256::from(30_000)),
                    error: Some(ChainError::TransactionReverted {
                        tx_hash: H256::repeat_byte(2),
                        block_number: Some(U64::from(101)),
                        gas_used: Some(U256::from(30_000)),
                    }),
                    ..TransactionOutcome::new(TxKind::BuyToken)
                };
            }
            confirmed(TxKind::BuyToken, 2)
        }

        async fn wait_for_token_balance(
            &self,
            _token: Address,
            _timeout: Duration,
        ) -> Result<U256, ChainError> {
            Ok(U256::exp10(18))
        }

        async fn sell_token_complete(&self, token: Address, _percentage: Decimal) -> SellOutcome {
            self.calls.lock().unwrap().push(TxKind::SellToken);
            SellOutcome {
                token_address: token,
                balance: U256::exp10(18),
                decimals: 18,
                sell_amount: U256::exp10(18),
                approve: Some(confirmed(TxKind::Approve, 3)),
                sell: Some(confirmed(TxKind::SellToken, 4)),
                error: None,
            }
        }
    }

    fn plan(purchase_amount: U256, sell_percentage: u32) -> LaunchPlan {
        LaunchPlan {
            token: TokenCreationRequest {
                name: "Moon Token".to_string(),
                symbol: "MOON42".to_string(),
                description: "Moon Token is building the future of Web3.".to_string(),
                ..Default::default()
            },
            image: ImageSource::None,
            purchase_amount,
            sell_percentage: Decimal::from(sell_percentage),
        }
    }

    fn context(exit: Arc<AtomicBool>) -> WorkflowContext {
        WorkflowContext::new(
            1,
            1,
            load_private_key_wallet(FIXTURE_KEY).unwrap().address(),
            Endpoints {
                api_base_url: "http://localhost/meme-api".to_string(),
                rpc_url: "http://localhost:8545".to_string(),
            },
            exit,
        )
    }

    async fn run(
        api: Arc<FakeApi>,
        chain: Arc<FakeChain>,
        plan: LaunchPlan,
        exit: Arc<AtomicBool>,
    ) -> WorkflowResult {
        let wallet = load_private_key_wallet(FIXTURE_KEY).unwrap();
        let service = WorkflowService::new(api, chain, WorkflowSettings::default());
        service.run(&mut context(exit), &wallet, &plan).await
    }

    fn centi_native(amount: u64) -> U256 {
        U256::exp10(16) * U256::from(amount)
    }

    #[tokio::test]
    async fn full_launch_completes_every_step() {
        let api = Arc::new(FakeApi::default());
        let chain = Arc::new(FakeChain::default());
        let result = run(
            api.clone(),
            chain.clone(),
            plan(centi_native(1), 100),
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert!(result.success(), "{:?}", result.error);
        assert_eq!(
            result.steps_completed,
            vec![
                WorkflowStep::BalanceCheck,
                WorkflowStep::TokenCreated,
                WorkflowStep::TokenBought,
                WorkflowStep::TokenSold
            ]
        );
        assert_eq!(result.token_address, Some(token()));
        assert_eq!(result.total_gas_used(), U256::from(200_000));
        assert_eq!(api.calls(), vec!["challenge", "login", "create"]);
        assert_eq!(
            *chain.calls.lock().unwrap(),
            vec![TxKind::CreateToken, TxKind::BuyToken, TxKind::SellToken]
        );
    }

    #[tokio::test]
    async fn low_balance_stops_before_any_request() {
        let api = Arc::new(FakeApi::default());
        let chain = Arc::new(FakeChain {
            balance: U256::exp10(15),
            ..FakeChain::default()
        });
        let result = run(
            api.clone(),
            chain.clone(),
            plan(centi_native(1), 100),
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert_eq!(result.error_kind(), Some("InsufficientFunds"));
        assert_eq!(
            result.error,
            Some(WorkflowError::InsufficientFunds {
                balance: "0.001".to_string(),
                required: "0.01".to_string(),
            })
        );
        assert!(result.steps_completed.is_empty());
        assert!(api.calls().is_empty());
        assert!(chain.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn purchase_above_balance_is_insufficient() {
        let chain = Arc::new(FakeChain::default());
        let result = run(
            Arc::new(FakeApi::default()),
            chain,
            plan(centi_native(5), 0),
            Arc::new(AtomicBool::new(false)),
        )
        .await;
        assert_eq!(result.error_kind(), Some("InsufficientFunds"));
    }

    #[tokio::test]
    async fn rejected_creation_sends_no_transaction() {
        let api = Arc::new(FakeApi {
            reject_creation: true,
            ..FakeApi::default()
        });
        let chain = Arc::new(FakeChain::default());
        let result = run(
            api,
            chain.clone(),
            plan(centi_native(1), 100),
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert_eq!(result.error_kind(), Some("CreationRequestError"));
        assert!(result.create_tx.is_none());
        assert_eq!(result.steps_completed, vec![WorkflowStep::BalanceCheck]);
        assert!(chain.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_purchase_skips_buy() {
        let chain = Arc::new(FakeChain::default());
        let result = run(
            Arc::new(FakeApi::default()),
            chain.clone(),
            plan(U256::zero(), 0),
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert!(result.success());
        assert!(result.buy_tx.is_none());
        assert!(result.sell.is_none());
        assert_eq!(
            result.steps_completed,
            vec![WorkflowStep::BalanceCheck, WorkflowStep::TokenCreated]
        );
        assert_eq!(*chain.calls.lock().unwrap(), vec![TxKind::CreateToken]);
    }

    #[tokio::test]
    async fn missing_create_event_fails_without_token() {
        let chain = Arc::new(FakeChain {
            emit_create_event: false,
            ..FakeChain::default()
        });
        let result = run(
            Arc::new(FakeApi::default()),
            chain.clone(),
            plan(centi_native(1), 100),
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert_eq!(result.error_kind(), Some("MissingCreateEvent"));
        assert!(result.token_address.is_none());
        // create tx is kept, its gas was spent
        assert_eq!(result.total_gas_used(), U256::from(50_000));
        assert_eq!(*chain.calls.lock().unwrap(), vec![TxKind::CreateToken]);
    }

    #[tokio::test]
    async fn failed_buy_keeps_created_token() {
        let chain = Arc::new(FakeChain {
            fail_buy: true,
            ..FakeChain::default()
        });
        let result = run(
            Arc::new(FakeApi::default()),
            chain.clone(),
            plan(centi_native(1), 100),
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert_eq!(result.error_kind(), Some("TransactionReverted"));
        assert_eq!(result.token_address, Some(token()));
        assert_eq!(
            result.steps_completed,
            vec![WorkflowStep::BalanceCheck, WorkflowStep::TokenCreated]
        );
        assert!(result.buy_tx.is_some());
        assert!(result.sell.is_none());
        assert_eq!(result.total_gas_used(), U256::from(80_000));
    }

    #[tokio::test]
    async fn interrupt_stops_remaining_steps() {
        let exit = Arc::new(AtomicBool::new(false));
        let chain = Arc::new(FakeChain {
            exit_after_create: Some(exit.clone()),
            ..FakeChain::default()
        });
        let result = run(
            Arc::new(FakeApi::default()),
            chain.clone(),
            plan(centi_native(1), 100),
            exit,
        )
        .await;

        assert_eq!(result.error, Some(WorkflowError::Cancelled));
        assert_eq!(
            result.steps_completed,
            vec![WorkflowStep::BalanceCheck, WorkflowStep::TokenCreated]
        );
        assert_eq!(*chain.calls.lock().unwrap(), vec![TxKind::CreateToken]);
    }

    #[tokio::test]
    async fn invalid_metadata_fails_validation_first() {
        let api = Arc::new(FakeApi::default());
        let mut bad_plan = plan(U256::zero(), 0);
        bad_plan.token.symbol = "WAY_TOO_LONG_SYMBOL".to_string();
        let result = run(
            api.clone(),
            Arc::new(FakeChain::default()),
            bad_plan,
            Arc::new(AtomicBool::new(false)),
        )
        .await;

        assert_eq!(result.error_kind(), Some("ValidationError"));
        assert!(api.calls().is_empty());
    }
}
