use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use meme_launch_utils::utils::load_private_key_wallet;
use rand::{rngs::StdRng, SeedableRng};
use tokio::time;
use tokio_stream::{wrappers::IntervalStream, StreamExt};

use crate::{
    constants::Env,
    core::{
        ChainService, ImagePool, LaunchApiService, TokenMetadataGenerator, WorkflowService,
        WorkflowSettings,
    },
    types::{
        BatchReport, ChainError, Endpoints, ImageSource, LaunchPlan, ValidationError, WalletFile,
        WalletRecord, WorkflowContext, WorkflowError, WorkflowResult,
    },
};

const PAUSE_TICK: Duration = Duration::from_millis(100);

/// Runs the launch workflow for a single wallet record.
#[async_trait]
pub trait WalletLauncher: Send + Sync {
    async fn launch(
        &self,
        ctx: &mut WorkflowContext,
        record: &WalletRecord,
        plan: &LaunchPlan,
    ) -> WorkflowResult;
}

/// Launcher backed by the platform API and a fresh healthy RPC provider per wallet.
pub struct LiveLauncher {
    env: Env,
    api: Arc<LaunchApiService>,
    settings: WorkflowSettings,
}

impl LiveLauncher {
    pub fn new(env: Env, api: LaunchApiService) -> Self {
        let settings = WorkflowSettings::from_env(&env);
        Self {
            env,
            api: Arc::new(api),
            settings,
        }
    }
}

#[async_trait]
impl WalletLauncher for LiveLauncher {
    async fn launch(
        &self,
        ctx: &mut WorkflowContext,
        record: &WalletRecord,
        plan: &LaunchPlan,
    ) -> WorkflowResult {
        let mut result = WorkflowResult::new(ctx.index, ctx.wallet_address, plan);

        let wallet = match load_private_key_wallet(&record.private_key) {
            Ok(wallet) => wallet,
            Err(err) => {
                result.error = Some(ValidationError::new("private_key", err.to_string()).into());
                return result;
            }
        };
        let chain = match ChainService::from_env(&self.env, wallet.clone()).await {
            Ok(chain) => chain,
            Err(err) => {
                log::error!("[BatchService] {} no rpc provider: {}", ctx.label(), err);
                result.error = Some(WorkflowError::Chain(ChainError::Rpc(err.to_string())));
                return result;
            }
        };

        WorkflowService::new(self.api.clone(), chain, self.settings.clone())
            .run(ctx, &wallet, plan)
            .await
    }
}

/// Processes wallets one at a time; a failed wallet never stops the batch.
pub struct BatchService<L: WalletLauncher> {
    launcher: L,
    metadata: TokenMetadataGenerator,
    image_pool: ImagePool,
    endpoints: Endpoints,
    wallet_delay: Duration,
    rng: StdRng,
    exit: Arc<AtomicBool>,
}

impl<L: WalletLauncher> BatchService<L> {
    pub fn new(
        launcher: L,
        endpoints: Endpoints,
        wallet_delay: Duration,
        exit: Arc<AtomicBool>,
    ) -> Self {
        Self {
            launcher,
            metadata: TokenMetadataGenerator,
            image_pool: ImagePool::default(),
            endpoints,
            wallet_delay,
            rng: StdRng::from_entropy(),
            exit,
        }
    }

    pub fn with_image_pool(mut self, image_pool: ImagePool) -> Self {
        self.image_pool = image_pool;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub async fn run(&mut self, wallet_file: WalletFile) -> BatchReport {
        let skipped_lines = wallet_file
            .warnings
            .into_iter()
            .filter(|warning| warning.skipped)
            .collect();
        let mut report = BatchReport::new(skipped_lines);
        let total = wallet_file.records.len();
        log::info!("[BatchService] processing {} wallets", total);

        for (position, record) in wallet_file.records.iter().enumerate() {
            if position > 0 && !self.pause().await {
                break;
            }
            if self.exit.load(Ordering::Relaxed) {
                break;
            }

            let index = position + 1;
            let plan = LaunchPlan {
                token: self.metadata.generate(&mut self.rng),
                image: self
                    .image_pool
                    .next_image(&mut self.rng)
                    .map(ImageSource::File)
                    .unwrap_or_default(),
                purchase_amount: record.purchase_amount_wei,
                sell_percentage: record.sell_percentage,
            };
            let mut ctx = WorkflowContext::new(
                index,
                total,
                record.derived_address,
                self.endpoints.clone(),
                self.exit.clone(),
            );

            let result = self.launcher.launch(&mut ctx, record, &plan).await;
            log::info!(
                "[BatchService] {} {}",
                ctx.label(),
                if result.success() { "succeeded" } else { "failed" }
            );
            report.push(result);
        }

        report.interrupted = self.exit.load(Ordering::Relaxed);
        if report.interrupted {
            log::warn!(
                "[BatchService] interrupted after {}/{} wallets",
                report.results.len(),
                total
            );
        }
        report.finish();
        report
    }

    /// Wait `wallet_delay`; false when interrupted meanwhile.
    async fn pause(&self) -> bool {
        let started = Instant::now();
        let mut stream = IntervalStream::new(time::interval(PAUSE_TICK));
        while stream.next().await.is_some() {
            if self.exit.load(Ordering::Relaxed) {
                return false;
            }
            if started.elapsed() >= self.wallet_delay {
                return true;
            }
        }
        true
    }
}
