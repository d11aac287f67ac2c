use std::{
    env,
    path::PathBuf,
    str::FromStr,
    sync::{atomic::Ordering, Arc},
};

use anyhow::{anyhow, Context};
use ethers::signers::Signer;
use meme_launch_rs::{
    constants::{Env, WalletCredentials, DEFAULT_LOG_FILE, NATIVE_DECIMALS},
    core::{
        ChainService, LaunchApiService, ReportService, TokenMetadataGenerator, WorkflowService,
        WorkflowSettings,
    },
    types::{
        BatchReport, ImageSource, LaunchPlan, TokenCreationRequest, TokenLabel, WorkflowContext,
    },
};
use meme_launch_utils::{
    env::get_optional_env, log::setup_logger, units::to_base_units,
    utils::load_private_key_wallet,
};
use rust_decimal::Decimal;

const USAGE: &str = "usage: launch_token [purchase_amount] [sell_percentage] [image_path|image_url]";

/// `TOKEN_*` variables override the generated metadata field by field.
fn token_from_env(generated: TokenCreationRequest) -> anyhow::Result<TokenCreationRequest> {
    let label = match get_optional_env("TOKEN_LABEL") {
        Some(label) => TokenLabel::from_str(&label)
            .map_err(|_| anyhow!("TOKEN_LABEL {:?} invalid", label))?,
        None => generated.label,
    };
    Ok(TokenCreationRequest {
        name: get_optional_env("TOKEN_NAME").unwrap_or(generated.name),
        symbol: get_optional_env("TOKEN_SYMBOL").unwrap_or(generated.symbol),
        description: get_optional_env("TOKEN_DESCRIPTION").unwrap_or(generated.description),
        label,
        web_url: get_optional_env("TOKEN_WEB_URL").or(generated.web_url),
        twitter_url: get_optional_env("TOKEN_TWITTER_URL"),
        telegram_url: get_optional_env("TOKEN_TELEGRAM_URL"),
        ..generated
    })
}

fn parse_decimal_arg(args: &[String], index: usize, name: &str) -> anyhow::Result<Decimal> {
    match args.get(index) {
        Some(value) => Decimal::from_str(value.trim_end_matches('%'))
            .with_context(|| format!("{} {:?} invalid\n{}", name, value, USAGE)),
        None => Ok(Decimal::ZERO),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    if get_optional_env("LOG_FILE").is_none() {
        env::set_var("LOG_FILE", DEFAULT_LOG_FILE);
    }
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    let purchase_amount = parse_decimal_arg(&args, 1, "purchase_amount")?;
    let sell_percentage = parse_decimal_arg(&args, 2, "sell_percentage")?;
    if sell_percentage < Decimal::ZERO || sell_percentage > Decimal::ONE_HUNDRED {
        return Err(anyhow!("sell_percentage {} outside [0, 100]", sell_percentage));
    }
    let image = match args.get(3) {
        Some(image) if image.starts_with("http://") || image.starts_with("https://") => {
            ImageSource::Url(image.clone())
        }
        Some(image) => ImageSource::File(PathBuf::from(image)),
        None => ImageSource::None,
    };

    let env = Env::new()?;
    let credentials = WalletCredentials::from_env()?;
    let wallet = load_private_key_wallet(&credentials.private_key)?;
    if let Some(declared) = credentials.declared_address {
        if declared != wallet.address() {
            log::warn!(
                "[launch_token] FOUR_WALLET_ADDRESS {:#x} does not match key address {:#x}, using key address",
                declared,
                wallet.address()
            );
        }
    }

    let token = token_from_env(TokenMetadataGenerator.generate(&mut rand::thread_rng()))?;
    let plan = LaunchPlan {
        token,
        image,
        purchase_amount: to_base_units(purchase_amount, NATIVE_DECIMALS)?,
        sell_percentage,
    };

    let exit = env.exit.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("[launch_token] interrupt received, stopping after the current step");
            exit.store(true, Ordering::Relaxed);
        }
    });

    let chain = ChainService::from_env(&env, wallet.clone()).await?;
    let api = Arc::new(LaunchApiService::from_env(&env)?);
    let workflow = WorkflowService::new(api, chain, WorkflowSettings::from_env(&env));

    let mut ctx = WorkflowContext::new(1, 1, wallet.address(), env.endpoints(), env.exit.clone());
    let result = workflow.run(&mut ctx, &wallet, &plan).await;
    let error = result.error.clone();

    let mut report = BatchReport::new(Vec::new());
    report.push(result);
    report.finish();
    ReportService::log_summary(&report);

    match error {
        Some(err) => Err(anyhow!("launch failed [{}]: {}", err.kind(), err)),
        None => Ok(()),
    }
}
