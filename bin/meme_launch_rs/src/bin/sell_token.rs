use std::{env, str::FromStr, sync::atomic::Ordering};

use anyhow::{anyhow, Context};
use ethers::types::Address;
use meme_launch_rs::{
    constants::{Env, WalletCredentials},
    core::{ChainService, LaunchChain},
};
use meme_launch_utils::{
    log::setup_logger,
    units::from_base_units,
    utils::{load_private_key_wallet, with_hex_prefix},
};
use rust_decimal::Decimal;

const USAGE: &str = "usage: sell_token <token_address> [sell_percentage]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    let Some(token) = args.get(1) else {
        return Err(anyhow!(USAGE));
    };
    let token = Address::from_str(&with_hex_prefix(token))
        .with_context(|| format!("token address {:?} invalid\n{}", token, USAGE))?;
    let percentage = match args.get(2) {
        Some(value) => Decimal::from_str(value.trim_end_matches('%'))
            .with_context(|| format!("sell_percentage {:?} invalid\n{}", value, USAGE))?,
        None => Decimal::ONE_HUNDRED,
    };

    let env = Env::new()?;
    let credentials = WalletCredentials::from_env()?;
    let wallet = load_private_key_wallet(&credentials.private_key)?;

    let exit = env.exit.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            exit.store(true, Ordering::Relaxed);
        }
    });

    let chain = ChainService::from_env(&env, wallet).await?;
    let outcome = chain.sell_token_complete(token, percentage).await;

    let balance = from_base_units(outcome.balance, u32::from(outcome.decimals))?;
    let sold = from_base_units(outcome.sell_amount, u32::from(outcome.decimals))?;
    log::info!(
        "[sell_token] {:#x}: balance {}, sell {} ({}%), approve {:?}, sell {:?}, gas used {}",
        token,
        balance,
        sold,
        percentage,
        outcome.approve.as_ref().map(|tx| tx.tx_hash_hex()),
        outcome.sell.as_ref().map(|tx| tx.tx_hash_hex()),
        outcome.gas_used()
    );

    match outcome.failure() {
        Some(err) => Err(anyhow!("sell failed [{}]: {}", err.kind(), err)),
        None => Ok(()),
    }
}
