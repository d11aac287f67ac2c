use std::{env, str::FromStr};

use anyhow::{anyhow, Context};
use ethers::{signers::Signer, types::Address};
use meme_launch_rs::{
    constants::{Env, WalletCredentials},
    core::ChainService,
};
use meme_launch_utils::{
    log::setup_logger,
    units::{from_base_units, to_base_units},
    utils::{load_private_key_wallet, with_hex_prefix},
};
use rust_decimal::Decimal;

const USAGE: &str = "usage: transfer_token <token_address> <recipient> [amount|all]";

fn parse_address(value: &str, name: &str) -> anyhow::Result<Address> {
    Address::from_str(&with_hex_prefix(value))
        .with_context(|| format!("{} {:?} invalid\n{}", name, value, USAGE))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    let (Some(token), Some(recipient)) = (args.get(1), args.get(2)) else {
        return Err(anyhow!(USAGE));
    };
    let token = parse_address(token, "token address")?;
    let recipient = parse_address(recipient, "recipient")?;

    let env = Env::new()?;
    let credentials = WalletCredentials::from_env()?;
    let wallet = load_private_key_wallet(&credentials.private_key)?;
    let owner = wallet.address();
    let chain = ChainService::from_env(&env, wallet).await?;

    let balance = chain.token_balance(token, owner).await?;
    let decimals = chain.token_decimals(token).await?;
    let amount = match args.get(3).map(String::as_str) {
        None | Some("all") => balance,
        Some(value) => {
            let amount = Decimal::from_str(value)
                .with_context(|| format!("amount {:?} invalid\n{}", value, USAGE))?;
            to_base_units(amount, u32::from(decimals))?
        }
    };
    if amount.is_zero() || amount > balance {
        return Err(anyhow!(
            "cannot transfer {} of balance {}",
            from_base_units(amount, u32::from(decimals))?,
            from_base_units(balance, u32::from(decimals))?
        ));
    }

    let outcome = chain.transfer_token(token, recipient, amount).await;
    log::info!(
        "[transfer_token] {:#x} -> {:#x}: {} {}, gas used {:?}",
        token,
        recipient,
        from_base_units(amount, u32::from(decimals))?,
        outcome.stage,
        outcome.gas_used
    );

    match outcome.failure() {
        Some(err) => Err(anyhow!("transfer {} failed: {}", outcome.tx_hash_hex(), err)),
        None => Ok(()),
    }
}
