use std::{env, path::Path};

use anyhow::anyhow;
use ethers::providers::Middleware;
use meme_launch_rs::{
    constants::{Env, NATIVE_DECIMALS},
    utils::{load_wallet_file, short_address},
};
use meme_launch_utils::{log::setup_logger, units::from_base_units};
use provider_utils::http_providers::HttpProviders;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    let Some(wallet_file_path) = args.get(1) else {
        return Err(anyhow!("usage: check_wallets <wallet_file>"));
    };

    let env = Env::new()?;
    let wallet_file = load_wallet_file(Path::new(wallet_file_path))?;
    let http_provider =
        HttpProviders::get_healthy_provider(&env.listen_network, false, env.rpc_url.as_deref())
            .await?;

    let symbol = env.native_symbol();
    let mut ready = 0;
    for record in &wallet_file.records {
        let balance = http_provider
            .get_balance(record.derived_address, None)
            .await?;
        let required = env.min_native_balance.max(record.purchase_amount_wei);
        let enough = balance >= required;
        if enough {
            ready += 1;
        }

        log::info!(
            "[check_wallets] line {} {}{} balance {} {} purchase {} sell {}% {}",
            record.line_number,
            short_address(&record.derived_address),
            if record.address_matches() {
                ""
            } else {
                " (declared address differs)"
            },
            from_base_units(balance, NATIVE_DECIMALS)?,
            symbol,
            record.purchase_amount,
            record.sell_percentage,
            if enough { "ready" } else { "insufficient" }
        );
    }

    log::info!(
        "[check_wallets] {}/{} wallets ready, {} lines skipped",
        ready,
        wallet_file.records.len(),
        wallet_file
            .warnings
            .iter()
            .filter(|warning| warning.skipped)
            .count()
    );

    Ok(())
}
