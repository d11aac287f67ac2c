use std::{env, path::Path, sync::atomic::Ordering, time::Duration};

use anyhow::{anyhow, Context};
use meme_launch_rs::{
    constants::{Env, DEFAULT_LOG_FILE, REPORT_DIR},
    core::{BatchService, ImagePool, LaunchApiService, LiveLauncher, ReportService},
    utils::load_wallet_file,
};
use meme_launch_utils::{env::get_optional_env, log::setup_logger};

const USAGE: &str = "usage: batch_launch <wallet_file> [image_dir|-] [delay_secs]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    if get_optional_env("LOG_FILE").is_none() {
        env::set_var("LOG_FILE", DEFAULT_LOG_FILE);
    }
    setup_logger(None)?;

    let args: Vec<String> = env::args().collect();
    let Some(wallet_file_path) = args.get(1) else {
        return Err(anyhow!(USAGE));
    };
    let image_dir = args.get(2).filter(|arg| !arg.is_empty() && *arg != "-");

    let env = Env::new()?;
    let wallet_delay = match args.get(3) {
        Some(delay) => Duration::from_secs(
            delay
                .parse()
                .with_context(|| format!("delay {:?} invalid\n{}", delay, USAGE))?,
        ),
        None => env.wallet_delay,
    };

    let wallet_file = load_wallet_file(Path::new(wallet_file_path))?;
    let image_pool = match image_dir {
        Some(dir) => ImagePool::from_dir(Path::new(dir))
            .with_context(|| format!("cannot read image dir {:?}", dir))?,
        None => ImagePool::default(),
    };
    log::info!(
        "[batch_launch] {} wallets on {:?}, {} images, {}s between wallets",
        wallet_file.records.len(),
        env.listen_network,
        image_pool.len(),
        wallet_delay.as_secs()
    );

    let exit = env.exit.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("[batch_launch] interrupt received, stopping after the current step");
            exit.store(true, Ordering::Relaxed);
        }
    });

    let api = LaunchApiService::from_env(&env)?;
    let mut batch = BatchService::new(
        LiveLauncher::new(env.clone(), api),
        env.endpoints(),
        wallet_delay,
        env.exit.clone(),
    )
    .with_image_pool(image_pool);

    let report = batch.run(wallet_file).await;
    ReportService::log_summary(&report);
    ReportService::write_csv(&report, Path::new(REPORT_DIR))?;

    Ok(())
}
