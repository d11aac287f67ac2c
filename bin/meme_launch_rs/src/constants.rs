use std::{
    str::FromStr,
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};

use anyhow::{anyhow, Context};
use ethers::types::{Address, U256, U64};
use meme_launch_utils::{
    constants::{TOKEN_MANAGERS, ZERO_ADDRESS},
    env::{get_env, get_optional_env},
    units::to_base_units,
    utils::with_hex_prefix,
};
use provider_utils::{enums::ENetwork, networks::NETWORKS};
use rust_decimal::Decimal;

use crate::types::Endpoints;

pub const DEFAULT_API_BASE_URL: &str = "https://four.meme/meme-api";
pub const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const API_MAX_ATTEMPTS: u32 = 3;
pub const API_RETRY_DELAY: Duration = Duration::from_secs(1);

pub const NATIVE_DECIMALS: u32 = 18;

pub const DEFAULT_LOG_FILE: &str = "logs/meme_launch.log";
pub const REPORT_DIR: &str = "logs";

#[derive(Debug, Clone)]
pub struct Env {
    pub listen_network: ENetwork,
    pub chain_id: U64,
    pub rpc_url: Option<String>,
    pub token_manager_address: Address,
    pub api_base_url: String,
    pub api_network_code: String,
    /// Wallets holding less are skipped before any request is made.
    pub min_native_balance: U256,
    pub receipt_timeout: Duration,
    pub wallet_delay: Duration,
    pub exit: Arc<AtomicBool>,
}

impl Env {
    pub fn new() -> anyhow::Result<Self> {
        let network_str = get_env("LISTEN_NETWORK", Some("BSC_MAINNET".to_string()));
        let listen_network = ENetwork::from_str(&network_str)
            .map_err(|_| anyhow!("LISTEN_NETWORK {:?} invalid", network_str))?;
        let Some(network_config) = NETWORKS.get(&listen_network) else {
            return Err(anyhow!("NETWORKS {:?} not found", listen_network));
        };

        let token_manager_address = match get_optional_env("TOKEN_MANAGER_ADDRESS") {
            Some(address) => Address::from_str(&with_hex_prefix(&address))
                .with_context(|| format!("TOKEN_MANAGER_ADDRESS {:?} invalid", address))?,
            None => TOKEN_MANAGERS
                .get(&listen_network)
                .copied()
                .unwrap_or(*ZERO_ADDRESS),
        };
        if token_manager_address == *ZERO_ADDRESS {
            return Err(anyhow!(
                "no launch platform contract for {:?}, set TOKEN_MANAGER_ADDRESS",
                listen_network
            ));
        }

        let min_native_balance_str = get_env("MIN_NATIVE_BALANCE", Some("0.01".to_string()));
        let min_native_balance = Decimal::from_str(&min_native_balance_str)
            .with_context(|| format!("MIN_NATIVE_BALANCE {:?} invalid", min_native_balance_str))?;

        Ok(Self {
            listen_network,
            chain_id: U64::from(network_config.chain_id),
            rpc_url: get_optional_env("RPC_URL"),
            token_manager_address,
            api_base_url: get_env("MEME_API_BASE_URL", Some(DEFAULT_API_BASE_URL.to_string())),
            api_network_code: get_env(
                "MEME_API_NETWORK_CODE",
                Some(listen_network.api_network_code().to_string()),
            ),
            min_native_balance: to_base_units(min_native_balance, NATIVE_DECIMALS)?,
            receipt_timeout: Duration::from_secs(parse_secs("RECEIPT_TIMEOUT_SECS", 300)?),
            wallet_delay: Duration::from_secs(parse_secs("WALLET_DELAY_SECS", 5)?),
            exit: Arc::new(AtomicBool::new(false)),
        })
    }

    /// API base url plus the explicit RPC url, or the network's first public one.
    pub fn endpoints(&self) -> Endpoints {
        let rpc_url = self.rpc_url.clone().unwrap_or_else(|| {
            NETWORKS
                .get(&self.listen_network)
                .and_then(|network| network.rpc_url.internal.first().cloned())
                .unwrap_or_default()
        });
        Endpoints {
            api_base_url: self.api_base_url.clone(),
            rpc_url,
        }
    }

    pub fn native_symbol(&self) -> &'static str {
        NETWORKS
            .get(&self.listen_network)
            .map(|network| network.native_symbol)
            .unwrap_or("ETH")
    }
}

fn parse_secs(key: &str, default: u64) -> anyhow::Result<u64> {
    let value = get_env(key, Some(default.to_string()));
    value
        .trim()
        .parse()
        .with_context(|| format!("{} {:?} invalid", key, value))
}

/// Single-wallet credentials for the one-off binaries.
pub struct WalletCredentials {
    pub private_key: String,
    pub declared_address: Option<Address>,
}

impl WalletCredentials {
    pub fn from_env() -> anyhow::Result<Self> {
        let private_key = get_optional_env("FOUR_PRIVATE_KEY")
            .map(|key| with_hex_prefix(&key))
            .ok_or_else(|| anyhow!("expect env FOUR_PRIVATE_KEY"))?;
        let declared_address = get_optional_env("FOUR_WALLET_ADDRESS")
            .map(|address| {
                Address::from_str(&with_hex_prefix(&address))
                    .with_context(|| format!("FOUR_WALLET_ADDRESS {:?} invalid", address))
            })
            .transpose()?;
        Ok(Self {
            private_key,
            declared_address,
        })
    }
}
