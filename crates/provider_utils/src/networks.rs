use ethers::prelude::Lazy;
use std::collections::HashMap;

use crate::enums::ENetwork;

#[derive(Debug, Clone, Default)]
pub struct NetworkConfig {
    pub network: ENetwork,
    pub chain_id: u64,
    pub native_symbol: &'static str,
    pub rpc_url: UrlConfig,
    pub explorer_url: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct UrlConfig {
    pub internal: Vec<String>,
    pub external: Vec<String>,
}

pub static NETWORKS: Lazy<HashMap<ENetwork, NetworkConfig>> = Lazy::new(|| {
    HashMap::from([
        (
            ENetwork::BscMainnet,
            NetworkConfig {
                network: ENetwork::BscMainnet,
                chain_id: 56,
                native_symbol: "BNB",
                rpc_url: UrlConfig {
                    internal: vec![
                        "https://bsc-dataseed1.binance.org".to_string(),
                        "https://bsc-dataseed2.binance.org".to_string(),
                    ],
                    external: vec![
                        "https://bsc-dataseed1.binance.org".to_string(),
                        "https://bsc-dataseed2.binance.org".to_string(),
                        "https://bsc-dataseed3.binance.org".to_string(),
                        "https://bsc-dataseed4.binance.org".to_string(),
                    ],
                },
                explorer_url: "https://bscscan.com",
            },
        ),
        (
            ENetwork::BscTestnet,
            NetworkConfig {
                network: ENetwork::BscTestnet,
                chain_id: 97,
                native_symbol: "tBNB",
                rpc_url: UrlConfig {
                    internal: vec!["https://data-seed-prebsc-1-s1.binance.org:8545".to_string()],
                    external: vec![
                        "https://data-seed-prebsc-1-s1.binance.org:8545".to_string(),
                        "https://data-seed-prebsc-2-s1.binance.org:8545".to_string(),
                    ],
                },
                explorer_url: "https://testnet.bscscan.com",
            },
        ),
    ])
});
