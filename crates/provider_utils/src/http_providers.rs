use anyhow::{anyhow, Error};
use ethers::providers::{Http, Middleware, Provider};
use std::time::Duration;

use crate::{
    constants::{DESERIALIZATION_ERROR_MSG, LOOKUP_ERROR_MSG},
    enums::ENetwork,
    networks::NETWORKS,
};

const POLLING_INTERVAL: Duration = Duration::from_millis(3_000);

pub struct HttpProviders;

impl HttpProviders {
    pub fn get_providers(
        network: &ENetwork,
        is_external_rpc: bool,
    ) -> anyhow::Result<Vec<Provider<Http>>> {
        let Some(network) = NETWORKS.get(network) else {
            return Err(anyhow!("NETWORKS {:?} not found", network));
        };

        let urls = if is_external_rpc {
            &network.rpc_url.external
        } else {
            &network.rpc_url.internal
        };

        let mut providers = Vec::new();
        for url in urls {
            providers.push(Self::from_url(url)?);
        }

        Ok(providers)
    }

    /// Build a provider for an explicit RPC url, e.g. an `RPC_URL` override.
    pub fn from_url(url: &str) -> anyhow::Result<Provider<Http>> {
        let provider = Provider::<Http>::try_from(url)
            .map_err(|err| anyhow!("invalid rpc url {:?}: {}", url, err))?
            .interval(POLLING_INTERVAL);
        Ok(provider)
    }

    /// Return the first provider answering `eth_blockNumber`.
    /// An explicit url, when given, is tried before the network's list.
    pub async fn get_healthy_provider(
        network: &ENetwork,
        is_external_rpc: bool,
        rpc_url_override: Option<&str>,
    ) -> anyhow::Result<Provider<Http>, Error> {
        let mut providers = Vec::new();
        if let Some(url) = rpc_url_override {
            providers.push(Self::from_url(url)?);
        }
        providers.extend(Self::get_providers(network, is_external_rpc)?);

        for provider in providers {
            match provider.get_block_number().await {
                Ok(_) => {
                    return Ok(provider);
                }
                Err(err) => {
                    let err_string = err.to_string();
                    if err_string.contains(LOOKUP_ERROR_MSG)
                        || err_string.contains(DESERIALIZATION_ERROR_MSG)
                        || err_string.contains("error sending request")
                    {
                        log::info!("Provider {:?} is unavailable !!", provider.url().host());
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }

        Err(anyhow!("All providers failed to retrieve the block number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_network_has_providers() {
        for network in [ENetwork::BscMainnet, ENetwork::BscTestnet] {
            let providers = HttpProviders::get_providers(&network, true).unwrap();
            assert!(!providers.is_empty());
        }
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(HttpProviders::from_url("not a url").is_err());
    }
}
