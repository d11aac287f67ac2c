use std::time::Duration;

use ethers::{providers::Middleware, types::U256};
use provider_utils::constants::DESERIALIZATION_ERROR_MSG;

use crate::types::ChainError;

const FETCH_ATTEMPTS: u32 = 3;
const FETCH_RETRY_DELAY: Duration = Duration::from_millis(500);

pub struct GasPrice;

impl GasPrice {
    /// `price * percent / 100`, e.g. 110 adds ten percent.
    pub fn with_markup(price: U256, percent: u64) -> U256 {
        price * U256::from(percent) / U256::from(100)
    }

    pub async fn fetch<M: Middleware>(client: &M, markup_percent: u64) -> Result<U256, ChainError> {
        let mut attempt = 1;
        loop {
            let fetched_gas_price = match client.get_gas_price().await {
                Ok(gas_price) => gas_price,
                Err(err) => {
                    // flaky public endpoints answer with an empty body now and then
                    if err.to_string().contains(DESERIALIZATION_ERROR_MSG)
                        && attempt < FETCH_ATTEMPTS
                    {
                        attempt += 1;
                        tokio::time::sleep(FETCH_RETRY_DELAY).await;
                        continue;
                    }
                    return Err(ChainError::Rpc(format!("gas price: {}", err)));
                }
            };

            let gas_price = Self::with_markup(fetched_gas_price, markup_percent);
            log::info!(
                "[GasPrice] network {:?}, using {:?} (+{}%)",
                fetched_gas_price,
                gas_price,
                markup_percent.saturating_sub(100)
            );
            return Ok(gas_price);
        }
    }
}
