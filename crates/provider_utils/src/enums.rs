use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, VariantNames};

#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    Display,
    EnumString,
    VariantNames,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ENetwork {
    #[default]
    BscMainnet,
    BscTestnet,
}

impl ENetwork {
    /// Network code expected by the launch platform API.
    pub fn api_network_code(&self) -> &'static str {
        match self {
            ENetwork::BscMainnet | ENetwork::BscTestnet => "BSC",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_screaming_snake_case() {
        assert_eq!(
            ENetwork::from_str("BSC_MAINNET").unwrap(),
            ENetwork::BscMainnet
        );
        assert_eq!(
            ENetwork::from_str("BSC_TESTNET").unwrap(),
            ENetwork::BscTestnet
        );
        assert!(ENetwork::from_str("bsc").is_err());
        assert_eq!(ENetwork::BscMainnet.to_string(), "BSC_MAINNET");
    }
}
