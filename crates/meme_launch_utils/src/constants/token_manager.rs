use ethers::{prelude::Lazy, types::Address};
use provider_utils::enums::ENetwork;
use std::{collections::HashMap, str::FromStr};

use crate::constants::ZERO_ADDRESS;

/// Launch platform contract (`TokenManager2`) per network.
/// `ZERO_ADDRESS` means not deployed; set `TOKEN_MANAGER_ADDRESS` instead.
pub static TOKEN_MANAGERS: Lazy<HashMap<ENetwork, Address>> = Lazy::new(|| {
    HashMap::from([
        (
            ENetwork::BscMainnet,
            Address::from_str("0x5c952063c7fc8610FFDB798152D69F0B9550762b").unwrap(),
        ),
        (ENetwork::BscTestnet, *ZERO_ADDRESS),
    ])
});
