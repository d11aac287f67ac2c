use ethers::prelude::Lazy;
use ethers::types::Address;

pub static ZERO_ADDRESS: Lazy<Address> = Lazy::new(Address::zero);
