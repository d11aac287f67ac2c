mod addresses;
mod launch_params;
mod token_manager;

pub use addresses::*;
pub use launch_params::*;
pub use token_manager::*;
