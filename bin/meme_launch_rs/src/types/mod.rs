mod api_types;
mod chain_types;
mod error_types;
mod report_types;
mod wallet_types;
mod workflow_types;

pub use api_types::*;
pub use chain_types::*;
pub use error_types::*;
pub use report_types::*;
pub use wallet_types::*;
pub use workflow_types::*;
