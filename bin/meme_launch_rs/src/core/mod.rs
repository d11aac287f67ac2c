mod batch_service;
mod chain_service;
mod gas_price;
mod image_pool;
mod launch_api_service;
mod metadata_service;
mod report_service;
mod workflow_service;

pub use batch_service::*;
pub use chain_service::*;
pub use gas_price::*;
pub use image_pool::*;
pub use launch_api_service::*;
pub use metadata_service::*;
pub use report_service::*;
pub use workflow_service::*;
