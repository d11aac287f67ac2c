// Economic parameters the platform mandates for every launch.
pub const TOTAL_SUPPLY: u64 = 1_000_000_000;
pub const RAISED_AMOUNT: u64 = 24;
pub const SALE_RATE: f64 = 0.8;
pub const RESERVE_RATE: f64 = 0.0;
pub const LP_TRADING_FEE: f64 = 0.0025;
pub const RAISED_SYMBOL: &str = "BNB";

pub const RAISED_TOKEN_SYMBOL: &str = "BNB";
pub const RAISED_TOKEN_NATIVE_SYMBOL: &str = "BNB";
pub const RAISED_TOKEN_ADDRESS: &str = "0xbb4cdb9cbd36b01bd1cbaebf2de08d9173bc095c";
pub const RAISED_TOKEN_DEPLOY_COST: &str = "0";
pub const RAISED_TOKEN_BUY_FEE: &str = "0.01";
pub const RAISED_TOKEN_SELL_FEE: &str = "0.01";
pub const RAISED_TOKEN_MIN_TRADE_FEE: &str = "0";
pub const RAISED_TOKEN_B0_AMOUNT: &str = "8";
pub const RAISED_TOKEN_TOTAL_B_AMOUNT: &str = "24";
pub const RAISED_TOKEN_TOTAL_AMOUNT: &str = "1000000000";
pub const RAISED_TOKEN_LOGO_URL: &str = "https://static.four.meme/market/68b871b6-96f7-408c-b8d0-388d804b34275092658264263839640.png";
pub const RAISED_TOKEN_TRADE_LEVELS: [&str; 3] = ["0.1", "0.5", "1"];
pub const RAISED_TOKEN_STATUS: &str = "PUBLISH";
pub const RAISED_TOKEN_BUY_LINK: &str = "https://pancakeswap.finance/swap";
pub const RAISED_TOKEN_RESERVED_NUMBER: u32 = 10;
pub const RAISED_TOKEN_SALE_RATE: &str = "0.8";
pub const RAISED_TOKEN_PLATFORM: &str = "MEME";

pub const DEFAULT_TOKEN_LOGO_URL: &str = "https://static.four.meme/market/default-token-logo.png";

pub const MAX_TOKEN_NAME_LEN: usize = 50;
pub const MAX_TOKEN_SYMBOL_LEN: usize = 10;
pub const MAX_TOKEN_DESC_LEN: usize = 500;

pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] = ["jpeg", "jpg", "png", "gif", "bmp", "webp"];
pub const MAX_IMAGE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Sell amounts of 18-decimal tokens must be a multiple of this, the platform
/// contract rejects finer amounts.
pub const SELL_AMOUNT_QUANTUM_18_DECIMALS: u64 = 1_000_000_000;
