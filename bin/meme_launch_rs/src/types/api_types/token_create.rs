use ethers::types::Bytes;
use meme_launch_utils::constants::{
    DEFAULT_TOKEN_LOGO_URL, LP_TRADING_FEE, MAX_TOKEN_DESC_LEN, MAX_TOKEN_NAME_LEN,
    MAX_TOKEN_SYMBOL_LEN, RAISED_AMOUNT, RAISED_SYMBOL, RAISED_TOKEN_ADDRESS,
    RAISED_TOKEN_B0_AMOUNT, RAISED_TOKEN_BUY_FEE, RAISED_TOKEN_BUY_LINK, RAISED_TOKEN_DEPLOY_COST,
    RAISED_TOKEN_LOGO_URL, RAISED_TOKEN_MIN_TRADE_FEE, RAISED_TOKEN_NATIVE_SYMBOL,
    RAISED_TOKEN_PLATFORM, RAISED_TOKEN_RESERVED_NUMBER, RAISED_TOKEN_SALE_RATE,
    RAISED_TOKEN_SELL_FEE, RAISED_TOKEN_STATUS, RAISED_TOKEN_SYMBOL, RAISED_TOKEN_TOTAL_AMOUNT,
    RAISED_TOKEN_TOTAL_B_AMOUNT, RAISED_TOKEN_TRADE_LEVELS, RESERVE_RATE, SALE_RATE, TOTAL_SUPPLY,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use url::Url;

use crate::types::ValidationError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
pub enum TokenLabel {
    #[default]
    Meme,
    #[strum(serialize = "AI")]
    #[serde(rename = "AI")]
    Ai,
    Defi,
    Games,
    Infra,
    #[strum(serialize = "De-Sci")]
    #[serde(rename = "De-Sci")]
    DeSci,
    Social,
    Depin,
    Charity,
    Others,
}

impl TokenLabel {
    pub const ALL: [TokenLabel; 10] = [
        TokenLabel::Meme,
        TokenLabel::Ai,
        TokenLabel::Defi,
        TokenLabel::Games,
        TokenLabel::Infra,
        TokenLabel::DeSci,
        TokenLabel::Social,
        TokenLabel::Depin,
        TokenLabel::Charity,
        TokenLabel::Others,
    ];
}

/// Caller-chosen token metadata. Platform economics are added by [`CreateTokenBody`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenCreationRequest {
    pub name: String,
    pub symbol: String,
    pub description: String,
    pub label: TokenLabel,
    pub image_url: Option<String>,
    pub web_url: Option<String>,
    pub twitter_url: Option<String>,
    pub telegram_url: Option<String>,
    pub pre_sale: Decimal,
    /// Milliseconds since epoch; `None` launches immediately.
    pub launch_time: Option<i64>,
}

impl TokenCreationRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, MAX_TOKEN_NAME_LEN)?;
        check_length("symbol", &self.symbol, MAX_TOKEN_SYMBOL_LEN)?;
        check_length("description", &self.description, MAX_TOKEN_DESC_LEN)?;
        check_url("image_url", self.image_url.as_deref())?;
        check_url("web_url", self.web_url.as_deref())?;
        check_url("twitter_url", self.twitter_url.as_deref())?;
        check_url("telegram_url", self.telegram_url.as_deref())?;
        if self.pre_sale.is_sign_negative() && !self.pre_sale.is_zero() {
            return Err(ValidationError::new("pre_sale", "must not be negative"));
        }
        Ok(())
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::new(field, "is required"));
    }
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("{} characters, at most {} allowed", len, max),
        ));
    }
    Ok(())
}

fn check_url(field: &'static str, value: Option<&str>) -> Result<(), ValidationError> {
    let Some(value) = value.filter(|value| !value.trim().is_empty()) else {
        return Ok(());
    };
    let url = Url::parse(value.trim()).map_err(|err| ValidationError::new(field, err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::new(field, "must use http or https"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaisedTokenConfig {
    pub symbol: String,
    pub native_symbol: String,
    pub symbol_address: String,
    pub deploy_cost: String,
    pub buy_fee: String,
    pub sell_fee: String,
    pub min_trade_fee: String,
    pub b0_amount: String,
    pub total_b_amount: String,
    pub total_amount: String,
    pub logo_url: String,
    pub trade_level: Vec<String>,
    pub status: String,
    pub buy_token_link: String,
    pub reserved_number: u32,
    pub sale_rate: String,
    pub network_code: String,
    pub platform: String,
}

impl RaisedTokenConfig {
    pub fn platform_default(network_code: &str) -> Self {
        Self {
            symbol: RAISED_TOKEN_SYMBOL.to_string(),
            native_symbol: RAISED_TOKEN_NATIVE_SYMBOL.to_string(),
            symbol_address: RAISED_TOKEN_ADDRESS.to_string(),
            deploy_cost: RAISED_TOKEN_DEPLOY_COST.to_string(),
            buy_fee: RAISED_TOKEN_BUY_FEE.to_string(),
            sell_fee: RAISED_TOKEN_SELL_FEE.to_string(),
            min_trade_fee: RAISED_TOKEN_MIN_TRADE_FEE.to_string(),
            b0_amount: RAISED_TOKEN_B0_AMOUNT.to_string(),
            total_b_amount: RAISED_TOKEN_TOTAL_B_AMOUNT.to_string(),
            total_amount: RAISED_TOKEN_TOTAL_AMOUNT.to_string(),
            logo_url: RAISED_TOKEN_LOGO_URL.to_string(),
            trade_level: RAISED_TOKEN_TRADE_LEVELS
                .iter()
                .map(|level| level.to_string())
                .collect(),
            status: RAISED_TOKEN_STATUS.to_string(),
            buy_token_link: RAISED_TOKEN_BUY_LINK.to_string(),
            reserved_number: RAISED_TOKEN_RESERVED_NUMBER,
            sale_rate: RAISED_TOKEN_SALE_RATE.to_string(),
            network_code: network_code.to_string(),
            platform: RAISED_TOKEN_PLATFORM.to_string(),
        }
    }
}

/// Body of `/v1/private/token/create`.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTokenBody {
    pub name: String,
    pub short_name: String,
    pub desc: String,
    pub img_url: String,
    pub launch_time: i64,
    pub label: TokenLabel,
    pub web_url: String,
    pub twitter_url: String,
    pub telegram_url: String,
    pub pre_sale: String,
    pub total_supply: u64,
    pub raised_amount: u64,
    pub sale_rate: f64,
    pub reserve_rate: f64,
    pub lp_trading_fee: f64,
    pub fun_group: bool,
    pub click_fun: bool,
    pub symbol: String,
    pub raised_token: RaisedTokenConfig,
}

impl CreateTokenBody {
    pub fn new(request: &TokenCreationRequest, network_code: &str, now_ms: i64) -> Self {
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            name: request.name.trim().to_string(),
            short_name: request.symbol.trim().to_string(),
            desc: request.description.trim().to_string(),
            img_url: request
                .image_url
                .clone()
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_LOGO_URL.to_string()),
            launch_time: request.launch_time.unwrap_or(now_ms),
            label: request.label,
            web_url: optional(&request.web_url),
            twitter_url: optional(&request.twitter_url),
            telegram_url: optional(&request.telegram_url),
            pre_sale: request.pre_sale.normalize().to_string(),
            total_supply: TOTAL_SUPPLY,
            raised_amount: RAISED_AMOUNT,
            sale_rate: SALE_RATE,
            reserve_rate: RESERVE_RATE,
            lp_trading_fee: LP_TRADING_FEE,
            fun_group: false,
            click_fun: false,
            symbol: RAISED_SYMBOL.to_string(),
            raised_token: RaisedTokenConfig::platform_default(network_code),
        }
    }
}

/// Signed creation arguments, submitted verbatim to `createToken`.
/// Requested fresh for every launch, never reused.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreationAuthorization {
    pub create_arg: Bytes,
    pub signature: Bytes,
}
