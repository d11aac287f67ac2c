use std::fmt;

use serde::Serialize;

pub const VERIFY_TYPE_LOGIN: &str = "LOGIN";

pub fn login_message(nonce: &str) -> String {
    format!("You are sign in Meme {}", nonce)
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NonceRequestBody {
    pub account_address: String,
    pub verify_type: String,
    pub network_code: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VerifyInfo {
    pub address: String,
    pub network_code: String,
    pub signature: String,
    pub verify_type: String,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    pub region: String,
    pub lang_type: String,
    pub login_ip: String,
    pub invite_code: String,
    pub verify_info: VerifyInfo,
    pub wallet_name: String,
}

impl LoginRequestBody {
    pub fn new(address: String, network_code: String, signature: String) -> Self {
        Self {
            region: "WEB".to_string(),
            lang_type: "EN".to_string(),
            login_ip: String::new(),
            invite_code: String::new(),
            verify_info: VerifyInfo {
                address,
                network_code,
                signature,
                verify_type: VERIFY_TYPE_LOGIN.to_string(),
            },
            wallet_name: "MetaMask".to_string(),
        }
    }
}

/// Bearer token sent as `meme-web-access`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}
