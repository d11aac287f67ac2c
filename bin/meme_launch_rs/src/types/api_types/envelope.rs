use serde::Deserialize;
use serde_json::Value;

pub const API_SUCCESS_CODE: &str = "0";

/// `{code, data, msg}` wrapper around every launch API response.
/// `code` arrives either as a number or as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub code: Value,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ApiEnvelope {
    pub fn code_str(&self) -> String {
        match &self.code {
            Value::String(code) => code.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code_str() == API_SUCCESS_CODE
    }

    /// Error text from `msg`, falling back to a textual `data`.
    pub fn message(&self) -> String {
        if let Some(msg) = self.msg.as_ref().filter(|msg| !msg.is_empty()) {
            return msg.clone();
        }
        match &self.data {
            Value::String(data) => data.clone(),
            Value::Null => "no message".to_string(),
            other => other.to_string(),
        }
    }

    /// `data` as a plain string, numbers accepted.
    pub fn data_str(&self) -> Option<String> {
        match &self.data {
            Value::String(data) if !data.is_empty() => Some(data.clone()),
            Value::Number(data) => Some(data.to_string()),
            _ => None,
        }
    }
}
