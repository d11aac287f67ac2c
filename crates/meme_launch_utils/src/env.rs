pub fn get_env(key: &str, default_value: Option<String>) -> String {
    match default_value {
        Some(value) => std::env::var(key).unwrap_or(value),
        None => std::env::var(key).unwrap_or_else(|_| panic!("expect env {}", key)),
    }
}

/// Like [`get_env`] but treats unset and blank values alike.
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
