use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:4000/api";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
}

impl Config {
    /// Read once at startup; TODO_API_BASE_URL overrides the local
    /// development default.
    pub fn from_env() -> Self {
        Self::from_value(env::var("TODO_API_BASE_URL").ok())
    }

    fn from_value(base_url: Option<String>) -> Self {
        Config {
            base_url: base_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }
}
