use crate::error::Error;

pub const DEFAULT_ENDPOINT_URL: &str = "https://api.airtable.com";

/// Airtable connection settings, read from the environment on every request
/// so a missing variable surfaces as a per-request error instead of a crash
/// at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_id: String,
    pub table_id: String,
    pub endpoint_url: String,
}

impl Config {
    /// Checks the three required variables independently, in order, so the
    /// first missing one names itself in the error.
    pub fn from_env() -> Result<Self, Error> {
        let api_key = require("AIRTABLE_API_KEY")?;
        let base_id = require("AIRTABLE_BASE_ID")?;
        let table_id = require("AIRTABLE_TABLE_ID")?;

        let endpoint_url = std::env::var("AIRTABLE_ENDPOINT_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT_URL.to_string());

        Ok(Self {
            api_key,
            base_id,
            table_id,
            endpoint_url,
        })
    }
}

fn require(name: &'static str) -> Result<String, Error> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::MissingConfig(name)),
    }
}
