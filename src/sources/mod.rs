//! Source type handlers
//!
//! Each stream source type (channel API, M3U playlist, schedule) has its own
//! handler implementing a common trait for validation and ingestion; the
//! factory picks the handler from the configured source type. Guide sources
//! have a single XMLTV handler.

pub mod channel_api;
pub mod factory;
pub mod logos;
pub mod m3u;
pub mod schedule;
pub mod traits;
pub mod xmltv_epg;

pub use factory::SourceHandlerFactory;
pub use traits::*;

use serde::{Deserialize, Deserializer};

use crate::errors::{AppError, AppResult, SourceError};

/// Accept JSON ids that arrive as either strings or numbers
pub(crate) fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Reject unparseable source URLs before any fetch is attempted
pub(crate) fn validate_source_url(source_name: &str, url: &str) -> AppResult<()> {
    url::Url::parse(url).map_err(|e| {
        AppError::Source(SourceError::invalid_config(
            "url",
            format!("source '{source_name}' has an invalid URL '{url}': {e}"),
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_source_url_accepts_http_and_rejects_garbage() {
        assert!(validate_source_url("ok", "https://host.example/list.m3u").is_ok());
        assert!(validate_source_url("bad", "not a url").is_err());
    }
}
