//! Remote logo table
//!
//! Loads a `"channel name": "logo url"` listing (one entry per line, the
//! format logo repositories publish) into an exact-match lookup with a
//! configurable fallback icon.

use regex::Regex;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::config::LogosConfig;
use crate::utils::{DecompressingHttpClient, StandardHttpClient};

/// Exact-match logo lookup keyed by lowercased channel name
pub struct LogoProvider {
    logos: HashMap<String, String>,
    default_icon: Option<String>,
}

impl LogoProvider {
    /// Build a provider from configuration, fetching the remote table when
    /// one is configured. A failed fetch degrades to the default icon only.
    pub async fn load(client: &StandardHttpClient, config: &LogosConfig) -> Self {
        let mut logos = HashMap::new();

        if let Some(url) = &config.url {
            match client.fetch_text(url).await {
                Ok(body) => {
                    logos = Self::parse_table(&body);
                    info!("Loaded {} logo entries", logos.len());
                }
                Err(e) => {
                    warn!("Failed to fetch logo table from {}: {}", url, e);
                }
            }
        }

        Self {
            logos,
            default_icon: config.default_icon.clone(),
        }
    }

    /// Parse `"name": "url"` lines, ignoring anything else
    fn parse_table(body: &str) -> HashMap<String, String> {
        let line_re = Regex::new(r#"^\s*"(.+?)":\s*"(.+?)",?\s*$"#).expect("static regex");

        body.lines()
            .filter_map(|line| {
                line_re.captures(line).map(|caps| {
                    (caps[1].trim().to_lowercase(), caps[2].to_string())
                })
            })
            .collect()
    }

    /// Look up a channel's logo; falls back to the default icon
    pub fn lookup(&self, channel_name: &str) -> Option<String> {
        self.logos
            .get(&channel_name.trim().to_lowercase())
            .cloned()
            .or_else(|| self.default_icon.clone())
    }

    #[cfg(test)]
    pub fn from_entries(entries: &[(&str, &str)], default_icon: Option<&str>) -> Self {
        Self {
            logos: entries
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            default_icon: default_icon.map(str::to_string),
        }
    }
}
