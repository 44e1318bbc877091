//! Channel API source handler
//!
//! Handles JSON channel listing endpoints returning an array of
//! `{ id, name, country }` records. Names are cleaned of site decorations,
//! rewritten by the configured rename rules, filtered by country and
//! exclusion list, and deduplicated with ` (n)` suffixes before the play URL
//! is built from the configured template.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::{StreamSourceConfig, StreamSourceType};
use crate::errors::{AppError, AppResult, SourceError};
use crate::models::Channel;
use crate::sources::flexible_string;
use crate::utils::{DecompressingHttpClient, StandardHttpClient};

use super::traits::{SourceIngest, StreamSourceHandler};

/// One record from the listing endpoint
#[derive(Debug, Deserialize)]
pub struct ApiChannel {
    #[serde(deserialize_with = "flexible_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// Channel API source handler
pub struct ChannelApiHandler {
    http_client: StandardHttpClient,
    decoration_regex: Regex,
    paren_regex: Regex,
}

impl ChannelApiHandler {
    pub fn new(http_client: StandardHttpClient) -> Self {
        Self {
            http_client,
            // Listing-site tags appended to channel names
            decoration_regex: Regex::new(r"\s*(\|E|\|H|\(6\)|\(7\)|\.c|\.s)")
                .expect("static regex"),
            paren_regex: Regex::new(r"\s*\([^)]*\)").expect("static regex"),
        }
    }

    /// Clean a raw listing name: strip site decorations and parentheticals,
    /// then apply the source's rename rules
    fn clean_name(&self, raw: &str, source: &StreamSourceConfig) -> String {
        let name = self.decoration_regex.replace_all(raw, "");
        let name = self.paren_regex.replace_all(&name, "");
        let name = name.trim();

        let lowered = name.to_lowercase();
        for rule in &source.rename_rules {
            if lowered.contains(&rule.contains.to_lowercase()) {
                return rule.replace_with.clone();
            }
        }

        name.to_string()
    }

    /// Turn API records into channels, applying country filter, exclusions
    /// and duplicate-name suffixes
    pub fn build_channels(
        &self,
        records: Vec<ApiChannel>,
        source: &StreamSourceConfig,
    ) -> Vec<Channel> {
        let template = source.play_url_template.as_deref().unwrap_or_default();
        let mut seen: HashMap<String, u32> = HashMap::new();
        let mut channels = Vec::new();
        let mut excluded = 0usize;

        for record in records {
            if let Some(country) = &source.country {
                if record.country.as_deref() != Some(country.as_str()) {
                    continue;
                }
            }

            let clean = self.clean_name(&record.name, source);
            if clean.is_empty() {
                continue;
            }

            let lowered = clean.to_lowercase();
            if source
                .exclude_names
                .iter()
                .any(|n| n.to_lowercase() == lowered)
            {
                excluded += 1;
                continue;
            }

            let count = seen.entry(clean.clone()).or_insert(0);
            *count += 1;
            let name = if *count > 1 {
                format!("{clean} ({count})")
            } else {
                clean
            };

            channels.push(Channel {
                name,
                tvg_id: None,
                tvg_name: None,
                tvg_logo: None,
                group_title: source.group_title.clone(),
                stream_url: template.replace("{id}", &record.id),
                http_headers: source.headers.clone(),
                source_name: source.name.clone(),
            });
        }

        if excluded > 0 {
            debug!(
                "Excluded {} channels by name from source '{}'",
                excluded, source.name
            );
        }

        channels
    }
}

#[async_trait]
impl StreamSourceHandler for ChannelApiHandler {
    fn source_type(&self) -> StreamSourceType {
        StreamSourceType::ChannelApi
    }

    fn validate(&self, source: &StreamSourceConfig) -> AppResult<()> {
        super::validate_source_url(&source.name, &source.url)?;

        let template = source.play_url_template.as_deref().unwrap_or_default();
        if !template.contains("{id}") {
            return Err(AppError::Source(SourceError::invalid_config(
                "play_url_template",
                format!(
                    "source '{}' needs a play_url_template with an {{id}} placeholder",
                    source.name
                ),
            )));
        }
        Ok(())
    }

    async fn ingest(&self, source: &StreamSourceConfig) -> AppResult<SourceIngest> {
        self.validate(source)?;

        let records: Vec<ApiChannel> = self.http_client.fetch_json(&source.url).await?;
        let total = records.len();
        let channels = self.build_channels(records, source);

        info!(
            "Ingested {} of {} listed channels from source '{}'",
            channels.len(),
            total,
            source.name
        );

        Ok(SourceIngest {
            channels,
            guide: Default::default(),
        })
    }
}
