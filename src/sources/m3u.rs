//! M3U playlist source handler
//!
//! Parses standard M3U/M3U8 documents with `#EXTINF` metadata. Attributes
//! (`tvg-id`, `tvg-name`, `tvg-logo`, `group-title`) are kept so already
//! curated playlists pass through with their joins intact; `#EXTVLCOPT`
//! header hints are captured onto the entry. Entries are deduplicated on
//! stream URL plus name.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::config::{StreamSourceConfig, StreamSourceType};
use crate::errors::AppResult;
use crate::models::{Channel, StreamHeaders};
use crate::utils::{DecompressingHttpClient, StandardHttpClient};

use super::traits::{SourceIngest, StreamSourceHandler};

struct PartialEntry {
    name: String,
    attributes: HashMap<String, String>,
    headers: StreamHeaders,
}

/// M3U source handler
pub struct M3uPlaylistHandler {
    http_client: StandardHttpClient,
}

impl M3uPlaylistHandler {
    pub fn new(http_client: StandardHttpClient) -> Self {
        Self { http_client }
    }

    /// Parse playlist text into channels
    pub fn parse_playlist(&self, content: &str, source: &StreamSourceConfig) -> Vec<Channel> {
        let mut channels = Vec::new();
        let mut current: Option<PartialEntry> = None;
        let mut seen = HashSet::new();
        let mut duplicates = 0usize;

        for (line_num, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(extinf) = line.strip_prefix("#EXTINF:") {
                current = Some(parse_extinf(extinf));
            } else if let Some(opt) = line.strip_prefix("#EXTVLCOPT:") {
                if let Some(entry) = current.as_mut() {
                    parse_vlc_option(opt, &mut entry.headers);
                }
            } else if line.starts_with('#') {
                continue;
            } else {
                // Stream URL line closes the current entry
                let Some(entry) = current.take() else {
                    warn!(
                        "Stream URL without #EXTINF metadata at line {} of '{}'",
                        line_num + 1,
                        source.name
                    );
                    continue;
                };

                if !seen.insert(format!("{line}|{}", entry.name)) {
                    duplicates += 1;
                    continue;
                }

                channels.push(self.complete_channel(entry, line, source));
            }
        }

        if duplicates > 0 {
            info!(
                "Removed {} duplicate entries from M3U source '{}'",
                duplicates, source.name
            );
        }

        channels
    }

    fn complete_channel(
        &self,
        entry: PartialEntry,
        url: &str,
        source: &StreamSourceConfig,
    ) -> Channel {
        let headers = if entry.headers.is_empty() {
            source.headers.clone()
        } else {
            Some(entry.headers)
        };

        Channel {
            name: entry.name,
            tvg_id: entry.attributes.get("tvg-id").cloned().filter(|s| !s.is_empty()),
            tvg_name: entry.attributes.get("tvg-name").cloned(),
            tvg_logo: entry.attributes.get("tvg-logo").cloned(),
            group_title: source
                .group_title
                .clone()
                .or_else(|| entry.attributes.get("group-title").cloned()),
            stream_url: url.to_string(),
            http_headers: headers,
            source_name: source.name.clone(),
        }
    }
}

/// Parse the body of an `#EXTINF` line (duration, attributes, title)
fn parse_extinf(extinf: &str) -> PartialEntry {
    // The title follows the last comma outside any quoted attribute; the
    // simple rfind matches how these playlists are actually written.
    let (attrs_part, title) = match extinf.rfind(',') {
        Some(pos) => (&extinf[..pos], extinf[pos + 1..].trim()),
        None => (extinf, ""),
    };

    PartialEntry {
        name: title.to_string(),
        attributes: parse_extinf_attributes(attrs_part),
        headers: StreamHeaders::default(),
    }
}

/// Parse `key="value"` pairs from an EXTINF attribute section
fn parse_extinf_attributes(attrs_part: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();

    let mut chars = attrs_part.chars().peekable();
    let mut current_key = String::new();
    let mut current_value = String::new();
    let mut in_quotes = false;
    let mut in_value = false;

    while let Some(ch) = chars.next() {
        match ch {
            ' ' | '\t' if !in_quotes => {
                if in_value {
                    if !current_key.is_empty() && !current_value.is_empty() {
                        attributes.insert(current_key.clone(), current_value.clone());
                    }
                    current_value.clear();
                    in_value = false;
                }
                current_key.clear();
            }
            '=' if !in_quotes && !in_value => {
                in_value = true;
                if chars.peek() == Some(&'"') {
                    chars.next();
                    in_quotes = true;
                }
            }
            '"' if in_value => {
                in_quotes = false;
                if !current_key.is_empty() {
                    attributes.insert(current_key.clone(), current_value.clone());
                }
                current_key.clear();
                current_value.clear();
                in_value = false;
            }
            _ => {
                if in_value {
                    current_value.push(ch);
                } else {
                    current_key.push(ch);
                }
            }
        }
    }

    if in_value && !current_key.is_empty() && !current_value.is_empty() {
        attributes.insert(current_key, current_value);
    }

    attributes
}

fn parse_vlc_option(option: &str, headers: &mut StreamHeaders) {
    if let Some(value) = option.strip_prefix("http-user-agent=") {
        headers.user_agent = Some(value.to_string());
    } else if let Some(value) = option.strip_prefix("http-referrer=") {
        headers.referrer = Some(value.to_string());
    } else if let Some(value) = option.strip_prefix("http-origin=") {
        headers.origin = Some(value.to_string());
    }
}

#[async_trait]
impl StreamSourceHandler for M3uPlaylistHandler {
    fn source_type(&self) -> StreamSourceType {
        StreamSourceType::M3u
    }

    fn validate(&self, source: &StreamSourceConfig) -> AppResult<()> {
        super::validate_source_url(&source.name, &source.url)
    }

    async fn ingest(&self, source: &StreamSourceConfig) -> AppResult<SourceIngest> {
        self.validate(source)?;
        let content = self.http_client.fetch_text(&source.url).await?;
        let channels = self.parse_playlist(&content, source);

        info!(
            "Parsed {} channels from M3U source '{}'",
            channels.len(),
            source.name
        );

        Ok(SourceIngest {
            channels,
            guide: Default::default(),
        })
    }
}
