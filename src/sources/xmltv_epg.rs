//! XMLTV guide source handler
//!
//! Fetches one configured guide URL (gzip or plain, detected by content)
//! and parses it into an in-memory guide.

use tracing::info;

use crate::config::EpgSourceConfig;
use crate::errors::AppResult;
use crate::models::EpgGuide;
use crate::utils::xmltv::parse_xmltv;
use crate::utils::{DecompressingHttpClient, StandardHttpClient};

/// XMLTV guide source handler
pub struct XmltvEpgHandler {
    http_client: StandardHttpClient,
}

impl XmltvEpgHandler {
    pub fn new(http_client: StandardHttpClient) -> Self {
        Self { http_client }
    }

    pub async fn ingest(&self, source: &EpgSourceConfig) -> AppResult<EpgGuide> {
        let content = self.http_client.fetch_text(&source.url).await?;
        let guide = parse_xmltv(&content)?;

        info!(
            "Parsed {} channels and {} programmes from guide source '{}'",
            guide.channels.len(),
            guide.programs.len(),
            source.name
        );

        Ok(guide)
    }
}
