//! Ingestion stage: fetch every configured source concurrently
//!
//! Guide sources and stream sources are fetched in one concurrent sweep.
//! A failing source is logged and skipped; it never aborts the run.

use futures::future::join_all;
use tracing::{error, info};

use crate::config::Config;
use crate::epg::canonicalize_guide;
use crate::models::EpgGuide;
use crate::sources::SourceHandlerFactory;
use crate::sources::xmltv_epg::XmltvEpgHandler;
use crate::utils::StandardHttpClient;

use super::SourceChannels;

/// Everything ingestion produced for the rest of the pipeline
pub struct IngestionOutput {
    pub sources: Vec<SourceChannels>,
    /// Merged reference guide (external guides plus schedule-source entries)
    pub guide: EpgGuide,
}

pub struct IngestionStage<'a> {
    config: &'a Config,
    http_client: StandardHttpClient,
}

impl<'a> IngestionStage<'a> {
    pub fn new(config: &'a Config, http_client: StandardHttpClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub async fn run(&self) -> IngestionOutput {
        let (guides, sources) = futures::join!(self.fetch_guides(), self.fetch_streams());

        let mut guide = EpgGuide::default();
        for (fetched, programs_only) in guides {
            guide.absorb(fetched, programs_only);
        }

        let mut source_channels = Vec::new();
        for (config, ingest) in sources {
            guide.absorb(ingest.guide, false);
            source_channels.push(SourceChannels {
                config,
                channels: ingest.channels,
            });
        }

        canonicalize_guide(&mut guide);

        info!(
            "Ingestion complete: {} sources, {} guide channels, {} programmes",
            source_channels.len(),
            guide.channels.len(),
            guide.programs.len()
        );

        IngestionOutput {
            sources: source_channels,
            guide,
        }
    }

    async fn fetch_guides(&self) -> Vec<(EpgGuide, bool)> {
        let handler = XmltvEpgHandler::new(self.http_client.clone());

        let fetches = self
            .config
            .epg_sources
            .iter()
            .filter(|source| source.enabled)
            .map(|source| {
                let handler = &handler;
                async move {
                    match handler.ingest(source).await {
                        Ok(guide) => Some((guide, source.programs_only)),
                        Err(e) => {
                            error!("Guide source '{}' failed, skipping: {}", source.name, e);
                            None
                        }
                    }
                }
            });

        join_all(fetches).await.into_iter().flatten().collect()
    }

    async fn fetch_streams(
        &self,
    ) -> Vec<(crate::config::StreamSourceConfig, crate::sources::SourceIngest)> {
        let fetches = self
            .config
            .stream_sources
            .iter()
            .filter(|source| source.enabled)
            .map(|source| {
                let http_client = self.http_client.clone();
                async move {
                    let handler =
                        SourceHandlerFactory::create_handler(source.source_type, http_client);
                    match handler.ingest(source).await {
                        Ok(ingest) => Some((source.clone(), ingest)),
                        Err(e) => {
                            error!(
                                "Stream source '{}' ({}) failed, skipping: {}",
                                source.name, source.source_type, e
                            );
                            None
                        }
                    }
                }
            });

        join_all(fetches).await.into_iter().flatten().collect()
    }
}
