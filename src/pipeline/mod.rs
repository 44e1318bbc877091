//! Staged aggregation pipeline
//!
//! One run executes four stages against in-memory models:
//! ingestion (all sources fetched concurrently), reconciliation (guide ids
//! attached via fuzzy matching), classification (service/category groups),
//! and generation (playlist, combined and guide outputs).

pub mod stages;

use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::utils::StandardHttpClient;

use stages::classify::ClassifyStage;
use stages::generation::GenerationStage;
use stages::ingestion::IngestionStage;
use stages::reconcile::ReconcileStage;

/// Counters and output paths reported after a run
#[derive(Debug, Default)]
pub struct PipelineSummary {
    pub channels: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub guide_channels: usize,
    pub guide_programs: usize,
    pub outputs: Vec<PathBuf>,
}

/// Drives the stages in order over one configuration
pub struct PipelineEngine {
    config: Config,
    http_client: StandardHttpClient,
}

impl PipelineEngine {
    pub fn new(config: Config) -> Self {
        let http_client = StandardHttpClient::new(&config.http);
        Self {
            config,
            http_client,
        }
    }

    pub async fn execute(&self) -> AppResult<PipelineSummary> {
        if self.config.stream_sources.is_empty() && self.config.epg_sources.is_empty() {
            return Err(AppError::validation(
                "no sources configured; add [[stream_sources]] or [[epg_sources]]",
            ));
        }

        let stages::ingestion::IngestionOutput { sources, guide } =
            IngestionStage::new(&self.config, self.http_client.clone())
                .run()
                .await;

        let reconcile = ReconcileStage::new(&self.config)?;
        let (mut sources, match_stats) = reconcile.run(sources, &guide, &self.http_client).await;

        ClassifyStage::new(&self.config.classify).run(&mut sources);

        let outputs = GenerationStage::new(&self.config).run(&sources, &guide)?;

        let summary = PipelineSummary {
            channels: sources.iter().map(|s| s.channels.len()).sum(),
            matched: match_stats.matched,
            unmatched: match_stats.unmatched,
            guide_channels: guide.channels.len(),
            guide_programs: guide.programs.len(),
            outputs,
        };

        info!(
            "Pipeline complete: {} channels ({} matched to guide ids, {} unmatched), {} guide channels, {} programmes",
            summary.channels,
            summary.matched,
            summary.unmatched,
            summary.guide_channels,
            summary.guide_programs
        );

        Ok(summary)
    }
}
