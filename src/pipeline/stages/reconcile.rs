//! Reconciliation stage: attach guide ids and logos to channels
//!
//! Channels that already carry a `tvg-id` (curated playlist entries,
//! schedule-generated channels) pass through untouched; everything else is
//! resolved against the merged guide. Logos come from the matched guide
//! entry first, then the remote logo table, then the configured default.

use tracing::debug;

use crate::config::Config;
use crate::errors::AppResult;
use crate::models::EpgGuide;
use crate::reconcile::{ChannelReconciler, ReferenceEntry};
use crate::sources::logos::LogoProvider;
use crate::utils::StandardHttpClient;

use super::SourceChannels;

/// Match counters reported in the pipeline summary
#[derive(Debug, Default, Clone, Copy)]
pub struct MatchStats {
    pub matched: usize,
    pub unmatched: usize,
}

pub struct ReconcileStage<'a> {
    config: &'a Config,
    reconciler: ChannelReconciler,
}

impl<'a> ReconcileStage<'a> {
    pub fn new(config: &'a Config) -> AppResult<Self> {
        Ok(Self {
            config,
            reconciler: ChannelReconciler::new(&config.reconciler)?,
        })
    }

    pub async fn run(
        &self,
        mut sources: Vec<SourceChannels>,
        guide: &EpgGuide,
        http_client: &StandardHttpClient,
    ) -> (Vec<SourceChannels>, MatchStats) {
        let logos = LogoProvider::load(http_client, &self.config.logos).await;

        let entries: Vec<ReferenceEntry> = guide
            .channels
            .iter()
            .map(|channel| ReferenceEntry {
                id: channel.channel_id.clone(),
                display_name: channel.display_name.clone(),
                icon_url: channel.icon_url.clone(),
            })
            .collect();

        let mut stats = MatchStats::default();

        for source in &mut sources {
            for channel in &mut source.channels {
                if channel.tvg_id.is_none() {
                    let result = self.reconciler.resolve(&channel.name, &entries);
                    match result.id {
                        Some(id) => {
                            stats.matched += 1;
                            channel.tvg_id = Some(id);
                            if channel.tvg_logo.is_none() {
                                channel.tvg_logo = result.icon_url;
                            }
                        }
                        None => {
                            stats.unmatched += 1;
                            debug!(
                                "No guide match for '{}' from '{}' (best score {})",
                                channel.name, channel.source_name, result.score
                            );
                        }
                    }
                }

                if channel.tvg_logo.is_none() {
                    channel.tvg_logo = logos.lookup(&channel.name);
                }
            }
        }

        (sources, stats)
    }
}
