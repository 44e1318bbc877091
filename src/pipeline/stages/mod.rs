//! Pipeline stage implementations

pub mod classify;
pub mod generation;
pub mod ingestion;
pub mod reconcile;

use crate::config::StreamSourceConfig;
use crate::models::Channel;

/// Channels of one source, paired with the configuration that produced them
/// so later stages can apply per-source options
#[derive(Debug)]
pub struct SourceChannels {
    pub config: StreamSourceConfig,
    pub channels: Vec<Channel>,
}
