//! Source handler trait definitions

use async_trait::async_trait;

use crate::config::{StreamSourceConfig, StreamSourceType};
use crate::errors::AppResult;
use crate::models::{Channel, EpgGuide};

/// Everything one stream source contributes to a run
///
/// Most sources only produce channels; schedule sources also emit the guide
/// entries describing their events.
#[derive(Debug, Default)]
pub struct SourceIngest {
    pub channels: Vec<Channel>,
    pub guide: EpgGuide,
}

/// Core stream source handler trait
#[async_trait]
pub trait StreamSourceHandler: Send + Sync {
    /// The source type this handler supports
    fn source_type(&self) -> StreamSourceType;

    /// Check the per-type fields this handler needs before any fetch
    fn validate(&self, source: &StreamSourceConfig) -> AppResult<()>;

    /// Fetch and parse the source into channels (and guide entries)
    async fn ingest(&self, source: &StreamSourceConfig) -> AppResult<SourceIngest>;
}
