//! Source handler factory

use crate::config::StreamSourceType;
use crate::utils::StandardHttpClient;

use super::channel_api::ChannelApiHandler;
use super::m3u::M3uPlaylistHandler;
use super::schedule::ScheduleHandler;
use super::traits::StreamSourceHandler;

/// Creates the handler matching a configured source type
pub struct SourceHandlerFactory;

impl SourceHandlerFactory {
    pub fn create_handler(
        source_type: StreamSourceType,
        http_client: StandardHttpClient,
    ) -> Box<dyn StreamSourceHandler> {
        match source_type {
            StreamSourceType::ChannelApi => Box::new(ChannelApiHandler::new(http_client)),
            StreamSourceType::M3u => Box::new(M3uPlaylistHandler::new(http_client)),
            StreamSourceType::Schedule => Box::new(ScheduleHandler::new(http_client)),
        }
    }
}
