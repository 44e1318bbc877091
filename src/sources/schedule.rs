//! Schedule source handler
//!
//! Turns a JSON sport schedule into event channels plus the guide entries
//! describing them. The document is keyed by day header
//! (`"Saturday 01st March 2025 - Schedule Time UK GMT"`), each day mapping
//! category names (possibly HTML-decorated) to event lists, each event
//! carrying a wall-clock time and the channels broadcasting it.
//!
//! Playlist entries and guide entries share one generated channel id, so
//! the rendered outputs join without any further matching.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{ScheduleOptions, StreamSourceConfig, StreamSourceType};
use crate::errors::{AppError, AppResult, SourceError};
use crate::models::{Channel, EpgChannel, EpgGuide, EpgProgram};
use crate::sources::flexible_string;
use crate::utils::time::{local_event_time, parse_day_header, parse_timezone};
use crate::utils::{DecompressingHttpClient, StandardHttpClient};

use super::traits::{SourceIngest, StreamSourceHandler};

/// Schedule document: day header -> category -> events
pub type ScheduleDoc = HashMap<String, HashMap<String, Vec<ScheduleEvent>>>;

#[derive(Debug, Deserialize)]
pub struct ScheduleEvent {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub channels: Vec<ScheduleEventChannel>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleEventChannel {
    #[serde(default)]
    pub channel_name: String,
    #[serde(default, deserialize_with = "flexible_string")]
    pub channel_id: String,
}

/// Schedule source handler
pub struct ScheduleHandler {
    http_client: StandardHttpClient,
    now: DateTime<Utc>,
    tag_regex: Regex,
}

impl ScheduleHandler {
    pub fn new(http_client: StandardHttpClient) -> Self {
        Self::new_with_now(http_client, Utc::now())
    }

    /// Create a handler with a fixed "now", for reproducible extraction
    pub fn new_with_now(http_client: StandardHttpClient, now: DateTime<Utc>) -> Self {
        Self {
            http_client,
            now,
            tag_regex: Regex::new(r"<[^>]+>").expect("static regex"),
        }
    }

    /// Extract event channels and guide entries from a parsed schedule
    pub fn extract(
        &self,
        doc: ScheduleDoc,
        source: &StreamSourceConfig,
        options: &ScheduleOptions,
    ) -> AppResult<SourceIngest> {
        let source_tz = parse_timezone(&options.source_timezone)
            .map_err(AppError::configuration)?;
        let target_tz = parse_timezone(&options.target_timezone)
            .map_err(AppError::configuration)?;
        let grace = Duration::hours(options.grace_hours);
        let program_duration = Duration::hours(options.program_duration_hours);

        let keywords: Vec<String> = options
            .event_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();

        let mut events: Vec<(DateTime<Utc>, Channel, EpgChannel, EpgProgram)> = Vec::new();
        let mut skipped_categories = 0usize;
        let mut skipped_keywords = 0usize;
        let mut skipped_expired = 0usize;

        for (day_header, categories) in &doc {
            let Some(date) = parse_day_header(day_header) else {
                warn!("Unparseable day header '{}', skipping day", day_header);
                continue;
            };

            for (category_raw, day_events) in categories {
                let category = self.tag_regex.replace_all(category_raw, "");
                let category = category.trim();

                if options.excluded_categories.iter().any(|c| c == category) {
                    skipped_categories += day_events.len();
                    continue;
                }

                for event in day_events {
                    let Some(start) = local_event_time(date, &event.time, source_tz) else {
                        warn!(
                            "Invalid event time '{}' for '{}', skipping",
                            event.time, event.event
                        );
                        continue;
                    };

                    if self.now - start > grace {
                        skipped_expired += event.channels.len();
                        continue;
                    }

                    for channel in &event.channels {
                        if !matches_keywords(&keywords, channel, event, category) {
                            skipped_keywords += 1;
                            continue;
                        }

                        events.push(self.build_event_channel(
                            source, options, event, channel, category, start, target_tz,
                            program_duration,
                        ));
                    }
                }
            }
        }

        // Day and category maps hash in arbitrary order; sort for stable output
        events.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));

        info!(
            "Schedule source '{}': kept {} event channels ({} filtered by keywords, {} expired, {} in excluded categories)",
            source.name,
            events.len(),
            skipped_keywords,
            skipped_expired,
            skipped_categories
        );

        let mut ingest = SourceIngest::default();
        for (_, channel, guide_channel, program) in events {
            ingest.channels.push(channel);
            ingest.guide.channels.push(guide_channel);
            ingest.guide.programs.push(program);
        }
        Ok(ingest)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_event_channel(
        &self,
        source: &StreamSourceConfig,
        options: &ScheduleOptions,
        event: &ScheduleEvent,
        channel: &ScheduleEventChannel,
        category: &str,
        start: DateTime<Utc>,
        target_tz: chrono_tz::Tz,
        program_duration: Duration,
    ) -> (DateTime<Utc>, Channel, EpgChannel, EpgProgram) {
        let local_start = start.with_timezone(&target_tz);
        let name = format!(
            "{} {} {}",
            event.event,
            local_start.format("%d/%m/%y - %H:%M"),
            channel.channel_name
        );

        let id = event_channel_id(&source.name, &event.event, &channel.channel_name, start);
        debug!("Event channel '{}' -> id {}", name, id);

        let playlist_channel = Channel {
            name: name.clone(),
            tvg_id: Some(id.clone()),
            tvg_name: None,
            tvg_logo: options.logo.clone(),
            group_title: source
                .group_title
                .clone()
                .or_else(|| Some(category.to_string())),
            stream_url: options
                .stream_url_template
                .replace("{channel_id}", &channel.channel_id),
            http_headers: source.headers.clone(),
            source_name: source.name.clone(),
        };

        let guide_channel = EpgChannel {
            channel_id: id.clone(),
            display_name: name,
            icon_url: options.logo.clone(),
        };

        let program = EpgProgram {
            channel_id: id,
            start,
            stop: start + program_duration,
            title: event.event.clone(),
            description: None,
            category: Some(category.to_string()),
            language: None,
        };

        (start, playlist_channel, guide_channel, program)
    }
}

fn matches_keywords(
    keywords: &[String],
    channel: &ScheduleEventChannel,
    event: &ScheduleEvent,
    category: &str,
) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let combined = format!("{} {} {}", channel.channel_name, event.event, category).to_lowercase();
    keywords.iter().any(|k| combined.contains(k.as_str()))
}

/// Stable id for one (event, channel, start) triple
///
/// The same schedule entry maps to the same id on every run, so playlist
/// and guide outputs stay consistent across regenerations.
fn event_channel_id(
    source_name: &str,
    event: &str,
    channel_name: &str,
    start: DateTime<Utc>,
) -> String {
    let mut hasher = DefaultHasher::new();
    source_name.hash(&mut hasher);
    event.hash(&mut hasher);
    channel_name.hash(&mut hasher);
    start.timestamp().hash(&mut hasher);
    let hash = hasher.finish();

    Uuid::from_u128(((hash as u128) << 64) | (hash as u128)).to_string()
}

#[async_trait]
impl StreamSourceHandler for ScheduleHandler {
    fn source_type(&self) -> StreamSourceType {
        StreamSourceType::Schedule
    }

    fn validate(&self, source: &StreamSourceConfig) -> AppResult<()> {
        super::validate_source_url(&source.name, &source.url)?;

        let Some(options) = &source.schedule else {
            return Err(AppError::Source(SourceError::invalid_config(
                "schedule",
                format!("source '{}' needs a [schedule] section", source.name),
            )));
        };
        if !options.stream_url_template.contains("{channel_id}") {
            return Err(AppError::Source(SourceError::invalid_config(
                "schedule.stream_url_template",
                format!(
                    "source '{}' needs a stream_url_template with a {{channel_id}} placeholder",
                    source.name
                ),
            )));
        }
        parse_timezone(&options.source_timezone).map_err(AppError::configuration)?;
        parse_timezone(&options.target_timezone).map_err(AppError::configuration)?;
        Ok(())
    }

    async fn ingest(&self, source: &StreamSourceConfig) -> AppResult<SourceIngest> {
        self.validate(source)?;
        let options = source
            .schedule
            .as_ref()
            .ok_or_else(|| AppError::internal("schedule options present after validation"))?;

        let doc: ScheduleDoc = self.http_client.fetch_json(&source.url).await?;
        self.extract(doc, source, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use chrono::TimeZone;

    fn options() -> ScheduleOptions {
        ScheduleOptions {
            stream_url_template: "https://proxy.example/stream-{channel_id}.m3u8".to_string(),
            event_keywords: vec!["italy".to_string(), "tennis".to_string()],
            excluded_categories: vec!["Cricket".to_string()],
            source_timezone: "Europe/London".to_string(),
            target_timezone: "Europe/Rome".to_string(),
            grace_hours: 2,
            program_duration_hours: 2,
            logo: Some("https://logos.example/event.png".to_string()),
        }
    }

    fn source() -> StreamSourceConfig {
        StreamSourceConfig {
            name: "events".to_string(),
            source_type: StreamSourceType::Schedule,
            url: "https://host.example/schedule.json".to_string(),
            enabled: true,
            country: None,
            play_url_template: None,
            rename_rules: Vec::new(),
            exclude_names: Vec::new(),
            exclude_group_title: None,
            append_header_params: false,
            schedule: Some(options()),
            group_title: Some("Live Events".to_string()),
            headers: None,
        }
    }

    fn handler() -> ScheduleHandler {
        // Fixed clock: 1 March 2025, 12:00 UTC
        ScheduleHandler::new_with_now(
            StandardHttpClient::new(&HttpConfig::default()),
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    fn sample_doc() -> ScheduleDoc {
        serde_json::from_str(
            r#"{
            "Saturday 01st March 2025 - Schedule Time UK GMT": {
                "Tennis</span>": [
                    {
                        "time": "14:00",
                        "event": "ATP Open: Final",
                        "channels": [
                            {"channel_name": "Sky Sport Italy", "channel_id": "877"},
                            {"channel_name": "BBC One", "channel_id": "12"}
                        ]
                    },
                    {
                        "time": "08:00",
                        "event": "ATP Open: Early Round",
                        "channels": [
                            {"channel_name": "Sky Sport Italy", "channel_id": "877"}
                        ]
                    }
                ],
                "Cricket": [
                    {
                        "time": "15:00",
                        "event": "Test Match Italy",
                        "channels": [
                            {"channel_name": "Willow Italy", "channel_id": "44"}
                        ]
                    }
                ]
            }
        }"#,
        )
        .unwrap()
    }

    #[test]
    fn extracts_matching_event_channels() {
        let ingest = handler()
            .extract(sample_doc(), &source(), &options())
            .unwrap();

        // Early round started 08:00 UK (4h before noon) and is expired;
        // Cricket is excluded; BBC One matches "tennis" via the category.
        assert_eq!(ingest.channels.len(), 2);
        assert_eq!(ingest.guide.channels.len(), 2);
        assert_eq!(ingest.guide.programs.len(), 2);
    }

    #[test]
    fn event_name_carries_target_timezone_time() {
        let ingest = handler()
            .extract(sample_doc(), &source(), &options())
            .unwrap();
        // 14:00 UK is 15:00 in Rome in early March
        let sky = ingest
            .channels
            .iter()
            .find(|c| c.name.contains("Sky Sport Italy"))
            .unwrap();
        assert_eq!(sky.name, "ATP Open: Final 01/03/25 - 15:00 Sky Sport Italy");
    }

    #[test]
    fn playlist_and_guide_share_channel_ids() {
        let ingest = handler()
            .extract(sample_doc(), &source(), &options())
            .unwrap();
        for (channel, guide_channel) in ingest.channels.iter().zip(&ingest.guide.channels) {
            assert_eq!(channel.tvg_id.as_deref(), Some(guide_channel.channel_id.as_str()));
        }
    }

    #[test]
    fn stream_url_uses_template() {
        let ingest = handler()
            .extract(sample_doc(), &source(), &options())
            .unwrap();
        let sky = ingest
            .channels
            .iter()
            .find(|c| c.name.contains("Sky Sport Italy"))
            .unwrap();
        assert_eq!(
            sky.stream_url,
            "https://proxy.example/stream-877.m3u8"
        );
    }

    #[test]
    fn programme_spans_configured_duration() {
        let ingest = handler()
            .extract(sample_doc(), &source(), &options())
            .unwrap();
        let program = &ingest.guide.programs[0];
        assert_eq!(program.stop - program.start, Duration::hours(2));
        assert_eq!(program.category.as_deref(), Some("Tennis"));
    }

    #[test]
    fn ids_are_stable_across_runs() {
        let first = handler()
            .extract(sample_doc(), &source(), &options())
            .unwrap();
        let second = handler()
            .extract(sample_doc(), &source(), &options())
            .unwrap();
        let ids = |ingest: &SourceIngest| {
            ingest
                .channels
                .iter()
                .map(|c| c.tvg_id.clone().unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn empty_keywords_keep_everything_current() {
        let mut options = options();
        options.event_keywords.clear();
        let ingest = handler().extract(sample_doc(), &source(), &options).unwrap();
        // Still excludes Cricket and the expired early round
        assert_eq!(ingest.channels.len(), 2);
    }

    #[test]
    fn validation_rejects_missing_placeholder() {
        let handler = handler();
        let mut bad = source();
        bad.schedule.as_mut().unwrap().stream_url_template =
            "https://proxy.example/stream.m3u8".to_string();
        assert!(handler.validate(&bad).is_err());
        assert!(handler.validate(&source()).is_ok());
    }

    #[test]
    fn validation_rejects_unknown_timezone() {
        let handler = handler();
        let mut bad = source();
        bad.schedule.as_mut().unwrap().target_timezone = "Mars/Olympus".to_string();
        assert!(handler.validate(&bad).is_err());
    }
}
