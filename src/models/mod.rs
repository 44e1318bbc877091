//! Core data models shared across pipeline stages
//!
//! Everything here is a plain in-memory value; the reference guide and the
//! channel set are rebuilt from the configured sources on every run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A channel assembled from any stream source
///
/// This is the unit that flows through the pipeline: ingestion produces it,
/// reconciliation fills in `tvg_id`/`tvg_logo`, classification fills in
/// `group_title`, and generation renders it into playlist entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    /// Display name, after source-specific cleanup
    pub name: String,
    pub tvg_id: Option<String>,
    pub tvg_name: Option<String>,
    pub tvg_logo: Option<String>,
    pub group_title: Option<String>,
    pub stream_url: String,
    /// Per-source HTTP header hints rendered as `#EXTVLCOPT`/`#EXTHTTP` lines
    pub http_headers: Option<StreamHeaders>,
    /// Name of the source this channel was ingested from
    pub source_name: String,
}

/// HTTP headers a player should send when opening a stream
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamHeaders {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub origin: Option<String>,
}

impl StreamHeaders {
    pub fn is_empty(&self) -> bool {
        self.user_agent.is_none() && self.referrer.is_none() && self.origin.is_none()
    }
}

/// A guide channel parsed from an XMLTV document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgChannel {
    /// Channel id as it appears in the guide (`tvg-id` join key)
    pub channel_id: String,
    pub display_name: String,
    pub icon_url: Option<String>,
}

/// A single programme entry parsed from an XMLTV document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgProgram {
    /// Guide channel id this programme belongs to
    pub channel_id: String,
    pub start: DateTime<Utc>,
    pub stop: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
}

/// Merged in-memory guide built from all configured EPG sources
#[derive(Debug, Clone, Default)]
pub struct EpgGuide {
    pub channels: Vec<EpgChannel>,
    pub programs: Vec<EpgProgram>,
}

impl EpgGuide {
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.programs.is_empty()
    }

    /// Append another guide's content, full or programmes-only
    pub fn absorb(&mut self, other: EpgGuide, programs_only: bool) {
        if !programs_only {
            self.channels.extend(other.channels);
        }
        self.programs.extend(other.programs);
    }
}
