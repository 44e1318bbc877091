use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::models::StreamHeaders;

pub mod defaults;

use defaults::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
    #[serde(default)]
    pub classify: ClassifyConfig,
    #[serde(default)]
    pub logos: LogosConfig,
    #[serde(default)]
    pub stream_sources: Vec<StreamSourceConfig>,
    #[serde(default)]
    pub epg_sources: Vec<EpgSourceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connection timeout in seconds for all source fetches
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    /// Basename for combined playlist outputs (`<name>.m3u8` and `<name>.m3u`)
    #[serde(default = "default_playlist_basename")]
    pub playlist_basename: String,
    /// Basename for guide outputs (`<name>.xml` and `<name>.xml.gz`)
    #[serde(default = "default_epg_basename")]
    pub epg_basename: String,
    /// Guide URL advertised in the playlist `#EXTM3U` header
    pub tvg_url: Option<String>,
}

/// Tunables for the channel reconciler and its name normalizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Minimum similarity score (0-100) required to accept a match
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: u8,
    /// Scanning stops as soon as a candidate reaches this score
    #[serde(default = "default_early_exit_score")]
    pub early_exit_score: u8,
    /// Regex patterns removed from names before comparison
    #[serde(default = "default_decoration_patterns")]
    pub decoration_patterns: Vec<String>,
    /// Trailing locale suffixes removed from names (e.g. ".it")
    #[serde(default = "default_country_suffixes")]
    pub country_suffixes: Vec<String>,
    /// Replace standalone small integers with their spelled-out form
    #[serde(default = "default_true")]
    pub spell_out_numbers: bool,
    /// Spelled-out vocabulary, index equals value
    #[serde(default = "default_number_words")]
    pub number_words: Vec<String>,
}

/// A named group with its substring triggers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Keyword tables for service/category assignment
///
/// These replace the per-script keyword dictionaries of ad-hoc aggregation
/// setups with one explicit, externally loaded structure. Order matters:
/// the first group whose any keyword is contained in the channel name wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyConfig {
    #[serde(default)]
    pub services: Vec<KeywordGroup>,
    #[serde(default)]
    pub categories: Vec<KeywordGroup>,
    #[serde(default = "default_service")]
    pub default_service: String,
    #[serde(default = "default_category")]
    pub default_category: String,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            services: Vec::new(),
            categories: Vec::new(),
            default_service: default_service(),
            default_category: default_category(),
        }
    }
}

/// Remote logo table and fallback icon
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogosConfig {
    /// URL of a `"channel name": "logo url"` listing, one entry per line
    pub url: Option<String>,
    /// Icon used when no logo entry matches
    pub default_icon: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StreamSourceType {
    /// JSON channel listing API returning `{ id, name, country }` records
    ChannelApi,
    /// Remote M3U/M3U8 playlist
    M3u,
    /// JSON sport schedule keyed by day header
    Schedule,
}

impl std::fmt::Display for StreamSourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamSourceType::ChannelApi => write!(f, "channel_api"),
            StreamSourceType::M3u => write!(f, "m3u"),
            StreamSourceType::Schedule => write!(f, "schedule"),
        }
    }
}

/// One configured stream source
///
/// Per-type options are optional fields; each handler validates the fields
/// it needs before ingesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSourceConfig {
    pub name: String,
    pub source_type: StreamSourceType,
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// channel_api: only keep records with this `country` value
    pub country: Option<String>,
    /// channel_api: play URL template with an `{id}` placeholder
    pub play_url_template: Option<String>,
    /// channel_api: substring-triggered display name rewrites
    #[serde(default)]
    pub rename_rules: Vec<RenameRule>,
    /// channel_api: cleaned names dropped outright (case-insensitive)
    #[serde(default)]
    pub exclude_names: Vec<String>,

    /// m3u: drop entries carrying this `group-title`
    pub exclude_group_title: Option<String>,
    /// m3u: append this source's headers as URL-encoded `h_*` parameters
    /// to `.m3u8` stream URLs when merging
    #[serde(default)]
    pub append_header_params: bool,

    /// schedule: event extraction options
    pub schedule: Option<ScheduleOptions>,

    /// Force every channel from this source into one group
    pub group_title: Option<String>,
    /// HTTP header hints rendered with each entry from this source
    pub headers: Option<StreamHeaders>,
}

/// Options for schedule sources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOptions {
    /// Stream URL template with a `{channel_id}` placeholder
    pub stream_url_template: String,
    /// An event is kept when any keyword appears in its combined
    /// event/channel/category text
    #[serde(default)]
    pub event_keywords: Vec<String>,
    /// Categories skipped by exact name
    #[serde(default)]
    pub excluded_categories: Vec<String>,
    #[serde(default = "default_source_timezone")]
    pub source_timezone: String,
    #[serde(default = "default_target_timezone")]
    pub target_timezone: String,
    /// Events that ended more than this many hours ago are dropped
    #[serde(default = "default_grace_hours")]
    pub grace_hours: i64,
    /// Guide programme length for each event
    #[serde(default = "default_program_duration_hours")]
    pub program_duration_hours: i64,
    /// Logo attached to every event channel
    pub logo: Option<String>,
}

/// Substring-triggered display name rewrite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRule {
    /// Case-insensitive substring that triggers the rule
    pub contains: String,
    pub replace_with: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgSourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Merge only `<programme>` elements from this source, not channels
    #[serde(default)]
    pub programs_only: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            playlist_basename: default_playlist_basename(),
            epg_basename: default_epg_basename(),
            tvg_url: None,
        }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            early_exit_score: default_early_exit_score(),
            decoration_patterns: default_decoration_patterns(),
            country_suffixes: default_country_suffixes(),
            spell_out_numbers: true,
            number_words: default_number_words(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            output: OutputConfig::default(),
            reconciler: ReconcilerConfig::default(),
            classify: ClassifyConfig::default(),
            logos: LogosConfig::default(),
            stream_sources: Vec::new(),
            epg_sources: Vec::new(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            let config: Config = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.reconciler.acceptance_threshold > 100 {
            anyhow::bail!(
                "reconciler.acceptance_threshold must be within 0-100, got {}",
                self.reconciler.acceptance_threshold
            );
        }
        if self.reconciler.early_exit_score > 100 {
            anyhow::bail!(
                "reconciler.early_exit_score must be within 0-100, got {}",
                self.reconciler.early_exit_score
            );
        }
        let mut seen = std::collections::HashSet::new();
        for source in &self.stream_sources {
            if !seen.insert(source.name.as_str()) {
                anyhow::bail!("duplicate stream source name: '{}'", source.name);
            }
        }
        Ok(())
    }
}
