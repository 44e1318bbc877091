//! Default values for configuration fields

pub fn default_true() -> bool {
    true
}

pub fn default_connect_timeout_secs() -> u64 {
    10
}

pub fn default_user_agent() -> String {
    format!("m3u-aggregator/{}", env!("CARGO_PKG_VERSION"))
}

pub fn default_output_directory() -> std::path::PathBuf {
    std::path::PathBuf::from(".")
}

pub fn default_playlist_basename() -> String {
    "combined_playlist".to_string()
}

pub fn default_epg_basename() -> String {
    "epg".to_string()
}

pub fn default_acceptance_threshold() -> u8 {
    90
}

pub fn default_early_exit_score() -> u8 {
    100
}

/// Decoration tokens stripped before any name comparison.
/// Resolution markers and transport tags that vary between listings
/// of the same channel.
pub fn default_decoration_patterns() -> Vec<String> {
    vec![
        r"(?i)\bFULL\s?HD\b".to_string(),
        r"(?i)\bFHD\b".to_string(),
        r"(?i)\bUHD\b".to_string(),
        r"(?i)\bHEVC\b".to_string(),
        r"(?i)\b4K\b".to_string(),
        r"(?i)\bHD\b".to_string(),
        r"(?i)\bSD\b".to_string(),
        r"(?i)\b(?:720|1080)P?\b".to_string(),
    ]
}

pub fn default_country_suffixes() -> Vec<String> {
    vec![".it".to_string()]
}

/// Spelled-out forms for standalone integers 0-20. Index equals value.
/// Larger numbers are left as digits.
pub fn default_number_words() -> Vec<String> {
    [
        "zero",
        "uno",
        "due",
        "tre",
        "quattro",
        "cinque",
        "sei",
        "sette",
        "otto",
        "nove",
        "dieci",
        "undici",
        "dodici",
        "tredici",
        "quattordici",
        "quindici",
        "sedici",
        "diciassette",
        "diciotto",
        "diciannove",
        "venti",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn default_service() -> String {
    "Free".to_string()
}

pub fn default_category() -> String {
    "Other".to_string()
}

pub fn default_source_timezone() -> String {
    "Europe/London".to_string()
}

pub fn default_target_timezone() -> String {
    "Europe/Rome".to_string()
}

pub fn default_grace_hours() -> i64 {
    2
}

pub fn default_program_duration_hours() -> i64 {
    2
}
