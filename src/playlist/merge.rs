//! Combining rendered playlists into the final outputs
//!
//! Each source renders to its own playlist first; the combined outputs are
//! assembled from those texts: per-playlist `#EXTM3U` headers are stripped,
//! per-source URL parameters appended, excluded groups dropped, and a single
//! header prepended. The `.m3u` variant differs from `.m3u8` only in the
//! guide-URL attribute name.

use crate::models::StreamHeaders;

/// One playlist text plus its merge-time options
pub struct MergeInput {
    pub content: String,
    /// Append these headers as URL-encoded `h_*` parameters to `.m3u8`
    /// stream URLs (for proxy endpoints that forward them upstream)
    pub append_params: Option<StreamHeaders>,
    /// Drop entries carrying this `group-title`
    pub exclude_group_title: Option<String>,
}

/// Remove any `#EXTM3U` header lines from a playlist body
pub fn strip_playlist_header(playlist: &str) -> String {
    playlist
        .lines()
        .filter(|line| !line.starts_with("#EXTM3U"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drop every entry block whose `#EXTINF` line carries the given group-title
///
/// A block runs from its `#EXTINF` line up to and including its URL line,
/// so `#EXTVLCOPT`/`#EXTHTTP` lines between them are dropped with it.
pub fn exclude_group(playlist: &str, group_title: &str) -> String {
    let needle = format!("group-title=\"{group_title}\"");
    let mut kept = Vec::new();
    let mut skipping = false;

    for line in playlist.lines() {
        if line.starts_with("#EXTINF") {
            skipping = line.contains(&needle);
        }
        if !skipping {
            kept.push(line);
        } else if !line.starts_with('#') && !line.trim().is_empty() {
            // URL line closes the excluded block
            skipping = false;
        }
    }

    kept.join("\n")
}

/// Append header parameters to every `.m3u8` stream URL line
pub fn append_header_params(playlist: &str, headers: &StreamHeaders) -> String {
    let mut params = String::new();
    if let Some(user_agent) = &headers.user_agent {
        params.push_str(&format!("&h_user-agent={}", urlencoding::encode(user_agent)));
    }
    if let Some(referrer) = &headers.referrer {
        params.push_str(&format!("&h_referer={}", urlencoding::encode(referrer)));
    }
    if let Some(origin) = &headers.origin {
        params.push_str(&format!("&h_origin={}", urlencoding::encode(origin)));
    }
    if params.is_empty() {
        return playlist.to_string();
    }

    playlist
        .lines()
        .map(|line| {
            if !line.starts_with('#') && line.contains(".m3u8") {
                let params = if line.contains('?') {
                    params.clone()
                } else {
                    format!("?{}", &params[1..])
                };
                format!("{line}{params}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Merge playlists into the combined `.m3u8` and `.m3u` documents
pub fn combine_playlists(inputs: &[MergeInput], tvg_url: Option<&str>) -> (String, String) {
    let mut body = String::new();

    for input in inputs {
        let mut part = strip_playlist_header(&input.content);
        if let Some(group) = &input.exclude_group_title {
            part = exclude_group(&part, group);
        }
        if let Some(headers) = &input.append_params {
            part = append_header_params(&part, headers);
        }
        let part = part.trim_matches('\n');
        if !part.is_empty() {
            body.push_str(part);
            body.push('\n');
        }
    }

    let m3u8 = match tvg_url {
        Some(url) => format!("#EXTM3U tvg-url=\"{url}\"\n{body}"),
        None => format!("#EXTM3U\n{body}"),
    };
    let m3u = m3u8.replacen("#EXTM3U tvg-url=", "#EXTM3U x-tvg-url=", 1);

    (m3u8, m3u)
}
