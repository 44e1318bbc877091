//! Rendering channels into M3U text

use crate::models::{Channel, StreamHeaders};

/// Render a full playlist document in the given channel order
pub fn render_playlist(channels: &[Channel], tvg_url: Option<&str>) -> String {
    let mut out = String::new();
    match tvg_url {
        Some(url) => out.push_str(&format!("#EXTM3U tvg-url=\"{url}\"\n\n")),
        None => out.push_str("#EXTM3U\n\n"),
    }

    for channel in channels {
        out.push_str(&render_entry(channel));
        out.push('\n');
    }

    out
}

/// Render one playlist entry: the `#EXTINF` line, optional player header
/// hints, and the stream URL
pub fn render_entry(channel: &Channel) -> String {
    let mut entry = String::new();

    let tvg_name = channel.tvg_name.as_deref().unwrap_or(&channel.name);
    entry.push_str(&format!(
        "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\"",
        channel.tvg_id.as_deref().unwrap_or(""),
        tvg_name,
    ));
    if let Some(logo) = &channel.tvg_logo {
        entry.push_str(&format!(" tvg-logo=\"{logo}\""));
    }
    if let Some(group) = &channel.group_title {
        entry.push_str(&format!(" group-title=\"{group}\""));
    }
    entry.push_str(&format!(",{}\n", channel.name));

    if let Some(headers) = &channel.http_headers {
        if !headers.is_empty() {
            entry.push_str(&render_header_hints(headers));
        }
    }

    entry.push_str(&channel.stream_url);
    entry.push('\n');
    entry
}

fn render_header_hints(headers: &StreamHeaders) -> String {
    let mut out = String::new();

    if let Some(user_agent) = &headers.user_agent {
        out.push_str(&format!("#EXTVLCOPT:http-user-agent={user_agent}\n"));
    }
    if let Some(referrer) = &headers.referrer {
        out.push_str(&format!("#EXTVLCOPT:http-referrer={referrer}\n"));
    }
    if let Some(origin) = &headers.origin {
        out.push_str(&format!("#EXTVLCOPT:http-origin={origin}\n"));
    }

    let mut json = serde_json::Map::new();
    if let Some(user_agent) = &headers.user_agent {
        json.insert("User-Agent".to_string(), user_agent.clone().into());
    }
    if let Some(referrer) = &headers.referrer {
        json.insert("Referer".to_string(), referrer.clone().into());
    }
    if let Some(origin) = &headers.origin {
        json.insert("Origin".to_string(), origin.clone().into());
    }
    out.push_str(&format!(
        "#EXTHTTP:{}\n",
        serde_json::Value::Object(json)
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> Channel {
        Channel {
            name: "Rai 1".to_string(),
            tvg_id: Some("rai1.it".to_string()),
            tvg_name: None,
            tvg_logo: Some("https://logos.example/rai1.png".to_string()),
            group_title: Some("DTT".to_string()),
            stream_url: "https://host.example/play/1/index.m3u8".to_string(),
            http_headers: None,
            source_name: "vavoo".to_string(),
        }
    }

    #[test]
    fn renders_extinf_attributes_in_order() {
        let entry = render_entry(&channel());
        assert!(entry.starts_with(
            "#EXTINF:-1 tvg-id=\"rai1.it\" tvg-name=\"Rai 1\" \
             tvg-logo=\"https://logos.example/rai1.png\" group-title=\"DTT\",Rai 1\n"
        ));
        assert!(entry.ends_with("https://host.example/play/1/index.m3u8\n"));
    }

    #[test]
    fn renders_empty_tvg_id_when_unmatched() {
        let mut unmatched = channel();
        unmatched.tvg_id = None;
        let entry = render_entry(&unmatched);
        assert!(entry.contains("tvg-id=\"\""));
    }

    #[test]
    fn renders_header_hint_lines() {
        let mut with_headers = channel();
        with_headers.http_headers = Some(StreamHeaders {
            user_agent: Some("VAVOO/2.6".to_string()),
            referrer: Some("https://host.example/".to_string()),
            origin: None,
        });

        let entry = render_entry(&with_headers);
        assert!(entry.contains("#EXTVLCOPT:http-user-agent=VAVOO/2.6\n"));
        assert!(entry.contains("#EXTVLCOPT:http-referrer=https://host.example/\n"));
        assert!(
            entry.contains(r#"#EXTHTTP:{"Referer":"https://host.example/","User-Agent":"VAVOO/2.6"}"#)
        );
        assert!(!entry.contains("http-origin"));
    }

    #[test]
    fn playlist_header_advertises_guide_url() {
        let playlist = render_playlist(&[channel()], Some("https://guide.example/epg.xml"));
        assert!(playlist.starts_with("#EXTM3U tvg-url=\"https://guide.example/epg.xml\"\n"));
        let bare = render_playlist(&[], None);
        assert_eq!(bare, "#EXTM3U\n\n");
    }
}
