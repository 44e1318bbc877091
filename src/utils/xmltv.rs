//! Streaming XMLTV parsing and rendering with quick-xml
//!
//! The parser extracts only the fields the pipeline actually uses (channel
//! id, first display name, first icon, programme metadata), which keeps
//! memory proportional to the useful content rather than the full document.

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use std::collections::HashMap;
use tracing::debug;

use crate::errors::{SourceError, SourceResult};
use crate::models::{EpgChannel, EpgGuide, EpgProgram};
use crate::utils::time::{format_xmltv_datetime, parse_xmltv_datetime};

struct PartialChannel {
    id: String,
    display_name: Option<String>,
    icon_url: Option<String>,
}

struct PartialProgram {
    channel: String,
    start: String,
    stop: Option<String>,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    language: Option<String>,
}

/// Parse an XMLTV document into an in-memory guide
///
/// Programmes with unparseable timestamps and channels without an id are
/// skipped with a debug log; a malformed document as a whole is an error.
pub fn parse_xmltv(content: &str) -> SourceResult<EpgGuide> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut guide = EpgGuide::default();
    let mut skipped_programs = 0usize;

    let mut current_channel: Option<PartialChannel> = None;
    let mut current_program: Option<PartialProgram> = None;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e.name())?;
                match name.as_str() {
                    "channel" => {
                        let attrs = parse_attributes(e);
                        current_channel = Some(PartialChannel {
                            id: attrs.get("id").cloned().unwrap_or_default(),
                            display_name: None,
                            icon_url: None,
                        });
                    }
                    "programme" => {
                        let attrs = parse_attributes(e);
                        current_program = Some(PartialProgram {
                            channel: attrs.get("channel").cloned().unwrap_or_default(),
                            start: attrs.get("start").cloned().unwrap_or_default(),
                            stop: attrs.get("stop").cloned(),
                            title: None,
                            description: None,
                            category: None,
                            language: None,
                        });
                    }
                    "icon" => {
                        record_icon(e, current_channel.as_mut());
                    }
                    _ => {}
                }
                current_text.clear();
            }

            Ok(Event::End(ref e)) => {
                let name = element_name(e.name())?;
                let text = current_text.trim();

                if let Some(ref mut program) = current_program {
                    match name.as_str() {
                        "title" if !text.is_empty() => program.title = Some(text.to_string()),
                        "desc" if !text.is_empty() => program.description = Some(text.to_string()),
                        "category" if !text.is_empty() => {
                            program.category = Some(text.to_string())
                        }
                        "language" if !text.is_empty() => {
                            program.language = Some(text.to_string())
                        }
                        "programme" => {
                            if let Some(program) = current_program.take() {
                                match complete_program(program) {
                                    Some(complete) => guide.programs.push(complete),
                                    None => skipped_programs += 1,
                                }
                            }
                        }
                        _ => {}
                    }
                } else if let Some(ref mut channel) = current_channel {
                    match name.as_str() {
                        "display-name" if !text.is_empty() && channel.display_name.is_none() => {
                            channel.display_name = Some(text.to_string());
                        }
                        "channel" => {
                            if let Some(channel) = current_channel.take() {
                                if channel.id.is_empty() {
                                    debug!("Skipping guide channel without id attribute");
                                } else {
                                    guide.channels.push(EpgChannel {
                                        channel_id: channel.id,
                                        display_name: channel.display_name.unwrap_or_default(),
                                        icon_url: channel.icon_url,
                                    });
                                }
                            }
                        }
                        _ => {}
                    }
                }
                current_text.clear();
            }

            Ok(Event::Empty(ref e)) => {
                if element_name(e.name())?.as_str() == "icon" {
                    record_icon(e, current_channel.as_mut());
                }
            }

            Ok(Event::Text(e)) => {
                let decoded = e
                    .decode()
                    .map_err(|e| SourceError::parse("xmltv", format!("invalid text: {e}")))?;
                let text = unescape(&decoded)
                    .map_err(|e| SourceError::parse("xmltv", format!("invalid text: {e}")))?;
                current_text.push_str(&text);
            }

            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|e| SourceError::parse("xmltv", format!("invalid CDATA: {e}")))?;
                current_text.push_str(text);
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(SourceError::parse("xmltv", format!("XML parsing error: {e}")));
            }

            _ => {}
        }
    }

    if skipped_programs > 0 {
        debug!(
            "Skipped {} programmes with unparseable timestamps",
            skipped_programs
        );
    }

    Ok(guide)
}

fn element_name(name: QName) -> SourceResult<String> {
    std::str::from_utf8(name.as_ref())
        .map(|s| s.to_string())
        .map_err(|e| SourceError::parse("xmltv", format!("invalid element name: {e}")))
}

fn parse_attributes(element: &BytesStart) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for attr in element.attributes().flatten() {
        if let (Ok(key), Ok(value)) = (
            std::str::from_utf8(attr.key.as_ref()),
            attr.unescape_value(),
        ) {
            attrs.insert(key.to_string(), value.to_string());
        }
    }
    attrs
}

fn record_icon(e: &BytesStart, channel: Option<&mut PartialChannel>) {
    if let Some(channel) = channel {
        if channel.icon_url.is_none() {
            let attrs = parse_attributes(e);
            if let Some(src) = attrs.get("src") {
                channel.icon_url = Some(src.clone());
            }
        }
    }
}

fn complete_program(partial: PartialProgram) -> Option<EpgProgram> {
    let start = parse_xmltv_datetime(&partial.start)?;
    let stop = partial
        .stop
        .as_deref()
        .and_then(parse_xmltv_datetime)
        .unwrap_or(start);

    Some(EpgProgram {
        channel_id: partial.channel,
        start,
        stop,
        title: partial.title.unwrap_or_default(),
        description: partial.description,
        category: partial.category,
        language: partial.language,
    })
}

/// Render a guide as an XMLTV document
pub fn write_xmltv(guide: &EpgGuide) -> String {
    let mut out = String::with_capacity(
        256 + guide.channels.len() * 128 + guide.programs.len() * 256,
    );
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str(&format!(
        "<tv generator-info-name=\"{}\">\n",
        env!("CARGO_PKG_NAME")
    ));

    for channel in &guide.channels {
        out.push_str(&format!(
            "  <channel id=\"{}\">\n",
            escape(&channel.channel_id)
        ));
        out.push_str(&format!(
            "    <display-name>{}</display-name>\n",
            escape(&channel.display_name)
        ));
        if let Some(icon) = &channel.icon_url {
            out.push_str(&format!("    <icon src=\"{}\"/>\n", escape(icon)));
        }
        out.push_str("  </channel>\n");
    }

    for program in &guide.programs {
        out.push_str(&format!(
            "  <programme start=\"{}\" stop=\"{}\" channel=\"{}\">\n",
            format_xmltv_datetime(program.start),
            format_xmltv_datetime(program.stop),
            escape(&program.channel_id)
        ));
        out.push_str(&format!("    <title>{}</title>\n", escape(&program.title)));
        if let Some(desc) = &program.description {
            out.push_str(&format!("    <desc>{}</desc>\n", escape(desc)));
        }
        if let Some(category) = &program.category {
            out.push_str(&format!(
                "    <category>{}</category>\n",
                escape(category)
            ));
        }
        if let Some(language) = &program.language {
            out.push_str(&format!(
                "    <language>{}</language>\n",
                escape(language)
            ));
        }
        out.push_str("  </programme>\n");
    }

    out.push_str("</tv>\n");
    out
}
