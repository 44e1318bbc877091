//! Guide merging and output rendering
//!
//! All fetched guides are merged into one document. Channel ids are
//! canonicalized (spaces stripped, lowercased) on both the channel elements
//! and the programme references so downstream joins cannot miss on
//! formatting differences between guide publishers.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::EpgGuide;
use crate::utils::xmltv::write_xmltv;

/// Canonical form of a guide channel id: no spaces, lowercase
pub fn canonicalize_channel_id(id: &str) -> String {
    id.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Canonicalize every channel id and programme reference in a guide,
/// then drop duplicate channel elements (first occurrence wins)
pub fn canonicalize_guide(guide: &mut EpgGuide) {
    for channel in &mut guide.channels {
        channel.channel_id = canonicalize_channel_id(&channel.channel_id);
    }
    for program in &mut guide.programs {
        program.channel_id = canonicalize_channel_id(&program.channel_id);
    }

    let mut seen = std::collections::HashSet::new();
    guide
        .channels
        .retain(|channel| seen.insert(channel.channel_id.clone()));
}

/// Write the merged guide as `<basename>.xml` and `<basename>.xml.gz`
pub fn write_guide_outputs(
    guide: &EpgGuide,
    directory: &Path,
    basename: &str,
) -> AppResult<(PathBuf, PathBuf)> {
    let xml = write_xmltv(guide);

    let xml_path = directory.join(format!("{basename}.xml"));
    std::fs::write(&xml_path, &xml)
        .map_err(|e| AppError::output(xml_path.display().to_string(), e.to_string()))?;

    let gz_path = directory.join(format!("{basename}.xml.gz"));
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(xml.as_bytes())
        .and_then(|_| encoder.finish())
        .map_err(|e| AppError::output(gz_path.display().to_string(), e.to_string()))
        .and_then(|compressed| {
            std::fs::write(&gz_path, compressed)
                .map_err(|e| AppError::output(gz_path.display().to_string(), e.to_string()))
        })?;

    info!(
        "Wrote guide with {} channels and {} programmes to {}",
        guide.channels.len(),
        guide.programs.len(),
        xml_path.display()
    );

    Ok((xml_path, gz_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EpgChannel, EpgProgram};
    use chrono::{TimeZone, Utc};

    fn channel(id: &str, name: &str) -> EpgChannel {
        EpgChannel {
            channel_id: id.to_string(),
            display_name: name.to_string(),
            icon_url: None,
        }
    }

    #[test]
    fn canonicalizes_ids_and_references_together() {
        let mut guide = EpgGuide {
            channels: vec![channel("Rai 1", "Rai 1")],
            programs: vec![EpgProgram {
                channel_id: "Rai 1".to_string(),
                start: Utc.with_ymd_and_hms(2025, 3, 1, 20, 0, 0).unwrap(),
                stop: Utc.with_ymd_and_hms(2025, 3, 1, 22, 0, 0).unwrap(),
                title: "Film".to_string(),
                description: None,
                category: None,
                language: None,
            }],
        };

        canonicalize_guide(&mut guide);

        assert_eq!(guide.channels[0].channel_id, "rai1");
        assert_eq!(guide.programs[0].channel_id, "rai1");
    }

    #[test]
    fn deduplicates_channels_after_canonicalization() {
        let mut guide = EpgGuide {
            channels: vec![channel("Rai 1", "Rai 1"), channel("rai1", "Rai Uno")],
            programs: vec![],
        };

        canonicalize_guide(&mut guide);

        assert_eq!(guide.channels.len(), 1);
        assert_eq!(guide.channels[0].display_name, "Rai 1");
    }

    #[test]
    fn writes_plain_and_gzipped_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let guide = EpgGuide {
            channels: vec![channel("rai1.it", "Rai 1")],
            programs: vec![],
        };

        let (xml_path, gz_path) = write_guide_outputs(&guide, dir.path(), "epg").unwrap();

        let xml = std::fs::read_to_string(&xml_path).unwrap();
        assert!(xml.contains("rai1.it"));

        let gz = std::fs::read(&gz_path).unwrap();
        let decompressed =
            crate::utils::DecompressionService::decompress(bytes::Bytes::from(gz)).unwrap();
        assert_eq!(decompressed, xml.as_bytes());
    }
}
