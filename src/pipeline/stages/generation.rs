//! Generation stage: render and write every output file
//!
//! Each source gets its own playlist file; the combined `.m3u8`/`.m3u`
//! pair is merged from those rendered texts with the per-source merge
//! options, and the merged guide is written plain and gzipped.

use std::path::PathBuf;

use tracing::info;

use crate::config::Config;
use crate::epg::write_guide_outputs;
use crate::errors::{AppError, AppResult};
use crate::models::EpgGuide;
use crate::playlist::{MergeInput, combine_playlists, render_playlist};

use super::SourceChannels;

pub struct GenerationStage<'a> {
    config: &'a Config,
}

impl<'a> GenerationStage<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn run(&self, sources: &[SourceChannels], guide: &EpgGuide) -> AppResult<Vec<PathBuf>> {
        let directory = &self.config.output.directory;
        std::fs::create_dir_all(directory)
            .map_err(|e| AppError::output(directory.display().to_string(), e.to_string()))?;

        let mut outputs = Vec::new();
        let mut merge_inputs = Vec::new();

        for source in sources {
            let content = render_playlist(&source.channels, None);

            let path = directory.join(format!("{}.m3u8", file_stem(&source.config.name)));
            std::fs::write(&path, &content)
                .map_err(|e| AppError::output(path.display().to_string(), e.to_string()))?;
            info!(
                "Wrote {} entries to {}",
                source.channels.len(),
                path.display()
            );
            outputs.push(path);

            merge_inputs.push(MergeInput {
                content,
                append_params: if source.config.append_header_params {
                    source.config.headers.clone()
                } else {
                    None
                },
                exclude_group_title: source.config.exclude_group_title.clone(),
            });
        }

        let (m3u8, m3u) =
            combine_playlists(&merge_inputs, self.config.output.tvg_url.as_deref());

        let basename = &self.config.output.playlist_basename;
        for (extension, content) in [("m3u8", &m3u8), ("m3u", &m3u)] {
            let path = directory.join(format!("{basename}.{extension}"));
            std::fs::write(&path, content)
                .map_err(|e| AppError::output(path.display().to_string(), e.to_string()))?;
            outputs.push(path);
        }

        if !guide.is_empty() {
            let (xml_path, gz_path) =
                write_guide_outputs(guide, directory, &self.config.output.epg_basename)?;
            outputs.push(xml_path);
            outputs.push(gz_path);
        }

        Ok(outputs)
    }
}

/// Filesystem-safe stem derived from a source name
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
