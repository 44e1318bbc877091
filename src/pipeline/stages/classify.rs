//! Classification stage: group assignment and ordering
//!
//! Channels without a group get the category from the keyword tables.
//! Within each source, channels are then ordered by service, configured
//! category order, and alphanumeric name, which keeps rendered playlists
//! stable from run to run.

use crate::classify::ChannelClassifier;
use crate::config::ClassifyConfig;

use super::SourceChannels;

pub struct ClassifyStage {
    classifier: ChannelClassifier,
}

impl ClassifyStage {
    pub fn new(config: &ClassifyConfig) -> Self {
        Self {
            classifier: ChannelClassifier::new(config),
        }
    }

    pub fn run(&self, sources: &mut [SourceChannels]) {
        let category_order = self.classifier.category_order();
        let order_index = |category: &str| {
            category_order
                .iter()
                .position(|c| c == category)
                .unwrap_or(category_order.len())
        };

        for source in sources.iter_mut() {
            let mut keyed: Vec<((String, usize, String), crate::models::Channel)> = source
                .channels
                .drain(..)
                .map(|mut channel| {
                    let classification = self.classifier.classify(&channel.name);
                    if channel.group_title.is_none() {
                        channel.group_title = Some(classification.category.clone());
                    }
                    let category = channel.group_title.clone().unwrap_or_default();
                    let key = (
                        classification.service,
                        order_index(&category),
                        sort_name(&channel.name),
                    );
                    (key, channel)
                })
                .collect();

            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            source.channels = keyed.into_iter().map(|(_, channel)| channel).collect();
        }
    }
}

/// Sort key used for channel ordering: alphanumeric characters only,
/// lowercased, so punctuation and spacing don't scatter related names
fn sort_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeywordGroup, StreamSourceConfig, StreamSourceType};
    use crate::models::Channel;

    fn channel(name: &str, group: Option<&str>) -> Channel {
        Channel {
            name: name.to_string(),
            tvg_id: None,
            tvg_name: None,
            tvg_logo: None,
            group_title: group.map(str::to_string),
            stream_url: format!("https://host.example/{name}.m3u8"),
            http_headers: None,
            source_name: "test".to_string(),
        }
    }

    fn source_with(channels: Vec<Channel>) -> SourceChannels {
        SourceChannels {
            config: StreamSourceConfig {
                name: "test".to_string(),
                source_type: StreamSourceType::M3u,
                url: "https://host.example/list.m3u".to_string(),
                enabled: true,
                country: None,
                play_url_template: None,
                rename_rules: Vec::new(),
                exclude_names: Vec::new(),
                exclude_group_title: None,
                append_header_params: false,
                schedule: None,
                group_title: None,
                headers: None,
            },
            channels,
        }
    }

    fn stage() -> ClassifyStage {
        ClassifyStage::new(&ClassifyConfig {
            services: vec![],
            categories: vec![
                KeywordGroup {
                    name: "Sport".to_string(),
                    keywords: vec!["sport".to_string()],
                },
                KeywordGroup {
                    name: "News".to_string(),
                    keywords: vec!["news".to_string()],
                },
            ],
            default_service: "Free".to_string(),
            default_category: "Other".to_string(),
        })
    }

    #[test]
    fn fills_missing_groups_from_keyword_tables() {
        let mut sources = vec![source_with(vec![
            channel("Sky Sport", None),
            channel("Rai News", None),
            channel("Boing", None),
        ])];
        stage().run(&mut sources);

        let groups: Vec<&str> = sources[0]
            .channels
            .iter()
            .map(|c| c.group_title.as_deref().unwrap())
            .collect();
        assert!(groups.contains(&"Sport"));
        assert!(groups.contains(&"News"));
        assert!(groups.contains(&"Other"));
    }

    #[test]
    fn preserves_existing_groups() {
        let mut sources = vec![source_with(vec![channel("Sky Sport", Some("Curated"))])];
        stage().run(&mut sources);
        assert_eq!(
            sources[0].channels[0].group_title.as_deref(),
            Some("Curated")
        );
    }

    #[test]
    fn orders_by_category_then_name() {
        let mut sources = vec![source_with(vec![
            channel("Zeta News", None),
            channel("Alpha News", None),
            channel("Beta Sport", None),
        ])];
        stage().run(&mut sources);

        let names: Vec<&str> = sources[0].channels.iter().map(|c| c.name.as_str()).collect();
        // Sport is configured before News
        assert_eq!(names, vec!["Beta Sport", "Alpha News", "Zeta News"]);
    }
}
