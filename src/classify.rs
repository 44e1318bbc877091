//! Keyword-driven channel classification
//!
//! Assigns each channel a service and a category from the configured
//! keyword tables. Group order is significant: the first group with a
//! matching trigger wins, so narrower groups belong before catch-alls.

use crate::config::ClassifyConfig;

struct CompiledGroup {
    name: String,
    keywords: Vec<String>,
}

/// Classifier over pre-lowercased keyword tables
pub struct ChannelClassifier {
    services: Vec<CompiledGroup>,
    categories: Vec<CompiledGroup>,
    default_service: String,
    default_category: String,
}

/// Service and category assigned to one channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub service: String,
    pub category: String,
}

impl ChannelClassifier {
    pub fn new(config: &ClassifyConfig) -> Self {
        let compile = |groups: &[crate::config::KeywordGroup]| {
            groups
                .iter()
                .map(|group| CompiledGroup {
                    name: group.name.clone(),
                    keywords: group.keywords.iter().map(|k| k.to_lowercase()).collect(),
                })
                .collect()
        };

        Self {
            services: compile(&config.services),
            categories: compile(&config.categories),
            default_service: config.default_service.clone(),
            default_category: config.default_category.clone(),
        }
    }

    pub fn classify(&self, channel_name: &str) -> Classification {
        let haystack = channel_name.to_lowercase();

        Classification {
            service: Self::first_match(&self.services, &haystack)
                .unwrap_or_else(|| self.default_service.clone()),
            category: Self::first_match(&self.categories, &haystack)
                .unwrap_or_else(|| self.default_category.clone()),
        }
    }

    /// Category names in configuration order, defaults last; used to keep
    /// playlist group ordering stable across runs
    pub fn category_order(&self) -> Vec<String> {
        let mut order: Vec<String> = self.categories.iter().map(|g| g.name.clone()).collect();
        if !order.contains(&self.default_category) {
            order.push(self.default_category.clone());
        }
        order
    }

    fn first_match(groups: &[CompiledGroup], haystack: &str) -> Option<String> {
        groups
            .iter()
            .find(|group| group.keywords.iter().any(|k| haystack.contains(k.as_str())))
            .map(|group| group.name.clone())
    }
}
