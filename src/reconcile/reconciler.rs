//! Best-match lookup of a channel name in a reference guide

use tracing::{debug, trace};

use crate::config::ReconcilerConfig;
use crate::errors::AppResult;

use super::normalizer::NameNormalizer;

/// One guide entry the reconciler can match against
#[derive(Debug, Clone)]
pub struct ReferenceEntry {
    /// Opaque guide channel id (the `tvg-id` join key)
    pub id: String,
    pub display_name: String,
    pub icon_url: Option<String>,
}

/// Outcome of a reconciliation lookup
///
/// `id` is populated exactly when the best score reached the acceptance
/// threshold; a sub-threshold best score is still reported for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub id: Option<String>,
    pub icon_url: Option<String>,
    pub score: u8,
}

impl MatchResult {
    fn missed(score: u8) -> Self {
        Self {
            id: None,
            icon_url: None,
            score,
        }
    }
}

/// Fuzzy channel-to-guide reconciler
///
/// Stateless apart from its compiled configuration; safe to share across
/// concurrent lookups against the same immutable reference set.
pub struct ChannelReconciler {
    normalizer: NameNormalizer,
    acceptance_threshold: u8,
    early_exit_score: u8,
}

impl ChannelReconciler {
    pub fn new(config: &ReconcilerConfig) -> AppResult<Self> {
        Ok(Self {
            normalizer: NameNormalizer::new(config)?,
            acceptance_threshold: config.acceptance_threshold,
            early_exit_score: config.early_exit_score,
        })
    }

    /// Find the best guide entry for a raw channel name
    ///
    /// Scans the whole reference set unless a candidate reaches the
    /// early-exit score. Ties keep the first entry seen. Entries whose
    /// display name is empty (or normalizes to nothing) are skipped without
    /// aborting the scan.
    pub fn resolve(&self, raw_name: &str, entries: &[ReferenceEntry]) -> MatchResult {
        let query = self.normalizer.normalize(raw_name);
        if query.text.is_empty() {
            return MatchResult::missed(0);
        }

        let mut best: Option<(&ReferenceEntry, u8)> = None;

        for entry in entries {
            if entry.display_name.trim().is_empty() {
                debug!("Skipping guide entry '{}' without display name", entry.id);
                continue;
            }

            let candidate = self.normalizer.normalize(&entry.display_name);
            if candidate.text.is_empty() {
                continue;
            }

            // Numeric gate: a lone number on either side, or differing
            // numbers, means the pair refers to different channel slots.
            if !numbers_compatible(query.number, candidate.number) {
                trace!(
                    "Rejected '{}' vs '{}': incompatible numbers {:?}/{:?}",
                    raw_name, entry.display_name, query.number, candidate.number
                );
                continue;
            }

            let score = token_sort_ratio(&query.text, &candidate.text);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((entry, score));
            }
            if score >= self.early_exit_score {
                break;
            }
        }

        match best {
            Some((entry, score)) if score >= self.acceptance_threshold => MatchResult {
                id: Some(entry.id.clone()),
                icon_url: entry.icon_url.clone(),
                score,
            },
            Some((_, score)) => MatchResult::missed(score),
            None => MatchResult::missed(0),
        }
    }
}

fn numbers_compatible(query: Option<u32>, candidate: Option<u32>) -> bool {
    match (query, candidate) {
        (None, None) => true,
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Token-order-insensitive similarity ratio on a 0-100 scale
///
/// Tokens are sorted before the edit-distance ratio, so "Sport Sky" and
/// "Sky Sport" compare as identical.
fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let sorted = |s: &str| {
        let mut tokens: Vec<&str> = s.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    };

    let ratio = strsim::normalized_levenshtein(&sorted(a), &sorted(b));
    (ratio * 100.0).round() as u8
}
