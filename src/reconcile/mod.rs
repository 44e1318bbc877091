//! Channel name reconciliation against a reference guide
//!
//! This module matches uncurated channel names from live sources to guide
//! channel ids. Both sides of every comparison go through the same
//! [`NameNormalizer`], then candidates are scored with a token-order
//! insensitive similarity ratio and gated on numeric compatibility so that
//! "Channel 1" can never be claimed by a "Channel 2" guide entry.

mod normalizer;
mod reconciler;

pub use normalizer::{NameNormalizer, NormalizedName};
pub use reconciler::{ChannelReconciler, MatchResult, ReferenceEntry};
