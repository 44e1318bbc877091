//! Utility modules for the aggregator
//!
//! Reusable pieces shared by source handlers and pipeline stages.

pub mod decompression;
pub mod http_client;
pub mod time;
pub mod xmltv;

pub use decompression::{CompressionFormat, DecompressionService};
pub use http_client::{DecompressingHttpClient, StandardHttpClient};
