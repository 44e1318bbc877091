//! M3U playlist rendering and merging

mod merge;
mod render;

pub use merge::{MergeInput, combine_playlists, exclude_group, strip_playlist_header};
pub use render::{render_entry, render_playlist};
