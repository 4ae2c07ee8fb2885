//! Media module: episode model, playlists and segment windows.

pub mod episode;
pub mod playlist;
pub mod segments;

pub use episode::{Chapter, Episode, Format, Tag, AUTO_FORMAT};
pub use playlist::{parse_formats, parse_segment_list};
pub use segments::{SegmentList, Window};
