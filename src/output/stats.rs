//! Listings and download statistics.

use std::time::Duration;

use console::style;

use crate::download::DownloadReport;
use crate::media::{Chapter, Episode, Format};

/// Print the chapters of an episode with their numbers and offsets.
pub fn print_chapters(chapters: &[Chapter]) {
    println!("{}", style("Chapters:").bold());
    if chapters.is_empty() {
        println!("  (none)");
    }
    for chapter in chapters {
        println!(
            "  {:>3}  {:>10}  {}",
            chapter.number(),
            format_timestamp(chapter.offset),
            chapter.title
        );
    }
}

/// Print the available formats, best first.
pub fn print_formats(formats: &[Format]) {
    println!("{}", style("Available formats:").bold());
    for format in formats {
        println!("  - {}", format.name);
    }
}

/// Print the episode's metadata below its title.
pub fn print_episode_info(episode: &Episode) {
    let mut details = vec![format!("Length: {}", format_timestamp(episode.length))];
    if episode.views > 0 {
        details.push(format!("Views: {}", episode.views));
    }
    if let Some(created_at) = episode.created_at() {
        details.push(format!("Streamed: {}", created_at.format("%Y-%m-%d %H:%M UTC")));
    }
    println!("  {}", style(details.join("  |  ")).dim());

    if !episode.tags.is_empty() {
        let tags: Vec<_> = episode.tags.iter().map(|tag| tag.title.as_str()).collect();
        println!("  {}", style(format!("Tags: {}", tags.join(", "))).dim());
    }
}

/// Print statistics of a completed download.
pub fn print_download_summary(report: &DownloadReport) {
    let secs = report.elapsed.as_secs_f64();
    let average = if secs > 0.0 {
        report.bytes as f64 / secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Download complete:").bold());
    println!("  File:     {}", report.path.display());
    println!("  Segments: {}", report.segments);
    println!("  Size:     {}", format_bytes(report.bytes));
    println!(
        "  Time:     {} ({} average)",
        format_timestamp(report.elapsed),
        format_rate(average)
    );
}

/// Format a duration the way timestamps are entered, e.g. `1h23m45s`.
pub fn format_timestamp(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, total % 3600 / 60, total % 60);

    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Format a transfer rate in MB/s.
pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{:.2} MB/s", bytes_per_sec / 1_000_000.0)
}

/// Format a byte count with a decimal unit.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
