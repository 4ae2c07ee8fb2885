//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{Config, OutputMode, DEFAULT_CONFIG_FILE};

/// gronkh.tv stream downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "gtv-downloader",
    version,
    about = "Download stream episodes from gronkh.tv",
    long_about = "A CLI tool to download stream episodes and chapters from gronkh.tv.\n\n\
                  Interrupted downloads can be continued with --continue. Downloads are \
                  rate limited to avoid running into server side limits."
)]
pub struct Args {
    /// The URL of the video, e.g. https://gronkh.tv/streams/777
    #[arg(short, long, env = "GTV_URL")]
    pub url: Option<String>,

    /// The chapter to download, 0 downloads the complete stream.
    /// Start and stop are taken from the chapter unless --start/--stop are given.
    #[arg(long)]
    pub chapter: Option<i64>,

    /// The desired video format, `auto` selects the best one.
    #[arg(short, long)]
    pub format: Option<String>,

    /// The output file. Determined from the episode title if omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Video timestamp to start at, e.g. 12m34s.
    #[arg(long)]
    pub start: Option<String>,

    /// Video timestamp to stop at, e.g. 1h23m45s.
    #[arg(long)]
    pub stop: Option<String>,

    /// Overwrite the output file if it already exists.
    #[arg(long)]
    pub overwrite: bool,

    /// Continue the download if possible.
    #[arg(long = "continue")]
    pub continue_download: bool,

    /// Maximum download rate in MB/s. Don't set this too high, the servers
    /// may rate limit or ban your IP address.
    #[arg(long = "max-rate", env = "GTV_MAX_RATE")]
    pub max_rate: Option<f64>,

    /// Print one JSON object per line instead of text.
    #[arg(long)]
    pub json: bool,

    /// List the chapters and exit.
    #[arg(long)]
    pub list_chapters: bool,

    /// List the available formats and exit.
    #[arg(long)]
    pub list_formats: bool,

    /// Path to configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Whether only a listing was requested.
    pub fn is_listing(&self) -> bool {
        self.list_chapters || self.list_formats
    }

    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.options.url = Some(url.clone());
        }

        if let Some(chapter) = self.chapter {
            config.options.chapter = chapter;
        }

        if let Some(format) = &self.format {
            config.options.format = format.clone();
        }

        if let Some(output) = &self.output {
            config.options.output_file = Some(output.clone());
        }

        if let Some(start) = &self.start {
            config.options.start = Some(start.clone());
        }

        if let Some(stop) = &self.stop {
            config.options.stop = Some(stop.clone());
        }

        if let Some(max_rate) = self.max_rate {
            config.options.max_rate = max_rate;
        }

        // Boolean flags (only override if set)
        if self.overwrite {
            config.options.overwrite = true;
        }

        if self.continue_download {
            config.options.continue_download = true;
        }

        if self.json {
            config.options.output_mode = OutputMode::Json;
        }
    }
}
