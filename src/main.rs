//! gtv-downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, EnvFilter};

use gtv_downloader::{
    api::{parse_video_url, GtvApi},
    cli::Args,
    config::{download_request, Config, OutputMode},
    download::{spawn_interrupt_listener, DownloadOutcome, Downloader},
    error::{exit_codes, Error, Result},
    media::{Chapter, Episode, Format},
    output::{
        print_chapters, print_download_summary, print_episode_info, print_error, print_format,
        print_formats, print_info, print_json, print_title, print_warning, ConsoleProgress,
        JsonMessage, JsonProgress,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging, stderr keeps stdout free for progress and JSON
    let log_level = if args.debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    match run(&args, &mut mode).await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            match mode {
                OutputMode::Text => print_error(&e.to_string()),
                OutputMode::Json => print_json(&JsonMessage::Error {
                    message: e.to_string(),
                }),
            }
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

async fn run(args: &Args, mode: &mut OutputMode) -> Result<i32> {
    // Load configuration, CLI arguments win
    let mut config = Config::load_or_default(&args.config)?;
    args.merge_into_config(&mut config);
    *mode = config.options.output_mode;
    tracing::debug!("Output mode: {}", mode);

    let request = download_request(&config)?;
    let video = parse_video_url(config.options.url.as_deref().unwrap_or_default())?;

    // Fetch metadata
    let api = GtvApi::new(&config.http)?;
    tracing::info!("Fetching metadata of episode {}", video.id);
    let episode = api.get_episode(&video.id).await?;
    announce_title(*mode, &episode);

    let chapter = match episode.chapter_by_number(request.chapter) {
        Ok(chapter) => chapter,
        Err(e) => {
            list_chapters(*mode, &episode.chapters);
            return Err(e);
        }
    };

    if args.is_listing() {
        if args.list_chapters {
            list_chapters(*mode, &episode.chapters);
        }
        if args.list_formats {
            list_formats(*mode, &episode.formats);
        }
        return Ok(exit_codes::SUCCESS);
    }

    let format = match episode.format_by_name(&request.format) {
        Ok(format) => format,
        Err(e) => {
            list_formats(*mode, &episode.formats);
            return Err(e);
        }
    };
    announce_selection(*mode, format, chapter);

    // Download
    let cancel = CancellationToken::new();
    let listener = spawn_interrupt_listener(cancel.clone());
    let downloader = Downloader::new(&api, cancel);

    let result = match *mode {
        OutputMode::Text => {
            println!();
            downloader
                .download(&episode, &request, &mut ConsoleProgress::new())
                .await
        }
        OutputMode::Json => {
            downloader
                .download(&episode, &request, &mut JsonProgress::stdout())
                .await
        }
    };
    listener.abort();

    match result? {
        DownloadOutcome::Completed(report) => {
            match *mode {
                OutputMode::Text => print_download_summary(&report),
                OutputMode::Json => print_json(&JsonMessage::summary(&report)),
            }
            Ok(exit_codes::SUCCESS)
        }
        DownloadOutcome::Aborted { next_index, path } => {
            let message = format!(
                "Download of '{}' stopped before segment {}. Run again with --continue to resume.",
                path.display(),
                next_index
            );
            match *mode {
                OutputMode::Text => {
                    println!();
                    print_warning(&message);
                }
                OutputMode::Json => print_json(&JsonMessage::Info { message }),
            }
            Ok(exit_codes::ABORTED)
        }
    }
}

fn announce_title(mode: OutputMode, episode: &Episode) {
    match mode {
        OutputMode::Text => {
            print_title(&episode.title);
            print_episode_info(episode);
        }
        OutputMode::Json => print_json(&JsonMessage::Title {
            id: &episode.id,
            title: &episode.title,
        }),
    }
}

fn announce_selection(mode: OutputMode, format: &Format, chapter: Option<&Chapter>) {
    let chapter_message =
        chapter.map(|chapter| format!("Chapter: {}. {}", chapter.number(), chapter.title));

    match mode {
        OutputMode::Text => {
            println!();
            print_format(&format.name);
            if let Some(message) = chapter_message {
                print_info(&message);
            }
        }
        OutputMode::Json => {
            print_json(&JsonMessage::Format {
                format: &format.name,
            });
            if let Some(message) = chapter_message {
                print_json(&JsonMessage::Info { message });
            }
        }
    }
}

fn list_chapters(mode: OutputMode, chapters: &[Chapter]) {
    match mode {
        OutputMode::Text => {
            println!();
            print_chapters(chapters);
        }
        OutputMode::Json => print_json(&JsonMessage::AvailableChapters { chapters }),
    }
}

fn list_formats(mode: OutputMode, formats: &[Format]) {
    match mode {
        OutputMode::Text => {
            println!();
            print_formats(formats);
        }
        OutputMode::Json => print_json(&JsonMessage::AvailableFormats { formats }),
    }
}

/// Map an error to the process exit code.
fn exit_code(error: &Error) -> i32 {
    if error.is_input_error() {
        return exit_codes::INPUT_ERROR;
    }

    match error {
        Error::Config(_)
        | Error::ConfigValidation { .. }
        | Error::MissingConfig(_)
        | Error::TomlParse(_) => exit_codes::CONFIG_ERROR,
        Error::HttpStatus { .. }
        | Error::Api(_)
        | Error::Http(_)
        | Error::Playlist(_)
        | Error::UrlParse(_) => exit_codes::API_ERROR,
        Error::FileExists(_)
        | Error::ResumeStateUnreadable { .. }
        | Error::Download(_)
        | Error::Io(_) => exit_codes::DOWNLOAD_ERROR,
        _ => exit_codes::UNEXPECTED_ERROR,
    }
}
