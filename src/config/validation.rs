//! Configuration validation logic.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::loader::Config;
use crate::download::{DownloadRequest, ThrottleSettings};
use crate::error::{Error, Result};

/// Go style duration: one or more `<number><unit>` pairs, e.g. `1h23m45s`.
static TIMESTAMP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:ns|us|µs|ms|s|m|h))+$")
        .expect("timestamp pattern is valid")
});

static TIMESTAMP_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]*)?|\.[0-9]+)(ns|us|µs|ms|s|m|h)")
        .expect("timestamp part pattern is valid")
});

/// Plain number of seconds, e.g. `754` or `12.5`.
static SECONDS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(?:\.[0-9]+)?$").expect("seconds pattern is valid"));

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_url(config.options.url.as_deref())?;
    validate_max_rate(config.options.max_rate)?;

    if config.options.format.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "format".to_string(),
            message: "Format must not be empty, use 'auto' for the best format".to_string(),
        });
    }

    parse_optional("start", config.options.start.as_deref())?;
    parse_optional("stop", config.options.stop.as_deref())?;

    Ok(())
}

/// Check that a video URL was given.
pub fn validate_url(url: Option<&str>) -> Result<()> {
    match url {
        Some(url) if !url.trim().is_empty() => Ok(()),
        _ => Err(Error::MissingConfig(
            "url (the video URL, e.g. https://gronkh.tv/streams/777)".to_string(),
        )),
    }
}

/// Validate the rate ceiling in MB/s.
pub fn validate_max_rate(max_rate: f64) -> Result<()> {
    if !(max_rate > 0.0) || !max_rate.is_finite() {
        return Err(Error::ConfigValidation {
            field: "max_rate".to_string(),
            message: format!("The value of --max-rate must be greater than 0 (got {})", max_rate),
        });
    }

    Ok(())
}

/// Parse a video timestamp.
///
/// Accepts Go style durations (`12m34s`, `1h23m45s`, `1.5h`, `90s`) and
/// plain seconds (`754`).
pub fn parse_timestamp(input: &str) -> Result<Duration> {
    parse_timestamp_field("timestamp", input)
}

/// Turn a validated configuration into the engine's parameters.
pub fn download_request(config: &Config) -> Result<DownloadRequest> {
    validate_config(config)?;
    let options = &config.options;

    Ok(DownloadRequest {
        format: options.format.trim().to_string(),
        output: options.output_file.clone(),
        start: parse_optional("start", options.start.as_deref())?,
        stop: parse_optional("stop", options.stop.as_deref())?,
        chapter: options.chapter,
        overwrite: options.overwrite,
        continue_download: options.continue_download,
        rate_limit: config.rate_limit(),
        retry_delay: Duration::from_millis(options.retry_delay_ms),
        throttle: ThrottleSettings::default(),
    })
}

fn parse_optional(field: &str, input: Option<&str>) -> Result<Option<Duration>> {
    match input.map(str::trim) {
        None | Some("") => Ok(None),
        Some(input) => parse_timestamp_field(field, input).map(Some),
    }
}

fn parse_timestamp_field(field: &str, input: &str) -> Result<Duration> {
    let input = input.trim();
    let invalid = || Error::ConfigValidation {
        field: field.to_string(),
        message: format!(
            "Invalid timestamp '{}', expected e.g. 12m34s or 1h23m45s",
            input
        ),
    };

    let secs = if SECONDS_PATTERN.is_match(input) {
        input.parse::<f64>().map_err(|_| invalid())?
    } else if TIMESTAMP_PATTERN.is_match(input) {
        let mut total = 0.0;
        for part in TIMESTAMP_PART.captures_iter(input) {
            let value: f64 = part[1].parse().map_err(|_| invalid())?;
            total += in_secs(value, &part[2]);
        }
        total
    } else {
        return Err(invalid());
    };

    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

fn in_secs(value: f64, unit: &str) -> f64 {
    match unit {
        "h" => value * 3600.0,
        "m" => value * 60.0,
        "s" => value,
        "ms" => value / 1e3,
        "us" | "µs" => value / 1e6,
        _ => value / 1e9,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.options.url = Some("https://gronkh.tv/streams/777".to_string());
        config
    }

    #[test]
    fn test_parse_timestamp_go_style() {
        assert_eq!(parse_timestamp("12m34s").unwrap(), Duration::from_secs(754));
        assert_eq!(
            parse_timestamp("1h23m45s").unwrap(),
            Duration::from_secs(3600 + 23 * 60 + 45)
        );
        assert_eq!(parse_timestamp("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_timestamp("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_timestamp("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_timestamp("0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_timestamp_seconds() {
        assert_eq!(parse_timestamp("754").unwrap(), Duration::from_secs(754));
        assert_eq!(parse_timestamp(" 12.5 ").unwrap(), Duration::from_millis(12_500));
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        for input in ["", "abc", "12x", "-5s", "1h 2m", "inf", "12:34", "h"] {
            assert!(
                matches!(parse_timestamp(input), Err(Error::ConfigValidation { .. })),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_validate_max_rate() {
        assert!(validate_max_rate(10.0).is_ok());
        assert!(validate_max_rate(0.001).is_ok());
        assert!(validate_max_rate(0.0).is_err());
        assert!(validate_max_rate(-1.0).is_err());
        assert!(validate_max_rate(f64::NAN).is_err());
        assert!(validate_max_rate(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_config_requires_url() {
        let config = Config::default();
        assert!(matches!(
            validate_config(&config),
            Err(Error::MissingConfig(_))
        ));
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_config_bad_stop() {
        let mut config = valid_config();
        config.options.stop = Some("soon".to_string());
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { field, .. }) if field == "stop"
        ));
    }

    #[test]
    fn test_download_request() {
        let mut config = valid_config();
        config.options.format = "720p".to_string();
        config.options.start = Some("1m".to_string());
        config.options.stop = Some(String::new());
        config.options.chapter = 2;
        config.options.continue_download = true;
        config.options.max_rate = 2.0;
        config.options.retry_delay_ms = 0;
        config.options.output_file = Some(PathBuf::from("out.ts"));

        let request = download_request(&config).unwrap();
        assert_eq!(request.format, "720p");
        assert_eq!(request.start, Some(Duration::from_secs(60)));
        assert_eq!(request.stop, None);
        assert_eq!(request.chapter, 2);
        assert!(request.continue_download);
        assert!(!request.overwrite);
        assert_eq!(request.rate_limit, 2_000_000.0);
        assert_eq!(request.retry_delay, Duration::ZERO);
        assert_eq!(request.output, Some(PathBuf::from("out.ts")));
    }
}
