//! Filename sanitization.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters that are illegal in filenames on common filesystems.
const INVALID_FILENAME_CHARS: &[char] = &['/', '<', '>', ':', '"', '\\', '|', '?', '*'];

/// Characters trimmed from both ends of a filename.
const TRIM_CHARS: &[char] = &[' ', '\u{1b}', '\u{07}', '\u{a0}', '\t', '\n', '\r', '.'];

/// Unicode format characters (zero-width spaces, bidi overrides, ...).
static FORMAT_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Cf}$").expect("format character pattern is valid"));

/// Sanitize a filename by dropping illegal and non-printable characters.
///
/// Leading and trailing whitespace, control characters and dots are trimmed.
/// The result may be empty.
pub fn sanitize_filename(name: &str) -> String {
    let filtered: String = name
        .trim_matches(TRIM_CHARS)
        .chars()
        .filter(|c| is_printable(*c) && !INVALID_FILENAME_CHARS.contains(c))
        .collect();

    filtered.trim_matches(TRIM_CHARS).to_string()
}

/// Printable characters: everything but control characters, format
/// characters and whitespace other than the plain space.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    if c.is_control() || c.is_whitespace() {
        return false;
    }
    let mut buf = [0u8; 4];
    !FORMAT_CHAR.is_match(c.encode_utf8(&mut buf))
}
