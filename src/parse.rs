//! Input file parsing.
//!
//! Stage 1 of the pipeline. Turns the plain-text location file into a
//! validated [`Config`].
//!
//! ## Input Format
//!
//! ```text
//! Domain:https://reviews.example.com
//! whatsapp:https://wa.me/15551234567
//! Main Street Cafe|https://g.page/r/main-street/review
//! Harbour Kiosk|https://g.page/r/harbour/review
//! ```
//!
//! Blank lines are ignored everywhere, and every line is trimmed before it is
//! inspected. The first two remaining lines carry the `Domain:` and
//! `whatsapp:` prefixes; every line after them is a location.
//!
//! ## Location ids
//!
//! A location's id is its 0-based index in the non-blank line list minus one,
//! so the first location line (index 2, after the two header lines) gets
//! `"1"`. Malformed lines are skipped but still consume their slot: fixing a
//! broken line later does not renumber the locations after it, and QR codes
//! already printed for them stay valid.
//!
//! ## Failure Modes
//!
//! Structural problems with the header lines, or a file with no usable
//! location, are fatal [`ParseError`]s. A location line without exactly one
//! `|` is a [`Diagnostic`]: reported, dropped, and parsing continues.

use crate::types::{Config, Location};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DOMAIN_PREFIX: &str = "Domain:";
pub const CONTACT_PREFIX: &str = "whatsapp:";
pub const SEPARATOR: char = '|';

/// Shown to the user when the input file cannot be found.
pub const FORMAT_HINT: &str = "\
1st line: Domain:{your domain}
2nd line: whatsapp:{link to whatsapp chat}
Following lines: {location name}|{review link}";

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Input file not found: {}\nExpected format:\n{FORMAT_HINT}", .0.display())]
    ConfigMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input file has insufficient data: expected at least 2 non-empty lines")]
    InsufficientData,
    #[error("First line must start with \"{DOMAIN_PREFIX}\"")]
    MissingDomain,
    #[error("Second line must start with \"{CONTACT_PREFIX}\"")]
    MissingContactChannel,
    #[error("No valid locations found in the input file")]
    NoValidLocations,
}

/// A non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A location line with zero or several separators.
    MalformedLocation {
        /// The id this line would have received.
        entry: usize,
        /// The trimmed line text.
        text: String,
        /// Number of `|` characters found.
        separators: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedLocation {
                entry,
                text,
                separators,
            } => write!(
                f,
                "entry {entry}: \"{text}\" ({separators} separators, expected 1)"
            ),
        }
    }
}

/// Parsed input plus whatever was skipped along the way.
#[derive(Debug, Clone)]
pub struct Parsed {
    pub config: Config,
    pub diagnostics: Vec<Diagnostic>,
}

/// Read and parse the input file at `path`.
pub fn load(path: &Path) -> Result<Parsed, ParseError> {
    if !path.exists() {
        return Err(ParseError::ConfigMissing(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse raw input text.
///
/// Malformed location lines are logged at `warn` and returned as diagnostics.
pub fn parse_config(text: &str) -> Result<Parsed, ParseError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 2 {
        return Err(ParseError::InsufficientData);
    }

    let domain = lines[0]
        .strip_prefix(DOMAIN_PREFIX)
        .ok_or(ParseError::MissingDomain)?
        .trim()
        .to_string();

    let contact_channel = lines[1]
        .strip_prefix(CONTACT_PREFIX)
        .ok_or(ParseError::MissingContactChannel)?
        .trim()
        .to_string();

    let mut locations = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, entry) in lines.iter().enumerate().skip(2) {
        let id = index - 1;
        match parse_location(entry, id) {
            Ok(location) => {
                tracing::debug!(id = %location.id, name = %location.name, "parsed location");
                locations.push(location);
            }
            Err(diagnostic) => {
                tracing::warn!("skipping malformed location {diagnostic}");
                diagnostics.push(diagnostic);
            }
        }
    }

    if locations.is_empty() {
        return Err(ParseError::NoValidLocations);
    }

    Ok(Parsed {
        config: Config {
            domain,
            contact_channel,
            locations,
        },
        diagnostics,
    })
}

/// Split a location line on its single separator.
fn parse_location(entry: &str, id: usize) -> Result<Location, Diagnostic> {
    let separators = entry.matches(SEPARATOR).count();
    match entry.split_once(SEPARATOR) {
        Some((name, target)) if separators == 1 => Ok(Location {
            name: name.trim().to_string(),
            id: id.to_string(),
            target_url: target.trim().to_string(),
        }),
        _ => Err(Diagnostic::MalformedLocation {
            entry: id,
            text: entry.to_string(),
            separators,
        }),
    }
}
