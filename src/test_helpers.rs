//! Shared test utilities for the smart-rev test suite.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let parsed = parse::load(&tmp.path().join("locations.txt")).unwrap();
//!
//! assert_eq!(location_ids(&parsed.config), vec!["1", "2", "4"]);
//! let cafe = find_location(&parsed.config, "Main Street Cafe");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::parse;
use crate::types::{Config, Location};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` to a temp directory and return it.
///
/// Tests get an isolated copy they can write next to without affecting other
/// tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    for entry in std::fs::read_dir(&fixtures).unwrap() {
        let entry = entry.unwrap();
        if entry.path().is_file() {
            std::fs::copy(entry.path(), tmp.path().join(entry.file_name())).unwrap();
        }
    }
    tmp
}

/// Parse inline input text, panicking on fatal errors.
pub fn config_from(text: &str) -> Config {
    parse::parse_config(text)
        .unwrap_or_else(|e| panic!("test input failed to parse: {e}"))
        .config
}

// =========================================================================
// Lookups
// =========================================================================

/// Find a location by name. Panics if not found.
pub fn find_location<'a>(config: &'a Config, name: &str) -> &'a Location {
    config
        .locations
        .iter()
        .find(|l| l.name == name)
        .unwrap_or_else(|| {
            let names = location_names(config);
            panic!("location '{name}' not found. Available: {names:?}")
        })
}

/// All location names in input order.
pub fn location_names(config: &Config) -> Vec<&str> {
    config.locations.iter().map(|l| l.name.as_str()).collect()
}

/// All location ids in input order.
pub fn location_ids(config: &Config) -> Vec<&str> {
    config.locations.iter().map(|l| l.id.as_str()).collect()
}

// =========================================================================
// Output inspection
// =========================================================================

/// Lines of the link manifest in `out`.
pub fn manifest_lines(out: &Path) -> Vec<String> {
    std::fs::read_to_string(out.join("generated_review_links.txt"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Sorted file names in a QR directory.
pub fn qr_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
