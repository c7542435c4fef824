//! Names derived from a location: its collection URL and its QR file stem.
//!
//! ## Collection URLs
//!
//! `<domain>/<page>?loc=<id>`. The domain is used verbatim, so a trailing
//! slash in the input produces `//` in the link.
//!
//! ## File stems
//!
//! Location names are free text, QR files need portable names:
//! - `Main Street Cafe` → `main_street_cafe`
//! - `Café Zürich` → `caf__z_rich`
//! - `A&B (North)` → `a_b__north_`
//!
//! Every character outside `[a-z0-9]` after lower-casing becomes one `_`.
//! Distinct names can collapse to the same stem; see
//! [`duplicate_stems`] for how callers detect that.

use crate::types::Location;
use std::collections::HashMap;

/// Build the URL a location's QR code and link manifest entry point at.
pub fn collection_url(domain: &str, page_name: &str, id: &str) -> String {
    format!("{domain}/{page_name}?loc={id}")
}

/// Filesystem-safe stem for a location's QR image.
pub fn qr_file_stem(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// QR image filename (`<stem>.png`) for a location name.
pub fn qr_file_name(name: &str) -> String {
    format!("{}.png", qr_file_stem(name))
}

/// Stems shared by more than one location, with the names that produced them.
///
/// Returned in order of first appearance.
pub fn duplicate_stems(locations: &[Location]) -> Vec<(String, Vec<&str>)> {
    let mut order: Vec<String> = Vec::new();
    let mut by_stem: HashMap<String, Vec<&str>> = HashMap::new();

    for location in locations {
        let stem = qr_file_stem(&location.name);
        let names = by_stem.entry(stem.clone()).or_default();
        if names.is_empty() {
            order.push(stem);
        }
        names.push(&location.name);
    }

    order
        .into_iter()
        .filter_map(|stem| {
            let names = by_stem.remove(&stem)?;
            (names.len() > 1).then_some((stem, names))
        })
        .collect()
}
