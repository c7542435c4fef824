//! Shared types used across all pipeline stages.
//!
//! The parser builds these once; the page generator serializes them into the
//! page and the emitter turns them into links and QR images. Nothing mutates
//! them after construction.

use serde::Serialize;

/// A reviewable place: display name, positional id, review destination.
///
/// Serialized as `{name, id, targetUrl}` inside the generated page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Display label, left of the `|` separator.
    pub name: String,
    /// Positional identifier, the value matched against the page's `loc` parameter.
    pub id: String,
    /// Where a satisfied visitor is sent to leave a public review.
    pub target_url: String,
}

/// The validated input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL prefix for collection links (no trailing-slash normalisation).
    pub domain: String,
    /// Contact deep-link used for private complaints.
    pub contact_channel: String,
    /// Locations in input order. Never empty once parsing succeeds.
    pub locations: Vec<Location>,
}
