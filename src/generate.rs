//! Review page generation.
//!
//! Stage 2 of the pipeline. Renders the single page every QR code and link
//! points at. The same document serves all locations; the visitor's `loc`
//! query parameter selects which one is shown.
//!
//! ## Self-contained output
//!
//! Style sheet, script and data are all inlined, so the file can be dropped on
//! any static host (or opened from disk) and works with no further requests:
//!
//! - `static/smart_rev.css`: layout and animations
//! - `static/smart_rev.js`: the rating state machine (modelled in [`crate::rating`])
//! - a `<script type="application/json" id="sr-config">` block holding
//!   `{contactChannel, locations: [{name, id, targetUrl}], rating: {...}}`
//!
//! The script parses that block once at load and passes the frozen value to
//! its handlers; nothing is read from globals. Star count, complaint threshold,
//! message prefix, layout fraction and delays all arrive under `rating`
//! ([`RatingRules`]), so the script carries no copies of them.
//!
//! ## Embedding data safely
//!
//! The JSON is serialized by `serde_json` (UTF-8 preserved) and then `<`, `>`,
//! `&`, U+2028 and U+2029 are rewritten as `\uXXXX` escapes. Those characters
//! only ever appear inside JSON strings, so the payload stays valid JSON that
//! decodes to the same values, and a location name such as `</script>` cannot
//! end the script element early.

use crate::config::PageConfig;
use crate::rating::RatingRules;
use crate::types::{Config, Location};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSS: &str = include_str!("../static/smart_rev.css");
const JS: &str = include_str!("../static/smart_rev.js");

/// Data block read by the page script.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedConfig<'a> {
    pub contact_channel: &'a str,
    pub locations: &'a [Location],
    pub rating: RatingRules,
}

impl<'a> EmbeddedConfig<'a> {
    pub fn from_config(config: &'a Config) -> Self {
        Self {
            contact_channel: &config.contact_channel,
            locations: &config.locations,
            rating: RatingRules::default(),
        }
    }
}

/// Render the review page for every location in `config`.
pub fn render_page(config: &Config, page: &PageConfig) -> Result<String, GenerateError> {
    let data = embed_json(&EmbeddedConfig::from_config(config))?;
    Ok(base_document(&page.title, review_card(), &data).into_string())
}

/// Serialize `value` for inclusion inside a `<script>` element.
pub fn embed_json<T: Serialize>(value: &T) -> Result<String, GenerateError> {
    let json = serde_json::to_string(value)?;
    let mut escaped = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => escaped.push_str("\\u003c"),
            '>' => escaped.push_str("\\u003e"),
            '&' => escaped.push_str("\\u0026"),
            '\u{2028}' => escaped.push_str("\\u2028"),
            '\u{2029}' => escaped.push_str("\\u2029"),
            _ => escaped.push(c),
        }
    }
    Ok(escaped)
}

// ============================================================================
// HTML Components
// ============================================================================

fn base_document(title: &str, content: Markup, data: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
                script #sr-config type="application/json" { (PreEscaped(data)) }
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Empty card the script fills in: name, stars, message, follow-up actions.
fn review_card() -> Markup {
    html! {
        div.sr-container {
            h1 #sr-location-name { "Loading..." }
            div #sr-stars .sr-stars {}
            div #sr-message {}
            div #sr-actions .sr-actions {}
            noscript {
                p { "Please enable JavaScript to leave a rating." }
            }
        }
    }
}
