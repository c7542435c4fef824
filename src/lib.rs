//! # Smart Rev
//!
//! Generates the static assets a business needs to collect customer reviews
//! from several physical locations: one self-contained review page, a list of
//! per-location links, and a QR code image per location.
//!
//! Visitors who scan a code land on the page with `?loc=<id>`, rate the visit
//! from one to five stars, and are routed by the rating. Low ratings get a
//! complaint box and a pre-filled message link to the business's chat channel;
//! high ratings are sent on to the location's public review page.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! ```text
//! 1. Parse     locations.txt  →  Config            (header lines + name|url entries)
//! 2. Generate  Config         →  HTML string       (page + inlined script and data)
//! 3. Emit      Config + HTML  →  out/              (page, link manifest, QR PNGs)
//! ```
//!
//! Parsing and rendering are pure and finish before anything touches the
//! output directory, so a bad input file never leaves half-written artifacts.
//! [`pipeline::run`] chains the three stages.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`parse`] | Stage 1: reads the location file, assigns ids, collects diagnostics |
//! | [`generate`] | Stage 2: renders the review page with Maud, embeds data as JSON |
//! | [`emit`] | Stage 3: writes page and manifest, fans QR jobs out over rayon |
//! | [`pipeline`] | Runs the stages end to end; `check` parses without writing |
//! | [`rating`] | Model of the page's client-side rating flow and layout rule |
//! | [`qr`] | QR encoder trait, `qrcode`-backed PNG encoder, raster geometry |
//! | [`naming`] | Collection URLs and QR file stems |
//! | [`config`] | Optional `smart-rev.toml` loading, merging and validation |
//! | [`types`] | `Config` and `Location`, shared by every stage |
//! | [`output`] | CLI output formatting |
//! | [`logger`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## One Page For Every Location
//!
//! All locations share one HTML file and are told apart by the `loc` query
//! parameter. Printed QR codes therefore stay valid when locations are added,
//! and the page can be re-uploaded without touching the codes.
//!
//! ## Stable Ids
//!
//! A location's id comes from its position in the input file. Malformed lines
//! still take up a position, so fixing or dropping a broken line elsewhere
//! never changes the link printed on an existing code.
//!
//! ## Data, Not Globals
//!
//! The page reads its locations from a JSON block parsed once at load. The
//! script's behavior is mirrored by [`rating`], which is where the state
//! machine is unit tested.

pub mod config;
pub mod emit;
pub mod generate;
pub mod logger;
pub mod naming;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod qr;
pub mod rating;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
