//! CLI output formatting for the build and check commands.
//!
//! # Information-First Display
//!
//! Every location leads with its positional index and name; the link and the
//! QR file are indented context lines. Skipped input lines are listed with the
//! entry number they would have had, so the file can be fixed without
//! counting lines by hand.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Locations
//! 001 Main Street Cafe
//!     Link: https://reviews.example.com/smart_rev.html?loc=1
//! 002 Harbour Kiosk
//!     Link: https://reviews.example.com/smart_rev.html?loc=2
//!
//! Skipped
//!     entry 3: "Old Depot, closed" (0 separators, expected 1)
//! ```
//!
//! ## Build
//!
//! Progress lines stream while the emitter runs:
//!
//! ```text
//! Page → out/smart_rev.html
//! Links → out/generated_review_links.txt (2 locations)
//! QR Harbour Kiosk → out/qrcodes/harbour_kiosk.png
//! QR Main Street Cafe failed: QR generation timed out after 10s
//! ```
//!
//! followed by the summary:
//!
//! ```text
//! Locations
//! 001 Main Street Cafe
//!     Link: https://reviews.example.com/smart_rev.html?loc=1
//!     QR: failed (QR generation timed out after 10s)
//! 002 Harbour Kiosk
//!     Link: https://reviews.example.com/smart_rev.html?loc=2
//!     QR: qrcodes/harbour_kiosk.png
//!
//! Generated 1 page, 2 links, 1 QR code (1 failed)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::emit::{EmitEvent, LocationReport, QrOutcome};
use crate::naming;
use crate::parse::Diagnostic;
use crate::pipeline::{BuildReport, CheckReport};
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `base` when it lives under it.
fn display_path(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn skipped_section(diagnostics: &[Diagnostic]) -> Vec<String> {
    if diagnostics.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![String::new(), "Skipped".to_string()];
    lines.extend(diagnostics.iter().map(|d| format!("{}{}", indent(1), d)));
    lines
}

fn qr_line(location: &LocationReport, output_dir: &Path) -> Option<String> {
    let status = match &location.qr {
        QrOutcome::Written(path) => display_path(path, output_dir),
        QrOutcome::Failed(error) => format!("failed ({error})"),
        QrOutcome::Superseded { by } => format!("replaced by entry {by} (same file name)"),
        QrOutcome::Skipped => return None,
    };
    Some(format!("{}QR: {}", indent(1), status))
}

// ============================================================================
// Check
// ============================================================================

/// Format the parsed locations, their links and anything skipped.
pub fn format_check_output(report: &CheckReport, page_name: &str) -> Vec<String> {
    let mut lines = vec!["Locations".to_string()];

    for (i, location) in report.config.locations.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), location.name));
        lines.push(format!(
            "{}Link: {}",
            indent(1),
            naming::collection_url(&report.config.domain, page_name, &location.id)
        ));
    }

    lines.extend(skipped_section(&report.diagnostics));

    if !report.shared_qr_files.is_empty() {
        lines.push(String::new());
        lines.push("Shared QR files".to_string());
        for (stem, names) in &report.shared_qr_files {
            lines.push(format!("{}{}.png: {}", indent(1), stem, names.join(", ")));
        }
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport, page_name: &str) {
    for line in format_check_output(report, page_name) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single emitter progress event as display lines.
pub fn format_emit_event(event: &EmitEvent) -> Vec<String> {
    match event {
        EmitEvent::PageWritten { path } => {
            vec![format!("Page \u{2192} {}", path.display())]
        }
        EmitEvent::LinksWritten { path, count } => vec![format!(
            "Links \u{2192} {} ({})",
            path.display(),
            plural(*count, "location", "locations")
        )],
        EmitEvent::QrWritten { name, path } => {
            vec![format!("QR {} \u{2192} {}", name, path.display())]
        }
        EmitEvent::QrFailed { name, error } => vec![format!("QR {} failed: {}", name, error)],
    }
}

/// Format the build summary: every location with its link and QR status,
/// skipped lines, then totals.
pub fn format_build_report(report: &BuildReport, output_dir: &Path) -> Vec<String> {
    let mut lines = vec!["Locations".to_string()];
    let locations = &report.emitted.locations;

    for (i, location) in locations.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), location.name));
        lines.push(format!("{}Link: {}", indent(1), location.url));
        lines.extend(qr_line(location, output_dir));
    }

    lines.extend(skipped_section(&report.diagnostics));

    let written = locations
        .iter()
        .filter(|l| matches!(l.qr, QrOutcome::Written(_)))
        .count();
    let failed = report.emitted.qr_failures().count();
    let mut summary = format!(
        "Generated 1 page, {}, {}",
        plural(locations.len(), "link", "links"),
        plural(written, "QR code", "QR codes")
    );
    if failed > 0 {
        summary.push_str(&format!(" ({failed} failed)"));
    }
    lines.push(String::new());
    lines.push(summary);

    lines
}

/// Print the build summary to stdout.
pub fn print_build_report(report: &BuildReport, output_dir: &Path) {
    for line in format_build_report(report, output_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
