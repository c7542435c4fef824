//! Behaviour of the generated review page, as plain Rust.
//!
//! The page ships its logic as JavaScript (`static/smart_rev.js`); this module
//! is the same model in testable form and the reference the script mirrors
//! function by function:
//!
//! | Rust | Script |
//! |---|---|
//! | [`loc_param`] + [`PageView::open`] | `locParam` + `openView` |
//! | [`transition`] | `transition` |
//! | [`RatingState::star_marks`] | `starMarks` |
//! | [`complaint_link`] | `complaintLink` |
//! | [`LayoutConstraint::field_height`] | `constrainedFieldHeight` |
//!
//! The script gets its constants from [`RatingRules`], which the generator
//! embeds in the page, and exposes its model as `window.smartReview`.
//!
//! ## State machine
//!
//! ```text
//! Unselected --Rate(k)--> Selected(k) --DelayElapsed--> ComplaintFlow(k)  (k <= 3)
//!                                                   \-> PositiveFlow(k)   (k >= 4)
//! ```
//!
//! Rating is write-once: `Rate` outside `Unselected` changes nothing. Both
//! flows are terminal.

use crate::types::Location;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use std::time::Duration;

/// Number of rating controls on the page.
pub const STAR_COUNT: u8 = 5;

/// Highest rating routed to the private complaint flow.
pub const COMPLAINT_THRESHOLD: u8 = 3;

/// Prepended to the visitor's complaint text in the contact link.
pub const COMPLAINT_PREFIX: &str = "I have a complaint. ";

/// Share of the viewport the card may occupy before the complaint field shrinks.
pub const MAX_HEIGHT_FRACTION: f64 = 0.9;

/// Pause between choosing a rating and revealing the follow-up flow.
pub const SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Pause before the complaint controls fade in.
pub const REVEAL_DELAY: Duration = Duration::from_millis(100);

/// Bytes left alone by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// The constants above as the page script receives them, under `rating` in
/// the embedded data block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRules {
    pub star_count: u8,
    pub complaint_threshold: u8,
    pub complaint_prefix: &'static str,
    pub max_height_fraction: f64,
    pub settle_delay_ms: u64,
    pub reveal_delay_ms: u64,
}

impl Default for RatingRules {
    fn default() -> Self {
        Self {
            star_count: STAR_COUNT,
            complaint_threshold: COMPLAINT_THRESHOLD,
            complaint_prefix: COMPLAINT_PREFIX,
            max_height_fraction: MAX_HEIGHT_FRACTION,
            settle_delay_ms: SETTLE_DELAY.as_millis() as u64,
            reveal_delay_ms: REVEAL_DELAY.as_millis() as u64,
        }
    }
}

/// A rating in `1..=STAR_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: u8) -> Option<Self> {
        (1..=STAR_COUNT).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Which follow-up flow this rating leads to.
    pub fn flow(self) -> Flow {
        if self.0 <= COMPLAINT_THRESHOLD {
            Flow::Complaint
        } else {
            Flow::Positive
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Complaint,
    Positive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingState {
    #[default]
    Unselected,
    /// Chosen, follow-up not yet revealed.
    Selected(Rating),
    ComplaintFlow(Rating),
    PositiveFlow(Rating),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingEvent {
    /// Click on the control with this value.
    Rate(u8),
    /// The transition delay after a selection has passed.
    DelayElapsed,
}

impl RatingState {
    pub fn rating(self) -> Option<Rating> {
        match self {
            RatingState::Unselected => None,
            RatingState::Selected(r) | RatingState::ComplaintFlow(r) | RatingState::PositiveFlow(r) => {
                Some(r)
            }
        }
    }

    pub fn flow(self) -> Option<Flow> {
        match self {
            RatingState::ComplaintFlow(_) => Some(Flow::Complaint),
            RatingState::PositiveFlow(_) => Some(Flow::Positive),
            _ => None,
        }
    }

    /// "Chosen" marker for each control, `1..=STAR_COUNT` in order.
    ///
    /// Every entry is explicit so re-rendering clears stale marks.
    pub fn star_marks(self) -> [bool; STAR_COUNT as usize] {
        let chosen = self.rating().map_or(0, Rating::value);
        std::array::from_fn(|i| (i as u8) < chosen)
    }
}

/// Advance the rating state.
pub fn transition(state: RatingState, event: RatingEvent) -> RatingState {
    match (state, event) {
        (RatingState::Unselected, RatingEvent::Rate(value)) => {
            Rating::new(value).map_or(state, RatingState::Selected)
        }
        (RatingState::Selected(rating), RatingEvent::DelayElapsed) => match rating.flow() {
            Flow::Complaint => RatingState::ComplaintFlow(rating),
            Flow::Positive => RatingState::PositiveFlow(rating),
        },
        _ => state,
    }
}

/// Contact-channel link carrying the complaint as its `text` parameter.
///
/// The `?text=` query is always appended to the channel URL as-is. The
/// message is escaped like `encodeURIComponent`, so spaces become `%20`.
pub fn complaint_link(channel: &str, complaint: &str) -> String {
    let message = format!("{COMPLAINT_PREFIX}{complaint}");
    format!("{channel}?text={}", utf8_percent_encode(&message, URI_COMPONENT))
}

/// The contact link stays inert until the visitor has typed something.
pub fn contact_link_enabled(complaint: &str) -> bool {
    !complaint.is_empty()
}

/// Rendered sizes, in CSS pixels, fed to [`LayoutConstraint::field_height`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMeasurement {
    pub viewport_height: f64,
    pub container_height: f64,
    pub field_height: f64,
}

/// Keeps the card within a fraction of the viewport by shrinking the
/// complaint field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraint {
    pub max_fraction: f64,
}

impl Default for LayoutConstraint {
    fn default() -> Self {
        Self {
            max_fraction: MAX_HEIGHT_FRACTION,
        }
    }
}

impl LayoutConstraint {
    /// New complaint field height, or `None` when the layout already fits.
    pub fn field_height(&self, m: LayoutMeasurement) -> Option<f64> {
        let limit = m.viewport_height * self.max_fraction;
        if m.container_height <= limit {
            return None;
        }
        Some((m.field_height - (m.container_height - limit)).max(0.0))
    }
}

/// First `loc` value of a query string (leading `?` allowed).
pub fn loc_param(query: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "loc")
        .map(|(_, value)| value.into_owned())
}

/// What the page shows once it has read its query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageView<'a> {
    InvalidLocation,
    Rating {
        location: &'a Location,
        state: RatingState,
    },
}

impl<'a> PageView<'a> {
    /// Look up `loc` by exact string equality against location ids.
    pub fn open(locations: &'a [Location], loc: Option<&str>) -> Self {
        loc.and_then(|loc| locations.iter().find(|l| l.id == loc))
            .map_or(PageView::InvalidLocation, |location| PageView::Rating {
                location,
                state: RatingState::Unselected,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(value: u8) -> RatingState {
        transition(RatingState::Unselected, RatingEvent::Rate(value))
    }

    fn settled(value: u8) -> RatingState {
        transition(rated(value), RatingEvent::DelayElapsed)
    }

    fn locations() -> Vec<Location> {
        vec![
            Location {
                name: "Cafe".to_string(),
                id: "1".to_string(),
                target_url: "https://g.page/cafe".to_string(),
            },
            Location {
                name: "Kiosk".to_string(),
                id: "3".to_string(),
                target_url: "https://g.page/kiosk".to_string(),
            },
        ]
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    #[test]
    fn starts_unselected() {
        assert_eq!(RatingState::default(), RatingState::Unselected);
    }

    #[test]
    fn rate_selects() {
        assert_eq!(rated(4), RatingState::Selected(Rating(4)));
    }

    #[test]
    fn low_ratings_route_to_complaint() {
        for value in 1..=3 {
            assert_eq!(settled(value).flow(), Some(Flow::Complaint), "rating {value}");
        }
    }

    #[test]
    fn high_ratings_route_to_positive() {
        for value in 4..=5 {
            assert_eq!(settled(value).flow(), Some(Flow::Positive), "rating {value}");
        }
    }

    #[test]
    fn second_click_is_ignored() {
        let first = rated(2);
        assert_eq!(transition(first, RatingEvent::Rate(5)), first);

        let done = settled(5);
        assert_eq!(transition(done, RatingEvent::Rate(1)), done);
    }

    #[test]
    fn second_click_during_delay_does_not_change_flow() {
        let state = transition(rated(1), RatingEvent::Rate(5));
        let state = transition(state, RatingEvent::DelayElapsed);
        assert_eq!(state, RatingState::ComplaintFlow(Rating(1)));
    }

    #[test]
    fn flows_are_terminal() {
        for value in 1..=5 {
            let done = settled(value);
            assert_eq!(transition(done, RatingEvent::DelayElapsed), done);
        }
    }

    #[test]
    fn delay_without_selection_does_nothing() {
        assert_eq!(
            transition(RatingState::Unselected, RatingEvent::DelayElapsed),
            RatingState::Unselected
        );
    }

    #[test]
    fn out_of_range_rating_is_ignored() {
        assert_eq!(rated(0), RatingState::Unselected);
        assert_eq!(rated(6), RatingState::Unselected);
    }

    #[test]
    fn rating_constructor_bounds() {
        assert!(Rating::new(0).is_none());
        assert_eq!(Rating::new(1).map(Rating::value), Some(1));
        assert_eq!(Rating::new(5).map(Rating::value), Some(5));
        assert!(Rating::new(6).is_none());
    }

    // =========================================================================
    // Star marks
    // =========================================================================

    #[test]
    fn no_marks_before_selection() {
        assert_eq!(RatingState::Unselected.star_marks(), [false; 5]);
    }

    #[test]
    fn marks_up_to_selected_value() {
        assert_eq!(rated(3).star_marks(), [true, true, true, false, false]);
        assert_eq!(settled(3).star_marks(), [true, true, true, false, false]);
        assert_eq!(settled(5).star_marks(), [true; 5]);
    }

    // =========================================================================
    // Complaint link
    // =========================================================================

    #[test]
    fn complaint_message_round_trips() {
        let link = complaint_link("https://wa.me/123", "broken chair");
        let parsed = url::Url::parse(&link).unwrap();
        let text = parsed
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned());
        assert_eq!(text.as_deref(), Some("I have a complaint. broken chair"));
        assert_eq!(parsed.path(), "/123");
    }

    #[test]
    fn complaint_link_escapes_reserved_characters() {
        let link = complaint_link("https://wa.me/1", "a&b=c?d#e");
        assert!(!link.contains('#'));
        let parsed = url::Url::parse(&link).unwrap();
        let (_, text) = parsed.query_pairs().next().unwrap();
        assert_eq!(text, "I have a complaint. a&b=c?d#e");
    }

    #[test]
    fn complaint_link_with_empty_text_still_has_prefix() {
        let link = complaint_link("https://wa.me/1", "");
        assert_eq!(link, "https://wa.me/1?text=I%20have%20a%20complaint.%20");
    }

    #[test]
    fn complaint_link_encodes_like_uri_component() {
        assert_eq!(
            complaint_link("https://wa.me/15551234567", "cold coffee & slow"),
            "https://wa.me/15551234567?text=I%20have%20a%20complaint.%20cold%20coffee%20%26%20slow"
        );
        assert_eq!(
            complaint_link("c", "it's (really) bad! ~*-_. 100%+"),
            "c?text=I%20have%20a%20complaint.%20it's%20(really)%20bad!%20~*-_.%20100%25%2B"
        );
        assert_eq!(
            complaint_link("c", "Zürich"),
            "c?text=I%20have%20a%20complaint.%20Z%C3%BCrich"
        );
    }

    #[test]
    fn contact_link_inert_until_text() {
        assert!(!contact_link_enabled(""));
        assert!(contact_link_enabled(" "));
        assert!(contact_link_enabled("cold coffee"));
    }

    // =========================================================================
    // Rules handed to the page
    // =========================================================================

    #[test]
    fn rules_carry_the_constants() {
        let rules = serde_json::to_value(RatingRules::default()).unwrap();
        assert_eq!(
            rules,
            serde_json::json!({
                "starCount": 5,
                "complaintThreshold": 3,
                "complaintPrefix": "I have a complaint. ",
                "maxHeightFraction": 0.9,
                "settleDelayMs": 500,
                "revealDelayMs": 100
            })
        );
    }

    // =========================================================================
    // Layout constraint
    // =========================================================================

    #[test]
    fn layout_that_fits_is_left_alone() {
        let constraint = LayoutConstraint::default();
        let fits = LayoutMeasurement {
            viewport_height: 1000.0,
            container_height: 900.0,
            field_height: 120.0,
        };
        assert_eq!(constraint.field_height(fits), None);
    }

    #[test]
    fn overflow_shrinks_field_by_excess() {
        let constraint = LayoutConstraint::default();
        let overflowing = LayoutMeasurement {
            viewport_height: 1000.0,
            container_height: 950.0,
            field_height: 120.0,
        };
        assert_eq!(constraint.field_height(overflowing), Some(70.0));
    }

    #[test]
    fn field_never_negative() {
        let constraint = LayoutConstraint::default();
        let tiny_viewport = LayoutMeasurement {
            viewport_height: 100.0,
            container_height: 600.0,
            field_height: 80.0,
        };
        assert_eq!(constraint.field_height(tiny_viewport), Some(0.0));
    }

    // =========================================================================
    // Location lookup
    // =========================================================================

    #[test]
    fn loc_param_parsing() {
        assert_eq!(loc_param("?loc=2").as_deref(), Some("2"));
        assert_eq!(loc_param("a=1&loc=3&loc=4").as_deref(), Some("3"));
        assert_eq!(loc_param("?other=1"), None);
        assert_eq!(loc_param(""), None);
    }

    #[test]
    fn open_matched_location() {
        let locations = locations();
        let view = PageView::open(&locations, Some("3"));
        assert_eq!(
            view,
            PageView::Rating {
                location: &locations[1],
                state: RatingState::Unselected,
            }
        );
    }

    #[test]
    fn open_is_string_equality_not_numeric() {
        let locations = locations();
        assert_eq!(PageView::open(&locations, Some("01")), PageView::InvalidLocation);
        assert_eq!(PageView::open(&locations, Some("1.0")), PageView::InvalidLocation);
        assert_eq!(PageView::open(&locations, Some(" 1")), PageView::InvalidLocation);
    }

    #[test]
    fn open_without_loc_is_invalid() {
        let locations = locations();
        assert_eq!(PageView::open(&locations, None), PageView::InvalidLocation);
        assert_eq!(PageView::open(&locations, Some("9")), PageView::InvalidLocation);
    }
}
