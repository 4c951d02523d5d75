#![forbid(unsafe_code)]

//! Short-form clip detection.
//!
//! Search results carry no explicit "this is a Short" flag. The only reliable
//! signal is the time-status badge drawn over the thumbnail, which reads
//! `SHORTS` (and is styled as such) instead of showing a duration.

use crate::raw::{Lenient, RawVideoItem, ThumbnailOverlay};

const TIME_STATUS_OVERLAY: &str = "ThumbnailOverlayTimeStatus";
const SHORTS_MARKER: &str = "SHORTS";

/// True iff one overlay is a time-status badge whose text and style are both
/// `SHORTS`. Items without an overlay array are never shorts.
pub fn is_short(item: &RawVideoItem) -> bool {
    item.thumbnail_overlays
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(Lenient::get)
        .any(is_shorts_badge)
}

fn is_shorts_badge(overlay: &ThumbnailOverlay) -> bool {
    overlay.kind.as_deref() == Some(TIME_STATUS_OVERLAY)
        && overlay.style.as_deref() == Some(SHORTS_MARKER)
        && overlay.text.as_ref().map(|text| text.to_plain()).as_deref() == Some(SHORTS_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn is_short_value(value: &Value) -> bool {
        is_short(&RawVideoItem::from_value(value))
    }

    #[test]
    fn matching_badge_marks_a_short() {
        let item = json!({
            "id": "s1",
            "thumbnail_overlays": [
                { "type": "ThumbnailOverlayNowPlaying", "text": "Şimdi oynatılıyor" },
                { "type": "ThumbnailOverlayTimeStatus", "text": "SHORTS", "style": "SHORTS" },
            ],
        });
        assert!(is_short_value(&item));
    }

    #[test]
    fn rich_text_badge_text_is_accepted() {
        let item = json!({
            "thumbnail_overlays": [
                { "type": "ThumbnailOverlayTimeStatus", "text": { "text": "SHORTS" }, "style": "SHORTS" },
            ],
        });
        assert!(is_short_value(&item));
    }

    #[test]
    fn two_of_three_markers_is_not_enough() {
        let cases = [
            json!({ "type": "ThumbnailOverlayTimeStatus", "text": "SHORTS", "style": "DEFAULT" }),
            json!({ "type": "ThumbnailOverlayTimeStatus", "text": "0:59", "style": "SHORTS" }),
            json!({ "type": "ThumbnailOverlayToggleButton", "text": "SHORTS", "style": "SHORTS" }),
        ];
        for overlay in cases {
            let item = json!({ "thumbnail_overlays": [overlay] });
            assert!(!is_short_value(&item), "{item}");
        }
    }

    #[test]
    fn markers_must_coincide_on_one_overlay() {
        let item = json!({
            "thumbnail_overlays": [
                { "type": "ThumbnailOverlayTimeStatus", "text": "0:59", "style": "DEFAULT" },
                { "type": "Other", "text": "SHORTS", "style": "SHORTS" },
            ],
        });
        assert!(!is_short_value(&item));
    }

    #[test]
    fn missing_or_non_array_overlays_are_not_shorts() {
        assert!(!is_short_value(&json!({ "id": "v1" })));
        assert!(!is_short_value(&json!({ "thumbnail_overlays": "SHORTS" })));
        assert!(!is_short_value(&json!({ "thumbnail_overlays": { "type": "ThumbnailOverlayTimeStatus" } })));
        assert!(!is_short_value(&json!(null)));
    }

    #[test]
    fn malformed_siblings_do_not_hide_the_badge() {
        let item = json!({
            "thumbnail_overlays": [
                42,
                null,
                { "type": "ThumbnailOverlayTimeStatus", "text": "SHORTS", "style": "SHORTS" },
            ],
        });
        assert!(is_short_value(&item));
    }
}
