// Invariants of the fixed palette, glyph set and box layout.
// These tests are native-friendly and avoid wasm/browser APIs.

use std::collections::HashSet;

use gift_catcher::{CatchBox, GiftColor, GiftKind};

#[test]
fn palette_entries_are_unique() {
    let mut names = HashSet::new();
    let mut css = HashSet::new();
    for c in GiftColor::ALL {
        assert!(names.insert(c.name()), "duplicate colour name '{}'", c.name());
        assert!(css.insert(c.css()), "colour '{}' shares a fill with another", c.name());
        let fill = c.css();
        assert!(fill.starts_with('#') && fill.len() == 7, "fill '{}' for '{}' is not #rrggbb", fill, c.name());
    }
}

#[test]
fn glyphs_are_unique_and_non_empty() {
    let mut seen = HashSet::new();
    for k in GiftKind::ALL {
        assert!(!k.glyph().is_empty());
        assert!(seen.insert(k.glyph()), "duplicate glyph for {:?}", k);
    }
}

#[test]
fn boxes_are_evenly_spaced_and_do_not_overlap() {
    let boxes = CatchBox::layout();
    let gaps: Vec<f64> = boxes.windows(2).map(|w| w[1].x - w[0].x).collect();
    assert!(gaps.windows(2).all(|g| (g[0] - g[1]).abs() < 1e-9));
    assert!(gaps.iter().all(|g| *g >= CatchBox::WIDTH));
    let ids: HashSet<usize> = boxes.iter().map(|b| b.id).collect();
    assert_eq!(ids.len(), boxes.len());
}
