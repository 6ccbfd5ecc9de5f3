//! Gift catching core: data model plus the spawner, per-frame physics, catch
//! detection, scoring policy and the session state machine.
//!
//! Nothing in here touches the browser; the `web` module drives it from
//! `requestAnimationFrame` and a spawn interval.

use serde::{Deserialize, Serialize};

pub mod collision;
pub mod driver;
pub mod physics;
pub mod scoring;
pub mod session;
pub mod spawner;

pub use collision::check_catch;
pub use driver::{Driver, Scheduler};
pub use physics::{Advance, advance};
pub use scoring::{catch_points, next_streak, speed_for_score};
pub use session::{FinalScore, GameEvent, GameOutcome, GamePhase, Session, SessionSnapshot};
pub use spawner::Spawner;

/// Fixed palette. Boxes and gifts match on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftColor {
    Red,
    Green,
    Blue,
    Yellow,
}

impl GiftColor {
    pub const ALL: [GiftColor; 4] = [
        GiftColor::Red,
        GiftColor::Green,
        GiftColor::Blue,
        GiftColor::Yellow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GiftColor::Red => "red",
            GiftColor::Green => "green",
            GiftColor::Blue => "blue",
            GiftColor::Yellow => "yellow",
        }
    }

    /// Fill colour used by the canvas renderer.
    pub fn css(self) -> &'static str {
        match self {
            GiftColor::Red => "#ef4444",
            GiftColor::Green => "#22c55e",
            GiftColor::Blue => "#3b82f6",
            GiftColor::Yellow => "#eab308",
        }
    }
}

/// Cosmetic glyph; independent of colour and never used for matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiftKind {
    Present,
    Ribbon,
    Tree,
    Star,
}

impl GiftKind {
    pub const ALL: [GiftKind; 4] = [
        GiftKind::Present,
        GiftKind::Ribbon,
        GiftKind::Tree,
        GiftKind::Star,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            GiftKind::Present => "🎁",
            GiftKind::Ribbon => "🎀",
            GiftKind::Tree => "🎄",
            GiftKind::Star => "⭐",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftId(pub u64);

/// A falling gift. `x` never changes after spawn; `y` grows every frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    pub id: GiftId,
    pub kind: GiftKind,
    pub color: GiftColor,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub missed: bool,
}

impl Gift {
    /// Flag the gift as fallen past the catch zone. A gift is only ever missed once.
    pub fn mark_missed(&mut self) {
        debug_assert!(!self.missed, "gift {:?} marked missed twice", self.id);
        self.missed = true;
    }
}

/// A catch target at the bottom of the play area, one per palette colour.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatchBox {
    pub id: usize,
    pub color: GiftColor,
    /// Left edge, percent of play width.
    pub x: f64,
}

impl CatchBox {
    pub const WIDTH: f64 = 18.0;
    const FIRST_X: f64 = 12.0;
    const SPACING: f64 = 21.0;

    /// Evenly spaced boxes in palette order.
    pub fn layout() -> Vec<CatchBox> {
        GiftColor::ALL
            .iter()
            .enumerate()
            .map(|(idx, &color)| CatchBox {
                id: idx,
                color,
                x: Self::FIRST_X + idx as f64 * Self::SPACING,
            })
            .collect()
    }

    pub fn centre(&self) -> f64 {
        self.x + Self::WIDTH / 2.0
    }
}

/// Box whose column is nearest to `x_pct` (pointer input in the box strip).
pub fn box_nearest(boxes: &[CatchBox], x_pct: f64) -> Option<&CatchBox> {
    boxes.iter().min_by(|a, b| {
        let da = (a.centre() - x_pct).abs();
        let db = (b.centre() - x_pct).abs();
        da.total_cmp(&db)
    })
}
