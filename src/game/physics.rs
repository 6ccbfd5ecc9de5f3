use super::Gift;
use crate::config::GameConfig;

/// Result of one frame step: the gifts still falling and the ones that fell through.
#[derive(Debug, Default)]
pub struct Advance {
    pub active: Vec<Gift>,
    pub missed: Vec<Gift>,
}

impl Advance {
    pub fn missed_count(&self) -> usize {
        self.missed.len()
    }
}

/// Convert a wall-clock delta into nominal frames, clamped to the configured maximum.
pub fn elapsed_frames(delta_ms: f64, cfg: &GameConfig) -> f64 {
    (delta_ms / cfg.nominal_frame_ms).clamp(0.0, cfg.max_elapsed_frames)
}

/// Move every gift down by `speed * elapsed * fall_factor`. Gifts past the miss
/// threshold are flagged and split off in the same pass; order is preserved.
pub fn advance(gifts: Vec<Gift>, elapsed: f64, cfg: &GameConfig) -> Advance {
    let step = elapsed * cfg.fall_factor;
    let mut out = Advance {
        active: Vec::with_capacity(gifts.len()),
        missed: Vec::new(),
    };
    for mut gift in gifts {
        gift.y += gift.speed * step;
        if gift.y > cfg.miss_threshold {
            gift.mark_missed();
            out.missed.push(gift);
        } else {
            out.active.push(gift);
        }
    }
    out
}
