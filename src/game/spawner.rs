use rand::Rng;
use rand::seq::SliceRandom;

use super::{Gift, GiftColor, GiftId, GiftKind};
use crate::config::GameConfig;

/// Constructs new gifts. Owns the id counter so ids stay unique for the life of the driver.
#[derive(Debug, Default)]
pub struct Spawner {
    next_id: u64,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// New gift just above the visible area, falling at `current_speed` plus jitter.
    /// `cfg` must have passed [`GameConfig::validate`].
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R, current_speed: f64, cfg: &GameConfig) -> Gift {
        let id = GiftId(self.next_id);
        self.next_id += 1;
        let color = *GiftColor::ALL.choose(rng).unwrap_or(&GiftColor::Red);
        let kind = *GiftKind::ALL.choose(rng).unwrap_or(&GiftKind::Present);
        let jitter = if cfg.speed_jitter > 0.0 {
            rng.gen_range(0.0..cfg.speed_jitter)
        } else {
            0.0
        };
        Gift {
            id,
            kind,
            color,
            x: rng.gen_range(cfg.spawn_x_min..cfg.spawn_x_max),
            y: cfg.spawn_y,
            speed: current_speed + jitter,
            missed: false,
        }
    }
}
