use super::{CatchBox, Gift};
use crate::config::GameConfig;

/// First gift, in spawn order, that sits inside the catch zone and matches the box colour.
pub fn check_catch<'a>(target: &CatchBox, gifts: &'a [Gift], cfg: &GameConfig) -> Option<&'a Gift> {
    gifts
        .iter()
        .find(|g| !g.missed && g.color == target.color && cfg.in_catch_zone(g.y))
}
