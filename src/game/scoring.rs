use crate::config::GameConfig;

/// Spawn speed for a score: one `speed_increment` per completed milestone.
pub fn speed_for_score(score: u32, cfg: &GameConfig) -> f64 {
    let milestones = score / cfg.speed_milestone.max(1);
    cfg.base_speed + milestones as f64 * cfg.speed_increment
}

/// Points for a catch made while holding `streak` (the streak before this catch).
pub fn catch_points(streak: u32, cfg: &GameConfig) -> u32 {
    cfg.catch_base_points + streak.min(cfg.streak_cap) * cfg.streak_bonus_points
}

pub fn next_streak(streak: u32, cfg: &GameConfig) -> u32 {
    (streak + 1).min(cfg.streak_cap)
}
