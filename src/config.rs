//! Tuning constants for a play session.
//!
//! Positions are percentages of the play area (x of width, y of height, y grows
//! downward). Speeds are "percent per nominal frame" before `fall_factor` is applied.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub initial_lives: i32,
    pub base_speed: f64,
    /// Added to the spawn speed for every `speed_milestone` points.
    pub speed_increment: f64,
    pub speed_milestone: u32,
    pub streak_cap: u32,
    pub catch_base_points: u32,
    pub streak_bonus_points: u32,
    pub fall_factor: f64,
    pub nominal_frame_ms: f64,
    /// Upper bound on a single frame step (tab switches can stall rAF for seconds).
    pub max_elapsed_frames: f64,
    pub miss_threshold: f64,
    pub catch_zone_top: f64,
    pub catch_zone_bottom: f64,
    pub spawn_interval_ms: u32,
    pub spawn_y: f64,
    pub spawn_x_min: f64,
    pub spawn_x_max: f64,
    pub speed_jitter: f64,
    pub win_score: u32,
    pub chain_id: u64,
    pub leaderboard_size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            initial_lives: 5,
            base_speed: 1.0,
            speed_increment: 0.08,
            speed_milestone: 1000,
            streak_cap: 20,
            catch_base_points: 10,
            streak_bonus_points: 2,
            fall_factor: 0.6,
            nominal_frame_ms: 16.0,
            max_elapsed_frames: 6.0,
            miss_threshold: 105.0,
            catch_zone_top: 65.0,
            catch_zone_bottom: 95.0,
            spawn_interval_ms: 900,
            spawn_y: -5.0,
            spawn_x_min: 15.0,
            spawn_x_max: 85.0,
            speed_jitter: 0.3,
            win_score: 10_000,
            chain_id: 5031,
            leaderboard_size: 10,
        }
    }
}

impl GameConfig {
    /// Overlay a (possibly partial) JSON object on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let bad = |msg: &str| Err(GameError::InvalidConfig(msg.to_string()));
        if self.initial_lives <= 0 {
            return bad("initial_lives must be positive");
        }
        if self.nominal_frame_ms <= 0.0 {
            return bad("nominal_frame_ms must be positive");
        }
        if self.max_elapsed_frames <= 0.0 {
            return bad("max_elapsed_frames must be positive");
        }
        if self.speed_milestone == 0 {
            return bad("speed_milestone must be non-zero");
        }
        if self.catch_zone_top >= self.catch_zone_bottom {
            return bad("catch zone is empty");
        }
        if self.catch_zone_bottom >= self.miss_threshold {
            return bad("miss threshold must lie below the catch zone");
        }
        if self.spawn_y >= self.catch_zone_top {
            return bad("gifts must spawn above the catch zone");
        }
        if self.spawn_x_min >= self.spawn_x_max {
            return bad("spawn x range is empty");
        }
        if self.spawn_interval_ms == 0 {
            return bad("spawn_interval_ms must be non-zero");
        }
        if self.base_speed <= 0.0 || self.speed_jitter < 0.0 {
            return bad("speeds must be positive");
        }
        Ok(())
    }

    pub fn in_catch_zone(&self, y: f64) -> bool {
        (self.catch_zone_top..=self.catch_zone_bottom).contains(&y)
    }
}
