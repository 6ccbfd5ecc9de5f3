//! Session state and its transitions: idle -> playing -> ended.
//!
//! Every mutating call reports what happened as a list of [`GameEvent`]s so the
//! host can play sounds or log without re-deriving anything from state diffs.
//! Calls made outside the `Playing` phase are ignored and report nothing.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::physics::{advance, elapsed_frames};
use super::scoring::{catch_points, next_streak, speed_for_score};
use super::{CatchBox, Gift, GiftColor, GiftId, check_catch};
use crate::config::GameConfig;
use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Idle,
    Playing,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Won,
    OutOfLives,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    GiftSpawned { id: GiftId, color: GiftColor },
    GiftMissed { id: GiftId },
    GiftCaught { id: GiftId, points: u32, streak: u32 },
    WrongPick { color: GiftColor },
    LifeLost { lives: i32 },
    StreakReset,
    GameEnded { outcome: GameOutcome, score: u32, best_streak: u32 },
}

/// Score tuple handed to the leaderboard / chain once a session is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub score: u32,
    pub best_streak: u32,
    pub outcome: GameOutcome,
}

/// Read-only view handed to the presentation layer each frame.
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot<'a> {
    pub phase: GamePhase,
    pub score: u32,
    pub streak: u32,
    pub best_streak: u32,
    pub lives: i32,
    pub current_speed: f64,
    pub gifts: &'a [Gift],
    pub boxes: &'a [CatchBox],
    pub outcome: Option<GameOutcome>,
}

#[derive(Debug)]
pub struct Session {
    cfg: GameConfig,
    phase: GamePhase,
    score: u32,
    streak: u32,
    best_streak: u32,
    lives: i32,
    current_speed: f64,
    gifts: Vec<Gift>,
    boxes: Vec<CatchBox>,
    last_frame_ms: Option<f64>,
    outcome: Option<GameOutcome>,
}

impl Session {
    pub fn new(cfg: GameConfig) -> Result<Self, GameError> {
        cfg.validate()?;
        let mut session = Self {
            phase: GamePhase::Idle,
            score: 0,
            streak: 0,
            best_streak: 0,
            lives: cfg.initial_lives,
            current_speed: cfg.base_speed,
            gifts: Vec::new(),
            boxes: Vec::new(),
            last_frame_ms: None,
            outcome: None,
            cfg,
        };
        session.reset();
        Ok(session)
    }

    /// Back to `Idle` with fresh counters. Used before every new session.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Idle;
        self.score = 0;
        self.streak = 0;
        self.best_streak = 0;
        self.lives = self.cfg.initial_lives;
        self.current_speed = speed_for_score(0, &self.cfg);
        self.gifts.clear();
        self.boxes = CatchBox::layout();
        self.last_frame_ms = None;
        self.outcome = None;
    }

    pub fn begin(&mut self) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Idle => {}
            GamePhase::Playing => return Err(GameError::AlreadyPlaying),
            phase => return Err(GameError::NotIdle(phase)),
        }
        self.reset();
        self.phase = GamePhase::Playing;
        info!("session started with {} lives", self.lives);
        Ok(())
    }

    /// Frame callback. `now_ms` is the rAF timestamp; the first frame only records it.
    pub fn on_frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Playing {
            return events;
        }
        let delta = self.last_frame_ms.map_or(0.0, |last| now_ms - last);
        self.last_frame_ms = Some(now_ms);

        let step = advance(std::mem::take(&mut self.gifts), elapsed_frames(delta, &self.cfg), &self.cfg);
        self.gifts = step.active;
        for gift in &step.missed {
            debug!("gift {:?} fell through", gift.id);
            events.push(GameEvent::GiftMissed { id: gift.id });
            self.lose_life(&mut events);
        }
        self.check_end(&mut events);
        events
    }

    /// Spawn-timer callback: adds an already constructed gift to the falling set.
    pub fn insert_gift(&mut self, gift: Gift) -> Vec<GameEvent> {
        if self.phase != GamePhase::Playing {
            return Vec::new();
        }
        let event = GameEvent::GiftSpawned { id: gift.id, color: gift.color };
        self.gifts.push(gift);
        vec![event]
    }

    /// Player pressed box `box_id`. Either a catch or a wrong pick.
    pub fn press_box(&mut self, box_id: usize) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Playing {
            return events;
        }
        let Some(target) = self.boxes.iter().find(|b| b.id == box_id) else {
            return events;
        };
        match check_catch(target, &self.gifts, &self.cfg).map(|g| g.id) {
            Some(id) => {
                let points = catch_points(self.streak, &self.cfg);
                self.gifts.retain(|g| g.id != id);
                self.score = self.score.saturating_add(points);
                self.streak = next_streak(self.streak, &self.cfg);
                self.best_streak = self.best_streak.max(self.streak);
                self.current_speed = speed_for_score(self.score, &self.cfg);
                events.push(GameEvent::GiftCaught { id, points, streak: self.streak });
            }
            None => {
                events.push(GameEvent::WrongPick { color: target.color });
                self.lose_life(&mut events);
            }
        }
        self.check_end(&mut events);
        events
    }

    fn lose_life(&mut self, events: &mut Vec<GameEvent>) {
        self.lives -= 1;
        self.streak = 0;
        events.push(GameEvent::LifeLost { lives: self.lives });
        events.push(GameEvent::StreakReset);
    }

    fn check_end(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let outcome = if self.lives <= 0 {
            GameOutcome::OutOfLives
        } else if self.score >= self.cfg.win_score {
            GameOutcome::Won
        } else {
            return;
        };
        self.phase = GamePhase::Ended;
        self.outcome = Some(outcome);
        info!("session ended: {:?} with score {} (best streak {})", outcome, self.score, self.best_streak);
        events.push(GameEvent::GameEnded {
            outcome,
            score: self.score,
            best_streak: self.best_streak,
        });
    }

    pub fn final_score(&self) -> Option<FinalScore> {
        self.outcome.map(|outcome| FinalScore {
            score: self.score,
            best_streak: self.best_streak,
            outcome,
        })
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            phase: self.phase,
            score: self.score,
            streak: self.streak,
            best_streak: self.best_streak,
            lives: self.lives,
            current_speed: self.current_speed,
            gifts: &self.gifts,
            boxes: &self.boxes,
            outcome: self.outcome,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.cfg
    }
}
