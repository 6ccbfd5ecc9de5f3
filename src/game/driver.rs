//! The driver owns a session, the spawner and the scheduling handle that feeds
//! it frame and spawn callbacks. Scheduling is stopped on every transition out
//! of `Playing`, so nothing mutates the session after it ends.

use log::{info, warn};
use rand::Rng;

use super::session::FinalScore;
use super::{GameEvent, GamePhase, Session, SessionSnapshot, Spawner, speed_for_score};
use crate::config::GameConfig;
use crate::error::GameError;
use crate::services::PlayerIdentity;

/// Source of the two periodic callbacks: one per display frame, one per spawn interval.
pub trait Scheduler {
    /// Begin delivering callbacks. Must cancel any previous schedule first.
    fn start(&mut self, spawn_interval_ms: u32);
    /// Cancel both callbacks synchronously.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

pub struct Driver<S: Scheduler, R: Rng> {
    session: Session,
    spawner: Spawner,
    scheduler: S,
    rng: R,
    player: Option<PlayerIdentity>,
}

impl<S: Scheduler, R: Rng> Driver<S, R> {
    /// Fails with `InvalidConfig` before anything is scheduled.
    pub fn new(cfg: GameConfig, scheduler: S, rng: R) -> Result<Self, GameError> {
        Ok(Self {
            session: Session::new(cfg)?,
            spawner: Spawner::new(),
            scheduler,
            rng,
            player: None,
        })
    }

    pub fn set_player(&mut self, player: Option<PlayerIdentity>) {
        self.player = player;
    }

    pub fn player(&self) -> Option<&PlayerIdentity> {
        self.player.as_ref()
    }

    /// idle -> playing. Requires a player identity; never starts a second schedule.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.require_player()?;
        self.session.begin()?;
        self.scheduler.start(self.session.config().spawn_interval_ms);
        Ok(())
    }

    /// Cancel scheduling and go back to idle, from any phase.
    pub fn quit(&mut self) {
        self.scheduler.stop();
        self.session.reset();
    }

    /// ended (or playing) -> idle -> playing. Without a player the old session,
    /// including its final score, is left as it was.
    pub fn restart(&mut self) -> Result<(), GameError> {
        self.require_player()?;
        info!("restarting session");
        self.quit();
        self.start()
    }

    fn require_player(&self) -> Result<(), GameError> {
        if self.player.is_none() {
            warn!("start refused: no player identity");
            return Err(GameError::MissingIdentity);
        }
        Ok(())
    }

    pub fn on_frame(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let events = self.session.on_frame(now_ms);
        self.stop_if_ended();
        events
    }

    pub fn on_spawn_timer(&mut self) -> Vec<GameEvent> {
        if self.session.phase() != GamePhase::Playing {
            return Vec::new();
        }
        let speed = speed_for_score(self.session.snapshot().score, self.session.config());
        let gift = self.spawner.spawn(&mut self.rng, speed, self.session.config());
        self.session.insert_gift(gift)
    }

    pub fn press_box(&mut self, box_id: usize) -> Vec<GameEvent> {
        let events = self.session.press_box(box_id);
        self.stop_if_ended();
        events
    }

    fn stop_if_ended(&mut self) {
        if self.session.phase() == GamePhase::Ended && self.scheduler.is_running() {
            self.scheduler.stop();
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase()
    }

    pub fn final_score(&self) -> Option<FinalScore> {
        self.session.final_score()
    }

    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        self.session.snapshot()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{PlayerIdentity, Username, WalletAddress};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Default)]
    struct CountingScheduler {
        running: bool,
        starts: u32,
        stops: u32,
    }

    impl Scheduler for CountingScheduler {
        fn start(&mut self, _spawn_interval_ms: u32) {
            self.stop();
            self.running = true;
            self.starts += 1;
        }
        fn stop(&mut self) {
            self.running = false;
            self.stops += 1;
        }
        fn is_running(&self) -> bool {
            self.running
        }
    }

    fn player() -> PlayerIdentity {
        PlayerIdentity {
            wallet: WalletAddress::parse("0x00000000000000000000000000000000000000aA").unwrap(),
            username: Username::parse("santa").unwrap(),
        }
    }

    fn driver(cfg: GameConfig) -> Driver<CountingScheduler, StdRng> {
        let mut d = Driver::new(cfg, CountingScheduler::default(), StdRng::seed_from_u64(11)).unwrap();
        d.set_player(Some(player()));
        d
    }

    #[test]
    fn start_without_identity_stays_idle() {
        let mut d = Driver::new(GameConfig::default(), CountingScheduler::default(), StdRng::seed_from_u64(0)).unwrap();
        assert!(matches!(d.start(), Err(GameError::MissingIdentity)));
        assert_eq!(d.phase(), GamePhase::Idle);
        assert_eq!(d.scheduler().starts, 0);
    }

    #[test]
    fn double_start_does_not_schedule_twice() {
        let mut d = driver(GameConfig::default());
        d.start().unwrap();
        assert!(matches!(d.start(), Err(GameError::AlreadyPlaying)));
        assert_eq!(d.scheduler().starts, 1);
        assert!(d.scheduler().is_running());
    }

    #[test]
    fn spawn_timer_adds_gifts_at_current_speed() {
        let mut d = driver(GameConfig::default());
        d.start().unwrap();
        let events = d.on_spawn_timer();
        assert!(matches!(events.as_slice(), [GameEvent::GiftSpawned { .. }]));
        let snap = d.session().snapshot();
        let g = &snap.gifts[0];
        assert!(g.speed >= 1.0 && g.speed < 1.3);
        assert_eq!(g.y, -5.0);
    }

    #[test]
    fn running_out_of_lives_stops_the_schedule() {
        let cfg = GameConfig { initial_lives: 2, ..GameConfig::default() };
        let mut d = driver(cfg);
        d.start().unwrap();
        d.press_box(0);
        assert!(d.scheduler().is_running());
        let events = d.press_box(1);
        assert!(matches!(events.last(), Some(GameEvent::GameEnded { .. })));
        assert_eq!(d.phase(), GamePhase::Ended);
        assert!(!d.scheduler().is_running());
        assert!(d.on_spawn_timer().is_empty());
        assert!(d.on_frame(1_000.0).is_empty());
        assert!(d.session().snapshot().gifts.is_empty());
    }

    #[test]
    fn restart_after_end_runs_a_fresh_session() {
        let cfg = GameConfig { initial_lives: 1, ..GameConfig::default() };
        let mut d = driver(cfg);
        d.start().unwrap();
        d.press_box(0);
        assert_eq!(d.phase(), GamePhase::Ended);
        d.restart().unwrap();
        assert_eq!(d.phase(), GamePhase::Playing);
        assert_eq!(d.session().snapshot().lives, 1);
        assert_eq!(d.scheduler().starts, 2);
        assert!(d.scheduler().is_running());
    }

    #[test]
    fn quit_cancels_and_returns_to_idle() {
        let mut d = driver(GameConfig::default());
        d.start().unwrap();
        d.on_spawn_timer();
        let stops_before = d.scheduler().stops;
        d.quit();
        assert_eq!(d.phase(), GamePhase::Idle);
        assert!(!d.scheduler().is_running());
        assert_eq!(d.scheduler().stops, stops_before + 1);
        assert!(d.on_spawn_timer().is_empty());
    }

    #[test]
    fn restart_without_identity_keeps_the_final_score() {
        let cfg = GameConfig { initial_lives: 1, ..GameConfig::default() };
        let mut d = driver(cfg);
        d.start().unwrap();
        d.press_box(0);
        let result = d.final_score();
        assert!(result.is_some());

        d.set_player(None);
        assert!(matches!(d.restart(), Err(GameError::MissingIdentity)));
        assert_eq!(d.phase(), GamePhase::Ended);
        assert_eq!(d.final_score(), result);
        assert_eq!(d.scheduler().starts, 1);
    }

    #[test]
    fn invalid_config_is_refused_up_front() {
        let cfg = GameConfig { spawn_x_min: 50.0, spawn_x_max: 50.0, ..GameConfig::default() };
        let built = Driver::new(cfg, CountingScheduler::default(), StdRng::seed_from_u64(1));
        assert!(matches!(built, Err(GameError::InvalidConfig(_))));
    }
}
