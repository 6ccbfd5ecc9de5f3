//! Sound cues for session events, played through `<audio>` elements.
//! Nothing plays until the host supplies clip URLs with `set_sounds`.

use log::debug;
use serde::Deserialize;
use web_sys::HtmlAudioElement;

use crate::game::{GameEvent, GameOutcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    Correct,
    Wrong,
    GameOver,
    Win,
}

impl Cue {
    /// Cue for an event, if it has one. Misses are silent; the life lost is not.
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::GiftCaught { .. } => Some(Cue::Correct),
            GameEvent::LifeLost { .. } => Some(Cue::Wrong),
            GameEvent::GameEnded { outcome: GameOutcome::Won, .. } => Some(Cue::Win),
            GameEvent::GameEnded { outcome: GameOutcome::OutOfLives, .. } => Some(Cue::GameOver),
            _ => None,
        }
    }
}

/// Clip URLs as passed from JS. Any may be left out.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SoundUrls {
    pub music: Option<String>,
    pub correct: Option<String>,
    pub wrong: Option<String>,
    pub game_over: Option<String>,
    pub win: Option<String>,
}

#[derive(Default)]
pub struct SoundBank {
    music: Option<HtmlAudioElement>,
    correct: Option<HtmlAudioElement>,
    wrong: Option<HtmlAudioElement>,
    game_over: Option<HtmlAudioElement>,
    win: Option<HtmlAudioElement>,
}

fn clip(url: Option<&str>) -> Option<HtmlAudioElement> {
    let el = HtmlAudioElement::new_with_src(url?).ok()?;
    el.set_preload("auto");
    Some(el)
}

impl SoundBank {
    pub fn load(urls: &SoundUrls) -> Self {
        let music = clip(urls.music.as_deref());
        if let Some(m) = &music {
            m.set_loop(true);
            m.set_volume(0.4);
        }
        Self {
            music,
            correct: clip(urls.correct.as_deref()),
            wrong: clip(urls.wrong.as_deref()),
            game_over: clip(urls.game_over.as_deref()),
            win: clip(urls.win.as_deref()),
        }
    }

    fn element(&self, cue: Cue) -> Option<&HtmlAudioElement> {
        match cue {
            Cue::Correct => self.correct.as_ref(),
            Cue::Wrong => self.wrong.as_ref(),
            Cue::GameOver => self.game_over.as_ref(),
            Cue::Win => self.win.as_ref(),
        }
    }

    pub fn play(&self, cue: Cue) {
        let Some(el) = self.element(cue) else {
            return;
        };
        el.set_current_time(0.0);
        // autoplay may be blocked until the first user gesture
        if el.play().is_err() {
            debug!("could not play {:?}", cue);
        }
    }

    /// Play the cue of each event, once per distinct cue.
    pub fn play_events(&self, events: &[GameEvent]) {
        let mut played: Vec<Cue> = Vec::new();
        for cue in events.iter().filter_map(Cue::for_event) {
            if !played.contains(&cue) {
                self.play(cue);
                played.push(cue);
            }
        }
        if played.contains(&Cue::GameOver) || played.contains(&Cue::Win) {
            self.stop_music();
        }
    }

    pub fn start_music(&self) {
        if let Some(m) = &self.music {
            m.set_current_time(0.0);
            if m.play().is_err() {
                debug!("background music blocked");
            }
        }
    }

    pub fn stop_music(&self) {
        if let Some(m) = &self.music {
            m.pause().ok();
        }
    }
}
