//! Browser implementation of [`Scheduler`]: one `requestAnimationFrame` chain and
//! one `setInterval` spawn timer, both cancellable from inside their own callbacks.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::game::Scheduler;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct BrowserScheduler {
    running: Rc<Cell<bool>>,
    raf_id: Rc<Cell<Option<i32>>>,
    interval_id: Option<i32>,
    frame: FrameCallback,
    spawn: Closure<dyn FnMut()>,
}

impl BrowserScheduler {
    /// `on_frame` receives the rAF timestamp; `on_spawn` fires every spawn interval.
    /// Neither is invoked until [`Scheduler::start`].
    pub fn new(mut on_frame: impl FnMut(f64) + 'static, mut on_spawn: impl FnMut() + 'static) -> Self {
        let running = Rc::new(Cell::new(false));
        let raf_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

        let f: FrameCallback = Rc::new(RefCell::new(None));
        let g = f.clone();
        let frame_running = running.clone();
        let frame_raf = raf_id.clone();
        *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
            if !frame_running.get() {
                return;
            }
            on_frame(ts);
            // on_frame may have stopped the schedule (game over)
            if frame_running.get() {
                frame_raf.set(request_frame(&f));
            }
        }) as Box<dyn FnMut(f64)>));

        let spawn_running = running.clone();
        let spawn = Closure::wrap(Box::new(move || {
            if spawn_running.get() {
                on_spawn();
            }
        }) as Box<dyn FnMut()>);

        Self {
            running,
            raf_id,
            interval_id: None,
            frame: g,
            spawn,
        }
    }
}

fn request_frame(f: &FrameCallback) -> Option<i32> {
    let w = window()?;
    let cb = f.borrow();
    let closure = cb.as_ref()?;
    w.request_animation_frame(closure.as_ref().unchecked_ref()).ok()
}

impl Scheduler for BrowserScheduler {
    fn start(&mut self, spawn_interval_ms: u32) {
        self.stop();
        let Some(w) = window() else {
            warn!("no window; cannot schedule game loop");
            return;
        };
        self.running.set(true);
        self.raf_id.set(request_frame(&self.frame));
        match w.set_interval_with_callback_and_timeout_and_arguments_0(
            self.spawn.as_ref().unchecked_ref(),
            spawn_interval_ms as i32,
        ) {
            Ok(id) => self.interval_id = Some(id),
            Err(e) => warn!("failed to start spawn timer: {:?}", e),
        }
    }

    fn stop(&mut self) {
        self.running.set(false);
        let w = window();
        if let Some(id) = self.raf_id.take() {
            if let Some(w) = &w {
                let _ = w.cancel_animation_frame(id);
            }
        }
        if let Some(id) = self.interval_id.take() {
            if let Some(w) = &w {
                w.clear_interval_with_handle(id);
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}

impl Drop for BrowserScheduler {
    fn drop(&mut self) {
        self.stop();
        // break the self-referencing rAF closure so it can be freed
        self.frame.borrow_mut().take();
    }
}
