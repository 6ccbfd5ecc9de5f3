//! Canvas drawing of the play area plus the DOM HUD overlays.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use crate::config::GameConfig;
use crate::game::{CatchBox, GameOutcome, GamePhase, SessionSnapshot};

pub const CANVAS_ID: &str = "gc-canvas";
const CANVAS_W: u32 = 360;
const CANVAS_H: u32 = 640;

/// Top of the box strip, percent of play height. Pointer presses below this pick a box.
pub const BOX_TOP: f64 = 86.0;
const BOX_HEIGHT: f64 = 11.0;

pub struct Renderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Renderer {
    /// Create or reuse the game canvas and the HUD overlays.
    pub fn mount(doc: &Document) -> Result<Self, JsValue> {
        let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
            el.dyn_into()?
        } else {
            let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
            c.set_id(CANVAS_ID);
            c.set_width(CANVAS_W);
            c.set_height(CANVAS_H);
            c.set_attribute("style", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); border-radius:18px; border:2px solid #1e3a8a; background:#0f172a; z-index:20;").ok();
            let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
            body.append_child(&c)?;
            c
        };
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");

        ensure_overlay(doc, "gc-score", "top:10px; left:12px;")?;
        ensure_overlay(doc, "gc-lives", "top:10px; left:150px;")?;
        ensure_overlay(doc, "gc-streak", "top:10px; left:300px;")?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn w(&self) -> f64 {
        self.canvas.width() as f64
    }

    fn h(&self) -> f64 {
        self.canvas.height() as f64
    }

    pub fn draw(&self, snap: &SessionSnapshot<'_>, cfg: &GameConfig) {
        let (w, h) = (self.w(), self.h());
        let ctx = &self.ctx;

        ctx.set_fill_style_str("#0f172a");
        ctx.fill_rect(0.0, 0.0, w, h);

        // Catch zone band
        let top = cfg.catch_zone_top;
        let bottom = cfg.catch_zone_bottom;
        ctx.set_fill_style_str("rgba(74,222,128,0.10)");
        ctx.fill_rect(0.0, h * top / 100.0, w, h * (bottom - top) / 100.0);
        ctx.set_stroke_style_str("rgba(74,222,128,0.30)");
        ctx.set_line_width(2.0);
        ctx.stroke_rect(0.0, h * top / 100.0, w, h * (bottom - top) / 100.0);
        ctx.set_font("11px 'Fira Code', monospace");
        ctx.set_fill_style_str("#86efac");
        ctx.fill_text("CATCH ZONE", w / 2.0, h * top / 100.0 + 10.0).ok();

        ctx.set_font("28px sans-serif");
        for gift in snap.gifts {
            let cx = w * gift.x / 100.0;
            let cy = h * gift.y / 100.0;
            ctx.set_fill_style_str(gift.color.css());
            ctx.fill_rect(cx - 22.0, cy - 22.0, 44.0, 44.0);
            ctx.fill_text(gift.kind.glyph(), cx, cy).ok();
        }

        for b in snap.boxes {
            self.draw_box(b);
        }

        if snap.phase == GamePhase::Ended {
            self.draw_end_banner(snap);
        }
    }

    fn draw_box(&self, b: &CatchBox) {
        let (w, h) = (self.w(), self.h());
        let ctx = &self.ctx;
        let x = w * b.x / 100.0;
        let y = h * BOX_TOP / 100.0;
        let bw = w * CatchBox::WIDTH / 100.0;
        let bh = h * BOX_HEIGHT / 100.0;
        ctx.set_fill_style_str(b.color.css());
        ctx.fill_rect(x, y, bw, bh);
        ctx.set_stroke_style_str("#ffffff");
        ctx.set_line_width(4.0);
        ctx.stroke_rect(x, y, bw, bh);
        ctx.set_font("26px sans-serif");
        ctx.fill_text("🎁", x + bw / 2.0, y + bh / 2.0).ok();
        // key hint
        ctx.set_font("12px 'Fira Code', monospace");
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_text(&(b.id + 1).to_string(), x + bw / 2.0, y + bh - 8.0).ok();
    }

    fn draw_end_banner(&self, snap: &SessionSnapshot<'_>) {
        let (w, h) = (self.w(), self.h());
        let ctx = &self.ctx;
        ctx.set_fill_style_str("rgba(0,0,0,0.65)");
        ctx.fill_rect(0.0, 0.0, w, h);
        let (title, colour) = match snap.outcome {
            Some(GameOutcome::Won) => ("🎉 YOU WIN! 🎉", "#fde047"),
            _ => ("💔 Game Over!", "#fca5a5"),
        };
        ctx.set_font("32px sans-serif");
        ctx.set_fill_style_str(colour);
        ctx.fill_text(title, w / 2.0, h * 0.38).ok();
        ctx.set_font("20px 'Fira Code', monospace");
        ctx.set_fill_style_str("#ffffff");
        ctx.fill_text(&format!("Score: {}", snap.score), w / 2.0, h * 0.47).ok();
        ctx.fill_text(&format!("Best streak: {}x", snap.best_streak), w / 2.0, h * 0.53).ok();
        ctx.set_font("14px 'Fira Code', monospace");
        ctx.fill_text("Press Enter to play again", w / 2.0, h * 0.62).ok();
    }
}

fn ensure_overlay(doc: &Document, id: &str, position: &str) -> Result<(), JsValue> {
    if doc.get_element_by_id(id).is_some() {
        return Ok(());
    }
    let Some(body) = doc.body() else {
        return Ok(());
    };
    let div = doc.create_element("div")?;
    div.set_id(id);
    let style = format!(
        "position:fixed; {position} font-family:'Fira Code', monospace; font-size:15px; padding:4px 8px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45;"
    );
    div.set_attribute("style", &style).ok();
    body.append_child(&div)?;
    Ok(())
}

/// Refresh score / lives / streak overlays.
pub fn update_hud(doc: &Document, snap: &SessionSnapshot<'_>, max_lives: i32) {
    if let Some(el) = doc.get_element_by_id("gc-score") {
        el.set_text_content(Some(&format!("Score: {}", snap.score)));
    }
    if let Some(el) = doc.get_element_by_id("gc-streak") {
        el.set_text_content(Some(&format!("Streak: {}x", snap.streak)));
    }
    if let Some(el) = doc.get_element_by_id("gc-lives") {
        el.set_inner_html(&hearts_html(snap.lives, max_lives));
    }
}

fn hearts_html(lives: i32, max_lives: i32) -> String {
    let filled = lives.clamp(0, max_lives) as usize;
    let mut html = String::new();
    for _ in 0..filled {
        html.push_str("<span style='color:#ff4d4d;font-size:16px;margin-right:4px;'>♥</span>");
    }
    for _ in filled..max_lives.max(0) as usize {
        html.push_str("<span style='color:#6b6b6b;font-size:16px;margin-right:4px;'>♡</span>");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hearts_never_exceed_max_or_go_negative() {
        assert_eq!(hearts_html(3, 5).matches('♥').count(), 3);
        assert_eq!(hearts_html(3, 5).matches('♡').count(), 2);
        assert_eq!(hearts_html(-1, 5).matches('♥').count(), 0);
        assert_eq!(hearts_html(9, 5).matches('♥').count(), 5);
    }
}
