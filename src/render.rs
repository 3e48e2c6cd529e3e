//! Half-block pixel rendering of the scene onto the terminal.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::game::{Game, Phase, WORLD_SCALE};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }
}

const SKY_TOP: Rgb = Rgb(72, 158, 214);
const SKY_BOT: Rgb = Rgb(178, 226, 244);
const CLOUD: Rgb = Rgb(250, 250, 252);
const PIPE_L: Rgb = Rgb(24, 140, 72);
const PIPE_M: Rgb = Rgb(46, 204, 113);
const PIPE_HI: Rgb = Rgb(96, 230, 150);
const PIPE_R: Rgb = Rgb(36, 170, 90);
const CAP_DARK: Rgb = Rgb(18, 110, 56);
const BIRD_BODY: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(235, 125, 35);
const LEVEL_FG: Rgb = Rgb(180, 255, 190);
const BANNER: Rgb = Rgb(235, 85, 60);
const PANEL: Rgb = Rgb(210, 185, 110);
const PANEL_LIGHT: Rgb = Rgb(225, 200, 130);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    pub w: usize,
    pub h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![SKY_TOP; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, SKY_TOP);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn fill_circle(&mut self, cx: i32, cy: i32, r: i32, c: Rgb) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set(cx + dx, cy + dy, c);
                }
            }
        }
    }

    /// Mix `c` over whatever is already at the pixel.
    fn blend(&mut self, x: i32, y: i32, c: Rgb, t_256: u16) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            let old = self.px[y as usize * self.w + x as usize];
            self.px[y as usize * self.w + x as usize] = Rgb::lerp(old, c, t_256);
        }
    }

    fn blend_circle(&mut self, cx: i32, cy: i32, r: i32, c: Rgb, t_256: u16) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.blend(cx + dx, cy + dy, c, t_256);
                }
            }
        }
    }

    fn darken(&mut self) {
        for px in &mut self.px {
            *px = Rgb(px.0 / 2, px.1 / 2, px.2 / 2);
        }
    }

    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(
                            out,
                            style::SetForegroundColor(CColor::Rgb {
                                r: top.0,
                                g: top.1,
                                b: top.2
                            })
                        )?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(
                            out,
                            style::SetBackgroundColor(CColor::Rgb {
                                r: bot.0,
                                g: bot.1,
                                b: bot.2
                            })
                        )?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row < rows - 1 {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, scale: i32, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5i32 {
        for col in 0..3i32 {
            if glyph[(row * 3 + col) as usize] == 1 {
                let px = x + col * scale;
                let py = y + row * scale;
                buf.fill_rect(px + 1, py + 1, scale, scale, SHADOW);
                buf.fill_rect(px, py, scale, scale, fg);
            }
        }
    }
}

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, scale: i32, fg: Rgb) {
    let s = n.to_string();
    // 3px per digit + 1px spacing, times scale.
    let total_w = s.len() as i32 * 4 * scale - scale;
    let start_x = cx - total_w / 2;
    for (i, ch) in s.chars().enumerate() {
        let d = ch as u8 - b'0';
        draw_digit(buf, start_x + i as i32 * 4 * scale, y, d, scale, fg);
    }
}

// ── Scene ──────────────────────────────────────────────────────────────────

fn px(v: f64) -> i32 {
    (v / WORLD_SCALE).round() as i32
}

pub fn draw(game: &Game, best: u32, buf: &mut PixelBuf) {
    draw_sky(buf);
    draw_clouds(game, buf);
    draw_pipes(game, buf);
    draw_bird(game, buf);
    draw_hud(game, buf);

    match game.phase {
        Phase::Ready => draw_title(buf),
        Phase::Playing => {}
        Phase::Dead => draw_game_over(game, best, buf),
    }
}

fn draw_sky(buf: &mut PixelBuf) {
    let h = buf.h;
    for y in 0..h {
        let t = (y as u16 * 256) / h.max(1) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        for x in 0..buf.w {
            buf.set(x as i32, y as i32, c);
        }
    }
}

fn draw_clouds(game: &Game, buf: &mut PixelBuf) {
    for cloud in &game.clouds {
        let cx = px(cloud.x);
        let cy = px(cloud.y);
        let r = px(cloud.radius).max(2);
        // Three overlapping puffs.
        buf.blend_circle(cx, cy, r, CLOUD, 200);
        buf.blend_circle(cx - r * 3 / 5, cy + r / 3, r * 7 / 10, CLOUD, 200);
        buf.blend_circle(cx + r * 3 / 5, cy + r / 3, r * 7 / 10, CLOUD, 200);
    }
}

fn draw_pipes(game: &Game, buf: &mut PixelBuf) {
    let cap_extra = 1;
    let cap_h = 2;
    let h = buf.h as i32;

    for pipe in &game.pipes {
        let x0 = px(pipe.x);
        let w = px(pipe.width).max(3);
        let gap_top = px(pipe.top);
        let gap_bot = px(pipe.bottom);

        // Top segment body.
        for x in 0..w {
            let c = pipe_shade(x, w);
            for y in 0..(gap_top - cap_h) {
                buf.set(x0 + x, y, c);
            }
        }
        // Top segment lip.
        for x in -cap_extra..(w + cap_extra) {
            let c = pipe_shade(x + cap_extra, w + cap_extra * 2);
            for y in (gap_top - cap_h)..gap_top {
                buf.set(x0 + x, y, c);
            }
            buf.set(x0 + x, gap_top - 1, CAP_DARK);
        }

        // Bottom segment lip.
        for x in -cap_extra..(w + cap_extra) {
            let c = pipe_shade(x + cap_extra, w + cap_extra * 2);
            for y in gap_bot..(gap_bot + cap_h) {
                buf.set(x0 + x, y, c);
            }
            buf.set(x0 + x, gap_bot, CAP_DARK);
        }
        // Bottom segment body.
        for x in 0..w {
            let c = pipe_shade(x, w);
            for y in (gap_bot + cap_h)..h {
                buf.set(x0 + x, y, c);
            }
        }
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

fn draw_bird(game: &Game, buf: &mut PixelBuf) {
    let bird = &game.bird;
    let cx = px(bird.x);
    let cy = px(bird.y);
    let r = px(bird.radius).max(2);
    let tilt = (bird.velocity / 4.0).clamp(-2.0, 2.0).round() as i32;

    // Body with a lighter crown.
    buf.fill_circle(cx, cy, r, BIRD_BODY);
    buf.fill_rect(cx - r + 1, cy - r + 1, (r * 2 - 1).max(1), 1, BIRD_HI);

    // Wing, flapping on an 8-frame cycle.
    let wing_off = if game.frame % 8 < 4 { -1 } else { 1 };
    buf.fill_rect(cx - r, cy + wing_off, r.max(1), (r / 2).max(1), BIRD_WING);

    // Eye and pupil, upper front.
    let ex = cx + r * 3 / 5;
    let ey = cy - r * 2 / 5 - 1;
    buf.set(ex, ey, BIRD_EYE);
    buf.set(ex + 1, ey, BIRD_PUPIL);

    // Beak, tapering to the right.
    let beak_len = r.max(2);
    for i in 0..beak_len {
        let half = (beak_len - i) / 2;
        buf.fill_rect(cx + r + i, cy + tilt - half, 1, half * 2 + 1, BIRD_BEAK);
    }
}

fn draw_hud(game: &Game, buf: &mut PixelBuf) {
    draw_number(buf, buf.w as i32 / 2, 3, game.score, 2, WHITE);
    draw_number(buf, buf.w as i32 - 8, 3, game.level, 1, LEVEL_FG);
}

/// A rectangle per glyph, in the blocky style of the title card.
fn draw_block_text(buf: &mut PixelBuf, cx: i32, y: i32, text: &str, cw: i32, ch: i32, fg: Rgb) {
    let total_w = text.len() as i32 * cw;
    let sx = cx - total_w / 2;
    for (i, c) in text.chars().enumerate() {
        if c == ' ' {
            continue;
        }
        let bx = sx + i as i32 * cw;
        buf.fill_rect(bx, y, cw - 1, ch, fg);
        buf.fill_rect(bx, y, cw - 1, 1, Rgb::lerp(fg, WHITE, 96));
    }
}

fn draw_title(buf: &mut PixelBuf) {
    let cx = buf.w as i32 / 2;
    let cy = buf.h as i32 / 4;
    draw_block_text(buf, cx, cy, "HOPBIRD", 4, 6, BIRD_BODY);
    draw_block_text(buf, cx, cy + 10, "SPACE TO FLAP", 4, 3, WHITE);
}

fn draw_game_over(game: &Game, best: u32, buf: &mut PixelBuf) {
    buf.darken();

    let cx = buf.w as i32 / 2;
    let cy = buf.h as i32 / 2;
    draw_block_text(buf, cx, cy / 2, "GAME OVER", 4, 5, BANNER);

    if !game.summary_shown() {
        return;
    }

    // Summary panel: this run's score on top, the best underneath.
    let panel_w = 40.min(buf.w as i32 - 2);
    let panel_h = 20.min(buf.h as i32 - 2);
    let px0 = cx - panel_w / 2;
    let py0 = cy - panel_h / 2;
    buf.fill_rect(px0 - 1, py0 - 1, panel_w + 2, panel_h + 2, SHADOW);
    buf.fill_rect(px0, py0, panel_w, panel_h, PANEL);
    buf.fill_rect(px0 + 1, py0 + 1, panel_w - 2, panel_h - 2, PANEL_LIGHT);

    draw_number(buf, cx, py0 + 4, game.score, 1, WHITE);
    draw_number(buf, cx, py0 + 12, best, 1, BIRD_BODY);

    draw_block_text(buf, cx, py0 + panel_h + 3, "SPACE TO RETRY", 4, 3, WHITE);
}
