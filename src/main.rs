mod audio;
mod game;
mod render;
mod store;

use std::io::{self, stdout};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind, MouseEventKind},
    execute, terminal,
};

use audio::Audio;
use game::{Game, Phase, WORLD_SCALE};
use render::PixelBuf;

const FRAME: Duration = Duration::from_millis(33); // ~30 fps

fn main() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut out = stdout();
    execute!(
        out,
        terminal::EnterAlternateScreen,
        cursor::Hide,
        terminal::DisableLineWrap,
        event::EnableMouseCapture,
    )?;

    let cleanup = |out: &mut io::Stdout| -> io::Result<()> {
        execute!(
            out,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show,
            terminal::EnableLineWrap,
        )?;
        terminal::disable_raw_mode()
    };

    let (cols, rows) = terminal::size()?;
    let pw = cols as usize;
    let ph = rows as usize * 2;

    let mut buf = PixelBuf::new(pw, ph);
    let mut game = Game::new(pw as f64 * WORLD_SCALE, ph as f64 * WORLD_SCALE);
    let mut rng = rand::thread_rng();
    let audio = Audio::open();
    let mut best = store::load_best();

    loop {
        let frame_start = Instant::now();

        // Input
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => {
                        cleanup(&mut out)?;
                        return Ok(());
                    }
                    KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter => {
                        activate(&mut game, &audio);
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => {
                    if let MouseEventKind::Down(_) = mouse.kind {
                        activate(&mut game, &audio);
                    }
                }
                Event::Resize(c, r) => {
                    let npw = c as usize;
                    let nph = r as usize * 2;
                    buf.resize(npw, nph);
                    // Entities keep their coordinates; only the bounds move.
                    game.resize(npw as f64 * WORLD_SCALE, nph as f64 * WORLD_SCALE);
                }
                _ => {}
            }
        }

        // Update
        let events = game.update(&mut rng);
        if let Some(audio) = &audio {
            if events.died {
                audio.death();
            } else if events.leveled {
                audio.level_up();
            } else if events.scored {
                audio.score();
            }
        }
        if events.died && store::record(&mut best, game.score) {
            let _ = store::save_best(best);
        }

        // Render
        render::draw(&game, best, &mut buf);
        buf.render(&mut out)?;

        // Frame pacing
        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

/// Route the activate input to the game and voice the flap if one happened.
fn activate(game: &mut Game, audio: &Option<Audio>) {
    let flapped = game.phase == Phase::Playing;
    game.activate();
    if flapped {
        if let Some(audio) = audio {
            audio.flap();
        }
    }
}
