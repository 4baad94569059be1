//! Entry point and frame loop for the terminal front end.
//!
//! The loop owns no game rules. It turns key presses and mouse clicks into
//! engine requests, keeps the latest `Snapshot`, and honours the snapshot's
//! `pending` hint: after the delay it calls `advance()` or shows the restart
//! prompt.

mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use triplestack::domain::card::Cell;
use triplestack::{Engine, GameConfig, GameEvent, Level, PendingAction, Response, Snapshot};
use ui::input::InputState;
use ui::renderer::{Renderer, View};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Cursor blink period, in ticks.
const BLINK_TICKS: u32 = 10;

fn main() {
    let config = GameConfig::load();
    let mut engine = Engine::new(&config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = if config.sound { SoundEngine::new() } else { None };

    let result = game_loop(&mut engine, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Triple Stack!");
    println!("Reached level {} (seed {})", engine.level().number(), engine.seed());
}

// ── Front-end state ──

/// What the loop remembers between frames.
struct Session {
    snapshot: Snapshot,
    /// When the current `pending` hint was issued.
    pending_since: Instant,
    prompt: bool,
    cursor: Cell,
    anim_tick: u32,
}

impl Session {
    fn new(snapshot: Snapshot) -> Self {
        let cursor = start_cursor(&snapshot);
        Session {
            snapshot,
            pending_since: Instant::now(),
            prompt: false,
            cursor,
            anim_tick: 0,
        }
    }

    /// Take in a response. Only applied requests restart the pending clock.
    fn apply(&mut self, response: Response, sound: Option<&SoundEngine>) {
        process_sound_events(sound, &response.events);
        let level_started = response
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::LevelStarted { .. }));
        if response.is_applied() {
            self.pending_since = Instant::now();
        }
        self.snapshot = response.snapshot;
        self.prompt = false;
        if level_started {
            self.cursor = start_cursor(&self.snapshot);
        }
    }

    fn view(&self, engine: &Engine) -> View {
        View {
            cursor: self.cursor,
            highlight: engine.board().top_at(self.cursor).map(|c| c.id),
            prompt: self.prompt,
            blink: (self.anim_tick / BLINK_TICKS) % 2 == 0,
            seed: engine.seed(),
        }
    }
}

/// Grid bounds `(min, max)` of the cards in `snap`.
fn bounds(snap: &Snapshot) -> Option<(Cell, Cell)> {
    let cells = snap
        .cards
        .iter()
        .map(|c| (c.x.round() as i64, c.y.round() as i64));
    cells.fold(None, |acc, (x, y)| match acc {
        None => Some(((x, y), (x, y))),
        Some(((x0, y0), (x1, y1))) => Some(((x0.min(x), y0.min(y)), (x1.max(x), y1.max(y)))),
    })
}

/// Start on the first clickable card, falling back to the top-left corner.
fn start_cursor(snap: &Snapshot) -> Cell {
    snap.clickable()
        .next()
        .map(|c| (c.x.round() as i64, c.y.round() as i64))
        .or_else(|| bounds(snap).map(|(min, _)| min))
        .unwrap_or((0, 0))
}

// ── Frame loop ──

fn game_loop(
    engine: &mut Engine,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut session = Session::new(engine.snapshot());
    let mut last_tick = Instant::now();
    let tick_rate = config.timing.tick_rate;

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if kb.resized {
            renderer.invalidate();
        }
        if handle_keys(engine, &mut session, sound, &kb) {
            break;
        }
        for &(col, row) in kb.clicks() {
            if session.prompt {
                break;
            }
            if let Some(id) = Renderer::hit_test(&session.snapshot, col, row) {
                let response = engine.select_card(id);
                session.apply(response, sound);
            }
        }

        tick_pending(engine, &mut session, sound);

        if last_tick.elapsed() >= tick_rate {
            session.anim_tick = session.anim_tick.wrapping_add(1);
            last_tick = Instant::now();
        }

        renderer.render(&session.snapshot, &session.view(engine))?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Act on the snapshot's scheduling hint once its delay has passed.
fn tick_pending(engine: &mut Engine, session: &mut Session, sound: Option<&SoundEngine>) {
    let Some(pending) = session.snapshot.pending else { return };
    if session.prompt || session.pending_since.elapsed() < pending.delay {
        return;
    }
    match pending.action {
        PendingAction::AdvanceLevel => {
            let response = engine.advance();
            session.apply(response, sound);
        }
        PendingAction::PromptRestart => session.prompt = true,
    }
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let Some(sfx) = sound else { return };
    // One cue per response: the most significant event wins.
    let cue = events.iter().max_by_key(|e| match e {
        GameEvent::GameCleared => 6,
        GameEvent::LevelCleared { .. } => 5,
        GameEvent::Deadlocked => 4,
        GameEvent::Matched { .. } => 3,
        GameEvent::Undone => 2,
        GameEvent::CardPicked { .. } => 1,
        GameEvent::LevelStarted { .. } => 0,
    });
    match cue {
        Some(GameEvent::GameCleared) => sfx.play_game_clear(),
        Some(GameEvent::LevelCleared { .. }) => sfx.play_level_clear(),
        Some(GameEvent::Deadlocked) => sfx.play_deadlock(),
        Some(GameEvent::Matched { .. }) => sfx.play_match(),
        Some(GameEvent::Undone) => sfx.play_undo(),
        Some(GameEvent::CardPicked { .. }) => sfx.play_pick(),
        _ => {}
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('h')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('l')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('k')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('j')];
const KEYS_PICK: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_UNDO: &[KeyCode] = &[KeyCode::Char('u'), KeyCode::Char('U'), KeyCode::Backspace];
const KEYS_NEW_GAME: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_YES: &[KeyCode] = &[KeyCode::Char('y'), KeyCode::Char('Y'), KeyCode::Enter];
const KEYS_NO: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N'), KeyCode::Esc];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

/// Returns true when the player asked to quit.
fn handle_keys(
    engine: &mut Engine,
    session: &mut Session,
    sound: Option<&SoundEngine>,
    kb: &InputState,
) -> bool {
    // ── Restart prompt swallows everything else ──
    if session.prompt {
        if kb.any_pressed(KEYS_YES) {
            let response = engine.confirm_restart(true);
            session.apply(response, sound);
        } else if kb.any_pressed(KEYS_NO) {
            let response = engine.confirm_restart(false);
            session.apply(response, sound);
        }
        return false;
    }

    if kb.any_pressed(KEYS_QUIT) {
        return true;
    }

    if let Some((dx, dy)) = detect_movement(kb) {
        move_cursor(session, dx, dy);
    }

    if kb.any_pressed(KEYS_PICK) {
        if let Some(id) = engine.board().top_at(session.cursor).map(|c| c.id) {
            let response = engine.select_card(id);
            session.apply(response, sound);
        }
    } else if kb.any_pressed(KEYS_UNDO) {
        let response = engine.undo();
        session.apply(response, sound);
    } else if kb.any_pressed(KEYS_NEW_GAME) {
        let response = engine.start_level(Level::One);
        session.apply(response, sound);
    }

    false
}

fn detect_movement(kb: &InputState) -> Option<(i64, i64)> {
    if kb.any_pressed(KEYS_UP) {
        Some((0, -1))
    } else if kb.any_pressed(KEYS_DOWN) {
        Some((0, 1))
    } else if kb.any_pressed(KEYS_LEFT) {
        Some((-1, 0))
    } else if kb.any_pressed(KEYS_RIGHT) {
        Some((1, 0))
    } else {
        None
    }
}

/// Step the cursor, clamped to the cells the board currently spans.
fn move_cursor(session: &mut Session, dx: i64, dy: i64) {
    let Some(((x0, y0), (x1, y1))) = bounds(&session.snapshot) else { return };
    let (x, y) = session.cursor;
    session.cursor = ((x + dx).clamp(x0, x1), (y + dy).clamp(y0, y1));
}
