mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::Print,
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use display::Overlay;
use galactic_invaders::compute::{init_state, resize, step};
use galactic_invaders::entities::{Direction, Field, GameEvent, GameState, GameStatus, Intent};
use galactic_invaders::Rules;

const FRAME: Duration = Duration::from_millis(16); // ≈60 FPS

/// World units per terminal cell.  Terminal cells are roughly twice as tall
/// as they are wide.
const CELL_WIDTH: f32 = 10.0;
const CELL_HEIGHT: f32 = 20.0;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 8 frames (≈133 ms) is
/// always refreshed before expiry.
const HOLD_WINDOW: u64 = 8;

#[derive(Debug, Parser)]
#[command(name = "galactic_invaders", about = "Defend the city from the alien swarm")]
struct Cli {
    /// Rules file (JSON).
    #[arg(long, default_value = "game_rules.json")]
    rules: PathBuf,

    /// Seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Where log output goes; the terminal itself is taken by the game.
    #[arg(long, default_value = "galactic_invaders.log")]
    log_file: PathBuf,
}

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|k| is_held(key_frame, k, frame))
}

fn field_for(cols: u16, rows: u16) -> Field {
    Field::new(
        cols.saturating_sub(2) as f32 * CELL_WIDTH,
        rows.saturating_sub(4) as f32 * CELL_HEIGHT,
    )
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file: {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ── Input ─────────────────────────────────────────────────────────────────────

const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const UP_KEYS: [KeyCode; 3] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const DOWN_KEYS: [KeyCode; 3] = [KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const FIRE_KEYS: [KeyCode; 1] = [KeyCode::Char(' ')];

enum Control {
    Continue,
    Quit,
}

/// Front-end state that is not part of the simulation.
struct Frontend {
    key_frame: HashMap<KeyCode, u64>,
    held: HashMap<Direction, bool>,
    fire_held: bool,
    overlay: Option<Overlay>,
}

impl Frontend {
    fn new() -> Self {
        Self {
            key_frame: HashMap::new(),
            held: HashMap::new(),
            fire_held: false,
            overlay: None,
        }
    }

    /// Forget which directions were sent as held.  The engine drops `Hold`
    /// while paused and clears controls on restart, so keys still down must
    /// be re-sent on the next frame.
    fn forget_held(&mut self) {
        self.held.clear();
    }

    fn close_overlay(&mut self, intents: &mut Vec<Intent>) {
        self.overlay = None;
        self.forget_held();
        intents.push(Intent::Resume);
    }

    fn toggle_overlay(&mut self, which: Overlay, intents: &mut Vec<Intent>) {
        if self.overlay == Some(which) {
            self.close_overlay(intents);
        } else {
            if self.overlay.is_none() {
                intents.push(Intent::Pause);
            }
            self.overlay = Some(which);
        }
    }

    /// One-shot actions for a key press.
    fn on_press(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        state: &GameState,
        intents: &mut Vec<Intent>,
    ) -> Control {
        match code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit;
            }
            KeyCode::Esc => {
                if self.overlay.is_some() {
                    self.close_overlay(intents);
                } else {
                    return Control::Quit;
                }
            }
            KeyCode::Char('h') | KeyCode::Char('H') => self.toggle_overlay(Overlay::Help, intents),
            KeyCode::Char('^') => self.toggle_overlay(Overlay::Rules, intents),
            _ if self.overlay.is_some() => {}
            KeyCode::Enter => intents.push(Intent::Start),
            KeyCode::Char(' ') => intents.push(Intent::FireDown),
            KeyCode::Char('q') | KeyCode::Char('Q') => intents.push(Intent::Nuke),
            KeyCode::Char('m') | KeyCode::Char('M') => intents.push(Intent::ToggleSound),
            KeyCode::Char('r') | KeyCode::Char('R') if state.status == GameStatus::GameOver => {
                self.forget_held();
                intents.push(Intent::Restart);
            }
            _ => {}
        }
        Control::Continue
    }

    /// Turn the current set of fresh keys into hold/release intents.
    fn held_intents(&mut self, frame: u64, intents: &mut Vec<Intent>) {
        let groups: [(Direction, &[KeyCode]); 4] = [
            (Direction::Left, &LEFT_KEYS),
            (Direction::Right, &RIGHT_KEYS),
            (Direction::Up, &UP_KEYS),
            (Direction::Down, &DOWN_KEYS),
        ];
        for (dir, keys) in groups {
            let now = any_held(&self.key_frame, keys, frame);
            let before = self.held.insert(dir, now).unwrap_or(false);
            match (before, now) {
                (false, true) => intents.push(Intent::Hold(dir)),
                (true, false) => intents.push(Intent::Release(dir)),
                _ => {}
            }
        }

        let fire = any_held(&self.key_frame, &FIRE_KEYS, frame);
        if self.fire_held && !fire {
            intents.push(Intent::FireUp);
        }
        self.fire_held = fire;
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

fn wants_bell(event: &GameEvent) -> bool {
    matches!(
        event,
        GameEvent::AlienDestroyed { .. }
            | GameEvent::LivesChanged(_)
            | GameEvent::BuildingsChanged(_)
            | GameEvent::NukeDetonated
    )
}

/// Input model: every press/repeat refreshes a key's timestamp in
/// `key_frame`; each frame the keys still "fresh" become held controls.
/// Release events (keyboard-enhancement terminals) drop a key at once.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rules: &Rules,
    rng: &mut StdRng,
    rx: &mpsc::Receiver<Event>,
) -> std::io::Result<()> {
    let mut frontend = Frontend::new();
    let mut frame: u64 = 0;
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();
        let dt_ms = frame_start.duration_since(last_frame).as_secs_f32() * 1000.0;
        last_frame = frame_start;
        frame += 1;

        let mut intents = Vec::new();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent { code, kind, modifiers, .. }) => match kind {
                    KeyEventKind::Press => {
                        frontend.key_frame.insert(code, frame);
                        if let Control::Quit =
                            frontend.on_press(code, modifiers, state, &mut intents)
                        {
                            return Ok(());
                        }
                    }
                    KeyEventKind::Repeat => {
                        frontend.key_frame.insert(code, frame);
                    }
                    KeyEventKind::Release => {
                        frontend.key_frame.remove(&code);
                    }
                },
                Event::Resize(cols, rows) => {
                    let field = field_for(cols, rows);
                    match resize(state, rules, field.width, field.height) {
                        Ok(resized) => *state = resized,
                        Err(err) => warn!(%err, "ignoring resize"),
                    }
                }
                _ => {}
            }
        }

        frontend.held_intents(frame, &mut intents);

        *state = step(state, rules, &intents, dt_ms, rng);

        if state.sound_on && state.events.iter().any(wants_bell) {
            out.queue(Print("\x07"))?;
        }
        if state.events.contains(&GameEvent::GameOver) {
            info!(score = state.score, "run finished");
        }

        display::render(out, state, rules, frontend.overlay)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    // The engine has no fallback values: without rules there is no game.
    let rules = Rules::load(&cli.rules)
        .with_context(|| format!("cannot start without rules from {}", cli.rules.display()))?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (cols, rows) = terminal::size()?;
    let mut state = init_state(&rules, field_for(cols, rows), &mut rng)
        .context("terminal window is too small for the game")?;

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, &mut state, &rules, &mut rng, &rx);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!(
        score = state.score,
        explosion_slots = state.explosions.capacity(),
        "exiting"
    );
    result.context("terminal I/O failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_over_state() -> GameState {
        let rules = Rules::from_json_str(include_str!("../game_rules.json")).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut state = init_state(&rules, Field::new(800.0, 600.0), &mut rng).unwrap();
        state.status = GameStatus::GameOver;
        state
    }

    #[test]
    fn held_key_is_resent_after_overlay_closes() {
        let mut fe = Frontend::new();
        let mut intents = Vec::new();
        fe.key_frame.insert(KeyCode::Left, 1);
        fe.held_intents(1, &mut intents);
        assert_eq!(intents, vec![Intent::Hold(Direction::Left)]);

        intents.clear();
        fe.toggle_overlay(Overlay::Help, &mut intents);
        fe.key_frame.insert(KeyCode::Left, 2);
        fe.held_intents(2, &mut intents);
        assert_eq!(intents, vec![Intent::Pause]);

        intents.clear();
        fe.toggle_overlay(Overlay::Help, &mut intents);
        fe.key_frame.insert(KeyCode::Left, 3);
        fe.held_intents(3, &mut intents);
        assert_eq!(intents, vec![Intent::Resume, Intent::Hold(Direction::Left)]);
    }

    #[test]
    fn esc_closing_overlay_resends_held_key() {
        let state = game_over_state();
        let mut fe = Frontend::new();
        let mut intents = Vec::new();
        fe.key_frame.insert(KeyCode::Up, 1);
        fe.held_intents(1, &mut intents);
        fe.toggle_overlay(Overlay::Rules, &mut intents);

        intents.clear();
        let control = fe.on_press(KeyCode::Esc, KeyModifiers::NONE, &state, &mut intents);
        assert!(matches!(control, Control::Continue));
        assert!(fe.overlay.is_none());
        fe.held_intents(2, &mut intents);
        assert_eq!(intents, vec![Intent::Resume, Intent::Hold(Direction::Up)]);
    }

    #[test]
    fn held_key_is_resent_after_restart() {
        let state = game_over_state();
        let mut fe = Frontend::new();
        let mut intents = Vec::new();
        fe.key_frame.insert(KeyCode::Char('d'), 1);
        fe.held_intents(1, &mut intents);

        intents.clear();
        fe.on_press(KeyCode::Char('r'), KeyModifiers::NONE, &state, &mut intents);
        fe.held_intents(2, &mut intents);
        assert_eq!(intents, vec![Intent::Restart, Intent::Hold(Direction::Right)]);
    }
}
