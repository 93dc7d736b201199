//! Terminal renderer. All screen output lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state.  No game logic is performed; this module only translates
//! world coordinates into terminal cells and state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use galactic_invaders::entities::{Alien, AlienKind, Building, GameState, GameStatus};
use galactic_invaders::Rules;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkMagenta;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_NUKES: Color = Color::Green;
const C_HUD_CITY: Color = Color::Magenta;
const C_PLAYER: Color = Color::Blue;
const C_PLAYER_RAPID: Color = Color::White;
const C_ALIEN_NORMAL: [Color; 6] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
];
const C_ALIEN_TOUGH: Color = Color::DarkMagenta;
const C_ALIEN_PHANTOM: Color = Color::Cyan;
const C_ALIEN_FLASH: Color = Color::White;
const C_BULLET: Color = Color::White;
const C_BUILDINGS: [Color; 3] = [Color::White, Color::Magenta, Color::Green];
const C_EXPLOSION: [Color; 3] = [Color::Yellow, Color::Red, Color::DarkRed];
const C_HINT: Color = Color::DarkGrey;
const C_POWERUP_ACTIVE: Color = Color::Yellow;

/// Overlays that freeze the simulation while open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Rules,
}

/// Maps world units onto the terminal grid inside the border.
struct Viewport {
    cols: u16,
    rows: u16,
    sx: f32,
    sy: f32,
}

impl Viewport {
    fn new(state: &GameState, cols: u16, rows: u16) -> Self {
        // Row 0 is the HUD, row 1 the top border, the last two rows are the
        // bottom border and the controls hint.
        let inner_w = cols.saturating_sub(2).max(1) as f32;
        let inner_h = rows.saturating_sub(4).max(1) as f32;
        Self {
            cols,
            rows,
            sx: inner_w / state.field.width,
            sy: inner_h / state.field.height,
        }
    }

    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = (x * self.sx).floor() as i32 + 1;
        let row = (y * self.sy).floor() as i32 + 2;
        let in_x = col >= 1 && col < self.cols as i32 - 1;
        let in_y = row >= 2 && row < self.rows as i32 - 2;
        (in_x && in_y).then_some((col as u16, row as u16))
    }

    fn span(&self, width: f32) -> usize {
        ((width * self.sx).round() as usize).max(1)
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    rules: &Rules,
    overlay: Option<Overlay>,
) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    let view = Viewport::new(state, cols, rows);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view)?;
    draw_hud(out, state, &view)?;
    draw_city(out, state, &view)?;

    for building in &state.buildings {
        draw_building(out, building, &view)?;
    }
    for alien in &state.aliens {
        draw_alien(out, alien, &view)?;
    }
    for bullet in &state.bullets {
        if let Some((c, r)) = view.cell(bullet.x, bullet.y) {
            out.queue(cursor::MoveTo(c, r))?;
            out.queue(style::SetForegroundColor(C_BULLET))?;
            out.queue(Print("║"))?;
        }
    }
    for exp in state.explosions.iter() {
        if let Some((c, r)) = view.cell(exp.x, exp.y) {
            let shade = ((1.0 - exp.alpha) * C_EXPLOSION.len() as f32) as usize;
            out.queue(cursor::MoveTo(c.saturating_sub(1), r))?;
            out.queue(style::SetForegroundColor(
                C_EXPLOSION[shade.min(C_EXPLOSION.len() - 1)],
            ))?;
            out.queue(Print(if exp.alpha > 0.5 { "*#*" } else { ".+." }))?;
        }
    }

    if state.is_started() {
        draw_player(out, state, &view)?;
    }
    draw_controls_hint(out, &view)?;

    match state.status {
        GameStatus::TitleScreen => draw_title(out, rules, &view)?,
        GameStatus::GameOver => draw_game_over(out, state, &view)?,
        GameStatus::Playing | GameStatus::GameOverPending => {}
    }
    match overlay {
        Some(Overlay::Help) => draw_help(out, &view)?,
        Some(Overlay::Rules) => draw_rules(out, rules, &view)?,
        None => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>7}  Lv:{}", state.score, state.difficulty_level)))?;

    let nukes = format!("Nukes:{}", state.nukes);
    let nx = (view.cols / 2).saturating_sub(nukes.len() as u16 / 2);
    out.queue(cursor::MoveTo(nx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_NUKES))?;
    out.queue(Print(&nukes))?;

    let rapid_tag = if state.rapid_fire_active {
        format!("[! RAPID {:>2}s] ", state.rapid_fire_remaining.ceil() as u32)
    } else {
        String::new()
    };
    let sound_tag = if state.sound_on { "" } else { "[muted] " };
    let city = format!("City:{} ", state.buildings.len());
    let lives = format!("Lives:{}", "♥".repeat(state.lives as usize));
    let right_len = rapid_tag.chars().count()
        + sound_tag.chars().count()
        + city.chars().count()
        + lives.chars().count();

    let rx = view.cols.saturating_sub(right_len as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    if !rapid_tag.is_empty() {
        out.queue(style::SetForegroundColor(C_POWERUP_ACTIVE))?;
        out.queue(Print(&rapid_tag))?;
    }
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(sound_tag))?;
    out.queue(style::SetForegroundColor(C_HUD_CITY))?;
    out.queue(Print(&city))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_city<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    if let Some((_, row)) = view.cell(0.0, state.field.base_y()) {
        out.queue(cursor::MoveTo(1, row))?;
        out.queue(style::SetForegroundColor(C_HUD_CITY))?;
        out.queue(Print("▀".repeat(view.cols.saturating_sub(2) as usize)))?;
    }
    Ok(())
}

fn draw_building<W: Write>(
    out: &mut W,
    building: &Building,
    view: &Viewport,
) -> std::io::Result<()> {
    let color = C_BUILDINGS[building.color as usize % C_BUILDINGS.len()];
    let span = view.span(building.width);
    let Some((col, top)) = view.cell(building.x, building.y) else {
        return Ok(());
    };
    let bottom = view
        .cell(building.x, building.y + building.height - 1.0)
        .map(|(_, r)| r)
        .unwrap_or(top);
    out.queue(style::SetForegroundColor(color))?;
    for row in top..=bottom {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(Print("▓".repeat(span)))?;
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    //   ▲       ← tip
    //  /█\      ← fuselage + wings
    let p = &state.player;
    let Some((col, row)) = view.cell(p.x, p.y) else {
        return Ok(());
    };
    let color = if state.rapid_fire_active { C_PLAYER_RAPID } else { C_PLAYER };
    out.queue(style::SetForegroundColor(color))?;
    out.queue(cursor::MoveTo(col, row.saturating_sub(1).max(2)))?;
    out.queue(Print("▲"))?;
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(Print("/█\\"))?;
    Ok(())
}

fn draw_alien<W: Write>(out: &mut W, alien: &Alien, view: &Viewport) -> std::io::Result<()> {
    let Some((col, row)) = view.cell(alien.x, alien.y) else {
        return Ok(());
    };
    let (sprite, color) = match alien.kind {
        AlienKind::Normal => {
            let idx = (alien.width as usize + alien.vx.abs() as usize) % C_ALIEN_NORMAL.len();
            ("«▼»", C_ALIEN_NORMAL[idx])
        }
        AlienKind::Tough => ("(◎)", C_ALIEN_TOUGH),
        AlienKind::Phantom { .. } => ("<=◓=>", C_ALIEN_PHANTOM),
    };
    let color = if alien.is_flashing() { C_ALIEN_FLASH } else { color };
    let half = sprite.chars().count() as u16 / 2;
    out.queue(cursor::MoveTo(col.saturating_sub(half).max(1), row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(sprite))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "←↑→↓/WASD: Move  SPACE: Shoot  Q: Nuke  M: Sound  H: Help  ^: Rules  ESC: Quit",
    ))?;
    Ok(())
}

// ── Centred text boxes ────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

fn draw_title<W: Write>(out: &mut W, rules: &Rules, view: &Viewport) -> std::io::Result<()> {
    let lines = vec![
        ("★  GALACTIC  INVADERS  ★".to_string(), Color::Magenta),
        (String::new(), Color::White),
        (format!("«▼»  {} Pts", rules.points.normal_alien), Color::Red),
        (format!("(◎)  {} Pts", rules.points.tough_alien), C_ALIEN_TOUGH),
        (format!("<=◓=>  {} Pts", rules.phantom_alien.bonus_score), C_ALIEN_PHANTOM),
        (String::new(), Color::White),
        ("Press [Enter] to Start".to_string(), Color::White),
    ];
    draw_centered(out, view, &lines)
}

fn draw_game_over<W: Write>(out: &mut W, state: &GameState, view: &Viewport) -> std::io::Result<()> {
    let cause = if state.buildings.is_empty() {
        "The city has fallen"
    } else {
        "Out of lives"
    };
    let lines = vec![
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (cause.to_string(), Color::DarkGrey),
        (format!("Final Score: {:>7}", state.score), Color::Yellow),
        ("R - Play Again  ESC - Quit".to_string(), Color::White),
    ];
    draw_centered(out, view, &lines)
}

fn draw_help<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let lines: Vec<(String, Color)> = [
        "── HELP (paused) ──",
        "",
        "Shoot the aliens before they reach the city.",
        "Tough aliens take several hits; the phantom is worth a bonus.",
        "Score milestones award nukes (Q) and timed rapid fire.",
        "Lose every life or every building and the game is over.",
        "",
        "H / ESC: close",
    ]
    .iter()
    .map(|s| (s.to_string(), Color::White))
    .collect();
    draw_centered(out, view, &lines)
}

fn draw_rules<W: Write>(out: &mut W, rules: &Rules, view: &Viewport) -> std::io::Result<()> {
    let text = serde_json::to_string_pretty(rules).unwrap_or_else(|e| e.to_string());
    let mut lines: Vec<(String, Color)> = vec![("── RULES (paused) ──".to_string(), Color::Yellow)];
    let room = view.rows.saturating_sub(6) as usize;
    lines.extend(text.lines().take(room).map(|l| (l.to_string(), Color::Green)));
    lines.push(("^ / ESC: close".to_string(), Color::White));
    draw_centered(out, view, &lines)
}
