//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `GameState` (plus the rules and, where needed, an RNG handle) and returns
//! a brand-new `GameState`.  Side effects are limited to the injected RNG
//! and to `tracing` output.  Internally each function clones once and then
//! works on the copy through the `&mut` helpers below.

use rand::Rng;
use tracing::{debug, info};

use crate::constants::{
    ALIEN_WIDTH, BULLET_EXIT_Y, BULLET_MARGIN_X, BULLET_MARGIN_Y, BULLET_SPEED,
    BUILDING_MARGIN, HIT_FLASH_FRAMES, PHANTOM_WOBBLE_AMPLITUDE, PHANTOM_WOBBLE_FREQUENCY,
    PLAYER_HEIGHT, PLAYER_SPEED, RAPID_FIRE_INTERVAL, SMALL_ALIEN_STEP, WALL_DROP,
};
use crate::entities::{
    Alien, AlienKind, Building, Bullet, Controls, Field, GameEvent, GameState, GameStatus,
    Intent, Player,
};
use crate::error::FieldError;
use crate::pool::ExplosionPool;
use crate::rules::Rules;
use crate::spawn::{check_field, generate_buildings, spawn_alien, spawn_phantom};

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Extra points for aliens smaller than the base size: one
/// `smallAlienBonus` per `SMALL_ALIEN_STEP` units of missing width.
fn size_bonus(alien: &Alien, rules: &Rules) -> u32 {
    let steps = ((ALIEN_WIDTH - alien.width) / SMALL_ALIEN_STEP).round();
    if steps <= 0.0 {
        0
    } else {
        (steps as u32).saturating_mul(rules.points.small_alien_bonus)
    }
}

/// Score awarded when `alien` is destroyed by the player.
pub fn score_for(alien: &Alien, rules: &Rules) -> u32 {
    let regular = rules.points.normal_alien.saturating_add(size_bonus(alien, rules));
    match alien.kind {
        AlienKind::Normal => regular,
        AlienKind::Tough => regular.max(rules.points.tough_alien),
        AlienKind::Phantom { .. } => rules.phantom_alien.bonus_score,
    }
}

// ── Constructors ─────────────────────────────────────────────────────────────

fn fresh_state(field: Field, rules: &Rules, rng: &mut impl Rng) -> GameState {
    let (x, y) = field.player_spawn();
    GameState {
        field,
        player: Player { x, y },
        bullets: Vec::new(),
        aliens: Vec::new(),
        buildings: generate_buildings(field, rules, rng),
        explosions: ExplosionPool::new(),
        score: 0,
        lives: rules.starting_lives,
        nukes: 0,
        difficulty_level: 0,
        spawn_interval: rules.difficulty.spawn_interval_start,
        spawn_timer: 0,
        last_nuke_score: 0,
        last_phantom_score: 0,
        last_rapid_fire_threshold: 0,
        rapid_fire_active: false,
        rapid_fire_remaining: 0.0,
        rapid_fire_timer: 0,
        can_normal_shoot: true,
        normal_shoot_timer: 0,
        controls: Controls::default(),
        status: GameStatus::TitleScreen,
        paused: false,
        sound_on: true,
        frame: 0,
        events: Vec::new(),
    }
}

/// Build the title-screen state for a field of the given size.
pub fn init_state(rules: &Rules, field: Field, rng: &mut impl Rng) -> Result<GameState, FieldError> {
    check_field(field, rules)?;
    let state = fresh_state(field, rules, rng);
    info!(
        width = field.width,
        height = field.height,
        buildings = state.buildings.len(),
        "game initialised"
    );
    Ok(state)
}

/// Reset every run-state field, rebuild the city, and go back to the title
/// screen.  The sound setting, the field and the explosion pool's slots
/// survive; pending events are kept so collaborators still see them.
pub fn restart(state: &GameState, rules: &Rules, rng: &mut impl Rng) -> GameState {
    let mut s = fresh_state(state.field, rules, rng);
    s.sound_on = state.sound_on;
    s.explosions = state.explosions.clone();
    s.explosions.clear();
    s.events = state.events.clone();

    if state.phantom().is_some() {
        s.events.push(GameEvent::PhantomGone);
    }
    if state.rapid_fire_active {
        s.events.push(GameEvent::RapidFireChanged(false));
    }
    s.events.push(GameEvent::ScoreChanged(0));
    s.events.push(GameEvent::LivesChanged(s.lives));
    s.events.push(GameEvent::NukesChanged(0));
    s.events.push(GameEvent::BuildingsChanged(s.buildings.len()));

    info!(buildings = s.buildings.len(), "run restarted");
    s
}

/// Adapt the state to a new field size: player back to its spawn point,
/// buildings re-anchored on the new base row, regular aliens pulled inside.
pub fn resize(
    state: &GameState,
    rules: &Rules,
    width: f32,
    height: f32,
) -> Result<GameState, FieldError> {
    let field = Field::new(width, height);
    check_field(field, rules)?;

    let mut s = state.clone();
    let scale_x = width / state.field.width;
    let base_y = field.base_y();
    for building in &mut s.buildings {
        building.x *= scale_x;
        building.y = base_y - building.height;
    }
    repack_buildings(&mut s.buildings, width);
    for alien in s.aliens.iter_mut().filter(|a| !a.kind.is_phantom()) {
        let half = alien.width / 2.0;
        alien.x = alien.x.clamp(half, width - half);
    }

    s.field = field;
    let (x, y) = field.player_spawn();
    s.player = Player { x, y };

    debug!(width, height, "field resized");
    Ok(s)
}

/// Restore the `BUILDING_MARGIN` gaps after the row was scaled: push each
/// building right past its left neighbour, then pull the tail back inside
/// the field.  `check_field` guarantees the whole row fits.
fn repack_buildings(buildings: &mut [Building], width: f32) {
    buildings.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut min_x = BUILDING_MARGIN;
    for b in buildings.iter_mut() {
        b.x = b.x.max(min_x);
        min_x = b.right() + BUILDING_MARGIN;
    }

    let mut max_right = width - BUILDING_MARGIN;
    for b in buildings.iter_mut().rev() {
        if b.right() > max_right {
            b.x = max_right - b.width;
        }
        max_right = b.x - BUILDING_MARGIN;
    }
}

// ── Shared mutations ─────────────────────────────────────────────────────────

fn explode(s: &mut GameState, x: f32, y: f32) {
    s.explosions.spawn(x, y);
    s.events.push(GameEvent::ExplosionSpawned { x, y });
}

fn fire_bullet(s: &mut GameState) {
    s.bullets.push(Bullet {
        x: s.player.x,
        y: s.player.y - PLAYER_HEIGHT / 2.0,
        vy: -BULLET_SPEED,
    });
    s.events.push(GameEvent::ShotFired);
}

/// Expiry always resets the normal-fire cooldown.
fn end_rapid_fire(s: &mut GameState) {
    s.rapid_fire_active = false;
    s.rapid_fire_remaining = 0.0;
    s.rapid_fire_timer = 0;
    s.can_normal_shoot = true;
    s.normal_shoot_timer = 0;
    s.events.push(GameEvent::RapidFireChanged(false));
}

/// Lives or buildings ran out.  The switch to `GameOver` waits until the
/// last explosion has faded.  Power-ups end here since their timers only
/// run while playing.
fn begin_game_over(s: &mut GameState) {
    if s.status == GameStatus::Playing {
        info!(score = s.score, lives = s.lives, buildings = s.buildings.len(), "game over pending");
        s.status = GameStatus::GameOverPending;
        if s.rapid_fire_active {
            end_rapid_fire(s);
        }
    }
}

fn try_shoot(s: &mut GameState) {
    if s.status != GameStatus::Playing || s.paused {
        return;
    }
    if !(s.can_normal_shoot || s.rapid_fire_active) {
        return;
    }
    fire_bullet(s);
    if !s.rapid_fire_active {
        s.can_normal_shoot = false;
        s.normal_shoot_timer = 0;
    }
}

fn detonate_nuke(s: &mut GameState) {
    if s.status != GameStatus::Playing || s.paused || s.nukes == 0 {
        return;
    }
    s.nukes -= 1;
    s.events.push(GameEvent::NukesChanged(s.nukes));

    let aliens = std::mem::take(&mut s.aliens);
    for alien in &aliens {
        explode(s, alien.x, alien.y);
        if alien.kind.is_phantom() {
            s.events.push(GameEvent::PhantomGone);
        }
    }
    s.events.push(GameEvent::NukeDetonated);
    info!(destroyed = aliens.len(), nukes_left = s.nukes, "nuke detonated");
}

// ── Input-driven state transitions (pure) ────────────────────────────────────

/// Fire one shot if the cooldown allows it (rapid fire bypasses it).
pub fn player_shoot(state: &GameState) -> GameState {
    let mut s = state.clone();
    try_shoot(&mut s);
    s
}

/// Spend a nuke: every alien on screen explodes, no points awarded.
pub fn use_nuke(state: &GameState) -> GameState {
    let mut s = state.clone();
    detonate_nuke(&mut s);
    s
}

/// Apply a single intent.  While paused only releases and `Resume` get
/// through, so keys let go during an overlay are not stuck afterwards.
pub fn apply_intent(
    state: &GameState,
    rules: &Rules,
    intent: Intent,
    rng: &mut impl Rng,
) -> GameState {
    if state.paused && !matches!(intent, Intent::Release(_) | Intent::FireUp | Intent::Resume) {
        return state.clone();
    }

    if intent == Intent::Restart {
        return restart(state, rules, rng);
    }

    let mut s = state.clone();
    match intent {
        Intent::Hold(dir) => s.controls.set(dir, true),
        Intent::Release(dir) => s.controls.set(dir, false),
        Intent::FireDown => {
            s.controls.fire = true;
            try_shoot(&mut s);
        }
        Intent::FireUp => {
            s.controls.fire = false;
            s.rapid_fire_timer = 0;
        }
        Intent::Nuke => detonate_nuke(&mut s),
        Intent::ToggleSound => {
            s.sound_on = !s.sound_on;
            s.events.push(GameEvent::SoundToggled(s.sound_on));
        }
        Intent::Start => {
            if s.status == GameStatus::TitleScreen {
                s.status = GameStatus::Playing;
                s.events.push(GameEvent::GameStarted);
                info!("game started");
            }
        }
        Intent::Pause => s.paused = true,
        Intent::Resume => s.paused = false,
        Intent::Restart => {}
    }
    s
}

/// One frame: drop last frame's events, apply the queued intents in order,
/// then advance the simulation.
pub fn step(
    state: &GameState,
    rules: &Rules,
    intents: &[Intent],
    dt_ms: f32,
    rng: &mut impl Rng,
) -> GameState {
    let mut s = state.clone();
    s.events.clear();
    for &intent in intents {
        s = apply_intent(&s, rules, intent, rng);
    }
    tick(&s, rules, dt_ms, rng)
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

fn move_player(s: &mut GameState) {
    let Controls { left, right, up, down, .. } = s.controls;
    let field = s.field;
    let p = &mut s.player;
    if left {
        p.x -= PLAYER_SPEED;
    }
    if right {
        p.x += PLAYER_SPEED;
    }
    if up {
        p.y -= PLAYER_SPEED;
    }
    if down {
        p.y += PLAYER_SPEED;
    }
    p.x = p.x.clamp(field.player_min_x(), field.player_max_x());
    p.y = p.y.clamp(field.player_min_y(), field.player_max_y());
}

fn advance_bullets(s: &mut GameState) {
    for bullet in &mut s.bullets {
        bullet.y += bullet.vy;
    }
    s.bullets.retain(|b| b.y >= BULLET_EXIT_Y);
}

fn advance_spawn_timer(s: &mut GameState, rules: &Rules, rng: &mut impl Rng) {
    s.spawn_timer += 1;
    if s.spawn_timer >= s.spawn_interval {
        let alien = spawn_alien(s.field, rules, s.difficulty_level, rng);
        s.aliens.push(alien);
        s.spawn_timer = 0;
    }
}

fn move_aliens(s: &mut GameState) {
    let width = s.field.width;
    let mut i = 0;
    while i < s.aliens.len() {
        let alien = &mut s.aliens[i];
        alien.x += alien.vx;
        alien.y += alien.vy;
        alien.flash_frames = alien.flash_frames.saturating_sub(1);

        match alien.kind {
            AlienKind::Phantom { from_left } => {
                alien.y += (alien.x * PHANTOM_WOBBLE_FREQUENCY).sin() * PHANTOM_WOBBLE_AMPLITUDE;
                let gone = if from_left {
                    alien.x > width + alien.width
                } else {
                    alien.x < -alien.width
                };
                if gone {
                    s.aliens.remove(i);
                    s.events.push(GameEvent::PhantomGone);
                    debug!("phantom escaped");
                    continue;
                }
            }
            AlienKind::Normal | AlienKind::Tough => {
                let half = alien.width / 2.0;
                if alien.x < half || alien.x > width - half {
                    alien.vx = -alien.vx;
                    alien.y += WALL_DROP;
                    alien.x = alien.x.clamp(half, width - half);
                }
            }
        }
        i += 1;
    }
}

fn check_phantom_spawn(s: &mut GameState, rules: &Rules, rng: &mut impl Rng) {
    let threshold = rules.phantom_alien.score_threshold;
    if s.score / threshold <= s.last_phantom_score / threshold {
        return;
    }
    s.last_phantom_score = s.score;
    if s.phantom().is_none() {
        let phantom = spawn_phantom(s.field, rules, rng);
        s.aliens.push(phantom);
        s.events.push(GameEvent::PhantomAppeared);
        info!(score = s.score, "phantom alien appeared");
    }
}

fn bullet_hits(bullet: &Bullet, alien: &Alien) -> bool {
    (bullet.x - alien.x).abs() < alien.width / 2.0 + BULLET_MARGIN_X
        && (bullet.y - alien.y).abs() < alien.height / 2.0 + BULLET_MARGIN_Y
}

fn damage_alien(s: &mut GameState, index: usize, rules: &Rules) {
    let alien = &mut s.aliens[index];
    alien.hp = alien.hp.saturating_sub(1);
    if alien.hp > 0 {
        alien.flash_frames = HIT_FLASH_FRAMES;
        s.events.push(GameEvent::AlienHit);
        return;
    }

    let alien = s.aliens.remove(index);
    let points = score_for(&alien, rules);
    s.score = s.score.saturating_add(points);
    s.events.push(GameEvent::ScoreChanged(s.score));
    s.events.push(GameEvent::AlienDestroyed { kind: alien.kind });
    if alien.kind.is_phantom() {
        s.events.push(GameEvent::PhantomGone);
    }
    explode(s, alien.x, alien.y);
    debug!(kind = ?alien.kind, points, score = s.score, "alien destroyed");
}

/// Each bullet hits at most one alien: the first overlapping one in list
/// order.
fn resolve_bullet_hits(s: &mut GameState, rules: &Rules) {
    let bullets = std::mem::take(&mut s.bullets);
    let mut survivors = Vec::with_capacity(bullets.len());
    for bullet in bullets {
        match s.aliens.iter().position(|a| bullet_hits(&bullet, a)) {
            Some(index) => damage_alien(s, index, rules),
            None => survivors.push(bullet),
        }
    }
    s.bullets = survivors;
}

fn resolve_player_hits(s: &mut GameState) {
    let mut i = 0;
    while i < s.aliens.len() {
        if !s.aliens[i].bounds().overlaps(&s.player.bounds()) {
            i += 1;
            continue;
        }
        let alien = s.aliens.remove(i);
        if alien.kind.is_phantom() {
            s.events.push(GameEvent::PhantomGone);
        }
        s.lives = s.lives.saturating_sub(1);
        s.events.push(GameEvent::LivesChanged(s.lives));
        let (px, py) = (s.player.x, s.player.y);
        explode(s, px, py);

        let (x, y) = s.field.player_spawn();
        s.player = Player { x, y };
        info!(lives = s.lives, "player hit");

        if s.lives == 0 {
            begin_game_over(s);
        }
    }
}

fn resolve_building_hits(s: &mut GameState) {
    let mut i = 0;
    while i < s.aliens.len() {
        let alien = &s.aliens[i];
        if alien.kind.is_phantom() {
            i += 1;
            continue;
        }
        let bounds = alien.bounds();
        let Some(b) = s.buildings.iter().position(|b| b.bounds().overlaps(&bounds)) else {
            i += 1;
            continue;
        };

        s.aliens.remove(i);
        let building = s.buildings.remove(b);
        let (cx, cy) = building.center();
        explode(s, cx, cy);
        s.events.push(GameEvent::BuildingsChanged(s.buildings.len()));
        info!(remaining = s.buildings.len(), "building destroyed");

        if s.buildings.is_empty() {
            begin_game_over(s);
        }
    }
}

/// Regular aliens that reach the city base land harmlessly.
fn resolve_base_landings(s: &mut GameState) {
    let base_y = s.field.base_y();
    let mut i = 0;
    while i < s.aliens.len() {
        let alien = &s.aliens[i];
        if alien.kind.is_phantom() || alien.y + alien.height / 2.0 < base_y {
            i += 1;
            continue;
        }
        let alien = s.aliens.remove(i);
        explode(s, alien.x, alien.y);
        debug!(x = alien.x, "alien landed");
    }
}

fn resolve_pending_game_over(s: &mut GameState) {
    if s.status == GameStatus::GameOverPending && s.explosions.is_empty() {
        s.status = GameStatus::GameOver;
        s.events.push(GameEvent::GameOver);
        info!(score = s.score, frame = s.frame, "game over");
    }
}

fn update_power_ups(s: &mut GameState, rules: &Rules, dt_ms: f32) {
    if s.rapid_fire_active && s.controls.fire {
        s.rapid_fire_timer += 1;
        if s.rapid_fire_timer >= RAPID_FIRE_INTERVAL {
            fire_bullet(s);
            s.rapid_fire_timer = 0;
        }
    }

    if !s.can_normal_shoot {
        s.normal_shoot_timer += 1;
        if s.normal_shoot_timer >= rules.normal_fire_cooldown {
            s.can_normal_shoot = true;
            s.normal_shoot_timer = 0;
        }
    }

    if s.rapid_fire_active {
        s.rapid_fire_remaining -= dt_ms / 1000.0;
        if s.rapid_fire_remaining <= 0.0 {
            end_rapid_fire(s);
            debug!("rapid fire expired");
        }
    }
}

fn check_thresholds(s: &mut GameState, rules: &Rules) {
    let level = s.score / rules.difficulty.score_per_level;
    if level > s.difficulty_level {
        s.difficulty_level = level;
        s.spawn_interval = rules.spawn_interval_for(level);
        s.events.push(GameEvent::LevelUp(level));
        info!(level, spawn_interval = s.spawn_interval, "difficulty increased");
    }

    let nuke_step = rules.nuke_threshold;
    if s.score / nuke_step > s.last_nuke_score / nuke_step {
        s.nukes += 1;
        s.last_nuke_score = s.score;
        s.events.push(GameEvent::NukesChanged(s.nukes));
        info!(nukes = s.nukes, "nuke awarded");
    }

    // Rapid fire counts down only while playing, so it is not awarded after
    // the run is lost.
    if s.status != GameStatus::Playing {
        return;
    }
    let rapid_index = s.score / rules.rapid_fire_threshold;
    if rapid_index > s.last_rapid_fire_threshold {
        s.last_rapid_fire_threshold = rapid_index;
        s.rapid_fire_remaining = rules.rapid_fire_duration;
        if !s.rapid_fire_active {
            s.rapid_fire_active = true;
            s.events.push(GameEvent::RapidFireChanged(true));
        }
        info!(seconds = rules.rapid_fire_duration, "rapid fire awarded");
    }
}

/// Advance the simulation by one frame.  All randomness comes through `rng`
/// so callers control determinism (useful for tests with a seeded RNG).
///
/// Does nothing while paused, on the title screen, or after game over.
/// `dt_ms` is the wall-clock time since the previous frame; only the
/// rapid-fire countdown uses it, every other timer counts frames.
pub fn tick(state: &GameState, rules: &Rules, dt_ms: f32, rng: &mut impl Rng) -> GameState {
    let playing = match state.status {
        GameStatus::Playing => true,
        GameStatus::GameOverPending => false,
        GameStatus::TitleScreen | GameStatus::GameOver => return state.clone(),
    };
    if state.paused {
        return state.clone();
    }

    let mut s = state.clone();
    s.frame += 1;

    // ── 1–3. Player, bullets, spawning ───────────────────────────────────────
    if playing {
        move_player(&mut s);
    }
    advance_bullets(&mut s);
    if playing {
        advance_spawn_timer(&mut s, rules, rng);
    }

    // ── 4–5. Alien movement, phantom appearance ──────────────────────────────
    move_aliens(&mut s);
    if playing {
        check_phantom_spawn(&mut s, rules, rng);
    }

    // ── 6–9. Collisions ──────────────────────────────────────────────────────
    resolve_bullet_hits(&mut s, rules);
    resolve_player_hits(&mut s);
    resolve_building_hits(&mut s);
    resolve_base_landings(&mut s);

    // ── 10–11. Explosions gate the end of the run ───────────────────────────
    s.explosions.advance();
    resolve_pending_game_over(&mut s);

    // ── 12–13. Timers and score thresholds ───────────────────────────────────
    if s.status == GameStatus::Playing {
        update_power_ups(&mut s, rules, dt_ms);
    }
    check_thresholds(&mut s, rules);

    s
}
