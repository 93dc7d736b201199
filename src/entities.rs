//! Game entity types. Pure data, no game logic.

use crate::constants::{
    CITY_BASE_HEIGHT, PLAYER_BOTTOM_CLEARANCE, PLAYER_HEIGHT, PLAYER_WIDTH,
};
use crate::pool::ExplosionPool;

// ── Geometry ─────────────────────────────────────────────────────────────────

/// Play-area dimensions in world units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Highest point (smallest y) the player may reach.
    pub fn player_min_y(&self) -> f32 {
        self.height / 2.0
    }

    /// Lowest point the player may reach; stops above the city row.
    pub fn player_max_y(&self) -> f32 {
        self.height - PLAYER_BOTTOM_CLEARANCE - PLAYER_HEIGHT / 2.0
    }

    pub fn player_min_x(&self) -> f32 {
        PLAYER_WIDTH / 2.0
    }

    pub fn player_max_x(&self) -> f32 {
        self.width - PLAYER_WIDTH / 2.0
    }

    /// Top edge of the city base strip.
    pub fn base_y(&self) -> f32 {
        self.height - CITY_BASE_HEIGHT
    }

    /// Where the player (re)appears.
    pub fn player_spawn(&self) -> (f32, f32) {
        (self.width / 2.0, self.player_max_y())
    }
}

/// Axis-aligned box given by its centre and half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub cx: f32,
    pub cy: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            cx,
            cy,
            half_w: width / 2.0,
            half_h: height / 2.0,
        }
    }

    pub fn from_top_left(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::centered(x + width / 2.0, y + height / 2.0, width, height)
    }

    /// Strict overlap; touching edges do not count.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        (self.cx - other.cx).abs() < self.half_w + other.half_w
            && (self.cy - other.cy).abs() < self.half_h + other.half_h
    }
}

// ── Player & projectiles ─────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
}

impl Player {
    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.x, self.y, PLAYER_WIDTH, PLAYER_HEIGHT)
    }
}

/// A player shot.  `vy` is negative (upward).
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
}

// ── Aliens ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlienKind {
    Normal,
    Tough,
    /// Crosses the field once; `from_left` is the entry side.
    Phantom { from_left: bool },
}

impl AlienKind {
    pub fn is_phantom(&self) -> bool {
        matches!(self, AlienKind::Phantom { .. })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alien {
    pub kind: AlienKind,
    /// Centre of the alien.
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub hp: u32,
    /// Collision box size.
    pub width: f32,
    pub height: f32,
    /// Frames of hit tint remaining; zero when not flashing.
    pub flash_frames: u32,
}

impl Alien {
    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.x, self.y, self.width, self.height)
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_frames > 0
    }
}

// ── City ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Index into the renderer's building palette.
    pub color: u8,
}

impl Building {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_top_left(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

// ── Effects ──────────────────────────────────────────────────────────────────

/// A fading explosion.  Purely visual apart from gating game over.
#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub age: u32,
    pub max_age: u32,
    /// 1.0 when fresh, 0.0 when fully faded.
    pub alpha: f32,
}

impl Explosion {
    pub fn is_faded(&self) -> bool {
        self.alpha <= 0.0 || self.age > self.max_age
    }
}

// ── Input ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Held keys, as last reported by the front-end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl Controls {
    pub fn set(&mut self, dir: Direction, held: bool) {
        match dir {
            Direction::Left => self.left = held,
            Direction::Right => self.right = held,
            Direction::Up => self.up = held,
            Direction::Down => self.down = held,
        }
    }
}

/// Everything a front-end may ask of the engine.  Intents are queued and
/// applied in order at the start of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Hold(Direction),
    Release(Direction),
    /// Fire pressed: shoots once (if allowed) and keeps fire held.
    FireDown,
    FireUp,
    Nuke,
    ToggleSound,
    Start,
    Restart,
    /// An overlay opened; freeze the simulation.
    Pause,
    /// The overlay closed; continue exactly where we left off.
    Resume,
}

// ── Output events ────────────────────────────────────────────────────────────

/// Notifications for the HUD, audio and renderer.  Collaborators read these;
/// they never feed back into the state.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ScoreChanged(u32),
    LivesChanged(u32),
    NukesChanged(u32),
    BuildingsChanged(usize),
    ExplosionSpawned { x: f32, y: f32 },
    ShotFired,
    AlienHit,
    AlienDestroyed { kind: AlienKind },
    PhantomAppeared,
    PhantomGone,
    NukeDetonated,
    RapidFireChanged(bool),
    LevelUp(u32),
    SoundToggled(bool),
    GameStarted,
    GameOver,
}

// ── Master game state ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    TitleScreen,
    Playing,
    /// The run is lost but explosions are still animating.
    GameOverPending,
    GameOver,
}

/// The entire game state.  Cloneable so the pure update functions can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub field: Field,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub aliens: Vec<Alien>,
    pub buildings: Vec<Building>,
    pub explosions: ExplosionPool,

    pub score: u32,
    pub lives: u32,
    pub nukes: u32,
    pub difficulty_level: u32,
    /// Frames between regular alien spawns at the current difficulty.
    pub spawn_interval: u32,
    /// Frames since the last regular spawn.
    pub spawn_timer: u32,

    /// Score at the last nuke award.
    pub last_nuke_score: u32,
    /// Score at the last phantom threshold crossing.
    pub last_phantom_score: u32,
    /// `floor(score / rapidFireThreshold)` at the last award.
    pub last_rapid_fire_threshold: u32,

    pub rapid_fire_active: bool,
    /// Seconds of rapid fire left.
    pub rapid_fire_remaining: f32,
    /// Frames since the last automatic rapid-fire shot.
    pub rapid_fire_timer: u32,
    pub can_normal_shoot: bool,
    /// Frames since the last normal shot while cooling down.
    pub normal_shoot_timer: u32,

    pub controls: Controls,
    pub status: GameStatus,
    pub paused: bool,
    pub sound_on: bool,
    pub frame: u64,

    /// Events raised since the current `step` began.
    pub events: Vec<GameEvent>,
}

impl GameState {
    pub fn phantom(&self) -> Option<&Alien> {
        self.aliens.iter().find(|a| a.kind.is_phantom())
    }

    pub fn phantom_count(&self) -> usize {
        self.aliens.iter().filter(|a| a.kind.is_phantom()).count()
    }

    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn is_started(&self) -> bool {
        self.status != GameStatus::TitleScreen
    }
}
