//! Fixed geometry and tuning that the rules file does not cover.
//!
//! All distances are world units (the pixels of a 60 FPS canvas); all
//! durations without a unit suffix are frames.

// ── Player ───────────────────────────────────────────────────────────────────

pub const PLAYER_WIDTH: f32 = 60.0;
pub const PLAYER_HEIGHT: f32 = 30.0;
pub const PLAYER_SPEED: f32 = 7.0;

/// Gap between the lowest player position and the bottom of the field.
pub const PLAYER_BOTTOM_CLEARANCE: f32 = 80.0;

// ── Projectiles ──────────────────────────────────────────────────────────────

pub const BULLET_SPEED: f32 = 10.0;

/// Bullets above this y have left the field.
pub const BULLET_EXIT_Y: f32 = -20.0;

/// Extra half-width / half-height added to an alien's box for bullet hits.
pub const BULLET_MARGIN_X: f32 = 4.0;
pub const BULLET_MARGIN_Y: f32 = 12.0;

/// Frames between automatic shots while fire is held under rapid fire.
pub const RAPID_FIRE_INTERVAL: u32 = 6;

// ── Aliens ───────────────────────────────────────────────────────────────────

pub const ALIEN_WIDTH: f32 = 40.0;
pub const ALIEN_HEIGHT: f32 = 30.0;
pub const ALIEN_SPAWN_Y: f32 = 40.0;

/// Probability that a regular spawn is a tough alien.
pub const TOUGH_SPAWN_CHANCE: f64 = 0.2;
pub const TOUGH_SIZE_SCALE: f32 = 1.3;
pub const TOUGH_SPEED_SCALE: f32 = 0.7;

/// Random size factor applied on top of the variant scale.
pub const ALIEN_MIN_SCALE: f32 = 0.7;
pub const ALIEN_MAX_SCALE: f32 = 1.0;

/// Each full step of this many units below the base width earns one
/// `smallAlienBonus`.
pub const SMALL_ALIEN_STEP: f32 = 10.0;

/// Downward step taken when a regular alien bounces off a side wall.
pub const WALL_DROP: f32 = 30.0;

/// Frames an alien stays tinted after a non-lethal hit.
pub const HIT_FLASH_FRAMES: u32 = 6;

pub const PHANTOM_SIZE_SCALE: f32 = 1.5;
pub const PHANTOM_HITBOX_WIDTH_SCALE: f32 = 1.4;
pub const PHANTOM_HITBOX_HEIGHT_SCALE: f32 = 1.1;
pub const PHANTOM_WOBBLE_FREQUENCY: f32 = 0.05;
pub const PHANTOM_WOBBLE_AMPLITUDE: f32 = 2.0;

// ── City ─────────────────────────────────────────────────────────────────────

pub const CITY_BASE_HEIGHT: f32 = 30.0;
pub const BUILDING_MIN_WIDTH: u32 = 25;
pub const BUILDING_MAX_WIDTH: u32 = 60;
pub const BUILDING_MIN_HEIGHT: u32 = 20;
pub const BUILDING_MAX_HEIGHT: u32 = 40;

/// Minimum horizontal gap between two buildings and from the field edges.
pub const BUILDING_MARGIN: f32 = 10.0;

/// Number of distinct building colours the renderer cycles through.
pub const BUILDING_PALETTE_SIZE: u8 = 3;

// ── Effects ──────────────────────────────────────────────────────────────────

pub const EXPLOSION_MAX_AGE: u32 = 20;

// ── Field ────────────────────────────────────────────────────────────────────

/// Smallest field height that leaves a non-empty vertical player band.
pub const MIN_FIELD_HEIGHT: f32 = 240.0;
