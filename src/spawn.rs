//! Entity generation: regular aliens, the phantom, and the city layout.
//!
//! Every function draws from the injected RNG only, so a seeded RNG gives a
//! reproducible run.

use rand::Rng;
use tracing::debug;

use crate::constants::{
    ALIEN_HEIGHT, ALIEN_MAX_SCALE, ALIEN_MIN_SCALE, ALIEN_SPAWN_Y, ALIEN_WIDTH,
    BUILDING_MARGIN, BUILDING_MAX_HEIGHT, BUILDING_MAX_WIDTH, BUILDING_MIN_HEIGHT,
    BUILDING_MIN_WIDTH, BUILDING_PALETTE_SIZE, MIN_FIELD_HEIGHT, PHANTOM_HITBOX_HEIGHT_SCALE,
    PHANTOM_HITBOX_WIDTH_SCALE, PHANTOM_SIZE_SCALE, TOUGH_SIZE_SCALE, TOUGH_SPAWN_CHANCE,
    TOUGH_SPEED_SCALE,
};
use crate::entities::{Alien, AlienKind, Building, Field};
use crate::error::FieldError;
use crate::rules::Rules;

// ── Field checks ─────────────────────────────────────────────────────────────

/// Narrowest field that always fits `buildings.max` of the widest buildings.
pub fn min_field_width(rules: &Rules) -> f32 {
    let n = rules.buildings.max as f32;
    n * BUILDING_MAX_WIDTH as f32 + (n + 1.0) * BUILDING_MARGIN
}

pub fn check_field(field: Field, rules: &Rules) -> Result<(), FieldError> {
    let min_width = min_field_width(rules);
    if field.width < min_width || field.height < MIN_FIELD_HEIGHT {
        return Err(FieldError::TooSmall {
            width: field.width,
            height: field.height,
            min_width,
            min_height: MIN_FIELD_HEIGHT,
        });
    }
    Ok(())
}

// ── Aliens ───────────────────────────────────────────────────────────────────

/// A regular alien near the top of the field.  One in five is tough:
/// bigger, slower, and harder to kill.  Speed grows with `level`.
pub fn spawn_alien(field: Field, rules: &Rules, level: u32, rng: &mut impl Rng) -> Alien {
    let tough = rng.gen_bool(TOUGH_SPAWN_CHANCE);
    let (kind, hp, size_scale, speed_scale) = if tough {
        (AlienKind::Tough, rules.alien_hp.tough, TOUGH_SIZE_SCALE, TOUGH_SPEED_SCALE)
    } else {
        (AlienKind::Normal, rules.alien_hp.normal, 1.0, 1.0)
    };

    let scale = rng.gen_range(ALIEN_MIN_SCALE..=ALIEN_MAX_SCALE) * size_scale;
    let width = ALIEN_WIDTH * scale;
    let height = ALIEN_HEIGHT * scale;

    let level = level as f32;
    let dir = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let vx = (rng.gen_range(0.0f32..2.0) + 1.5 + level * 0.5) * dir * speed_scale * rules.alien_speed;
    let vy = (rng.gen_range(0.0f32..0.7) + 0.5 + level * 0.2) * speed_scale * rules.alien_speed;

    let span = (field.width - width).max(1.0);
    let x = rng.gen_range(0.0f32..span) + width / 2.0;

    debug!(?kind, x, vx, vy, "spawned alien");
    Alien {
        kind,
        x,
        y: ALIEN_SPAWN_Y,
        vx,
        vy,
        hp,
        width,
        height,
        flash_frames: 0,
    }
}

/// The phantom: enters just outside a random side edge, somewhere in the
/// upper half, and flies straight across.
pub fn spawn_phantom(field: Field, rules: &Rules, rng: &mut impl Rng) -> Alien {
    let p = &rules.phantom_alien;
    let width = ALIEN_WIDTH * PHANTOM_SIZE_SCALE;
    let height = ALIEN_HEIGHT * PHANTOM_SIZE_SCALE;

    let speed = if p.max_speed > p.min_speed {
        rng.gen_range(p.min_speed..p.max_speed)
    } else {
        p.min_speed
    };
    let from_left = rng.gen_bool(0.5);
    let x = if from_left { -width } else { field.width + width };
    let band = (field.height / 2.0 - height).max(1.0);
    let y = rng.gen_range(0.0f32..band) + height;

    debug!(from_left, y, speed, "spawned phantom");
    Alien {
        kind: AlienKind::Phantom { from_left },
        x,
        y,
        vx: if from_left { speed } else { -speed },
        vy: 0.0,
        hp: p.hp,
        width: width * PHANTOM_HITBOX_WIDTH_SCALE,
        height: height * PHANTOM_HITBOX_HEIGHT_SCALE,
        flash_frames: 0,
    }
}

// ── City ─────────────────────────────────────────────────────────────────────

/// A fresh row of buildings standing on the city base.
///
/// The count is drawn from `buildings.min..=buildings.max`.  Widths are
/// drawn first, then the leftover width is split at random cut points into
/// the gaps, so buildings never overlap and keep `BUILDING_MARGIN` apart.
/// Callers must have passed [`check_field`].
pub fn generate_buildings(field: Field, rules: &Rules, rng: &mut impl Rng) -> Vec<Building> {
    let count = rng.gen_range(rules.buildings.min..=rules.buildings.max);
    let sizes: Vec<(f32, f32)> = (0..count)
        .map(|_| {
            (
                rng.gen_range(BUILDING_MIN_WIDTH..=BUILDING_MAX_WIDTH) as f32,
                rng.gen_range(BUILDING_MIN_HEIGHT..=BUILDING_MAX_HEIGHT) as f32,
            )
        })
        .collect();

    let used: f32 = sizes.iter().map(|(w, _)| w).sum::<f32>()
        + (count as f32 + 1.0) * BUILDING_MARGIN;
    let slack = (field.width - used).max(0.0);

    let mut cuts: Vec<f32> = (0..count)
        .map(|_| (rng.gen::<f32>() * slack).floor())
        .collect();
    cuts.sort_by(f32::total_cmp);

    let base_y = field.base_y();
    let mut buildings = Vec::with_capacity(count);
    let mut prev_cut = 0.0;
    let mut cursor = BUILDING_MARGIN;
    for ((width, height), cut) in sizes.into_iter().zip(cuts) {
        cursor += cut - prev_cut;
        prev_cut = cut;
        buildings.push(Building {
            x: cursor,
            y: base_y - height,
            width,
            height,
            color: rng.gen_range(0..BUILDING_PALETTE_SIZE),
        });
        cursor += width + BUILDING_MARGIN;
    }

    debug!(count = buildings.len(), "generated city");
    buildings
}
