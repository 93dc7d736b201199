use galactic_invaders::constants::*;
use galactic_invaders::entities::*;
use galactic_invaders::pool::ExplosionPool;

fn empty_state() -> GameState {
    GameState {
        field: Field::new(800.0, 600.0),
        player: Player { x: 400.0, y: 505.0 },
        bullets: Vec::new(),
        aliens: Vec::new(),
        buildings: Vec::new(),
        explosions: ExplosionPool::new(),
        score: 0,
        lives: 3,
        nukes: 0,
        difficulty_level: 0,
        spawn_interval: 120,
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
        status: GameStatus::Playing,
        paused: false,
        sound_on: true,
        frame: 0,
        events: Vec::new(),
    }
}

fn phantom() -> Alien {
    Alien {
        kind: AlienKind::Phantom { from_left: true },
        x: 100.0,
        y: 100.0,
        vx: 3.0,
        vy: 0.0,
        hp: 3,
        width: 84.0,
        height: 49.5,
        flash_frames: 0,
    }
}

// ── Field ─────────────────────────────────────────────────────────────────────

#[test]
fn field_player_band() {
    let f = Field::new(800.0, 600.0);
    assert_eq!(f.player_min_y(), 300.0);
    assert_eq!(f.player_max_y(), 600.0 - PLAYER_BOTTOM_CLEARANCE - PLAYER_HEIGHT / 2.0);
    assert_eq!(f.player_min_x(), 30.0);
    assert_eq!(f.player_max_x(), 770.0);
    assert_eq!(f.base_y(), 570.0);
    assert_eq!(f.player_spawn(), (400.0, 505.0));
}

#[test]
fn player_stays_above_city_row() {
    let f = Field::new(800.0, 600.0);
    let p = Player { x: 400.0, y: f.player_max_y() };
    let b = p.bounds();
    assert!(b.cy + b.half_h < f.base_y());
}

// ── Aabb ──────────────────────────────────────────────────────────────────────

#[test]
fn aabb_overlap() {
    let a = Aabb::centered(0.0, 0.0, 10.0, 10.0);
    let b = Aabb::centered(8.0, 8.0, 10.0, 10.0);
    assert!(a.overlaps(&b));
    assert!(b.overlaps(&a));
}

#[test]
fn aabb_touching_edges_do_not_overlap() {
    let a = Aabb::centered(0.0, 0.0, 10.0, 10.0);
    let b = Aabb::centered(10.0, 0.0, 10.0, 10.0);
    assert!(!a.overlaps(&b));
}

#[test]
fn aabb_from_top_left_matches_centered() {
    let a = Aabb::from_top_left(10.0, 20.0, 30.0, 40.0);
    assert_eq!(a, Aabb::centered(25.0, 40.0, 30.0, 40.0));
}

#[test]
fn building_geometry() {
    let b = Building { x: 100.0, y: 530.0, width: 40.0, height: 40.0, color: 1 };
    assert_eq!(b.center(), (120.0, 550.0));
    assert_eq!(b.right(), 140.0);
    assert_eq!(b.bounds(), Aabb::centered(120.0, 550.0, 40.0, 40.0));
}

// ── Aliens & effects ──────────────────────────────────────────────────────────

#[test]
fn alien_kind_phantom_check() {
    assert!(!AlienKind::Normal.is_phantom());
    assert!(!AlienKind::Tough.is_phantom());
    assert!(AlienKind::Phantom { from_left: false }.is_phantom());
    assert_ne!(
        AlienKind::Phantom { from_left: true },
        AlienKind::Phantom { from_left: false }
    );
}

#[test]
fn explosion_fades_at_max_age() {
    let mut e = Explosion { x: 0.0, y: 0.0, age: 19, max_age: 20, alpha: 0.05 };
    assert!(!e.is_faded());
    e.age = 20;
    e.alpha = 0.0;
    assert!(e.is_faded());
}

// ── Controls ──────────────────────────────────────────────────────────────────

#[test]
fn controls_set_and_release() {
    let mut c = Controls::default();
    c.set(Direction::Left, true);
    c.set(Direction::Down, true);
    assert!(c.left && c.down);
    assert!(!c.right && !c.up && !c.fire);
    c.set(Direction::Left, false);
    assert!(!c.left);
}

// ── GameState ─────────────────────────────────────────────────────────────────

#[test]
fn phantom_lookup() {
    let mut s = empty_state();
    assert!(s.phantom().is_none());
    assert_eq!(s.phantom_count(), 0);
    s.aliens.push(phantom());
    assert_eq!(s.phantom().map(|p| p.hp), Some(3));
    assert_eq!(s.phantom_count(), 1);
}

#[test]
fn status_helpers() {
    let mut s = empty_state();
    s.status = GameStatus::TitleScreen;
    assert!(!s.is_started());
    s.status = GameStatus::GameOverPending;
    assert!(s.is_started());
    assert!(!s.is_game_over());
    s.status = GameStatus::GameOver;
    assert!(s.is_game_over());
}

#[test]
fn game_state_clone_is_independent() {
    let original = empty_state();
    let mut cloned = original.clone();

    // Mutating the clone must not affect the original
    cloned.player.x = 99.0;
    cloned.score = 999;
    cloned.aliens.push(phantom());
    cloned.explosions.spawn(1.0, 1.0);

    assert_eq!(original.player.x, 400.0);
    assert_eq!(original.score, 0);
    assert!(original.aliens.is_empty());
    assert!(original.explosions.is_empty());
}
