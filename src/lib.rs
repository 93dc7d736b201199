//! Galactic Invaders: a deterministic, frame-driven arcade simulation.
//!
//! The engine is a set of pure functions over [`entities::GameState`]:
//! front-ends queue [`entities::Intent`]s, call [`compute::step`] once per
//! frame, and read the resulting state and [`entities::GameEvent`]s.

pub mod compute;
pub mod constants;
pub mod entities;
pub mod error;
pub mod pool;
pub mod rules;
pub mod spawn;

pub use error::{FieldError, RulesError};
pub use rules::Rules;
