//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod formation;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use formation::{Formation, spawn_wave};
pub use state::{
    Bullet, Enemy, EnemyKind, Explosion, GameOutcome, GamePhase, GameState, LEVELS, LevelSpec,
    Particle, Player,
};
pub use tick::{TickInput, tick};
