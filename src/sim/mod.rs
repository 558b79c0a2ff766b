//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One `step` call advances exactly one simulation step; no wall-clock time
//! - Seeded RNG only (the tier queue)
//! - Stable iteration order (store insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod merge;
pub mod state;
pub mod tick;

pub use collision::{elastic_response, reclamp_walls, resolve_collisions};
pub use state::{Ball, GameEvent, GamePhase, GameState};
pub use tick::step;
