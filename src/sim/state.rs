//! Game state and core simulation types
//!
//! The entity store owns every ball exclusively; the renderer and driver only
//! ever see positions and the event stream.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::tier_radius;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the player to press start
    Ready,
    /// Active gameplay
    Playing,
    /// Simulation frozen, preview hidden
    Paused,
    /// A tier-8 ball exists; no further steps are processed
    Won,
}

/// A ball entity
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Size rank in `[0, MAX_TIER]`; radius is derived from this, never stored
    pub tier: u8,
    /// Set once speed decays below the rest threshold at the floor;
    /// resting balls skip integration until a collision wakes them
    pub resting: bool,
    /// Set for the step in which the ball is consumed by a merge;
    /// excludes it from every later pair in the same sweep
    pub merging: bool,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, tier: u8) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            tier,
            resting: false,
            merging: false,
        }
    }

    /// Radius is a pure function of tier
    #[inline]
    pub fn radius(&self) -> f32 {
        tier_radius(self.tier)
    }
}

/// Facts the UI needs to render, emitted by the core and drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A ball was placed by the player
    BallSpawned { id: u32, tier: u8, pos: Vec2 },
    /// A surviving ball ended the step at a new position
    BallMoved { id: u32, pos: Vec2 },
    /// A ball was consumed by a merge
    BallRemoved { id: u32 },
    /// Two same-tier balls became this one; carries the score awarded
    BallsMerged {
        id: u32,
        tier: u8,
        pos: Vec2,
        score_delta: u64,
    },
    /// A tier-8 ball exists; the run is over
    GameWon { score: u64 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed, kept for logging
    pub seed: u64,
    /// Playable rectangle
    pub width: f32,
    pub height: f32,
    pub score: u64,
    /// Highest tier created this run (feeds the leaderboard)
    pub best_tier: u8,
    pub phase: GamePhase,
    /// Live balls, in insertion order; collision sweeps rely on this order
    pub balls: Vec<Ball>,
    /// Tier the next placement will drop; the UI previews this
    pub next_tier: u8,
    /// Pending output events, drained by the driver each frame
    events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a fresh game over the given playable rectangle.
    ///
    /// The first queued tier is drawn from a narrower range than later ones.
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let next_tier = rng.random_range(0..FIRST_DROP_TIERS);
        Self {
            seed,
            width,
            height,
            score: 0,
            best_tier: 0,
            phase: GamePhase::Ready,
            balls: Vec::new(),
            next_tier,
            events: Vec::new(),
            rng,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Begin play from the ready screen
    pub fn start(&mut self) {
        if self.phase == GamePhase::Ready {
            self.phase = GamePhase::Playing;
        }
    }

    /// Freeze or resume the simulation
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
    }

    /// Drop a ball of the queued tier at horizontal position `x`.
    ///
    /// `x` is clamped into the drop margin rather than rejected. Returns the
    /// new ball's ID, or `None` outside active play. Afterwards the queued
    /// tier is redrawn from the wider post-first-drop range.
    pub fn place(&mut self, x: f32) -> Option<u32> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        let tier = self.next_tier;
        let x = x.max(DROP_MARGIN).min(self.width - DROP_MARGIN);
        let pos = Vec2::new(x, tier_radius(tier) + DROP_LINE_OFFSET);
        let id = self.next_entity_id();
        self.balls.push(Ball::new(id, pos, tier));
        self.events.push(GameEvent::BallSpawned { id, tier, pos });
        self.next_tier = self.rng.random_range(0..LATER_DROP_TIERS);
        Some(id)
    }

    /// Change the playable rectangle and pull every ball back in range.
    ///
    /// Non-positive dimensions are rejected rather than corrupting positions.
    pub fn resize(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::warn!("ignoring resize to {width}x{height}");
            return;
        }
        self.width = width;
        self.height = height;
        for ball in &mut self.balls {
            let r = ball.radius();
            ball.pos.x = ball.pos.x.max(r).min(width - r);
            // A resting ball below a raised floor would never integrate again
            if ball.pos.y + r > height {
                ball.pos.y = height - r;
            }
        }
    }

    /// Take the events accumulated since the last drain
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
