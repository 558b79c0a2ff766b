//! Pairwise collision detection and response
//!
//! One sweep per step over every unordered pair, in store order. Same-tier
//! contacts merge; everything else gets an elastic exchange along the line of
//! centers plus a positional separation. A trailing pass re-clamps every ball
//! against the side walls, catching boundary violations the pair responses
//! introduced within the same step.

use glam::Vec2;

use super::merge;
use super::state::{Ball, GameEvent, GameState};
use crate::consts::WALL_DAMPING;

/// Run the collision sweep for one step.
///
/// The pair list is fixed by the ball count at entry: balls created by merges
/// are appended after the sweep and are not re-examined until the next step.
/// Consumed balls stay in place (flagged `merging`) until the sweep finishes,
/// so every pair is visited exactly once.
pub fn resolve_collisions(state: &mut GameState) {
    let n = state.balls.len();
    let mut spawned: Vec<Ball> = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            if state.balls[i].merging || state.balls[j].merging {
                continue;
            }
            let delta = state.balls[j].pos - state.balls[i].pos;
            let dist = delta.length();
            if dist >= state.balls[i].radius() + state.balls[j].radius() {
                continue;
            }

            if state.balls[i].tier == state.balls[j].tier {
                let id = state.next_entity_id();
                let (consumed_a, consumed_b) = (state.balls[i].id, state.balls[j].id);
                let merged = merge::consume_pair(&mut state.balls, i, j, id);
                let score_delta = merge::score_value(merged.tier);
                state.score += score_delta;
                state.best_tier = state.best_tier.max(merged.tier);
                state.push_event(GameEvent::BallRemoved { id: consumed_a });
                state.push_event(GameEvent::BallRemoved { id: consumed_b });
                state.push_event(GameEvent::BallsMerged {
                    id: merged.id,
                    tier: merged.tier,
                    pos: merged.pos,
                    score_delta,
                });
                spawned.push(merged);
            } else {
                let (a, b) = pair_mut(&mut state.balls, i, j);
                elastic_response(a, b);
            }
        }
    }

    state.balls.retain(|b| !b.merging);
    // Appended before the wall pass: a midpoint spawn can sit inside the
    // wall margin of its larger radius and needs the same correction.
    state.balls.append(&mut spawned);

    for ball in &mut state.balls {
        reclamp_walls(ball, state.width);
    }
}

/// Elastic exchange between two overlapping balls of different tiers.
///
/// Velocities are rotated into the collision-axis frame, exchanged with the
/// 1-D formula, and rotated back. Pseudo-mass is the ball diameter
/// (`2 * radius`); the game was balanced around this exchange, which is not
/// exact momentum conservation. Both balls are pushed apart by half the
/// overlap and woken.
pub fn elastic_response(a: &mut Ball, b: &mut Ball) {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    let angle = delta.y.atan2(delta.x);
    let (sin, cos) = angle.sin_cos();

    // Rotate velocities into the collision axis frame
    let va = Vec2::new(
        a.vel.x * cos + a.vel.y * sin,
        a.vel.y * cos - a.vel.x * sin,
    );
    let vb = Vec2::new(
        b.vel.x * cos + b.vel.y * sin,
        b.vel.y * cos - b.vel.x * sin,
    );

    let ma = a.radius() * 2.0;
    let mb = b.radius() * 2.0;
    let fa = ((ma - mb) * va.x + mb * vb.x * 2.0) / (ma + mb);
    let fb = (ma * va.x * 2.0 + (mb - ma) * vb.x) / (ma + mb);

    // Rotate back to the world frame
    a.vel = Vec2::new(fa * cos - va.y * sin, va.y * cos + fa * sin);
    b.vel = Vec2::new(fb * cos - vb.y * sin, vb.y * cos + fb * sin);

    // Separate along the collision axis to stop interpenetration
    let overlap = (a.radius() + b.radius() - dist) / 2.0;
    let push = Vec2::new(overlap * cos, overlap * sin);
    a.pos -= push;
    b.pos += push;

    // A collision always wakes resting balls
    a.resting = false;
    b.resting = false;
}

/// Side-wall correction applied to every ball after the pair sweep.
///
/// Unlike the integrator's bounce, the reflected velocity always points away
/// from the wall regardless of the incoming sign.
pub fn reclamp_walls(ball: &mut Ball, width: f32) {
    let r = ball.radius();
    if ball.pos.x - r < 0.0 {
        ball.pos.x = r;
        ball.vel.x = ball.vel.x.abs() * WALL_DAMPING;
    } else if ball.pos.x + r > width {
        ball.pos.x = width - r;
        ball.vel.x = -ball.vel.x.abs() * WALL_DAMPING;
    }
}

fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    debug_assert!(i < j);
    let (head, tail) = balls.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball(id: u32, x: f32, y: f32, tier: u8) -> Ball {
        Ball::new(id, Vec2::new(x, y), tier)
    }

    #[test]
    fn head_on_exchange_matches_known_numbers() {
        // tier 0 (r=30, m=60) moving right meets tier 1 (r=42, m=84)
        // moving left along the x axis; the axis frame is the world frame.
        let mut a = ball(1, 100.0, 100.0, 0);
        a.vel = Vec2::new(5.0, 0.0);
        let mut b = ball(2, 150.0, 100.0, 1);
        b.vel = Vec2::new(-3.0, 0.0);

        elastic_response(&mut a, &mut b);

        // ((60-84)*5 + 84*-3*2) / 144 and (60*5*2 + (84-60)*-3) / 144
        assert!((a.vel.x - (-624.0 / 144.0)).abs() < 1e-4);
        assert!((b.vel.x - (528.0 / 144.0)).abs() < 1e-4);
        assert!(a.vel.y.abs() < 1e-6);
        assert!(b.vel.y.abs() < 1e-6);

        // Overlap (72 - 50) split evenly
        assert!((a.pos.x - 89.0).abs() < 1e-4);
        assert!((b.pos.x - 161.0).abs() < 1e-4);
    }

    #[test]
    fn collision_wakes_resting_balls() {
        let mut a = ball(1, 100.0, 100.0, 0);
        a.resting = true;
        let mut b = ball(2, 140.0, 100.0, 1);
        b.resting = true;

        elastic_response(&mut a, &mut b);
        assert!(!a.resting);
        assert!(!b.resting);
    }

    #[test]
    fn vertical_contact_exchanges_along_y() {
        let mut a = ball(1, 100.0, 100.0, 0);
        let mut b = ball(2, 100.0, 150.0, 1);
        b.vel = Vec2::new(0.0, -4.0);

        elastic_response(&mut a, &mut b);
        // Axis is vertical: x velocities stay zero, a is knocked upward
        assert!(a.vel.x.abs() < 1e-4);
        assert!(b.vel.x.abs() < 1e-4);
        assert!(a.vel.y < 0.0);
        // Separation is purely vertical
        assert!((a.pos.x - 100.0).abs() < 1e-4);
        assert!(a.pos.y < 100.0);
        assert!(b.pos.y > 150.0);
    }

    #[test]
    fn reclamp_pushes_away_from_left_wall() {
        let mut b = ball(1, 6.0, 100.0, 0);
        b.vel = Vec2::new(-2.0, 0.0);
        reclamp_walls(&mut b, 800.0);
        assert_eq!(b.pos.x, b.radius());
        assert!((b.vel.x - 2.0 * WALL_DAMPING).abs() < 1e-6);
    }

    #[test]
    fn reclamp_pushes_away_from_right_wall() {
        let mut b = ball(1, 795.0, 100.0, 0);
        b.vel = Vec2::new(3.0, 0.0);
        reclamp_walls(&mut b, 800.0);
        assert_eq!(b.pos.x, 800.0 - b.radius());
        assert!((b.vel.x - (-3.0 * WALL_DAMPING)).abs() < 1e-6);
    }

    #[test]
    fn reclamp_leaves_interior_balls_alone() {
        let mut b = ball(1, 400.0, 100.0, 0);
        b.vel = Vec2::new(1.0, 2.0);
        reclamp_walls(&mut b, 800.0);
        assert_eq!(b.pos, Vec2::new(400.0, 100.0));
        assert_eq!(b.vel, Vec2::new(1.0, 2.0));
    }
}
