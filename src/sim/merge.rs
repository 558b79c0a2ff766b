//! Merging two same-tier balls into one of the next tier

use crate::consts::{MAX_TIER, MERGE_SCORE_STEP};

use super::state::Ball;

/// Consume the same-tier pair at `i`, `j` and build their replacement.
///
/// Both source balls are flagged `merging` immediately so no later pair in
/// the current sweep can touch them; the caller removes them after the sweep.
/// The replacement sits at the pair's midpoint with their averaged velocity,
/// one tier up. At the top tier the result saturates: a tier-8 pair still
/// merges into a single tier-8 ball.
pub fn consume_pair(balls: &mut [Ball], i: usize, j: usize, id: u32) -> Ball {
    balls[i].merging = true;
    balls[j].merging = true;
    let (a, b) = (&balls[i], &balls[j]);
    let mut merged = Ball::new(id, (a.pos + b.pos) / 2.0, (a.tier + 1).min(MAX_TIER));
    merged.vel = (a.vel + b.vel) / 2.0;
    merged
}

/// Score awarded for creating a ball of the given tier
#[inline]
pub fn score_value(tier: u8) -> u64 {
    tier as u64 * MERGE_SCORE_STEP
}
