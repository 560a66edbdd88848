//! Posts and comments are ranked by a time-decayed "hot" score: every vote beyond the author's
//! own raises the score, and the score falls off polynomially with age.

use tendermint::Time;

/// How quickly scores decay with age.
pub const GRAVITY: f64 = 1.8;

/// Hours are measured in this many seconds.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// The hot score of an item with `upvotes` votes, created at `created_at`, as of `now`.
///
/// The author's automatic self-vote contributes nothing, so an item nobody else voted for scores
/// exactly zero. Items stamped in the future are treated as brand new.
pub fn score(upvotes: i64, created_at: Time, now: Time) -> f64 {
    let age_seconds = now
        .duration_since(created_at)
        .map(|age| age.as_secs_f64())
        .unwrap_or(0.0);
    (upvotes - 1) as f64 / (age_seconds * SECONDS_PER_HOUR + 2.0).powf(GRAVITY)
}
