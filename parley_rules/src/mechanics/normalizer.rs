//! Stat normalization - turns a raw proposal into a delta that is safe to apply.
//!
//! The rules, in order:
//! 1. **Polarity**: a success never raises resistance or lowers relationship,
//!    a failure never does the opposite. Wrong-way components become 0.
//! 2. **Swing**: clean outcomes move each stat at most `full_swing`, partial
//!    outcomes at most `partial_swing`.
//! 3. **Bounds**: resistance stays inside `[resistance_floor,
//!    resistance_ceiling]`. Overshoot is absorbed, never carried over.

use super::{Outcome, RawDelta, StatDelta};
use crate::config::RulesConfig;
use crate::entities::PersuasionStats;

/// Compute the delta to apply for one turn. Pure.
pub fn normalize_deltas(
    stats: PersuasionStats,
    outcome: Outcome,
    raw: RawDelta,
    config: &RulesConfig,
) -> StatDelta {
    let (resistance, relationship) = match outcome {
        Outcome::Success => (raw.resistance.min(0), raw.relationship.max(0)),
        Outcome::Failure => (raw.resistance.max(0), raw.relationship.min(0)),
        Outcome::Partial => (raw.resistance, raw.relationship),
    };

    if (resistance, relationship) != (raw.resistance, raw.relationship) {
        tracing::debug!(
            %outcome,
            raw_resistance = raw.resistance,
            raw_relationship = raw.relationship,
            "corrected delta polarity"
        );
    }

    let swing = match outcome {
        Outcome::Partial => config.partial_swing,
        Outcome::Success | Outcome::Failure => config.full_swing,
    }
    .max(0);
    let resistance = resistance.clamp(-swing, swing);
    let relationship = relationship.clamp(-swing, swing);

    let current = i64::from(stats.resistance);
    let target = (current + i64::from(resistance))
        .max(i64::from(config.resistance_floor))
        .min(i64::from(config.resistance_ceiling));
    let resistance = (target - current) as i32;
    // Out-of-range starting stats must not make the bound clamp flip polarity.
    let resistance = match outcome {
        Outcome::Success => resistance.min(0),
        Outcome::Failure => resistance.max(0),
        Outcome::Partial => resistance,
    };

    let relationship = stats.relationship.saturating_add(relationship) - stats.relationship;

    StatDelta::new(resistance, relationship)
}
