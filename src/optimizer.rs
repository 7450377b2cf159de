//! Level optimizer.
//!
//! Finds the highest half-level at which an IV triple stays under a CP cap.
//! CP never decreases as level increases, so a binary search over the
//! half-level domain is exact.

use crate::cpm::calculate_cp_multiplier;
use crate::stats::{attack_product, calculate_cp, BaseStats, IvSet};
use serde::{Deserialize, Serialize};

/// Stats of an IV triple at its optimal level under a CP cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PvpStat {
    /// Effective attack stat at `level`.
    pub attack: f64,
    /// Stat product at `level`.
    pub value: f64,
    /// Highest level not exceeding the CP cap.
    pub level: f64,
    /// CP at `level`.
    pub cp: u32,
}

/// Find the best level for `ivs` in `[min_level, level_cap]` under `cp_cap`.
///
/// Returns `None` when the CP at `min_level` already exceeds the cap.
///
/// # Examples
///
/// ```rust
/// use pvprank::{calculate_pvp_stat, BaseStats, IvSet};
///
/// let raichu = BaseStats::new(193.0, 151.0, 155.0);
/// let stat = calculate_pvp_stat(&raichu, IvSet::uniform(15), 1500, 40.0, 1.0).unwrap();
/// assert!(stat.cp <= 1500);
/// assert!(stat.level <= 40.0);
/// ```
pub fn calculate_pvp_stat(
    stats: &BaseStats,
    ivs: IvSet,
    cp_cap: u32,
    level_cap: f64,
    min_level: f64,
) -> Option<PvpStat> {
    let mut best_cp = calculate_cp(stats, ivs, min_level);
    if best_cp > cp_cap {
        return None;
    }
    let mut lowest = min_level;
    let mut highest = level_cap;
    while lowest < highest {
        let mid = (lowest + highest).ceil() / 2.0;
        let cp = calculate_cp(stats, ivs, mid);
        if cp <= cp_cap {
            lowest = mid;
            best_cp = cp;
        } else {
            highest = mid - 0.5;
        }
    }
    let multiplier = calculate_cp_multiplier(lowest);
    let attack = (stats.attack + ivs.attack as f64) * multiplier;
    Some(PvpStat {
        attack,
        value: attack_product(attack, stats, ivs, multiplier, lowest),
        level: lowest,
        cp: best_cp,
    })
}
