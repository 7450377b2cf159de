//! Ranking comparators.
//!
//! A comparator defines the total order used to rank IV combinations.
//! `Ordering::Less` means the first argument ranks better.

use crate::optimizer::PvpStat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Strategy deciding which of two stats ranks higher.
///
/// Any `Fn(&PvpStat, &PvpStat) -> Ordering` closure is a comparator.
///
/// # Examples
///
/// ```rust
/// use pvprank::comparator::{RankingComparator, StandardComparator};
/// use pvprank::PvpStat;
/// use std::cmp::Ordering;
///
/// let a = PvpStat { attack: 120.0, value: 2000.0, level: 20.0, cp: 1490 };
/// let b = PvpStat { attack: 110.0, value: 1900.0, level: 21.0, cp: 1495 };
/// assert_eq!(StandardComparator::Default.compare(&a, &b), Ordering::Less);
/// ```
pub trait RankingComparator: Send + Sync {
    /// Compare two stats; `Less` means `a` ranks ahead of `b`.
    fn compare(&self, a: &PvpStat, b: &PvpStat) -> Ordering;
}

impl<F> RankingComparator for F
where
    F: Fn(&PvpStat, &PvpStat) -> Ordering + Send + Sync,
{
    fn compare(&self, a: &PvpStat, b: &PvpStat) -> Ordering {
        self(a, b)
    }
}

/// The built-in comparators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardComparator {
    /// Stat product descending, then attack descending.
    ///
    /// Higher attack wins charge move priority ties.
    #[default]
    Default,
    /// The default order, then CP descending.
    PreferHigherCp,
    /// The default order, then CP ascending.
    PreferLowerCp,
}

impl RankingComparator for StandardComparator {
    fn compare(&self, a: &PvpStat, b: &PvpStat) -> Ordering {
        let base = b
            .value
            .total_cmp(&a.value)
            .then_with(|| b.attack.total_cmp(&a.attack));
        match self {
            StandardComparator::Default => base,
            StandardComparator::PreferHigherCp => base.then_with(|| b.cp.cmp(&a.cp)),
            StandardComparator::PreferLowerCp => base.then_with(|| a.cp.cmp(&b.cp)),
        }
    }
}
