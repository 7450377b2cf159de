//! Combination ranking.
//!
//! Every IV triple of a species is evaluated at its optimal level under a
//! CP cap and level cap, sorted with a [`RankingComparator`], and given a
//! dense rank: tied entries share a rank and the next distinct entry takes
//! its 1-based position.
//!
//! Two representations are produced:
//!
//! - [`FullRanking`] keeps the complete [`RankResult`] for every triple.
//! - [`CompactRanking`] keeps only rank numbers, addressed by
//!   [`IvSet::index`], and recomputes everything else on demand.

use crate::comparator::RankingComparator;
use crate::optimizer::{calculate_pvp_stat, PvpStat};
use crate::stats::{BaseStats, IvSet, IV_COMBINATIONS};
use log::trace;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How ranked combinations are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// Keep value, level, CP, rank and percentage for every triple.
    Full,
    /// Keep only rank numbers and the best value.
    Compact,
}

/// The ranked result of one IV triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankResult {
    pub value: f64,
    pub level: f64,
    pub cp: u32,
    pub rank: u16,
    /// `value / best value`, rounded to 5 decimals.
    pub percentage: f64,
}

/// An IV triple together with its optimal stats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedStat {
    pub ivs: IvSet,
    pub stat: PvpStat,
}

/// Round a ratio to 5 decimal places.
///
/// Rounding works on the exact decimal expansion of the ratio, so a ratio
/// stored just below a half step rounds down.
pub fn round_percentage(value: f64, best: f64) -> f64 {
    let ratio = value / best;
    format!("{:.5}", ratio).parse().unwrap_or(ratio)
}

/// Ranking with full per-triple results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullRanking {
    /// Results addressed by [`IvSet::index`]; `None` when not viable.
    combinations: Vec<Option<RankResult>>,
    /// Viable triples, best first.
    sorted: Vec<IvSet>,
}

impl FullRanking {
    /// Look up the result of one IV triple.
    pub fn get(&self, ivs: IvSet) -> Option<&RankResult> {
        self.combinations[ivs.index()].as_ref()
    }

    /// Iterate over viable triples from best to worst.
    pub fn sorted(&self) -> impl Iterator<Item = (IvSet, &RankResult)> + '_ {
        self.sorted
            .iter()
            .filter_map(move |&ivs| self.get(ivs).map(|result| (ivs, result)))
    }

    /// The highest stat product, if any triple is viable.
    pub fn best_value(&self) -> Option<f64> {
        self.sorted
            .first()
            .and_then(|&ivs| self.get(ivs))
            .map(|result| result.value)
    }
}

/// Ranking with rank numbers only, plus the sorted stats it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactRanking {
    /// Rank per [`IvSet::index`]; 0 for triples outside the lattice or not viable.
    pub ranks: Vec<u16>,
    /// Viable triples with their stats, best first.
    pub sorted: Vec<RankedStat>,
}

impl CompactRanking {
    /// The highest stat product, if any triple is viable.
    pub fn best_value(&self) -> Option<f64> {
        self.sorted.first().map(|entry| entry.stat.value)
    }

    /// Drop the sorted list, keeping what a cache needs.
    pub fn into_table(self) -> CompactRanks {
        let best_value = self.best_value().unwrap_or(0.0);
        CompactRanks {
            ranks: self.ranks,
            best_value,
        }
    }
}

/// The storable part of a [`CompactRanking`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactRanks {
    ranks: Vec<u16>,
    best_value: f64,
}

impl CompactRanks {
    /// Rank of one IV triple, `None` when it was not ranked.
    pub fn rank(&self, ivs: IvSet) -> Option<u16> {
        match self.ranks[ivs.index()] {
            0 => None,
            rank => Some(rank),
        }
    }

    pub fn best_value(&self) -> f64 {
        self.best_value
    }
}

/// Rankings for one level cap in either storage shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Combinations {
    Full(FullRanking),
    Compact(CompactRanks),
}

impl Combinations {
    /// Rank every IV triple and keep the result in the requested shape.
    pub fn compute(
        stats: &BaseStats,
        cp_cap: u32,
        level_cap: f64,
        comparator: &dyn RankingComparator,
        mode: StorageMode,
    ) -> Self {
        match mode {
            StorageMode::Full => {
                Combinations::Full(calculate_ranks(stats, cp_cap, level_cap, comparator))
            }
            StorageMode::Compact => Combinations::Compact(
                calculate_ranks_compact(stats, cp_cap, level_cap, comparator, 0).into_table(),
            ),
        }
    }

    pub fn mode(&self) -> StorageMode {
        match self {
            Combinations::Full(_) => StorageMode::Full,
            Combinations::Compact(_) => StorageMode::Compact,
        }
    }
}

/// Rankings of one `(base stats, CP cap)` pair across ascending level caps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationIndex {
    entries: Vec<(f64, Combinations)>,
}

impl CombinationIndex {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, level_cap: f64, combinations: Combinations) {
        debug_assert!(self.entries.last().map_or(true, |(cap, _)| *cap < level_cap));
        self.entries.push((level_cap, combinations));
    }

    /// Iterate over `(level cap, combinations)` in ascending level cap order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &Combinations)> + '_ {
        self.entries.iter().map(|(cap, combinations)| (*cap, combinations))
    }

    /// Rankings for one level cap.
    pub fn get(&self, level_cap: f64) -> Option<&Combinations> {
        self.entries
            .iter()
            .find(|(cap, _)| *cap == level_cap)
            .map(|(_, combinations)| combinations)
    }

    pub fn level_caps(&self) -> Vec<f64> {
        self.entries.iter().map(|(cap, _)| *cap).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walk a sorted list and assign dense ranks.
///
/// `j` tracks the first entry of the current tie group.
fn dense_ranks<T>(
    sorted: &[T],
    stat: impl Fn(&T) -> &PvpStat,
    comparator: &dyn RankingComparator,
) -> Vec<u16> {
    let mut ranks = Vec::with_capacity(sorted.len());
    let mut j = 0;
    for (i, entry) in sorted.iter().enumerate() {
        if comparator.compare(stat(&sorted[j]), stat(entry)) == Ordering::Less {
            j = i;
        }
        ranks.push((j + 1) as u16);
    }
    ranks
}

fn collect_stats(stats: &BaseStats, cp_cap: u32, level_cap: f64, iv_floor: u8) -> Vec<RankedStat> {
    IvSet::lattice(iv_floor)
        .filter_map(|ivs| {
            calculate_pvp_stat(stats, ivs, cp_cap, level_cap, 1.0).map(|stat| RankedStat { ivs, stat })
        })
        .collect()
}

/// Rank the full IV lattice, keeping every result.
///
/// The sort is stable, so entries the comparator considers equal stay in
/// lattice order.
///
/// # Examples
///
/// ```rust
/// use pvprank::comparator::StandardComparator;
/// use pvprank::ranking::calculate_ranks;
/// use pvprank::{BaseStats, IvSet};
///
/// let raichu = BaseStats::new(193.0, 151.0, 155.0);
/// let ranking = calculate_ranks(&raichu, 1500, 40.0, &StandardComparator::Default);
/// assert_eq!(ranking.get(IvSet::uniform(15)).unwrap().rank, 742);
/// ```
pub fn calculate_ranks(
    stats: &BaseStats,
    cp_cap: u32,
    level_cap: f64,
    comparator: &dyn RankingComparator,
) -> FullRanking {
    trace!(
        "ranking {:?} at cp cap {} level cap {} (full)",
        stats,
        cp_cap,
        level_cap
    );
    let mut sorted = collect_stats(stats, cp_cap, level_cap, 0);
    sorted.sort_by(|a, b| comparator.compare(&a.stat, &b.stat));
    let ranks = dense_ranks(&sorted, |entry| &entry.stat, comparator);
    let best = sorted.first().map(|entry| entry.stat.value);

    let mut combinations = vec![None; IV_COMBINATIONS];
    for (entry, rank) in sorted.iter().zip(ranks) {
        let percentage = best.map_or(0.0, |best| round_percentage(entry.stat.value, best));
        combinations[entry.ivs.index()] = Some(RankResult {
            value: entry.stat.value,
            level: entry.stat.level,
            cp: entry.stat.cp,
            rank,
            percentage,
        });
    }

    FullRanking {
        combinations,
        sorted: sorted.into_iter().map(|entry| entry.ivs).collect(),
    }
}

/// Rank `[iv_floor, 15]^3`, keeping only rank numbers.
///
/// Ties under the comparator are broken by lattice index, so the order is
/// total regardless of sort stability.
pub fn calculate_ranks_compact(
    stats: &BaseStats,
    cp_cap: u32,
    level_cap: f64,
    comparator: &dyn RankingComparator,
    iv_floor: u8,
) -> CompactRanking {
    trace!(
        "ranking {:?} at cp cap {} level cap {} (compact, floor {})",
        stats,
        cp_cap,
        level_cap,
        iv_floor
    );
    let mut sorted = collect_stats(stats, cp_cap, level_cap, iv_floor);
    sorted.sort_unstable_by(|a, b| {
        comparator
            .compare(&a.stat, &b.stat)
            .then_with(|| a.ivs.index().cmp(&b.ivs.index()))
    });
    let mut ranks = vec![0; IV_COMBINATIONS];
    for (entry, rank) in sorted
        .iter()
        .zip(dense_ranks(&sorted, |entry| &entry.stat, comparator))
    {
        ranks[entry.ivs.index()] = rank;
    }
    CompactRanking { ranks, sorted }
}
