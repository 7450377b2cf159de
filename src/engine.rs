//! Rank engine.
//!
//! Provides [`PvpRanker`], the main entry point. It owns the configured
//! leagues and level caps, a comparator, a rank cache and the species
//! catalog, and answers two kinds of query:
//!
//! - [`PvpRanker::query_pvp_rank`] ranks one IV triple of a species and
//!   everything it can evolve into, in every league.
//! - [`PvpRanker::calculate_top_ranks`] lists the best IV triples of one
//!   species in every league.

use crate::cache::{CacheKey, CachedIndex, RankCache};
use crate::catalog::{Catalog, Evolution, FormView, Pokemon};
use crate::comparator::RankingComparator;
use crate::config::RankerConfig;
use crate::cpm::MAX_LEVEL;
use crate::entry::{RankEntry, TopRankEntry};
use crate::error::RankError;
use crate::league::League;
use crate::optimizer::calculate_pvp_stat;
use crate::ranking::{
    calculate_ranks_compact, round_percentage, CombinationIndex, Combinations, StorageMode,
};
use crate::stats::{calculate_cp, calculate_hp, stat_product, BaseStats, IvSet, MAX_IV};
use log::{debug, info, trace};
use std::collections::HashMap;
use std::sync::Arc;

/// Evolution chains deeper than this are treated as malformed.
pub const MAX_EVOLUTION_DEPTH: usize = 16;

/// Species whose evolution depends on which IV is highest.
const HITMONLEE: u32 = 106;
const HITMONCHAN: u32 = 107;
const HITMONTOP: u32 = 237;

/// A validated rank query.
///
/// # Examples
///
/// ```rust
/// use pvprank::RankQuery;
///
/// let query = RankQuery::new(605, 1, 4, 12, 7.0).unwrap().with_form(0);
/// assert_eq!(query.ivs.stamina, 12);
/// assert!(RankQuery::new(605, 16, 4, 12, 7.0).is_err());
/// assert!(RankQuery::new(605, 1, 4, 12, 0.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankQuery {
    pub pokemon: u32,
    pub form: u32,
    pub costume: u32,
    pub gender: u32,
    pub ivs: IvSet,
    /// Current level of the queried pokemon.
    pub level: f64,
}

impl RankQuery {
    /// Create a query for a species with form, costume and gender 0.
    ///
    /// # Arguments
    ///
    /// * `pokemon` - Species id
    /// * `attack`, `defense`, `stamina` - IVs, each between 0 and 15
    /// * `level` - Current level, at least 1
    ///
    /// # Returns
    ///
    /// * `Ok(RankQuery)` - The validated query
    /// * `Err(RankError::IvOutOfRange)` - If an IV is out of range
    /// * `Err(RankError::InvalidLevel)` - If the level is below 1 or not finite
    pub fn new(pokemon: u32, attack: i64, defense: i64, stamina: i64, level: f64) -> Result<Self, RankError> {
        let query = Self {
            pokemon,
            form: 0,
            costume: 0,
            gender: 0,
            ivs: IvSet::new(attack, defense, stamina)?,
            level,
        };
        query.validate()?;
        Ok(query)
    }

    /// Set the form id. Form 0 means the species' base record.
    pub fn with_form(mut self, form: u32) -> Self {
        self.form = form;
        self
    }

    /// Set the costume id. Evolution-locked costumes stop evolutions.
    pub fn with_costume(mut self, costume: u32) -> Self {
        self.costume = costume;
        self
    }

    /// Set the gender id checked against gender-restricted evolutions.
    pub fn with_gender(mut self, gender: u32) -> Self {
        self.gender = gender;
        self
    }

    fn validate(&self) -> Result<(), RankError> {
        IvSet::new(
            self.ivs.attack.into(),
            self.ivs.defense.into(),
            self.ivs.stamina.into(),
        )?;
        if !self.level.is_finite() || self.level < 1.0 {
            return Err(RankError::InvalidLevel(self.level));
        }
        Ok(())
    }
}

/// What combination indexes are built from.
struct RankSettings {
    level_caps: Vec<f64>,
    remove_unviable: bool,
    comparator: Box<dyn RankingComparator>,
    mode: StorageMode,
}

impl RankSettings {
    /// Whether even a perfect triple stays at or under `cp_cap` at `level_cap`.
    fn is_unviable(&self, stats: &BaseStats, cp_cap: u32, level_cap: f64) -> bool {
        self.remove_unviable && calculate_cp(stats, IvSet::uniform(MAX_IV), level_cap) <= cp_cap
    }

    fn build_index(&self, stats: &BaseStats, cp_cap: u32) -> Option<CombinationIndex> {
        let mut index = CombinationIndex::new();
        let mut maxed = false;
        for &level_cap in &self.level_caps {
            if self.is_unviable(stats, cp_cap, level_cap) {
                continue;
            }
            index.push(
                level_cap,
                Combinations::compute(stats, cp_cap, level_cap, self.comparator.as_ref(), self.mode),
            );
            // every triple already stops below the next half level
            if calculate_cp(stats, IvSet::uniform(0), level_cap + 0.5) > cp_cap {
                maxed = true;
                break;
            }
        }
        if index.is_empty() {
            return None;
        }
        let below_max = index.level_caps().last().map_or(false, |&cap| cap < MAX_LEVEL);
        if !maxed && below_max {
            index.push(
                MAX_LEVEL,
                Combinations::compute(stats, cp_cap, MAX_LEVEL, self.comparator.as_ref(), self.mode),
            );
        }
        Some(index)
    }
}

fn all_ranks(
    cache: &mut dyn RankCache,
    settings: &RankSettings,
    stats: &BaseStats,
    cp_cap: u32,
) -> CachedIndex {
    let key = CacheKey::new(stats, cp_cap);
    if let Some(cached) = cache.get(&key) {
        return cached;
    }
    debug!("building rank index for {:?} at cp cap {}", stats, cp_cap);
    let index = settings.build_index(stats, cp_cap).map(Arc::new);
    cache.set(key, index.clone());
    index
}

/// Identity and eligibility of the record being ranked.
#[derive(Debug, Clone, Copy)]
struct Origin {
    pokemon: u32,
    form: Option<u32>,
    evolution: Option<u32>,
    little: bool,
}

/// Pending work of a rank query.
enum Task {
    Species {
        pokemon: u32,
        form: u32,
        costume: u32,
        depth: usize,
    },
    TempEvolutions {
        pokemon: u32,
        form: u32,
    },
}

/// The PvP rank engine.
///
/// # Examples
///
/// ```rust
/// use pvprank::catalog::Catalog;
/// use pvprank::{PvpRanker, RankQuery, RankerConfig};
///
/// let catalog: Catalog = serde_json::from_str(r#"{
///     "pokemon": {
///         "605": {"attack": 148, "defense": 100, "stamina": 146, "little": true,
///                 "evolutions": [{"pokemon": 606}]},
///         "606": {"attack": 221, "defense": 163, "stamina": 181}
///     }
/// }"#).unwrap();
///
/// let mut ranker = PvpRanker::new(RankerConfig::default()).unwrap().with_catalog(catalog);
/// let ranks = ranker.query_pvp_rank(&RankQuery::new(605, 1, 4, 12, 7.0).unwrap()).unwrap();
///
/// let little = &ranks["little"];
/// assert_eq!(little.len(), 1);
/// assert_eq!(little[0].pokemon, 605);
/// assert!(little[0].capped);
/// ```
pub struct PvpRanker {
    leagues: Vec<(String, League)>,
    settings: RankSettings,
    cache: Box<dyn RankCache>,
    catalog: Arc<Catalog>,
}

impl PvpRanker {
    /// Create a ranker with an empty catalog.
    ///
    /// Fails when the configured level caps or cache settings are invalid.
    pub fn new(config: RankerConfig) -> Result<Self, RankError> {
        config.validate()?;
        let (cache, mode) = config.caching.build()?;
        Ok(Self {
            leagues: config.leagues(),
            settings: RankSettings {
                level_caps: config.level_caps,
                remove_unviable: config.remove_unviable,
                comparator: Box::new(config.comparator),
                mode,
            },
            cache,
            catalog: Arc::new(Catalog::default()),
        })
    }

    /// Use `catalog` for species lookups.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Species, forms and evolutions to query against
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Use a custom comparator.
    ///
    /// Cached indexes are not keyed by comparator, so set this before the
    /// first query.
    pub fn with_comparator(mut self, comparator: impl RankingComparator + 'static) -> Self {
        self.settings.comparator = Box::new(comparator);
        self
    }

    /// Use a custom cache storing indexes in `mode`.
    pub fn with_cache(mut self, cache: Box<dyn RankCache>, mode: StorageMode) -> Self {
        self.cache = cache;
        self.settings.mode = mode;
        self
    }

    /// Replace the species catalog. Cached indexes stay valid because they
    /// depend on base stats only.
    pub fn update_catalog(&mut self, catalog: Catalog) {
        info!("catalog updated with {} species", catalog.pokemon.len());
        self.catalog = Arc::new(catalog);
    }

    /// The current species catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Configured leagues in name order.
    pub fn leagues(&self) -> &[(String, League)] {
        &self.leagues
    }

    /// Configured level caps, ascending.
    pub fn level_caps(&self) -> &[f64] {
        &self.settings.level_caps
    }

    /// How cached rank indexes store their results.
    pub fn storage_mode(&self) -> StorageMode {
        self.settings.mode
    }

    /// Number of entries currently held by the rank cache.
    pub fn rank_cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Rank every IV triple of `stats` under `cp_cap` at each viable level cap.
    ///
    /// When no triple reaches the cap at the last configured level cap, an
    /// extra index at [`MAX_LEVEL`] is appended so callers can tell whether
    /// a result is capped. Returns `None` when no level cap is viable.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvprank::{BaseStats, PvpRanker, RankerConfig};
    ///
    /// let mut ranker = PvpRanker::new(RankerConfig::default()).unwrap();
    /// let talonflame = BaseStats::new(176.0, 155.0, 186.0);
    ///
    /// // every triple passes 1500 CP below level 50.5
    /// let great = ranker.calculate_all_ranks(&talonflame, 1500).unwrap();
    /// assert_eq!(great.level_caps(), vec![50.0]);
    ///
    /// // even a perfect one stays under 2500 CP at level 50
    /// let ultra = ranker.calculate_all_ranks(&talonflame, 2500).unwrap();
    /// assert_eq!(ultra.level_caps(), vec![51.0, 100.0]);
    /// ```
    pub fn calculate_all_ranks(&mut self, stats: &BaseStats, cp_cap: u32) -> CachedIndex {
        all_ranks(self.cache.as_mut(), &self.settings, stats, cp_cap)
    }

    /// Rank one IV triple of a species and everything it evolves into.
    ///
    /// The result maps league names to entries in evolution order: the
    /// queried record, then each evolution chain depth-first, then the
    /// temporary evolutions of each record after its chain. Unknown species
    /// yield an empty map.
    ///
    /// Evolutions are skipped when the costume is evolution-locked (unless
    /// the record lists the costume as an override), when the gender does
    /// not match a gender requirement, or when the IVs do not select that
    /// branch of a Tyrogue evolution.
    pub fn query_pvp_rank(
        &mut self,
        query: &RankQuery,
    ) -> Result<HashMap<String, Vec<RankEntry>>, RankError> {
        query.validate()?;
        let catalog = Arc::clone(&self.catalog);
        let mut result: HashMap<String, Vec<RankEntry>> = HashMap::new();
        let mut stack = vec![Task::Species {
            pokemon: query.pokemon,
            form: query.form,
            costume: query.costume,
            depth: 0,
        }];

        while let Some(task) = stack.pop() {
            match task {
                Task::Species {
                    pokemon,
                    form,
                    costume,
                    depth,
                } => {
                    let Some(record) = catalog.get(pokemon) else {
                        continue;
                    };
                    let Some(species_stats) = record.base_stats() else {
                        continue;
                    };
                    let view = record.form(form);
                    let origin = Origin {
                        pokemon,
                        form: (form != 0).then_some(form),
                        evolution: None,
                        little: view.little || record.little,
                    };
                    let stats = view.stats.unwrap_or(species_stats);
                    self.push_entries(&mut result, origin, &stats, query);

                    // popped after the whole evolution chain below
                    stack.push(Task::TempEvolutions { pokemon, form });
                    if !can_evolve(&catalog, &view, costume) {
                        continue;
                    }
                    for evolution in view.evolutions.iter().rev() {
                        if !evolution_allowed(evolution, query) {
                            continue;
                        }
                        if depth + 1 > MAX_EVOLUTION_DEPTH {
                            return Err(RankError::EvolutionDepthExceeded {
                                pokemon: evolution.pokemon,
                                depth: depth + 1,
                            });
                        }
                        stack.push(Task::Species {
                            pokemon: evolution.pokemon,
                            form: evolution.form,
                            costume: 0,
                            depth: depth + 1,
                        });
                    }
                }
                Task::TempEvolutions { pokemon, form } => {
                    let Some(record) = catalog.get(pokemon) else {
                        continue;
                    };
                    let view = record.form(form);
                    for &evolution in view.temp_evolutions.keys() {
                        let Some(stats) = record.temp_evolution_stats(&view, evolution) else {
                            continue;
                        };
                        let origin = Origin {
                            pokemon,
                            form: (form != 0).then_some(form),
                            evolution: Some(evolution),
                            little: record.little,
                        };
                        self.push_entries(&mut result, origin, &stats, query);
                    }
                }
            }
        }
        Ok(result)
    }

    fn push_entries(
        &mut self,
        result: &mut HashMap<String, Vec<RankEntry>>,
        origin: Origin,
        stats: &BaseStats,
        query: &RankQuery,
    ) {
        for (name, league) in &self.leagues {
            if !league.admits(origin.little) {
                continue;
            }
            let entries = match league.cap {
                Some(cp_cap) => {
                    let Some(index) = all_ranks(self.cache.as_mut(), &self.settings, stats, cp_cap)
                    else {
                        continue;
                    };
                    capped_entries(&index, origin, stats, cp_cap, query)
                }
                None => uncapped_entries(&self.settings.level_caps, origin, stats, query.ivs),
            };
            if !entries.is_empty() {
                result.entry(name.clone()).or_default().extend(entries);
            }
        }
    }

    /// List the best IV triples of a species in every league.
    ///
    /// Only triples with every component at least `iv_floor` are ranked,
    /// and only ranks up to `max_rank` are kept. An entry is emitted for a
    /// level cap only when the triple, level or rank in that slot changed
    /// since the previous level cap; entries that no higher level cap would
    /// change are marked `capped`. A non-zero `evolution` ranks that
    /// temporary evolution.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvprank::catalog::Catalog;
    /// use pvprank::{PvpRanker, RankerConfig};
    ///
    /// let catalog: Catalog = serde_json::from_str(r#"{
    ///     "pokemon": {"663": {"attack": 176, "defense": 155, "stamina": 186}}
    /// }"#).unwrap();
    /// let ranker = PvpRanker::new(RankerConfig::default()).unwrap().with_catalog(catalog);
    ///
    /// let top = ranker.calculate_top_ranks(5, 663, 0, 0, 0);
    /// assert!(top["great"].iter().all(|entry| entry.rank <= 5));
    /// assert!(top["great"].iter().any(|entry| entry.rank == 1));
    /// assert!(!top.contains_key("little"));
    /// ```
    pub fn calculate_top_ranks(
        &self,
        max_rank: u16,
        pokemon: u32,
        form: u32,
        evolution: u32,
        iv_floor: u8,
    ) -> HashMap<String, Vec<TopRankEntry>> {
        let mut result = HashMap::new();
        let Some(record) = self.catalog.get(pokemon) else {
            return result;
        };
        let Some((stats, little)) = top_rank_stats(record, form, evolution) else {
            return result;
        };
        let iv_floor = iv_floor.min(MAX_IV);
        let form = (form != 0).then_some(form);
        let evolution = (evolution != 0).then_some(evolution);

        for (name, league) in &self.leagues {
            if !league.admits(little) {
                continue;
            }
            let rankings = match league.cap {
                Some(cp_cap) => {
                    let mut survey = TopRankSurvey {
                        stats: &stats,
                        cp_cap,
                        max_rank,
                        iv_floor,
                        comparator: self.settings.comparator.as_ref(),
                        form,
                        evolution,
                        rankings: Vec::new(),
                        last_rank: Vec::new(),
                    };
                    survey.run(&self.settings);
                    survey.rankings
                }
                None if evolution.is_none() => {
                    uncapped_top_ranks(&self.settings.level_caps, &stats, iv_floor, form)
                }
                None => Vec::new(),
            };
            if !rankings.is_empty() {
                result.insert(name.clone(), rankings);
            }
        }
        result
    }
}

fn can_evolve(catalog: &Catalog, view: &FormView<'_>, costume: u32) -> bool {
    !catalog.costume_blocks_evolution(costume) || view.costume_override_evos.contains(&costume)
}

fn evolution_allowed(evolution: &Evolution, query: &RankQuery) -> bool {
    let IvSet {
        attack,
        defense,
        stamina,
    } = query.ivs;
    let branch = match evolution.pokemon {
        HITMONLEE => attack >= defense && attack >= stamina,
        HITMONCHAN => defense >= attack && defense >= stamina,
        HITMONTOP => stamina >= attack && stamina >= defense,
        _ => true,
    };
    branch && (evolution.gender_requirement == 0 || evolution.gender_requirement == query.gender)
}

/// Entries of one record in a capped league.
fn capped_entries(
    index: &CombinationIndex,
    origin: Origin,
    stats: &BaseStats,
    cp_cap: u32,
    query: &RankQuery,
) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = Vec::new();
    for (level_cap, combinations) in index.iter() {
        let (value, level, cp, rank, percentage) = match combinations {
            Combinations::Full(full) => match full.get(query.ivs) {
                Some(result) => (
                    result.value,
                    result.level,
                    result.cp,
                    result.rank,
                    result.percentage,
                ),
                None => continue,
            },
            Combinations::Compact(table) => {
                let Some(rank) = table.rank(query.ivs) else {
                    continue;
                };
                let Some(stat) = calculate_pvp_stat(stats, query.ivs, cp_cap, level_cap, 1.0) else {
                    continue;
                };
                let percentage = round_percentage(stat.value, table.best_value());
                (stat.value, stat.level, stat.cp, rank, percentage)
            }
        };
        // already past the optimal level, cannot be powered down
        if query.level > level {
            continue;
        }
        entries.push(RankEntry {
            pokemon: origin.pokemon,
            form: origin.form,
            evolution: origin.evolution,
            cap: Some(level_cap),
            level,
            rank,
            percentage,
            value: Some(value.floor() as u64),
            cp: Some(cp),
            capped: false,
        });
    }

    while entries.len() >= 2 {
        let last = &entries[entries.len() - 1];
        let previous = &entries[entries.len() - 2];
        if previous.level != last.level || previous.rank != last.rank {
            break;
        }
        entries.pop();
    }
    let below_max = entries
        .last()
        .map(|last| last.cap.map_or(false, |cap| cap < MAX_LEVEL));
    match below_max {
        Some(true) => {
            if let Some(last) = entries.last_mut() {
                last.capped = true;
            }
        }
        // a lone entry at the max level is kept unflagged
        Some(false) if entries.len() > 1 => {
            entries.pop();
        }
        _ => {}
    }
    trace!(
        "pokemon {} cp cap {}: {} entries",
        origin.pokemon,
        cp_cap,
        entries.len()
    );
    entries
}

/// Entries of one record in an uncapped league.
///
/// Only HP separates near-perfect triples there: a 15/15/x triple whose HP
/// matches 15/15/15 at a level cap is as good as perfect.
fn uncapped_entries(level_caps: &[f64], origin: Origin, stats: &BaseStats, ivs: IvSet) -> Vec<RankEntry> {
    if origin.evolution.is_some()
        || ivs.attack != MAX_IV
        || ivs.defense != MAX_IV
        || ivs.stamina == MAX_IV
    {
        return Vec::new();
    }
    level_caps
        .iter()
        .filter(|&&level_cap| {
            calculate_hp(stats, ivs.stamina, level_cap) == calculate_hp(stats, MAX_IV, level_cap)
        })
        .map(|&level_cap| RankEntry {
            pokemon: origin.pokemon,
            form: origin.form,
            evolution: None,
            cap: None,
            level: level_cap,
            rank: 1,
            percentage: 1.0,
            value: None,
            cp: None,
            capped: false,
        })
        .collect()
}

fn top_rank_stats(record: &Pokemon, form: u32, evolution: u32) -> Option<(BaseStats, bool)> {
    let view = record.form(form);
    if evolution != 0 {
        let stats = record.temp_evolution_stats(&view, evolution)?;
        return Some((stats, record.little));
    }
    let stats = view.stats.or_else(|| record.base_stats())?;
    Some((stats, view.little || record.little))
}

/// Top ranks of one species in one capped league, built level cap by
/// level cap.
struct TopRankSurvey<'a> {
    stats: &'a BaseStats,
    cp_cap: u32,
    max_rank: u16,
    iv_floor: u8,
    comparator: &'a dyn RankingComparator,
    form: Option<u32>,
    evolution: Option<u32>,
    rankings: Vec<TopRankEntry>,
    /// Position in the sorted list to the entry last emitted for it.
    last_rank: Vec<usize>,
}

impl TopRankSurvey<'_> {
    fn run(&mut self, settings: &RankSettings) {
        let floor = IvSet::uniform(self.iv_floor);
        let mut maxed = false;
        for &level_cap in &settings.level_caps {
            if settings.is_unviable(self.stats, self.cp_cap, level_cap) {
                continue;
            }
            self.survey(level_cap, false);
            if calculate_cp(self.stats, floor, level_cap + 0.5) > self.cp_cap {
                for &slot in &self.last_rank {
                    self.rankings[slot].capped = true;
                }
                maxed = true;
                break;
            }
        }
        if !maxed && !self.rankings.is_empty() {
            self.survey(MAX_LEVEL, true);
        }
    }

    /// Rank at `level_cap` and compare each position with the last entry
    /// emitted for it.
    ///
    /// Unchanged positions are marked capped when `final_pass` is set;
    /// otherwise changed positions get a new entry.
    fn survey(&mut self, level_cap: f64, final_pass: bool) {
        let ranking = calculate_ranks_compact(
            self.stats,
            self.cp_cap,
            level_cap,
            self.comparator,
            self.iv_floor,
        );
        let Some(best) = ranking.best_value() else {
            self.last_rank.clear();
            return;
        };
        let mut kept = ranking.sorted.len();
        for (position, entry) in ranking.sorted.iter().enumerate() {
            let rank = ranking.ranks[entry.ivs.index()];
            if rank > self.max_rank {
                kept = position;
                break;
            }
            let previous = self.last_rank.get(position).copied();
            let unchanged = previous.map_or(false, |slot| {
                let emitted = &self.rankings[slot];
                emitted.level == entry.stat.level && emitted.rank == rank && emitted.ivs() == entry.ivs
            });
            if unchanged {
                if final_pass {
                    if let Some(slot) = previous {
                        self.rankings[slot].capped = true;
                    }
                }
                continue;
            }
            if final_pass {
                continue;
            }
            self.rankings.push(TopRankEntry {
                attack: entry.ivs.attack,
                defense: entry.ivs.defense,
                stamina: entry.ivs.stamina,
                value: entry.stat.value,
                level: entry.stat.level,
                cp: entry.stat.cp,
                rank,
                cap: level_cap,
                percentage: round_percentage(entry.stat.value, best),
                capped: false,
                evolution: self.evolution,
                form: self.form,
            });
            let slot = self.rankings.len() - 1;
            if position < self.last_rank.len() {
                self.last_rank[position] = slot;
            } else {
                self.last_rank.push(slot);
            }
        }
        self.last_rank.truncate(kept);
    }
}

/// Near-perfect triples of an uncapped league: 15/15/x whose HP matches
/// 15/15/15 at a level cap.
fn uncapped_top_ranks(
    level_caps: &[f64],
    stats: &BaseStats,
    iv_floor: u8,
    form: Option<u32>,
) -> Vec<TopRankEntry> {
    let mut rankings = Vec::new();
    for &level_cap in level_caps {
        let perfect_hp = calculate_hp(stats, MAX_IV, level_cap);
        for stamina in iv_floor..MAX_IV {
            if calculate_hp(stats, stamina, level_cap) != perfect_hp {
                continue;
            }
            let ivs = IvSet {
                attack: MAX_IV,
                defense: MAX_IV,
                stamina,
            };
            rankings.push(TopRankEntry {
                attack: ivs.attack,
                defense: ivs.defense,
                stamina: ivs.stamina,
                value: stat_product(stats, ivs, level_cap),
                level: level_cap,
                cp: calculate_cp(stats, ivs, level_cap),
                rank: 1,
                cap: level_cap,
                percentage: 1.0,
                capped: false,
                evolution: None,
                form,
            });
        }
    }
    rankings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachingStrategy;
    use crate::optimizer::PvpStat;
    use serde_json::json;
    use std::cmp::Ordering;

    fn talonflame() -> BaseStats {
        BaseStats::new(176.0, 155.0, 186.0)
    }

    fn registeel() -> BaseStats {
        BaseStats::new(143.0, 285.0, 190.0)
    }

    fn ranker(caching: CachingStrategy) -> PvpRanker {
        PvpRanker::new(RankerConfig::new().with_caching(caching)).unwrap()
    }

    #[test]
    fn test_index_appends_max_level() {
        let mut ranker = ranker(CachingStrategy::CpuHeavy);
        let index = ranker.calculate_all_ranks(&registeel(), 2500).unwrap();
        assert_eq!(index.level_caps(), vec![50.0, 51.0, MAX_LEVEL]);
        // level 50 is skipped as unviable
        let index = ranker.calculate_all_ranks(&talonflame(), 2500).unwrap();
        assert_eq!(index.level_caps(), vec![51.0, MAX_LEVEL]);
    }

    #[test]
    fn test_index_stops_when_maxed() {
        let mut ranker = ranker(CachingStrategy::CpuHeavy);
        // even 0/0/0 passes 1500 below level 50
        let index = ranker.calculate_all_ranks(&talonflame(), 1500).unwrap();
        assert_eq!(index.level_caps(), vec![50.0]);
    }

    #[test]
    fn test_unviable_species_has_no_index() {
        let mut ranker = ranker(CachingStrategy::Balanced);
        let weak = BaseStats::new(50.0, 50.0, 50.0);
        assert!(ranker.calculate_all_ranks(&weak, 2500).is_none());
        // the miss is cached too
        assert_eq!(ranker.rank_cache_len(), 1);
        assert!(ranker.calculate_all_ranks(&weak, 2500).is_none());
        assert_eq!(ranker.rank_cache_len(), 1);

        let mut keep_all = PvpRanker::new(RankerConfig::new().with_remove_unviable(false)).unwrap();
        let index = keep_all.calculate_all_ranks(&weak, 2500).unwrap();
        assert_eq!(index.level_caps(), vec![50.0, 51.0, MAX_LEVEL]);
    }

    #[test]
    fn test_cached_index_is_shared() {
        let mut ranker = ranker(CachingStrategy::MemoryHeavy);
        let first = ranker.calculate_all_ranks(&talonflame(), 2500).unwrap();
        let second = ranker.calculate_all_ranks(&talonflame(), 2500).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(ranker.rank_cache_len(), 1);
    }

    #[test]
    fn test_storage_modes_agree() {
        let mut full = ranker(CachingStrategy::MemoryHeavy);
        let mut compact = ranker(CachingStrategy::Balanced);
        assert_eq!(compact.storage_mode(), StorageMode::Compact);
        let full_index = full.calculate_all_ranks(&talonflame(), 2500).unwrap();
        let compact_index = compact.calculate_all_ranks(&talonflame(), 2500).unwrap();
        for ((cap, a), (other_cap, b)) in full_index.iter().zip(compact_index.iter()) {
            assert_eq!(cap, other_cap);
            match (a, b) {
                (Combinations::Full(a), Combinations::Compact(b)) => {
                    for ivs in IvSet::lattice(0) {
                        assert_eq!(a.get(ivs).map(|result| result.rank), b.rank(ivs));
                    }
                }
                _ => panic!("unexpected storage modes"),
            }
        }
    }

    #[test]
    fn test_query_validation() {
        let mut ranker = ranker(CachingStrategy::CpuHeavy);
        let mut query = RankQuery::new(1, 0, 0, 0, 1.0).unwrap();
        query.ivs.attack = 16;
        assert!(matches!(
            ranker.query_pvp_rank(&query),
            Err(RankError::IvOutOfRange { stat: "attack", value: 16 })
        ));
        query.ivs.attack = 0;
        query.level = f64::NAN;
        assert!(matches!(ranker.query_pvp_rank(&query), Err(RankError::InvalidLevel(_))));
    }

    #[test]
    fn test_unknown_species_is_empty() {
        let mut ranker = ranker(CachingStrategy::CpuHeavy);
        let query = RankQuery::new(9999, 15, 15, 15, 1.0).unwrap();
        assert!(ranker.query_pvp_rank(&query).unwrap().is_empty());
        assert!(ranker.calculate_top_ranks(10, 9999, 0, 0, 0).is_empty());
    }

    #[test]
    fn test_tyrogue_branches() {
        let catalog: Catalog = serde_json::from_value(json!({
            "pokemon": {
                "236": {"attack": 64, "defense": 64, "stamina": 111, "little": true,
                        "evolutions": [{"pokemon": 106}, {"pokemon": 107}, {"pokemon": 237}]},
                "106": {"attack": 224, "defense": 181, "stamina": 137},
                "107": {"attack": 193, "defense": 197, "stamina": 137},
                "237": {"attack": 173, "defense": 207, "stamina": 137}
            }
        }))
        .unwrap();
        let config = RankerConfig::new().with_leagues([("great", League::capped(1500))]);
        let mut ranker = PvpRanker::new(config).unwrap().with_catalog(catalog);

        let evolved = |ranker: &mut PvpRanker, attack, defense, stamina| -> Vec<u32> {
            let query = RankQuery::new(236, attack, defense, stamina, 1.0).unwrap();
            let result = ranker.query_pvp_rank(&query).unwrap();
            let mut ids: Vec<u32> = result["great"]
                .iter()
                .map(|entry| entry.pokemon)
                .filter(|&id| id != 236)
                .collect();
            ids.dedup();
            ids
        };
        assert_eq!(evolved(&mut ranker, 15, 3, 3), vec![106]);
        assert_eq!(evolved(&mut ranker, 3, 15, 3), vec![107]);
        assert_eq!(evolved(&mut ranker, 3, 3, 15), vec![237]);
        assert_eq!(evolved(&mut ranker, 10, 10, 10), vec![106, 107, 237]);
    }

    #[test]
    fn test_depth_bound() {
        let mut pokemon = serde_json::Map::new();
        for id in 1..=20u32 {
            pokemon.insert(
                id.to_string(),
                json!({"attack": 100, "defense": 100, "stamina": 100,
                       "evolutions": [{"pokemon": id + 1}]}),
            );
        }
        let catalog: Catalog = serde_json::from_value(json!({ "pokemon": pokemon })).unwrap();
        let config = RankerConfig::new().with_leagues([("great", League::capped(1500))]);
        let mut ranker = PvpRanker::new(config).unwrap().with_catalog(catalog);
        let query = RankQuery::new(1, 0, 0, 0, 1.0).unwrap();
        assert!(matches!(
            ranker.query_pvp_rank(&query),
            Err(RankError::EvolutionDepthExceeded { depth: 17, .. })
        ));
    }

    fn by_cp(a: &PvpStat, b: &PvpStat) -> Ordering {
        b.cp.cmp(&a.cp).then(b.value.total_cmp(&a.value))
    }

    #[test]
    fn test_custom_comparator() {
        let ranker = PvpRanker::new(RankerConfig::new().with_leagues([("great", League::capped(1500))]))
            .unwrap()
            .with_comparator(by_cp)
            .with_catalog(
                serde_json::from_value(json!({
                    "pokemon": {"663": {"attack": 176, "defense": 155, "stamina": 186}}
                }))
                .unwrap(),
            );
        let top = ranker.calculate_top_ranks(3, 663, 0, 0, 0);
        let direct = calculate_ranks_compact(&talonflame(), 1500, 50.0, &by_cp, 0);
        let first = &top["great"][0];
        assert_eq!(first.ivs(), direct.sorted[0].ivs);
        assert_eq!(first.cp, direct.sorted[0].stat.cp);
        assert!(top["great"].windows(2).all(|pair| pair[0].cp >= pair[1].cp));
    }
}
