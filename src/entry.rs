//! Query output entries and level cap filtering.

use crate::stats::IvSet;
use serde::{Deserialize, Serialize};

fn is_false(flag: &bool) -> bool {
    !*flag
}

/// One rank of a queried IV triple for one species and level cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankEntry {
    pub pokemon: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<u32>,
    /// Temporary evolution id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution: Option<u32>,
    /// Level cap; `None` for uncapped league entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<f64>,
    pub level: f64,
    pub rank: u16,
    pub percentage: f64,
    /// Stat product, floored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp: Option<u32>,
    /// Raising the level cap further does not change this entry.
    #[serde(default, skip_serializing_if = "is_false")]
    pub capped: bool,
}

/// One of the best IV triples of a species at a level cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRankEntry {
    pub attack: u8,
    pub defense: u8,
    pub stamina: u8,
    pub value: f64,
    pub level: f64,
    pub cp: u32,
    pub rank: u16,
    pub cap: f64,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "is_false")]
    pub capped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form: Option<u32>,
}

impl TopRankEntry {
    pub fn ivs(&self) -> IvSet {
        IvSet {
            attack: self.attack,
            defense: self.defense,
            stamina: self.stamina,
        }
    }
}

/// Keep only entries relevant to the given ascending level caps.
///
/// Uncapped league entries survive when their level is listed. Capped
/// entries survive up to the highest listed cap, other entries only when
/// their cap is listed. Neighbouring survivors of the same species, form
/// and evolution with equal level and rank are merged into the later cap.
///
/// # Examples
///
/// ```rust
/// use pvprank::{filter_level_caps, RankEntry};
///
/// let entry = |cap: f64, rank: u16| RankEntry {
///     pokemon: 605, form: None, evolution: None, cap: Some(cap),
///     level: 14.5, rank, percentage: 0.95, value: None, cp: None, capped: false,
/// };
/// let filtered = filter_level_caps(&[entry(40.0, 10), entry(50.0, 10), entry(51.0, 9)], &[40.0, 50.0]);
/// assert_eq!(filtered.len(), 1);
/// assert_eq!(filtered[0].cap, Some(50.0));
/// ```
pub fn filter_level_caps(entries: &[RankEntry], interested_level_caps: &[f64]) -> Vec<RankEntry> {
    let highest = interested_level_caps.last().copied();
    let mut result: Vec<RankEntry> = Vec::new();
    let mut last: Option<usize> = None;
    for entry in entries {
        let cap = match entry.cap {
            Some(cap) => cap,
            None => {
                if interested_level_caps.contains(&entry.level) {
                    result.push(entry.clone());
                }
                continue;
            }
        };
        let keep = if entry.capped {
            highest.map_or(false, |highest| cap <= highest)
        } else {
            interested_level_caps.contains(&cap)
        };
        if !keep {
            continue;
        }
        // once the level stops rising with the cap, an unchanged rank stays unchanged
        match last {
            Some(index) if same_slot(&result[index], entry) => {
                let previous = &mut result[index];
                previous.cap = Some(cap);
                previous.capped |= entry.capped;
            }
            _ => {
                result.push(entry.clone());
                last = Some(result.len() - 1);
            }
        }
    }
    result
}

fn same_slot(previous: &RankEntry, entry: &RankEntry) -> bool {
    previous.pokemon == entry.pokemon
        && previous.form == entry.form
        && previous.evolution == entry.evolution
        && previous.level == entry.level
        && previous.rank == entry.rank
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(pokemon: u32, cap: Option<f64>, level: f64, rank: u16, capped: bool) -> RankEntry {
        RankEntry {
            pokemon,
            form: None,
            evolution: None,
            cap,
            level,
            rank,
            percentage: 0.9,
            value: Some(1000),
            cp: Some(1490),
            capped,
        }
    }

    #[test]
    fn test_keeps_only_interested_caps() {
        let entries = vec![
            entry(1, Some(40.0), 20.0, 5, false),
            entry(1, Some(50.0), 25.0, 3, false),
            entry(1, Some(51.0), 25.5, 2, true),
        ];
        let filtered = filter_level_caps(&entries, &[50.0]);
        assert_eq!(filtered, vec![entry(1, Some(50.0), 25.0, 3, false)]);
    }

    #[test]
    fn test_capped_entries_below_highest_cap_survive() {
        let entries = vec![
            entry(1, Some(40.0), 20.0, 5, false),
            entry(1, Some(41.0), 21.0, 4, true),
        ];
        let filtered = filter_level_caps(&entries, &[40.0, 50.0]);
        assert_eq!(filtered.len(), 2);
        assert!(filter_level_caps(&entries, &[40.0]).iter().all(|e| !e.capped));
    }

    #[test]
    fn test_merges_identical_neighbours() {
        let entries = vec![
            entry(1, Some(40.0), 20.0, 5, false),
            entry(1, Some(50.0), 20.0, 5, true),
            entry(2, Some(50.0), 20.0, 5, false),
        ];
        let filtered = filter_level_caps(&entries, &[40.0, 50.0]);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].cap, Some(50.0));
        assert!(filtered[0].capped);
        assert_eq!(filtered[1].pokemon, 2);
    }

    #[test]
    fn test_uncapped_entries_filter_by_level() {
        let entries = vec![
            entry(661, None, 50.0, 1, false),
            entry(661, None, 51.0, 1, false),
        ];
        let filtered = filter_level_caps(&entries, &[51.0]);
        assert_eq!(filtered, vec![entry(661, None, 51.0, 1, false)]);
    }

    #[test]
    fn test_idempotent() {
        let entries = vec![
            entry(1, Some(40.0), 20.0, 5, false),
            entry(1, Some(41.0), 20.0, 5, false),
            entry(1, Some(50.0), 22.0, 3, false),
            entry(1, Some(51.0), 22.0, 3, true),
            entry(1, None, 50.0, 1, false),
            entry(2, Some(50.0), 30.0, 7, true),
        ];
        let caps = [40.0, 41.0, 50.0, 51.0];
        let once = filter_level_caps(&entries, &caps);
        let twice = filter_level_caps(&once, &caps);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 4);
    }
}
