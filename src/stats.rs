//! Base stats, IVs and the CP / HP / stat product formulas.

use crate::cpm::calculate_cp_multiplier;
use crate::error::RankError;
use serde::{Deserialize, Serialize};

/// Highest value an IV component can take.
pub const MAX_IV: u8 = 15;

/// Number of points in the full IV lattice.
pub const IV_COMBINATIONS: usize = 16 * 16 * 16;

/// Base stats of a species, form or temporary evolution.
///
/// # Examples
///
/// ```rust
/// use pvprank::BaseStats;
///
/// let mewtwo = BaseStats::new(300.0, 182.0, 214.0);
/// assert_eq!(mewtwo.attack, 300.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub attack: f64,
    pub defense: f64,
    pub stamina: f64,
}

impl BaseStats {
    pub fn new(attack: f64, defense: f64, stamina: f64) -> Self {
        Self {
            attack,
            defense,
            stamina,
        }
    }
}

/// An individual value triple, each component in `[0, 15]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IvSet {
    pub attack: u8,
    pub defense: u8,
    pub stamina: u8,
}

impl IvSet {
    /// Build an IV triple, rejecting components outside `[0, 15]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvprank::IvSet;
    ///
    /// assert!(IvSet::new(15, 15, 15).is_ok());
    /// assert!(IvSet::new(16, 0, 0).is_err());
    /// ```
    pub fn new(attack: i64, defense: i64, stamina: i64) -> Result<Self, RankError> {
        Ok(Self {
            attack: check_iv("attack", attack)?,
            defense: check_iv("defense", defense)?,
            stamina: check_iv("stamina", stamina)?,
        })
    }

    /// Build an IV triple with every component set to `iv`, clamped to 15.
    pub fn uniform(iv: u8) -> Self {
        let iv = iv.min(MAX_IV);
        Self {
            attack: iv,
            defense: iv,
            stamina: iv,
        }
    }

    /// Flat lattice index `(attack * 16 + defense) * 16 + stamina`.
    pub fn index(self) -> usize {
        (self.attack as usize * 16 + self.defense as usize) * 16 + self.stamina as usize
    }

    /// Inverse of [`IvSet::index`]. Only the low 12 bits are used.
    pub fn from_index(index: usize) -> Self {
        Self {
            attack: ((index >> 8) & 15) as u8,
            defense: ((index >> 4) & 15) as u8,
            stamina: (index & 15) as u8,
        }
    }

    /// Iterate over `[floor, 15]^3` in ascending index order.
    pub fn lattice(floor: u8) -> impl Iterator<Item = IvSet> {
        let floor = floor.min(MAX_IV);
        (floor..=MAX_IV).flat_map(move |attack| {
            (floor..=MAX_IV).flat_map(move |defense| {
                (floor..=MAX_IV).map(move |stamina| IvSet {
                    attack,
                    defense,
                    stamina,
                })
            })
        })
    }
}

fn check_iv(stat: &'static str, value: i64) -> Result<u8, RankError> {
    if (0..=MAX_IV as i64).contains(&value) {
        Ok(value as u8)
    } else {
        Err(RankError::IvOutOfRange { stat, value })
    }
}

/// Calculate HP at a level, with a floor of 10.
pub fn calculate_hp(stats: &BaseStats, stamina_iv: u8, level: f64) -> u32 {
    let hp = ((stats.stamina + stamina_iv as f64) * calculate_cp_multiplier(level)).floor();
    (hp as u32).max(10)
}

/// Calculate CP at a level, with a floor of 10.
///
/// # Examples
///
/// ```rust
/// use pvprank::{calculate_cp, BaseStats, IvSet};
///
/// let mewtwo = BaseStats::new(300.0, 182.0, 214.0);
/// assert_eq!(calculate_cp(&mewtwo, IvSet::uniform(15), 40.0), 4178);
/// ```
pub fn calculate_cp(stats: &BaseStats, ivs: IvSet, level: f64) -> u32 {
    let multiplier = calculate_cp_multiplier(level);
    let attack = stats.attack + ivs.attack as f64;
    let defense = stats.defense + ivs.defense as f64;
    let stamina = stats.stamina + ivs.stamina as f64;
    let cp = (multiplier * multiplier * attack * (defense * stamina).sqrt() / 10.0).floor();
    (cp as u32).max(10)
}

/// Attack times defense times HP at a level.
pub fn stat_product(stats: &BaseStats, ivs: IvSet, level: f64) -> f64 {
    let multiplier = calculate_cp_multiplier(level);
    let attack = (stats.attack + ivs.attack as f64) * multiplier;
    attack_product(attack, stats, ivs, multiplier, level)
}

/// Finish a stat product from an already scaled attack stat.
///
/// The multiplication order is fixed so that equal products compare equal.
pub(crate) fn attack_product(
    attack: f64,
    stats: &BaseStats,
    ivs: IvSet,
    multiplier: f64,
    level: f64,
) -> f64 {
    attack * (stats.defense + ivs.defense as f64) * multiplier
        * calculate_hp(stats, ivs.stamina, level) as f64
}
