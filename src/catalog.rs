//! Species catalog.
//!
//! The catalog is supplied by the caller and treated as read-only. It
//! deserializes from masterfile-style JSON where species, forms and
//! temporary evolutions are keyed by numeric ids.

use crate::evolution::EvolutionGraph;
use crate::error::RankError;
use crate::stats::BaseStats;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// An evolution edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evolution {
    /// Target species id.
    pub pokemon: u32,
    /// Target form, 0 when unset.
    #[serde(default)]
    pub form: u32,
    /// Required gender, 0 when any gender may evolve.
    #[serde(default)]
    pub gender_requirement: u32,
}

impl Evolution {
    pub fn new(pokemon: u32) -> Self {
        Self {
            pokemon,
            form: 0,
            gender_requirement: 0,
        }
    }
}

/// A temporary evolution (mega and similar).
///
/// Form-level records may omit stats; the species-level record then applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TempEvolution {
    #[serde(default)]
    pub attack: Option<f64>,
    #[serde(default)]
    pub defense: Option<f64>,
    #[serde(default)]
    pub stamina: Option<f64>,
    /// The stats are speculative.
    #[serde(default)]
    pub unreleased: bool,
}

impl TempEvolution {
    pub fn base_stats(&self) -> Option<BaseStats> {
        to_base_stats(self.attack, self.defense, self.stamina)
    }
}

/// A form record. Missing stats fall back to the species record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Form {
    #[serde(default)]
    pub attack: Option<f64>,
    #[serde(default)]
    pub defense: Option<f64>,
    #[serde(default)]
    pub stamina: Option<f64>,
    #[serde(default)]
    pub evolutions: Vec<Evolution>,
    #[serde(default)]
    pub temp_evolutions: BTreeMap<u32, TempEvolution>,
    /// Costumes that may evolve despite being evolution-locked.
    #[serde(default)]
    pub costume_override_evos: Vec<u32>,
    #[serde(default)]
    pub little: bool,
}

/// A species record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    #[serde(default)]
    pub attack: Option<f64>,
    #[serde(default)]
    pub defense: Option<f64>,
    #[serde(default)]
    pub stamina: Option<f64>,
    #[serde(default)]
    pub forms: HashMap<u32, Form>,
    #[serde(default)]
    pub evolutions: Vec<Evolution>,
    #[serde(default)]
    pub temp_evolutions: BTreeMap<u32, TempEvolution>,
    #[serde(default)]
    pub costume_override_evos: Vec<u32>,
    /// Eligible for little cup.
    #[serde(default)]
    pub little: bool,
}

/// Borrowed view over either a species or one of its forms.
#[derive(Debug, Clone, Copy)]
pub struct FormView<'a> {
    pub stats: Option<BaseStats>,
    pub evolutions: &'a [Evolution],
    pub temp_evolutions: &'a BTreeMap<u32, TempEvolution>,
    pub costume_override_evos: &'a [u32],
    pub little: bool,
}

impl Pokemon {
    pub fn base_stats(&self) -> Option<BaseStats> {
        to_base_stats(self.attack, self.defense, self.stamina)
    }

    /// The record used for `form`: the form itself when it exists,
    /// otherwise the species.
    pub fn form(&self, form: u32) -> FormView<'_> {
        match self.forms.get(&form).filter(|_| form != 0) {
            Some(record) => FormView {
                stats: to_base_stats(record.attack, record.defense, record.stamina),
                evolutions: &record.evolutions,
                temp_evolutions: &record.temp_evolutions,
                costume_override_evos: &record.costume_override_evos,
                little: record.little,
            },
            None => FormView {
                stats: self.base_stats(),
                evolutions: &self.evolutions,
                temp_evolutions: &self.temp_evolutions,
                costume_override_evos: &self.costume_override_evos,
                little: self.little,
            },
        }
    }

    /// Stats of a temporary evolution, preferring the form-level record.
    pub fn temp_evolution_stats(&self, form: &FormView<'_>, evolution: u32) -> Option<BaseStats> {
        form.temp_evolutions
            .get(&evolution)
            .and_then(TempEvolution::base_stats)
            .or_else(|| {
                self.temp_evolutions
                    .get(&evolution)
                    .and_then(TempEvolution::base_stats)
            })
    }
}

fn to_base_stats(attack: Option<f64>, defense: Option<f64>, stamina: Option<f64>) -> Option<BaseStats> {
    match attack {
        Some(attack) if attack != 0.0 => Some(BaseStats::new(
            attack,
            defense.unwrap_or_default(),
            stamina.unwrap_or_default(),
        )),
        _ => None,
    }
}

/// The full species catalog.
///
/// # Examples
///
/// ```rust
/// use pvprank::catalog::Catalog;
///
/// let catalog: Catalog = serde_json::from_str(r#"{
///     "pokemon": {
///         "605": {"attack": 148, "defense": 100, "stamina": 146, "little": true,
///                 "evolutions": [{"pokemon": 606}]},
///         "606": {"attack": 221, "defense": 163, "stamina": 181}
///     }
/// }"#).unwrap();
/// assert_eq!(catalog.find_base_stats(606, 0, 0).unwrap().attack, 221.0);
/// assert!(catalog.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub pokemon: HashMap<u32, Pokemon>,
    /// Costume id to whether it blocks evolution.
    #[serde(default)]
    pub costumes: HashMap<u32, bool>,
}

impl Catalog {
    pub fn get(&self, pokemon: u32) -> Option<&Pokemon> {
        self.pokemon.get(&pokemon)
    }

    /// Look up the base stats of a species, form or temporary evolution.
    ///
    /// Form stats fall back to the species stats. A non-zero
    /// `temp_evolution` selects that temporary evolution instead.
    pub fn find_base_stats(&self, pokemon: u32, form: u32, temp_evolution: u32) -> Option<BaseStats> {
        let record = self.get(pokemon)?;
        let view = record.form(form);
        if temp_evolution != 0 {
            return record.temp_evolution_stats(&view, temp_evolution);
        }
        view.stats.or_else(|| record.base_stats())
    }

    /// Whether the stats of a temporary evolution are speculative.
    pub fn is_mega_unreleased(&self, pokemon: u32, temp_evolution: u32) -> bool {
        self.get(pokemon)
            .and_then(|record| record.temp_evolutions.get(&temp_evolution))
            .map_or(false, |evolution| evolution.unreleased)
    }

    /// Whether wearing `costume` prevents evolving.
    pub fn costume_blocks_evolution(&self, costume: u32) -> bool {
        costume != 0 && self.costumes.get(&costume).copied().unwrap_or(false)
    }

    /// Check that no evolution chain loops back on itself.
    pub fn validate(&self) -> Result<(), RankError> {
        EvolutionGraph::from_catalog(self).detect_cycles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        serde_json::from_value(json!({
            "pokemon": {
                "3": {
                    "attack": 198, "defense": 189, "stamina": 190,
                    "forms": {
                        "169": {"evolutions": []},
                        "950": {"attack": 200}
                    },
                    "temp_evolutions": {
                        "1": {"attack": 241, "defense": 246, "stamina": 190},
                        "2": {"attack": 250, "defense": 250, "stamina": 190, "unreleased": true}
                    }
                }
            },
            "costumes": {"5": true, "6": false}
        }))
        .unwrap()
    }

    #[test]
    fn test_find_base_stats() {
        let catalog = catalog();
        assert_eq!(
            catalog.find_base_stats(3, 0, 0),
            Some(BaseStats::new(198.0, 189.0, 190.0))
        );
        // form without stats falls back to the species
        assert_eq!(catalog.find_base_stats(3, 169, 0).unwrap().attack, 198.0);
        assert_eq!(catalog.find_base_stats(3, 950, 0).unwrap().attack, 200.0);
        // unknown form uses the species record
        assert_eq!(catalog.find_base_stats(3, 12345, 0).unwrap().attack, 198.0);
        assert_eq!(catalog.find_base_stats(3, 0, 1).unwrap().attack, 241.0);
        assert_eq!(catalog.find_base_stats(3, 169, 1).unwrap().defense, 246.0);
        assert_eq!(catalog.find_base_stats(3, 0, 9), None);
        assert_eq!(catalog.find_base_stats(4, 0, 0), None);
    }

    #[test]
    fn test_mega_unreleased() {
        let catalog = catalog();
        assert!(!catalog.is_mega_unreleased(3, 1));
        assert!(catalog.is_mega_unreleased(3, 2));
        assert!(!catalog.is_mega_unreleased(4, 1));
    }

    #[test]
    fn test_costume_lock() {
        let catalog = catalog();
        assert!(catalog.costume_blocks_evolution(5));
        assert!(!catalog.costume_blocks_evolution(6));
        assert!(!catalog.costume_blocks_evolution(7));
        assert!(!catalog.costume_blocks_evolution(0));
    }

    #[test]
    fn test_zero_attack_means_no_stats() {
        let pokemon = Pokemon {
            attack: Some(0.0),
            defense: Some(10.0),
            stamina: Some(10.0),
            ..Pokemon::default()
        };
        assert_eq!(pokemon.base_stats(), None);
    }
}
