//! Ranker configuration.
//!
//! Every field is optional. Configuration can be built in code with the
//! `with_*` methods or loaded from JSON:
//!
//! ```rust
//! use pvprank::RankerConfig;
//!
//! let config = RankerConfig::from_json(r#"{
//!     "leagues": {"great": 1500, "little": 500, "master": null},
//!     "level_caps": [40, 50, 51],
//!     "caching": "balanced"
//! }"#).unwrap();
//! assert_eq!(config.level_caps, vec![40.0, 50.0, 51.0]);
//! ```

use crate::cache::CachingStrategy;
use crate::comparator::StandardComparator;
use crate::cpm::MAX_LEVEL;
use crate::error::RankError;
use crate::league::{default_leagues, League, LeagueSetting};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Construction-time settings of a [`crate::PvpRanker`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// League name to CP cap, league record, or `null` for uncapped.
    pub leagues: BTreeMap<String, Option<LeagueSetting>>,
    /// Ascending level caps of interest.
    pub level_caps: Vec<f64>,
    /// Skip level caps where even 15/15/15 stays under the CP cap.
    pub remove_unviable: bool,
    pub comparator: StandardComparator,
    pub caching: CachingStrategy,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            leagues: default_leagues()
                .into_iter()
                .map(|(name, league)| (name, league.cap.map(|_| LeagueSetting::League(league))))
                .collect(),
            level_caps: vec![50.0, 51.0],
            remove_unviable: true,
            comparator: StandardComparator::Default,
            caching: CachingStrategy::CpuHeavy,
        }
    }
}

impl RankerConfig {
    /// Create the default configuration: the four standard leagues, level
    /// caps 50 and 51, unviable caps removed and CPU-heavy caching.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON.
    ///
    /// Missing fields take their default values. The result is not
    /// validated here; [`crate::PvpRanker::new`] does that.
    ///
    /// # Arguments
    ///
    /// * `json` - A JSON object with any of the configuration fields
    ///
    /// # Returns
    ///
    /// * `Ok(RankerConfig)` - The parsed configuration
    /// * `Err(RankError::InvalidConfig)` - If the JSON is malformed or a field has the wrong shape
    pub fn from_json(json: &str) -> Result<Self, RankError> {
        serde_json::from_str(json).map_err(|err| RankError::InvalidConfig(err.to_string()))
    }

    /// Replace the configured leagues.
    ///
    /// # Arguments
    ///
    /// * `leagues` - League names paired with their definitions
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvprank::RankerConfig;
    /// use pvprank::league::League;
    ///
    /// let config = RankerConfig::new().with_leagues(vec![
    ///     ("great", League::capped(1500)),
    ///     ("master", League::functionally_perfect()),
    /// ]);
    /// assert_eq!(config.leagues().len(), 2);
    /// ```
    pub fn with_leagues<I, S>(mut self, leagues: I) -> Self
    where
        I: IntoIterator<Item = (S, League)>,
        S: Into<String>,
    {
        self.leagues = leagues
            .into_iter()
            .map(|(name, league)| {
                let setting = league.cap.map(|_| LeagueSetting::League(league));
                (name.into(), setting)
            })
            .collect();
        self
    }

    /// Replace the level caps.
    ///
    /// # Arguments
    ///
    /// * `level_caps` - Strictly ascending half-levels between 1 and 100
    pub fn with_level_caps(mut self, level_caps: impl Into<Vec<f64>>) -> Self {
        self.level_caps = level_caps.into();
        self
    }

    /// Choose whether level caps where even 15/15/15 stays at or under the
    /// CP cap are skipped when building rank indexes.
    pub fn with_remove_unviable(mut self, remove_unviable: bool) -> Self {
        self.remove_unviable = remove_unviable;
        self
    }

    /// Set the built-in ranking order.
    pub fn with_comparator(mut self, comparator: StandardComparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Set the rank cache strategy.
    pub fn with_caching(mut self, caching: CachingStrategy) -> Self {
        self.caching = caching;
        self
    }

    /// Resolved leagues in name order.
    pub fn leagues(&self) -> Vec<(String, League)> {
        self.leagues
            .iter()
            .map(|(name, setting)| (name.clone(), League::from_setting(name, *setting)))
            .collect()
    }

    /// Reject level caps that are empty, unordered, out of range or not half-levels.
    pub fn validate(&self) -> Result<(), RankError> {
        if self.level_caps.is_empty() {
            return Err(RankError::InvalidConfig("no level caps configured".into()));
        }
        for &cap in &self.level_caps {
            if !cap.is_finite() || cap < 1.0 || cap > MAX_LEVEL || (cap * 2.0).fract() != 0.0 {
                return Err(RankError::InvalidConfig(format!(
                    "level cap {} is not a half-level between 1 and {}",
                    cap, MAX_LEVEL
                )));
            }
        }
        if self.level_caps.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(RankError::InvalidConfig(
                "level caps must be strictly ascending".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RankerConfig::default();
        assert_eq!(config.level_caps, vec![50.0, 51.0]);
        assert!(config.remove_unviable);
        let leagues = config.leagues();
        assert_eq!(leagues.len(), 4);
        assert!(leagues.contains(&("little".to_string(), League::little(500))));
        assert!(leagues.contains(&("master".to_string(), League::functionally_perfect())));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_false_is_honoured() {
        let config = RankerConfig::from_json(r#"{"remove_unviable": false}"#).unwrap();
        assert!(!config.remove_unviable);
        let config = RankerConfig::from_json("{}").unwrap();
        assert!(config.remove_unviable);
    }

    #[test]
    fn test_json_leagues() {
        let config = RankerConfig::from_json(
            r#"{"leagues": {"little": 500, "premier": {"cap": 1500}, "master": null},
                "comparator": "prefer_higher_cp",
                "caching": {"lru": {"capacity": 10, "compact": false}}}"#,
        )
        .unwrap();
        let leagues = config.leagues();
        assert_eq!(
            leagues,
            vec![
                ("little".to_string(), League::little(500)),
                ("master".to_string(), League::functionally_perfect()),
                ("premier".to_string(), League::capped(1500)),
            ]
        );
        assert_eq!(config.comparator, StandardComparator::PreferHigherCp);
    }

    #[test]
    fn test_builder() {
        let config = RankerConfig::new()
            .with_leagues([("great", League::capped(1500)), ("master", League::functionally_perfect())])
            .with_level_caps([40.0, 41.0])
            .with_remove_unviable(false);
        assert_eq!(config.leagues().len(), 2);
        assert_eq!(config.level_caps, vec![40.0, 41.0]);
        assert!(!config.remove_unviable);
    }

    #[test]
    fn test_invalid_level_caps() {
        assert!(RankerConfig::new().with_level_caps(Vec::<f64>::new()).validate().is_err());
        assert!(RankerConfig::new().with_level_caps([51.0, 50.0]).validate().is_err());
        assert!(RankerConfig::new().with_level_caps([50.25]).validate().is_err());
        assert!(RankerConfig::new().with_level_caps([0.5]).validate().is_err());
        assert!(RankerConfig::new().with_level_caps([100.5]).validate().is_err());
        assert!(RankerConfig::new().with_level_caps([40.5, 41.0]).validate().is_ok());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            RankerConfig::from_json("{\"level_caps\": \"fifty\"}"),
            Err(RankError::InvalidConfig(_))
        ));
    }
}
