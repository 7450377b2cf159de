//! Leagues.
//!
//! A league is a CP cap plus a little cup flag. A league without a cap is
//! "functionally perfect": only HP saturation distinguishes near-perfect
//! IVs there.

use serde::{Deserialize, Serialize};

/// A competitive bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    /// CP cap, `None` for an uncapped league.
    pub cap: Option<u32>,
    /// Only little cup eligible species may enter.
    #[serde(default)]
    pub little: bool,
}

impl League {
    /// Create an open league with a CP cap.
    ///
    /// # Arguments
    ///
    /// * `cap` - Highest CP a pokemon may have to enter
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvprank::league::League;
    ///
    /// let great = League::capped(1500);
    /// assert_eq!(great.cap, Some(1500));
    /// assert!(great.admits(false));
    /// ```
    pub fn capped(cap: u32) -> Self {
        Self { cap: Some(cap), little: false }
    }

    /// Create a CP-capped league restricted to little cup eligible species.
    ///
    /// # Arguments
    ///
    /// * `cap` - Highest CP a pokemon may have to enter
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pvprank::league::League;
    ///
    /// let little = League::little(500);
    /// assert!(little.admits(true));
    /// assert!(!little.admits(false));
    /// ```
    pub fn little(cap: u32) -> Self {
        Self { cap: Some(cap), little: true }
    }

    /// Create the uncapped league.
    ///
    /// Every triple reaches the highest level cap there, so queries only
    /// report triples whose HP ties a perfect one.
    pub fn functionally_perfect() -> Self {
        Self { cap: None, little: false }
    }

    /// Whether a species with the given little cup eligibility may enter.
    pub fn admits(&self, little_eligible: bool) -> bool {
        !self.little || little_eligible
    }

    /// Interpret a configured league value.
    ///
    /// A bare CP cap counts as little cup when the league name starts with
    /// `little`; `None` is the uncapped league.
    pub fn from_setting(name: &str, setting: Option<LeagueSetting>) -> Self {
        match setting {
            None => Self::functionally_perfect(),
            Some(LeagueSetting::Cap(cap)) => Self {
                cap: Some(cap),
                little: name.starts_with("little"),
            },
            Some(LeagueSetting::League(league)) => league,
        }
    }
}

/// A league as written in configuration: a bare cap or a full record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeagueSetting {
    Cap(u32),
    League(League),
}

/// `little: 500`, `great: 1500`, `ultra: 2500` and uncapped `master`.
pub fn default_leagues() -> Vec<(String, League)> {
    vec![
        ("great".to_string(), League::capped(1500)),
        ("little".to_string(), League::little(500)),
        ("master".to_string(), League::functionally_perfect()),
        ("ultra".to_string(), League::capped(2500)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_setting() {
        assert_eq!(
            League::from_setting("little", Some(LeagueSetting::Cap(500))),
            League::little(500)
        );
        assert_eq!(
            League::from_setting("littlejungle", Some(LeagueSetting::Cap(500))),
            League::little(500)
        );
        assert_eq!(
            League::from_setting("great", Some(LeagueSetting::Cap(1500))),
            League::capped(1500)
        );
        assert_eq!(
            League::from_setting("master", None),
            League::functionally_perfect()
        );
        assert_eq!(
            League::from_setting("cup", Some(LeagueSetting::League(League::little(800)))),
            League::little(800)
        );
    }

    #[test]
    fn test_admits() {
        assert!(League::capped(1500).admits(false));
        assert!(League::little(500).admits(true));
        assert!(!League::little(500).admits(false));
    }

    #[test]
    fn test_setting_json() {
        let cap: LeagueSetting = serde_json::from_str("1500").unwrap();
        assert_eq!(cap, LeagueSetting::Cap(1500));
        let league: LeagueSetting = serde_json::from_str(r#"{"cap": 500, "little": true}"#).unwrap();
        assert_eq!(league, LeagueSetting::League(League::little(500)));
    }
}
