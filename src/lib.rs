//! # pvprank - Deterministic PvP IV Ranking Engine
//!
//! Ranks the 4096 individual value (IV) triples of a species for CP-capped
//! PvP leagues:
//! - **Deterministic** results (same catalog and config → same ranks)
//! - **Level-cap aware** ranking (best-buddy and level 51 caps included)
//! - **Evolution-aware** queries (ranks for everything a pokemon becomes)
//! - **Cached** rank tables with pluggable storage strategies
//!
//! ## Core Concepts
//!
//! ### Ranking Pipeline
//!
//! ```text
//! [BaseStats + IvSet] → [optimal level under CP cap] → [sorted lattice] → [dense rank]
//! ```
//!
//! 1. **CP multipliers** turn a level into a stat scale
//! 2. **The optimizer** finds the highest level that stays under the CP cap
//! 3. **The ranker** sorts every triple by stat product and assigns dense ranks
//! 4. **The engine** looks triples up per league, level cap and evolution
//!
//! ### Key Features
//!
//! - **Comparators**: tie-breaking is pluggable through [`comparator::RankingComparator`]
//! - **Compact Storage**: rank tables can keep only rank numbers
//! - **Capped Flags**: entries say whether a higher level cap could change them
//! - **Catalog Validation**: evolution cycles are detected up front
//!
//! ## Example
//!
//! ```rust
//! use pvprank::*;
//! use pvprank::catalog::Catalog;
//!
//! let catalog: Catalog = serde_json::from_str(r#"{
//!     "pokemon": {
//!         "661": {"attack": 95, "defense": 80, "stamina": 128,
//!                 "evolutions": [{"pokemon": 662}]},
//!         "662": {"attack": 145, "defense": 110, "stamina": 158,
//!                 "evolutions": [{"pokemon": 663}]},
//!         "663": {"attack": 176, "defense": 155, "stamina": 186}
//!     }
//! }"#).unwrap();
//! catalog.validate().unwrap();
//!
//! let mut ranker = PvpRanker::new(RankerConfig::default()).unwrap().with_catalog(catalog);
//! let query = RankQuery::new(661, 15, 15, 14, 1.0).unwrap();
//! let ranks = ranker.query_pvp_rank(&query).unwrap();
//!
//! // stamina 14 keeps the HP of a perfect Talonflame
//! assert!(ranks["master"].iter().any(|entry| entry.pokemon == 663));
//! ```
//!
//! ## Modules
//!
//! - [`cpm`] - CP multiplier table
//! - [`stats`] - Base stats, IVs, CP and HP
//! - [`optimizer`] - Best level under a CP cap
//! - [`comparator`] - Ranking order
//! - [`ranking`] - Whole-lattice ranking
//! - [`cache`] - Rank table caching
//! - [`catalog`] - Species catalog
//! - [`evolution`] - Evolution graph validation
//! - [`league`] - League definitions
//! - [`config`] - Ranker configuration
//! - [`entry`] - Query output and level cap filtering
//! - [`engine`] - Main rank engine
//! - [`error`] - Error types

pub mod cache;
pub mod catalog;
pub mod comparator;
pub mod config;
pub mod cpm;
pub mod engine;
pub mod entry;
pub mod error;
pub mod evolution;
pub mod league;
pub mod optimizer;
pub mod ranking;
pub mod stats;

// Re-export main types for convenience
pub use config::RankerConfig;
pub use engine::{PvpRanker, RankQuery};
pub use entry::{filter_level_caps, RankEntry, TopRankEntry};
pub use error::RankError;

// Re-export the stat formulas
pub use cpm::calculate_cp_multiplier;
pub use optimizer::{calculate_pvp_stat, PvpStat};
pub use stats::{calculate_cp, calculate_hp, stat_product, BaseStats, IvSet};
