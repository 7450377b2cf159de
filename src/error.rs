//! Error types for ranking queries and engine construction.
//!
//! All errors that can occur while configuring the engine or querying
//! ranks are represented by the `RankError` enum.

use thiserror::Error;

/// Format an evolution cycle as a readable string.
fn format_cycle_path(path: &[(u32, u32)]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|(pokemon, form)| format!("{}:{}", pokemon, form))
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors that can occur while ranking.
///
/// # Examples
///
/// ```rust
/// use pvprank::RankError;
///
/// let err = RankError::IvOutOfRange { stat: "attack", value: 16 };
/// assert_eq!(err.to_string(), "attack IV out of range: 16");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RankError {
    /// An IV component was outside `[0, 15]`.
    #[error("{stat} IV out of range: {value}")]
    IvOutOfRange { stat: &'static str, value: i64 },

    /// A queried level was below 1 or not a finite number.
    #[error("level out of range: {0}")]
    InvalidLevel(f64),

    /// The engine configuration was rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The catalog contains a cyclic evolution chain.
    ///
    /// Each step is `(pokemon, form)`; the first node is repeated at the end.
    #[error("evolution cycle detected: {}", format_cycle_path(.path))]
    EvolutionCycle { path: Vec<(u32, u32)> },

    /// An evolution chain was deeper than the engine is willing to follow.
    #[error("evolution chain from pokemon {pokemon} exceeds depth {depth}")]
    EvolutionDepthExceeded { pokemon: u32, depth: usize },
}
