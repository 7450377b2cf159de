//! Basic example: Ranking one IV triple across leagues
//!
//! This example demonstrates:
//! - Loading a small species catalog from JSON
//! - Querying the ranks of a pokemon and its evolutions
//! - Filtering the result down to chosen level caps

use pvprank::catalog::Catalog;
use pvprank::*;

fn main() -> Result<(), RankError> {
    // Fletchling, Fletchinder and Talonflame
    let catalog: Catalog = serde_json::from_str(
        r#"{
            "pokemon": {
                "661": {"attack": 95, "defense": 80, "stamina": 128, "little": true,
                        "evolutions": [{"pokemon": 662}]},
                "662": {"attack": 145, "defense": 110, "stamina": 158,
                        "evolutions": [{"pokemon": 663}]},
                "663": {"attack": 176, "defense": 155, "stamina": 186}
            }
        }"#,
    )
    .map_err(|err| RankError::InvalidConfig(err.to_string()))?;
    catalog.validate()?;

    let mut ranker = PvpRanker::new(RankerConfig::default())?.with_catalog(catalog);
    println!("Leagues:");
    for (name, league) in ranker.leagues() {
        match league.cap {
            Some(cap) => println!("  - {}: {} CP", name, cap),
            None => println!("  - {}: uncapped", name),
        }
    }
    println!("Level caps: {:?}", ranker.level_caps());

    // A level 5 Fletchling with 0/14/15
    let query = RankQuery::new(661, 0, 14, 15, 5.0)?;
    println!("\nQuerying Fletchling 0/14/15 at level 5...");
    let ranks = ranker.query_pvp_rank(&query)?;

    let mut names: Vec<_> = ranks.keys().cloned().collect();
    names.sort();
    for name in &names {
        println!("\n=== {} ===", name);
        for entry in &ranks[name] {
            let cap = entry
                .cap
                .map_or_else(|| "-".to_string(), |cap| cap.to_string());
            println!(
                "  #{:<5} pokemon {} cap {:<5} level {:<5} cp {:?} ({:.2}%){}",
                entry.rank,
                entry.pokemon,
                cap,
                entry.level,
                entry.cp,
                entry.percentage * 100.0,
                if entry.capped { " capped" } else { "" }
            );
        }
    }

    // Keep only what matters at level 50
    println!("\nEntries relevant at level cap 50:");
    for name in &names {
        let filtered = filter_level_caps(&ranks[name], &[50.0]);
        println!("  {}: {} of {}", name, filtered.len(), ranks[name].len());
    }
    println!("\nRank indexes cached: {}", ranker.rank_cache_len());

    Ok(())
}
