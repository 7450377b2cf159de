//! Cycle detection example: Catching malformed evolution data
//!
//! This example shows:
//! - How `Catalog::validate` reports a looping evolution chain
//! - That the same check passes on a well-formed chain
//! - How the ranker bounds its walk when a bad catalog is used anyway

use pvprank::catalog::Catalog;
use pvprank::*;

fn load(json: &str) -> Result<Catalog, RankError> {
    serde_json::from_str(json).map_err(|err| RankError::InvalidConfig(err.to_string()))
}

fn main() -> Result<(), RankError> {
    println!("=== Catalog with a looping evolution chain ===\n");

    // 1 -> 2 -> 3 -> 1
    let looping = load(
        r#"{
            "pokemon": {
                "1": {"attack": 118, "defense": 111, "stamina": 128, "evolutions": [{"pokemon": 2}]},
                "2": {"attack": 151, "defense": 143, "stamina": 155, "evolutions": [{"pokemon": 3}]},
                "3": {"attack": 198, "defense": 189, "stamina": 190, "evolutions": [{"pokemon": 1}]}
            }
        }"#,
    )?;
    println!("1 evolves into 2, 2 into 3, 3 back into 1");

    match looping.validate() {
        Err(RankError::EvolutionCycle { path }) => {
            println!("✓ Cycle detected successfully!");
            let steps: Vec<String> = path
                .iter()
                .map(|(pokemon, form)| format!("{}:{}", pokemon, form))
                .collect();
            println!("\nCycle path: {}", steps.join(" -> "));
        }
        Err(e) => println!("✗ Unexpected error: {}", e),
        Ok(()) => println!("✗ ERROR: Cycle was not detected! This should not happen."),
    }

    println!("\n=== Querying the looping catalog anyway ===\n");

    let mut ranker = PvpRanker::new(RankerConfig::default())?.with_catalog(looping);
    match ranker.query_pvp_rank(&RankQuery::new(1, 15, 15, 15, 1.0)?) {
        Err(e) => println!("✓ Query stopped: {}", e),
        Ok(_) => println!("✗ ERROR: the query followed the loop without stopping"),
    }

    println!("\n=== Valid evolution chain (no cycle) ===\n");

    let linear = load(
        r#"{
            "pokemon": {
                "1": {"attack": 118, "defense": 111, "stamina": 128, "evolutions": [{"pokemon": 2}]},
                "2": {"attack": 151, "defense": 143, "stamina": 155, "evolutions": [{"pokemon": 3}]},
                "3": {"attack": 198, "defense": 189, "stamina": 190}
            }
        }"#,
    )?;
    println!("1 evolves into 2, 2 into 3");
    linear.validate()?;
    println!("✓ No cycle found");

    ranker.update_catalog(linear);
    let ranks = ranker.query_pvp_rank(&RankQuery::new(1, 15, 15, 15, 1.0)?)?;
    if let Some(great) = ranks.get("great") {
        let chain: Vec<u32> = great.iter().map(|entry| entry.pokemon).collect();
        println!("Great league entries by pokemon: {:?}", chain);
    }

    Ok(())
}
