//! Demonstrates the full capabilities of the async inference engine:
//! loading a knowledge file, rules over synchronous built-ins, the
//! convenience query methods, and an asynchronous HTTP built-in.
//!
//! Run with `cargo run --example full_demo`. The last query performs a real
//! HTTP request and degrades gracefully when offline.

use anyhow::Result;
use futures_util::StreamExt;
use siamese::{goal, Engine, QueryOptions, Term};

#[tokio::main]
async fn main() -> Result<()> {
    // Verbose tracing shows the resolver's CALL/EXIT/REDO/FAIL ports; use
    // RUST_LOG=siamese=trace to see them, =debug for engine-level events.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut engine = Engine::new();
    engine.load_from_file("demos/knowledge.json")?;
    println!("loaded {} clauses", engine.clause_count());

    // --- Query 1: a rule with a synchronous built-in (`neq`) ---
    println!("\nsiblings of john:");
    let mut solutions = engine.query(goal!("sibling", "john", "?S"), QueryOptions::default());
    while let Some(solution) = solutions.next().await {
        println!("  john's sibling is {}", solution?["?S"]);
    }

    // --- Query 2: the `exists` convenience method ---
    let related = engine.exists(goal!("sibling", "john", "anna")).await?;
    println!("\nare john and anna siblings? {}", if related { "yes" } else { "no" });

    // --- Query 3: numeric comparison built-ins ---
    println!("\nelders:");
    let mut elders = engine.query(goal!("elder", "?Who"), QueryOptions::default());
    while let Some(solution) = elders.next().await {
        println!("  {}", solution?["?Who"]);
    }

    // --- Query 4: an asynchronous built-in (`http_get_json`) ---
    // The fetch suspends the resolver without blocking the runtime; the JSON
    // response flows back into inference as an ordinary term.
    println!("\nfetching john's profile:");
    let profile = engine
        .query_one(
            goal!("origin_of", "?Ip"),
            QueryOptions::default(),
        )
        .await;
    // `origin_of` is not asserted yet: unknown predicates just fail.
    assert!(matches!(profile, Ok(None)));

    engine.add_rule(
        goal!("origin_of", "?Who", "?Ip"),
        vec![
            goal!("profile", "?Who", "?Url"),
            goal!("http_get_json", "?Url", "?Response"),
            goal!("unify_json_path", "?Response", Term::text("origin"), "?Ip"),
        ],
    )?;

    match engine
        .query_one(goal!("origin_of", "john", "?Ip"), QueryOptions::default())
        .await?
    {
        Some(solution) => println!("  john's profile origin is {}", solution["?Ip"]),
        None => println!("  no response (offline?)"),
    }

    Ok(())
}
