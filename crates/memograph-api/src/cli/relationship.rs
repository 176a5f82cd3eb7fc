//! Relationship CLI commands: link, connected.

use anyhow::Result;
use console::style;
use uuid::Uuid;

use crate::cli::memory::{memory_table, parse_metadata_arg};
use crate::state::AppState;

/// Create a relationship between two memories.
///
/// # Examples
///
/// ```bash
/// mgraph link <from-id> <to-id> --relationship-type references --strength 0.8
/// ```
pub async fn link(
    state: &AppState,
    from: Uuid,
    to: Uuid,
    relationship_type: &str,
    strength: f64,
    metadata: Option<&str>,
    json: bool,
) -> Result<()> {
    let metadata = parse_metadata_arg(metadata)?;
    let id = state
        .memory_service
        .add_relationship(from, to, relationship_type, strength, metadata)
        .await?;

    if json {
        println!("{}", serde_json::json!({ "id": id }));
        return Ok(());
    }

    println!(
        "  {} Linked {} -> {} ({relationship_type}, strength {strength})",
        style("✓").green().bold(),
        style(from).cyan(),
        style(to).cyan(),
    );
    Ok(())
}

/// List memories reachable from a start memory within `max_depth` hops.
pub async fn connected(state: &AppState, id: &Uuid, max_depth: usize, json: bool) -> Result<()> {
    let memories = state.memory_service.get_connected_memories(id, max_depth).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&memories)?);
        return Ok(());
    }

    if memories.is_empty() {
        println!("  No connected memories within {max_depth} hops.");
        return Ok(());
    }
    println!("{}", memory_table(&memories));
    Ok(())
}
