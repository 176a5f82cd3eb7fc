//! Memory CLI commands: add, show, search, delete.

use anyhow::Result;
use comfy_table::{presets, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use memograph_types::memory::{Memory, Metadata};

use crate::state::AppState;

pub(crate) fn parse_metadata_arg(raw: Option<&str>) -> Result<Metadata> {
    match raw {
        Some(raw) => {
            serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("--metadata must be a JSON object: {e}"))
        }
        None => Ok(Metadata::new()),
    }
}

pub(crate) fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

pub(crate) fn memory_table(memories: &[Memory]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Id", "Content", "Created"]);
    for memory in memories {
        table.add_row(vec![
            memory.id.to_string(),
            memory.content.clone(),
            memory.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    table
}

/// Add a memory.
///
/// # Examples
///
/// ```bash
/// mgraph add "Paris is the capital of France" --metadata '{"topic":"geography"}'
/// ```
pub async fn add(state: &AppState, content: &str, metadata: Option<&str>, json: bool) -> Result<()> {
    let metadata = parse_metadata_arg(metadata)?;

    let progress = (!json).then(|| spinner("Embedding and storing..."));
    let result = state.memory_service.add_memory(content, metadata).await;
    if let Some(progress) = &progress {
        progress.finish_and_clear();
    }
    let write = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&write)?);
        return Ok(());
    }

    println!();
    println!("  {} Memory stored", style("✓").green().bold());
    println!("  {}     {}", style("Id:").bold(), style(write.id).cyan());
    println!("  {}  {}", style("Index:").bold(), write.index);
    Ok(())
}

/// Show a memory by id.
pub async fn show(state: &AppState, id: &Uuid, json: bool) -> Result<()> {
    let Some(memory) = state.memory_service.get_memory(id).await? else {
        if json {
            println!("null");
        } else {
            println!("  {} No memory with id {id}", style("✗").red());
        }
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&memory)?);
        return Ok(());
    }

    println!();
    println!("  {}       {}", style("Id:").bold(), style(memory.id).cyan());
    println!("  {}  {}", style("Content:").bold(), memory.content);
    if !memory.metadata.is_empty() {
        println!(
            "  {} {}",
            style("Metadata:").bold(),
            serde_json::to_string(&memory.metadata)?
        );
    }
    println!("  {}  {}", style("Created:").bold(), memory.created_at);
    println!("  {}  {}", style("Updated:").bold(), memory.updated_at);
    Ok(())
}

/// Search memories.
pub async fn search(
    state: &AppState,
    query: &str,
    limit: usize,
    threshold: f32,
    json: bool,
) -> Result<()> {
    let progress = (!json).then(|| spinner("Searching..."));
    let result = state.memory_service.search_memories(query, limit, threshold).await;
    if let Some(progress) = &progress {
        progress.finish_and_clear();
    }
    let memories = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&memories)?);
        return Ok(());
    }

    if memories.is_empty() {
        println!("  No matching memories.");
        return Ok(());
    }
    println!("{}", memory_table(&memories));
    Ok(())
}

/// Delete a memory and its relationships.
pub async fn delete(state: &AppState, id: &Uuid, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete memory {id} and all its relationships?"))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let deleted = state.memory_service.delete_memory(id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": deleted }));
        return Ok(());
    }

    if deleted {
        println!("  {} Memory deleted", style("✓").green().bold());
    } else {
        println!("  {} No memory with id {id}", style("✗").red());
    }
    Ok(())
}
