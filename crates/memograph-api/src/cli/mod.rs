//! CLI argument definitions for the `mgraph` binary.

pub mod memory;
pub mod relationship;
pub mod serve;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

use memograph_core::memory::service::{
    DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_THRESHOLD, DEFAULT_TRAVERSAL_DEPTH,
};

#[derive(Parser)]
#[command(
    name = "mgraph",
    version,
    about = "Semantic memory store with a typed relationship graph"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Machine-readable JSON output
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server
    Serve {
        /// Bind address
        #[arg(long, default_value = "127.0.0.1:7464", env = "MEMOGRAPH_BIND")]
        bind: String,

        /// Export spans via OpenTelemetry (stdout exporter)
        #[arg(long)]
        otel: bool,
    },

    /// Add a memory
    Add {
        /// The memory text
        content: String,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// Show a memory by id
    Show { id: Uuid },

    /// Search memories (semantic, with substring fallback)
    Search {
        query: String,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,

        /// Similarity floor for the semantic path
        #[arg(long, default_value_t = DEFAULT_SEARCH_THRESHOLD)]
        threshold: f32,
    },

    /// Delete a memory (cascades its relationships)
    Delete {
        id: Uuid,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Create a relationship between two memories
    Link {
        from: Uuid,
        to: Uuid,

        /// Relationship type label
        #[arg(long, default_value = "related")]
        relationship_type: String,

        #[arg(long, default_value_t = 1.0)]
        strength: f64,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,
    },

    /// List memories reachable within a bounded number of hops
    Connected {
        id: Uuid,

        #[arg(long, default_value_t = DEFAULT_TRAVERSAL_DEPTH)]
        max_depth: usize,
    },

    /// Generate shell completions
    Completions { shell: Shell },
}
