//! CLI argument parsing and command definitions.
//!
//! The `cognita` binary is a thin local surface over the engine: it loads a
//! JSON dataset, builds a snapshot and prints the read results.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "cognita", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "COGNITA_CONFIG")]
    pub config: Option<String>,

    /// Path to the concept dataset (overrides configuration).
    #[arg(short, long, env = "COGNITA_DATASET")]
    pub dataset: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<BaseCommand>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// Print version information.
    Version,

    /// Graph reads over the dataset.
    Graph(GraphCommand),

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "graph.max_nodes").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "graph.max_nodes").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

/// Graph-specific subcommands.
#[derive(Parser, Debug)]
pub struct GraphCommand {
    /// Print JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Graph subcommand to execute.
    #[command(subcommand)]
    pub command: GraphSubcommand,
}

/// Available graph subcommands.
#[derive(Subcommand, Debug)]
pub enum GraphSubcommand {
    /// Laid-out graph view (always JSON).
    Snapshot {
        /// Restrict to one category (e.g. "data_structure").
        #[arg(long)]
        category: Option<String>,

        /// Maximum number of concepts.
        #[arg(long, conflicts_with = "all")]
        max_nodes: Option<usize>,

        /// Load every concept, without a cap.
        #[arg(long)]
        all: bool,

        /// Layout strategy: force_directed, hierarchical, circular.
        #[arg(short, long)]
        layout: Option<String>,

        /// Seed for the force-directed layout.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Concept detail with related concepts and containing paths (always JSON).
    Detail {
        /// Concept id.
        #[arg(long)]
        id: u64,

        /// Include this learner's progress.
        #[arg(long)]
        learner: Option<u64>,
    },

    /// Recommendations for a learner.
    Recommend {
        /// Learner id.
        #[arg(long)]
        learner: u64,

        /// Number of recommendations.
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Ordered study path ending in a concept.
    Sequence {
        /// Concept id.
        #[arg(long)]
        id: u64,
    },

    /// Every transitive prerequisite of a concept.
    Prerequisites {
        /// Concept id.
        #[arg(long)]
        id: u64,
    },

    /// Direct and transitive dependencies of a concept.
    Deps {
        /// Concept id.
        #[arg(long)]
        id: u64,
    },

    /// Concepts a learner is ready to study.
    Next {
        /// Learner id.
        #[arg(long)]
        learner: u64,
    },

    /// Prerequisite cycles.
    Cycles {
        /// Report each cycle once, rotated to its smallest id.
        #[arg(long)]
        dedup: bool,
    },

    /// Personalized study plan towards one or more targets.
    Path {
        /// Learner id.
        #[arg(long)]
        learner: u64,

        /// Target concept ids.
        #[arg(long = "target", required = true, num_args = 1..)]
        targets: Vec<u64>,
    },

    /// Topological order of the whole prerequisite graph.
    Order,

    /// Concepts grouped by difficulty tier.
    Progression,

    /// Graph statistics.
    Stats {
        /// Number of top concepts by degree to list.
        #[arg(long, default_value = "5")]
        top: usize,
    },

    /// Validate the raw dataset rows.
    Validate,
}

// ============================================================================
// Tests
// ============================================================================
