//! Handler functions for graph CLI commands.
//!
//! Every handler loads the dataset named by the [`ConfigProvider`], builds
//! a snapshot (through the [`SnapshotCache`]) and prints either text or
//! JSON. Only `graph snapshot` applies the node cap and category filter;
//! the other reads see every active concept.

use crate::config::CognitaConfig;
use cognita_core::traits::ConfigProvider;
use cognita_core::{Error, Result};
use cognita_graph::{
    CacheKey, Category, ConceptId, ConceptStore, DegreeDirection, GraphBuilder, GraphSnapshot,
    LayoutConfig, LayoutStrategy, LearnerId, LearnerProgress, MemoryStore, PathOptions,
    SnapshotCache, ValidationIssue, compute_layout, compute_stats, concept_dependencies,
    concept_detail, dataset_version, dedup_cycles, detect_cycles, difficulty_progression,
    graph_view, learned_set, learning_sequence, load_dataset, next_concepts, personalized_path,
    prerequisites, quick_summary, recommend, recommendation_views, summaries,
    top_concepts_by_degree,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Settings and context
// ============================================================================

/// Engine settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    /// Default category filter for `graph snapshot`.
    pub category: Option<Category>,
    /// Default node cap for `graph snapshot`.
    pub max_nodes: Option<usize>,
    /// Default layout strategy.
    pub layout: LayoutStrategy,
    /// Default force-directed seed.
    pub seed: u64,
    pub layout_config: LayoutConfig,
    pub path: PathOptions,
    pub cache_ttl: Duration,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self::from(&CognitaConfig::default())
    }
}

impl From<&CognitaConfig> for GraphSettings {
    fn from(config: &CognitaConfig) -> Self {
        Self {
            category: config.graph.category,
            max_nodes: config.graph.max_nodes,
            layout: config.graph.layout,
            seed: config.graph.seed,
            layout_config: config.layout.clone(),
            path: config.path.clone(),
            cache_ttl: Duration::from_secs(config.graph.cache_ttl_secs),
        }
    }
}

/// Everything a handler needs.
pub struct GraphContext<'a, C: ConfigProvider> {
    pub config: &'a C,
    pub settings: &'a GraphSettings,
    pub cache: &'a SnapshotCache,
    /// Print JSON instead of text.
    pub json: bool,
}

/// Options for `graph snapshot`.
#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    pub category: Option<String>,
    pub max_nodes: Option<usize>,
    /// Disable the node cap.
    pub all: bool,
    pub layout: Option<String>,
    pub seed: Option<u64>,
}

// ============================================================================
// Loading
// ============================================================================

/// A loaded dataset store plus a snapshot built from it.
pub struct Loaded {
    pub store: MemoryStore,
    pub snapshot: Arc<GraphSnapshot>,
}

impl Loaded {
    fn progress(&self, learner: u64) -> Result<Vec<LearnerProgress>> {
        self.store.learner_progress(LearnerId(learner))
    }
}

fn load_store(path: &Path) -> Result<MemoryStore> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    Ok(load_dataset(path)?.into_store())
}

/// Load the dataset and build (or reuse) the snapshot for the given filters.
pub fn load_snapshot<C: ConfigProvider>(
    ctx: &GraphContext<'_, C>,
    category: Option<Category>,
    max_nodes: Option<usize>,
) -> Result<Loaded> {
    let path = ctx.config.dataset_path()?;
    let store = load_store(&path)?;
    let version = dataset_version(&path).unwrap_or(0);

    let snapshot = ctx
        .cache
        .get_or_build(CacheKey::new(category, max_nodes), version, || {
            let (snapshot, stats) = GraphBuilder::new(&store)
                .with_category(category)
                .with_max_nodes(max_nodes)
                .build()?;
            if stats.dropped() > 0 {
                log::info!(
                    "Dropped {} inconsistent rows while building from {}",
                    stats.dropped(),
                    path.display()
                );
            }
            Ok(snapshot)
        })?;

    Ok(Loaded { store, snapshot })
}

fn load_full<C: ConfigProvider>(ctx: &GraphContext<'_, C>) -> Result<Loaded> {
    load_snapshot(ctx, None, None)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::operation(format!("Failed to serialize output: {e}")))?;
    println!("{json}");
    Ok(())
}

fn parse_arg<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = Error>,
{
    value.parse::<T>().map_err(|e| Error::config(e.to_string()))
}

fn print_named_list(snapshot: &GraphSnapshot, ids: &[ConceptId]) {
    for (i, id) in ids.iter().enumerate() {
        println!("  {}. {} ({id})", i + 1, snapshot.name_of(*id));
    }
}

fn cycle_warning(has_cycle: bool) {
    if has_cycle {
        println!("\n  WARNING: Prerequisite cycle detected; ordering is approximate.");
    }
}

// ============================================================================
// Read API
// ============================================================================

/// Print the laid-out graph view as JSON.
pub async fn handle_snapshot<C: ConfigProvider>(
    ctx: &GraphContext<'_, C>,
    options: SnapshotOptions,
) -> Result<()> {
    let category = match options.category.as_deref() {
        Some(name) => Some(parse_arg::<Category>(name)?),
        None => ctx.settings.category,
    };
    let max_nodes = if options.all {
        None
    } else {
        options.max_nodes.or(ctx.settings.max_nodes)
    };
    let strategy = match options.layout.as_deref() {
        Some(name) => parse_arg::<LayoutStrategy>(name)?,
        None => ctx.settings.layout,
    };
    let seed = options.seed.unwrap_or(ctx.settings.seed);

    let loaded = load_snapshot(ctx, category, max_nodes)?;
    let layout = compute_layout(&loaded.snapshot, strategy, &ctx.settings.layout_config, seed);
    print_json(&graph_view(&loaded.snapshot, &layout))
}

/// Print one concept's detail as JSON.
pub async fn handle_detail<C: ConfigProvider>(
    ctx: &GraphContext<'_, C>,
    id: u64,
    learner: Option<u64>,
) -> Result<()> {
    let loaded = load_full(ctx)?;
    let progress = match learner {
        Some(learner) => loaded.progress(learner)?,
        None => Vec::new(),
    };
    let paths = loaded.store.learning_paths()?;
    let detail = concept_detail(&loaded.snapshot, ConceptId(id), &paths, &progress)?;
    print_json(&detail)
}

/// Print recommendations for a learner.
pub async fn handle_recommend<C: ConfigProvider>(
    ctx: &GraphContext<'_, C>,
    learner: u64,
    limit: usize,
) -> Result<()> {
    let loaded = load_full(ctx)?;
    let progress = loaded.progress(learner)?;
    let views = recommendation_views(
        &loaded.snapshot,
        &recommend(&loaded.snapshot, &progress, limit),
    );

    if ctx.json {
        return print_json(&views);
    }

    println!("Recommendations for learner {learner}:");
    if views.is_empty() {
        println!("  (nothing to recommend)");
    }
    for (i, view) in views.iter().enumerate() {
        println!(
            "  {}. {} ({}) - {}, score {:.2}",
            i + 1,
            view.concept.name,
            view.concept.id,
            view.reason,
            view.score
        );
    }
    Ok(())
}

// ============================================================================
// Ordering reads
// ============================================================================

/// Print the learning sequence ending in a concept.
pub async fn handle_sequence<C: ConfigProvider>(ctx: &GraphContext<'_, C>, id: u64) -> Result<()> {
    let loaded = load_full(ctx)?;
    let sequence = learning_sequence(loaded.snapshot.prereq(), ConceptId(id))?;

    if ctx.json {
        return print_json(&sequence);
    }

    println!(
        "Learning sequence for '{}':",
        loaded.snapshot.name_of(ConceptId(id))
    );
    print_named_list(&loaded.snapshot, &sequence.order);
    cycle_warning(sequence.has_cycle);
    Ok(())
}

/// Print every transitive prerequisite of a concept.
pub async fn handle_prerequisites<C: ConfigProvider>(
    ctx: &GraphContext<'_, C>,
    id: u64,
) -> Result<()> {
    let loaded = load_full(ctx)?;
    let found = prerequisites(loaded.snapshot.prereq(), ConceptId(id))?;

    if ctx.json {
        return print_json(&summaries(&loaded.snapshot, &found));
    }

    println!(
        "Prerequisites of '{}' (discovery order):",
        loaded.snapshot.name_of(ConceptId(id))
    );
    if found.is_empty() {
        println!("  (no prerequisites)");
    }
    print_named_list(&loaded.snapshot, &found);
    Ok(())
}

/// Print the dependency summary of a concept.
pub async fn handle_dependencies<C: ConfigProvider>(
    ctx: &GraphContext<'_, C>,
    id: u64,
) -> Result<()> {
    let loaded = load_full(ctx)?;
    let deps = concept_dependencies(&loaded.snapshot, ConceptId(id))?;

    if ctx.json {
        return print_json(&deps);
    }

    let snapshot = &loaded.snapshot;
    let names = |ids: &[ConceptId]| {
        ids.iter()
            .map(|id| snapshot.name_of(*id))
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("{} ({})", snapshot.name_of(deps.concept), deps.difficulty);
    println!("Direct prerequisites: {}", names(&deps.direct_prerequisites));
    println!("Direct dependents:    {}", names(&deps.direct_dependents));
    println!("All prerequisites:    {}", deps.all_prerequisites.len());
    println!(
        "Position in sequence: {} of {}",
        deps.position_in_sequence,
        deps.learning_sequence.len()
    );
    println!("Estimated minutes:    {}", deps.estimated_minutes);
    cycle_warning(deps.has_cycle);
    Ok(())
}

/// Print the concepts a learner is ready to study.
pub async fn handle_next<C: ConfigProvider>(ctx: &GraphContext<'_, C>, learner: u64) -> Result<()> {
    let loaded = load_full(ctx)?;
    let learned = learned_set(&loaded.progress(learner)?);
    let ready = next_concepts(&loaded.snapshot, &learned);

    if ctx.json {
        return print_json(&summaries(&loaded.snapshot, &ready));
    }

    println!(
        "Ready to study for learner {learner} ({} learned):",
        learned.len()
    );
    if ready.is_empty() {
        println!("  (nothing ready)");
    }
    print_named_list(&loaded.snapshot, &ready);
    Ok(())
}

/// Print prerequisite cycles.
pub async fn handle_cycles<C: ConfigProvider>(ctx: &GraphContext<'_, C>, dedup: bool) -> Result<()> {
    let loaded = load_full(ctx)?;
    let mut cycles = detect_cycles(loaded.snapshot.prereq());
    if dedup {
        cycles = dedup_cycles(cycles);
    }

    if ctx.json {
        return print_json(&cycles);
    }

    if cycles.is_empty() {
        println!("No prerequisite cycles.");
        return Ok(());
    }
    println!("{} prerequisite cycle(s):", cycles.len());
    for cycle in &cycles {
        let names: Vec<String> = cycle
            .nodes()
            .iter()
            .chain(cycle.nodes().first())
            .map(|id| loaded.snapshot.name_of(*id))
            .collect();
        println!("  - {}", names.join(" -> "));
    }
    Ok(())
}

/// Print a personalized study plan.
pub async fn handle_path<C: ConfigProvider>(
    ctx: &GraphContext<'_, C>,
    learner: u64,
    targets: &[u64],
) -> Result<()> {
    let loaded = load_full(ctx)?;
    let progress = loaded.progress(learner)?;
    let targets: Vec<ConceptId> = targets.iter().copied().map(ConceptId).collect();
    let plan = personalized_path(&loaded.snapshot, &progress, &targets, &ctx.settings.path)?;

    if ctx.json {
        return print_json(&plan);
    }

    println!(
        "Study plan for learner {learner} ({} concept(s) already learned):",
        plan.learned_count
    );
    if plan.path.is_empty() {
        println!("  (every target is already learned)");
    }
    print_named_list(&loaded.snapshot, &plan.path);
    println!(
        "\nEstimated time: {} min (~{} h)",
        plan.estimated_minutes,
        plan.estimated_hours()
    );
    cycle_warning(plan.has_cycle);
    Ok(())
}

/// Print the topological order of the whole prerequisite graph.
pub async fn handle_order<C: ConfigProvider>(ctx: &GraphContext<'_, C>) -> Result<()> {
    let loaded = load_full(ctx)?;
    let ordering = cognita_graph::topological_sort(loaded.snapshot.prereq());

    if ctx.json {
        return print_json(&ordering);
    }

    println!("Topological order ({} concepts):", ordering.len());
    print_named_list(&loaded.snapshot, &ordering.order);
    if ordering.has_cycle {
        println!(
            "\n  WARNING: {} concept(s) sit on prerequisite cycles and were appended last.",
            ordering.unresolved.len()
        );
    }
    Ok(())
}

/// Print concepts grouped by difficulty tier.
pub async fn handle_progression<C: ConfigProvider>(ctx: &GraphContext<'_, C>) -> Result<()> {
    let loaded = load_full(ctx)?;
    let tiers = difficulty_progression(&loaded.snapshot);

    if ctx.json {
        return print_json(&tiers);
    }

    for (difficulty, ids) in &tiers {
        println!("{difficulty} ({}):", ids.len());
        for id in ids {
            println!("  - {}", loaded.snapshot.name_of(*id));
        }
    }
    Ok(())
}

// ============================================================================
// Analysis
// ============================================================================

/// Show graph statistics.
pub async fn handle_stats<C: ConfigProvider>(ctx: &GraphContext<'_, C>, top: usize) -> Result<()> {
    let loaded = load_full(ctx)?;
    let snapshot = &loaded.snapshot;
    let stats = compute_stats(snapshot);

    if ctx.json {
        return print_json(&stats);
    }

    println!("Graph Statistics");
    println!("================");
    println!("{}", quick_summary(snapshot));
    println!("Orphans:        {}", stats.orphan_count);
    println!("Avg degree:     {:.2}", stats.avg_degree);
    println!("Max in-degree:  {}", stats.max_in_degree);
    println!("Max out-degree: {}", stats.max_out_degree);

    if let Some(id) = stats.most_depended_on {
        println!(
            "Most depended on: {} (in-degree: {})",
            snapshot.name_of(id),
            stats.max_in_degree
        );
    }
    if let Some(id) = stats.most_dependencies {
        println!(
            "Most dependencies: {} (out-degree: {})",
            snapshot.name_of(id),
            stats.max_out_degree
        );
    }

    let sections = [
        ("Categories", &stats.category_distribution),
        ("Difficulties", &stats.difficulty_distribution),
        ("Relations", &stats.relation_distribution),
    ];
    for (title, distribution) in sections {
        if distribution.is_empty() {
            continue;
        }
        println!("\n{title}:");
        let mut rows: Vec<_> = distribution.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(a.1));
        for (name, count) in rows {
            println!("  {name}: {count}");
        }
    }

    if top > 0 && !snapshot.is_empty() {
        println!("\nMost connected:");
        for (id, degree) in top_concepts_by_degree(snapshot, top, DegreeDirection::Both) {
            println!("  {} ({degree})", snapshot.name_of(id));
        }
    }

    Ok(())
}

fn print_issue(label: &str, issue: &ValidationIssue) {
    println!("  {label} [{}]: {}", issue.code, issue.message);
    for node in &issue.nodes {
        println!("    - {node}");
    }
    for edge in &issue.edges {
        println!("    - {edge}");
    }
}

/// Validate the raw dataset rows.
pub async fn handle_validate<C: ConfigProvider>(ctx: &GraphContext<'_, C>) -> Result<()> {
    let path = ctx.config.dataset_path()?;
    if !path.exists() {
        return Err(Error::file_not_found(&path));
    }
    let result = load_dataset(&path)?.validate();

    if ctx.json {
        print_json(&result)?;
    } else {
        if result.valid {
            println!("Dataset is valid.");
        } else {
            println!("Dataset has validation issues:");
        }
        for error in &result.errors {
            print_issue("ERROR", error);
        }
        for warning in &result.warnings {
            print_issue("WARN ", warning);
        }
        for info in &result.info {
            print_issue("INFO ", info);
        }
        println!(
            "\nSummary: {} error(s), {} warning(s)",
            result.errors.len(),
            result.warnings.len()
        );
    }

    if result.valid {
        Ok(())
    } else {
        Err(Error::operation(format!(
            "Dataset validation failed with {} error(s)",
            result.errors.len()
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
