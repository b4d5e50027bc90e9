//! Concept graph and prerequisite engine for Cognita.
//!
//! This crate builds an immutable [`GraphSnapshot`] from a
//! [`ConceptStore`] and answers ordering, recommendation and layout
//! queries against it.
//!
//! # Key Abstractions
//!
//! - [`ConceptStore`] trait: storage collaborators provide concept,
//!   relation, progress and learning path rows
//! - [`GraphSnapshot`]: a capped, cleaned view holding a visualization
//!   graph (every relation kind) and a prerequisite graph (ordering kinds)
//! - [`SnapshotCache`]: opt-in reuse of snapshots keyed by build
//!   parameters and storage version

#![doc = include_str!("../README.md")]

pub mod builder;
pub mod cache;
pub mod graph;
pub mod layout;
pub mod ordering;
pub mod persistence;
pub mod query;
pub mod recommend;
pub mod stats;
pub mod store;
pub mod types;
pub mod validation;

// Re-exports - types
pub use types::{
    Category, Concept, ConceptId, Difficulty, LearnedSet, LearnerId, LearnerProgress,
    LearningPath, ProgressStatus, Relation, RelationKind, learned_set,
};

// Re-exports - graph
pub use graph::{GraphSnapshot, PrereqGraph, VisGraph};

// Re-exports - storage and building
pub use builder::{BuildStats, DEFAULT_MAX_NODES, GraphBuilder};
pub use cache::{CacheKey, DEFAULT_TTL, SnapshotCache};
pub use store::{ConceptStore, MemoryStore};

// Re-exports - algorithms
pub use layout::{Layout, LayoutConfig, LayoutStrategy, Point, compute_layout};
pub use ordering::{
    ConceptDependencies, Cycle, DEFAULT_CONCEPT_MINUTES, Ordering, PathOptions, PersonalizedPath,
    TargetSequence, concept_dependencies, dedup_cycles, detect_cycles, difficulty_progression,
    learning_sequence, next_concepts, personalized_path, prerequisites, topological_sort,
    topological_sort_subset,
};
pub use recommend::{Reason, Recommendation, popular, recommend};

// Re-exports - persistence
pub use persistence::{
    Dataset, DatasetMetadata, dataset_version, load_dataset, load_dataset_from_str, save_dataset,
};

// Re-exports - query
pub use query::{
    ConceptDetail, EdgeView, GraphView, NodeSummary, NodeView, PathSummary, RecommendationView,
    RelatedConcept, RelationDirection, ViewStats, concept_detail, graph_view,
    recommendation_views, summaries,
};

// Re-exports - stats
pub use stats::{DegreeDirection, GraphStats, compute_stats, quick_summary, top_concepts_by_degree};

// Re-exports - validation
pub use validation::{ValidationIssue, ValidationResult, is_valid, validate_concepts};

// Re-export core error types
pub use cognita_core::{Error, Result};
