//! Dataset validation and integrity checking.
//!
//! Runs over raw storage rows, before the builder drops anything, and
//! reports every problem the builder would otherwise silently repair:
//! self-loops, dangling references, prerequisite cycles, duplicate
//! relations and names, out-of-range weights, and orphan concepts.

use crate::graph::PrereqGraph;
use crate::ordering::{dedup_cycles, detect_cycles};
use crate::types::{Concept, ConceptId, Relation};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

// ============================================================================
// Types
// ============================================================================

/// Result of dataset validation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the dataset is valid (no critical issues).
    pub valid: bool,
    /// Critical issues that should be fixed.
    pub errors: Vec<ValidationIssue>,
    /// Non-critical issues (warnings).
    pub warnings: Vec<ValidationIssue>,
    /// Informational findings.
    pub info: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a new empty (valid) result.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            info: Vec::new(),
        }
    }

    /// Add an error (marks the dataset as invalid).
    pub fn add_error(&mut self, issue: ValidationIssue) {
        self.valid = false;
        self.errors.push(issue);
    }

    /// Add a warning.
    pub fn add_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }

    /// Add an informational finding.
    pub fn add_info(&mut self, issue: ValidationIssue) {
        self.info.push(issue);
    }

    /// Total issue count (errors + warnings).
    pub fn total_issues(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    /// Whether any error or warning carries `code`.
    pub fn has_issue(&self, code: &str) -> bool {
        self.errors
            .iter()
            .chain(&self.warnings)
            .any(|issue| issue.code == code)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// A validation issue found in the dataset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Issue type/code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Affected concepts.
    pub nodes: Vec<ConceptId>,
    /// Affected relation descriptions.
    pub edges: Vec<String>,
}

impl ValidationIssue {
    /// Create a new issue.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Attach affected concepts.
    pub fn with_nodes(mut self, nodes: Vec<ConceptId>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Attach affected relations.
    pub fn with_edges(mut self, edges: Vec<String>) -> Self {
        self.edges = edges;
        self
    }
}

// ============================================================================
// Validation functions
// ============================================================================

/// Validate raw concept and relation rows.
///
/// Only active rows are checked; inactive ones are counted as info.
pub fn validate_concepts(concepts: &[Concept], relations: &[Relation]) -> ValidationResult {
    let mut result = ValidationResult::new();

    let active: Vec<&Concept> = concepts.iter().filter(|c| c.active).collect();
    let active_relations: Vec<&Relation> = relations.iter().filter(|r| r.active).collect();

    check_duplicate_ids(&active, &mut result);
    check_self_loops(&active_relations, &mut result);
    check_dangling_references(&active, &active_relations, &mut result);
    check_prerequisite_cycles(&active, &active_relations, &mut result);
    check_duplicate_relations(&active_relations, &mut result);
    check_duplicate_names(&active, &mut result);
    check_weights(&active, &active_relations, &mut result);
    check_orphans(&active, &active_relations, &mut result);
    report_inactive(concepts, relations, &mut result);

    result
}

/// Quick check if the rows have any validation errors.
pub fn is_valid(concepts: &[Concept], relations: &[Relation]) -> bool {
    validate_concepts(concepts, relations).valid
}

// ============================================================================
// Individual checks
// ============================================================================

fn check_duplicate_ids(concepts: &[&Concept], result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    let duplicates: BTreeSet<ConceptId> = concepts
        .iter()
        .filter(|c| !seen.insert(c.id))
        .map(|c| c.id)
        .collect();

    if !duplicates.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DUPLICATE_IDS",
                format!("{} concept id(s) appear more than once", duplicates.len()),
            )
            .with_nodes(duplicates.into_iter().collect()),
        );
    }
}

fn check_self_loops(relations: &[&Relation], result: &mut ValidationResult) {
    let self_loops: Vec<String> = relations
        .iter()
        .filter(|r| r.is_self_loop())
        .map(|r| r.describe())
        .collect();

    if !self_loops.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "SELF_LOOPS",
                format!("{} relation(s) are self-loops", self_loops.len()),
            )
            .with_edges(self_loops),
        );
    }
}

fn check_dangling_references(
    concepts: &[&Concept],
    relations: &[&Relation],
    result: &mut ValidationResult,
) {
    let ids: HashSet<ConceptId> = concepts.iter().map(|c| c.id).collect();
    let mut missing = BTreeSet::new();
    let mut edges = Vec::new();

    for relation in relations {
        let mut dangling = false;
        for endpoint in [relation.source, relation.target] {
            if !ids.contains(&endpoint) {
                missing.insert(endpoint);
                dangling = true;
            }
        }
        if dangling {
            edges.push(relation.describe());
        }
    }

    if !edges.is_empty() {
        result.add_error(
            ValidationIssue::new(
                "DANGLING_REFERENCES",
                format!(
                    "{} relation(s) reference {} unknown or inactive concept(s)",
                    edges.len(),
                    missing.len()
                ),
            )
            .with_nodes(missing.into_iter().collect())
            .with_edges(edges),
        );
    }
}

fn check_prerequisite_cycles(
    concepts: &[&Concept],
    relations: &[&Relation],
    result: &mut ValidationResult,
) {
    let graph = PrereqGraph::from_edges(
        concepts.iter().map(|c| c.id),
        relations
            .iter()
            .filter(|r| r.kind.is_ordering())
            .map(|r| (r.source, r.target)),
    );
    let cycles = dedup_cycles(detect_cycles(&graph));
    if cycles.is_empty() {
        return;
    }

    let nodes: BTreeSet<ConceptId> = cycles.iter().flat_map(|c| c.nodes().to_vec()).collect();
    let edges: Vec<String> = cycles
        .iter()
        .map(|cycle| {
            let mut parts: Vec<String> = cycle.nodes().iter().map(ToString::to_string).collect();
            if let Some(first) = cycle.nodes().first() {
                parts.push(first.to_string());
            }
            parts.join(" -> ")
        })
        .collect();

    result.add_error(
        ValidationIssue::new(
            "PREREQUISITE_CYCLE",
            format!("{} cycle(s) in prerequisite relations", cycles.len()),
        )
        .with_nodes(nodes.into_iter().collect())
        .with_edges(edges),
    );
}

fn check_duplicate_relations(relations: &[&Relation], result: &mut ValidationResult) {
    let mut seen = HashSet::new();
    let duplicates: Vec<String> = relations
        .iter()
        .filter(|r| !seen.insert(r.key()))
        .map(|r| r.describe())
        .collect();

    if !duplicates.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "DUPLICATE_RELATIONS",
                format!("{} duplicate relation(s) found", duplicates.len()),
            )
            .with_edges(duplicates),
        );
    }
}

fn check_duplicate_names(concepts: &[&Concept], result: &mut ValidationResult) {
    let mut by_name: HashMap<&str, Vec<ConceptId>> = HashMap::new();
    for concept in concepts {
        by_name.entry(concept.name.as_str()).or_default().push(concept.id);
    }

    let mut clashing: Vec<ConceptId> = by_name
        .into_values()
        .filter(|ids| ids.len() > 1)
        .flatten()
        .collect();
    clashing.sort();
    clashing.dedup();

    if !clashing.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "DUPLICATE_NAMES",
                format!("{} concept(s) share a name with another", clashing.len()),
            )
            .with_nodes(clashing),
        );
    }
}

fn check_weights(concepts: &[&Concept], relations: &[&Relation], result: &mut ValidationResult) {
    let in_range = |w: f32| (0.0..=1.0).contains(&w);

    let nodes: Vec<ConceptId> = concepts
        .iter()
        .filter(|c| !in_range(c.importance))
        .map(|c| c.id)
        .collect();
    let edges: Vec<String> = relations
        .iter()
        .filter(|r| !in_range(r.strength))
        .map(|r| format!("{} (strength {})", r.describe(), r.strength))
        .collect();

    if !nodes.is_empty() || !edges.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "OUT_OF_RANGE_WEIGHTS",
                format!(
                    "{} importance and {} strength value(s) outside [0, 1]; they will be clamped",
                    nodes.len(),
                    edges.len()
                ),
            )
            .with_nodes(nodes)
            .with_edges(edges),
        );
    }
}

fn check_orphans(concepts: &[&Concept], relations: &[&Relation], result: &mut ValidationResult) {
    let connected: HashSet<ConceptId> = relations
        .iter()
        .filter(|r| !r.is_self_loop())
        .flat_map(|r| [r.source, r.target])
        .collect();
    let orphans: Vec<ConceptId> = concepts
        .iter()
        .map(|c| c.id)
        .filter(|id| !connected.contains(id))
        .collect();

    if !orphans.is_empty() {
        result.add_warning(
            ValidationIssue::new(
                "ORPHAN_CONCEPTS",
                format!("{} concept(s) have no relations", orphans.len()),
            )
            .with_nodes(orphans),
        );
    }
}

fn report_inactive(concepts: &[Concept], relations: &[Relation], result: &mut ValidationResult) {
    let inactive_concepts = concepts.iter().filter(|c| !c.active).count();
    let inactive_relations = relations.iter().filter(|r| !r.active).count();

    if inactive_concepts + inactive_relations > 0 {
        result.add_info(ValidationIssue::new(
            "INACTIVE_ROWS",
            format!(
                "{inactive_concepts} inactive concept(s) and {inactive_relations} inactive relation(s) skipped"
            ),
        ));
    }
}

// ============================================================================
// Tests
// ============================================================================
