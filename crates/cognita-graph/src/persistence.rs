//! JSON dataset persistence.
//!
//! A dataset file holds the raw rows the engine reads through a
//! [`ConceptStore`](crate::ConceptStore): concepts, relations, learner
//! progress and curated learning paths, plus optional metadata. It is the
//! local storage collaborator used by the command line front end.
//!
//! ```json
//! {
//!   "concepts": [{"id": 1, "name": "Array", "importance": 0.9}],
//!   "relations": [{"source": 1, "target": 2, "kind": "prerequisite"}],
//!   "progress": [],
//!   "metadata": {"version": 3}
//! }
//! ```

use crate::store::MemoryStore;
use crate::types::{Concept, LearnerProgress, LearningPath, Relation};
use crate::validation::{validate_concepts, ValidationResult};
use cognita_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Serializable types
// ============================================================================

/// Serializable set of storage rows.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// Concept rows, active or not.
    #[serde(default)]
    pub concepts: Vec<Concept>,
    /// Relation rows, active or not.
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Learner progress rows.
    #[serde(default)]
    pub progress: Vec<LearnerProgress>,
    /// Curated learning paths.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paths: Vec<LearningPath>,
    /// Optional metadata about the export.
    #[serde(default)]
    pub metadata: Option<DatasetMetadata>,
}

/// Metadata about a persisted dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// When the dataset was written (RFC 3339).
    #[serde(default)]
    pub exported_at: String,
    /// Version of the writer.
    #[serde(default)]
    pub builder_version: String,
    /// Storage version stamp, bumped whenever rows change.
    #[serde(default)]
    pub version: u64,
}

impl Default for DatasetMetadata {
    fn default() -> Self {
        Self {
            exported_at: chrono::Utc::now().to_rfc3339(),
            builder_version: env!("CARGO_PKG_VERSION").to_string(),
            version: 0,
        }
    }
}

impl Dataset {
    pub fn new(concepts: Vec<Concept>, relations: Vec<Relation>) -> Self {
        Self {
            concepts,
            relations,
            ..Self::default()
        }
    }

    pub fn with_progress(mut self, progress: Vec<LearnerProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_paths(mut self, paths: Vec<LearningPath>) -> Self {
        self.paths = paths;
        self
    }

    pub fn with_metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// The storage version stamp (0 when the file carries no metadata).
    pub fn version(&self) -> u64 {
        self.metadata.as_ref().map_or(0, |m| m.version)
    }

    /// Validate the raw concept and relation rows.
    pub fn validate(&self) -> ValidationResult {
        validate_concepts(&self.concepts, &self.relations)
    }

    /// Move the rows into an in-memory store.
    pub fn into_store(self) -> MemoryStore {
        MemoryStore::from_parts(self.concepts, self.relations, self.progress)
            .with_paths(self.paths)
    }
}

// ============================================================================
// Save / Load
// ============================================================================

/// Save a dataset to a JSON file.
pub fn save_dataset(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(dataset)
        .map_err(|e| Error::operation(format!("Failed to serialize dataset: {e}")))?;

    std::fs::write(path.as_ref(), json).map_err(|e| Error::io_with_path(e, path.as_ref()))?;
    log::debug!(
        "Saved dataset ({} concepts, {} relations) to {}",
        dataset.concepts.len(),
        dataset.relations.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Load a dataset from a JSON file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }
    let json = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let dataset = load_dataset_from_str(&json)?;
    log::debug!(
        "Loaded dataset version {} from {}",
        dataset.version(),
        path.display()
    );
    Ok(dataset)
}

/// Load a dataset from a JSON string.
///
/// Useful for testing or loading from non-file sources.
pub fn load_dataset_from_str(json: &str) -> Result<Dataset> {
    serde_json::from_str(json)
        .map_err(|e| Error::parse(format!("Failed to parse dataset JSON: {e}")))
}

/// Read only the version stamp of a dataset file.
///
/// Returns `None` when the file is missing or unreadable.
pub fn dataset_version(path: impl AsRef<Path>) -> Option<u64> {
    #[derive(Deserialize)]
    struct Header {
        #[serde(default)]
        metadata: Option<DatasetMetadata>,
    }

    let json = std::fs::read_to_string(path.as_ref()).ok()?;
    let header: Header = serde_json::from_str(&json).ok()?;
    Some(header.metadata.map_or(0, |m| m.version))
}

// ============================================================================
// Tests
// ============================================================================
