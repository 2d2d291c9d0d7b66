//! Reference bundle loading
//!
//! A bundle is a directory containing the four reference tables as JSON or
//! YAML files: `keyword_mapping`, `weights`, `teaching_corpus`, and
//! `concept_graph`. CSV ingestion and encoding detection live with the
//! upstream data-preparation tooling; this loader only consumes the
//! serde-native rendition.

use super::{CorpusEntry, IndicatorWeight, KeywordEntry, ReferenceStore};
use crate::graph::ConceptGraph;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading reference data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported bundle file format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing reference table: {0}")]
    MissingTable(String),
}

/// Result type for store loading operations
pub type StoreResult<T> = Result<T, StoreError>;

/// One row of the keyword-mapping table
#[derive(Debug, Deserialize)]
struct KeywordRow {
    keyword: String,
    indicator_code: String,
    weight: f64,
    parent_indicator: String,
}

/// One row of the indicator-weight table
#[derive(Debug, Deserialize)]
struct WeightRow {
    indicator_code: String,
    absolute_weight: f64,
    relative_weight: f64,
    name: String,
    level: String,
}

/// One head→tail triple of the expert concept graph
#[derive(Debug, Deserialize)]
struct TripleRow {
    head: String,
    tail: String,
    relation: String,
}

/// A reference-data bundle directory
#[derive(Debug, Clone)]
pub struct ReferenceBundle {
    dir: PathBuf,
}

impl ReferenceBundle {
    /// Point at a bundle directory
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load all four tables and build the store
    pub fn load(&self) -> StoreResult<ReferenceStore> {
        let keyword_mapping = self.load_keyword_mapping()?;
        let weight_mapping = self.load_weight_mapping()?;
        let corpus = self.load_teaching_corpus()?;
        let graph = self.load_concept_graph()?;

        tracing::info!(
            keywords = keyword_mapping.len(),
            indicators = weight_mapping.len(),
            corpus_entries = corpus.len(),
            graph_nodes = graph.node_count(),
            graph_edges = graph.edge_count(),
            "reference bundle loaded"
        );

        Ok(
            ReferenceStore::new(keyword_mapping, weight_mapping, corpus, graph)
                .with_source(self.dir.display().to_string()),
        )
    }

    fn load_keyword_mapping(&self) -> StoreResult<HashMap<String, KeywordEntry>> {
        let rows: Vec<KeywordRow> = self.load_table("keyword_mapping")?;
        let mut mapping = HashMap::with_capacity(rows.len());
        for row in rows {
            mapping.insert(
                row.keyword.trim().to_string(),
                KeywordEntry {
                    indicator_code: row.indicator_code,
                    weight: row.weight,
                    parent_indicator: row.parent_indicator,
                },
            );
        }
        tracing::debug!(count = mapping.len(), "keyword mapping loaded");
        Ok(mapping)
    }

    fn load_weight_mapping(&self) -> StoreResult<HashMap<String, IndicatorWeight>> {
        let rows: Vec<WeightRow> = self.load_table("weights")?;
        let mut mapping = HashMap::with_capacity(rows.len());
        for row in rows {
            mapping.insert(
                row.indicator_code.trim().to_string(),
                IndicatorWeight {
                    absolute_weight: row.absolute_weight,
                    relative_weight: row.relative_weight,
                    name: row.name,
                    level: row.level,
                },
            );
        }
        tracing::debug!(count = mapping.len(), "indicator weights loaded");
        Ok(mapping)
    }

    fn load_teaching_corpus(&self) -> StoreResult<Vec<CorpusEntry>> {
        let mut corpus: Vec<CorpusEntry> = self.load_table("teaching_corpus")?;
        for entry in &mut corpus {
            entry.knowledge_domain = entry.knowledge_domain.trim().to_string();
            for keyword in &mut entry.keywords {
                *keyword = keyword.trim().to_string();
            }
            entry.description = entry.description.trim().to_string();
        }
        tracing::debug!(count = corpus.len(), "teaching corpus loaded");
        Ok(corpus)
    }

    fn load_concept_graph(&self) -> StoreResult<ConceptGraph> {
        let rows: Vec<TripleRow> = self.load_table("concept_graph")?;
        let mut graph = ConceptGraph::new();
        for row in rows {
            let head = row.head.trim().to_string();
            let tail = row.tail.trim().to_string();
            graph.add_concept(&head);
            graph.add_concept(&tail);
            graph.add_edge(&head, &tail, row.relation.trim());
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "concept graph built"
        );
        Ok(graph)
    }

    /// Find `<stem>.{json,yaml,yml}` in the bundle directory and parse it
    fn load_table<T: DeserializeOwned>(&self, stem: &str) -> StoreResult<Vec<T>> {
        for ext in ["json", "yaml", "yml"] {
            let path = self.dir.join(format!("{stem}.{ext}"));
            if path.exists() {
                return parse_table(&path);
            }
        }
        Err(StoreError::MissingTable(stem.to_string()))
    }
}

fn parse_table<T: DeserializeOwned>(path: &Path) -> StoreResult<Vec<T>> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        other => Err(StoreError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}
