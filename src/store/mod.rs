//! Reference store: the four immutable tables every scorer reads
//!
//! Holds the keyword mapping, indicator weight table, teaching corpus, and
//! expert concept graph, plus the derived indices built once at
//! construction. The store is read-only after load; scorers share it by
//! reference and never mutate it.

mod loader;

pub use loader::{ReferenceBundle, StoreError, StoreResult};

use crate::graph::ConceptGraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A keyword's declared mapping onto the indicator system.
///
/// `weight` is the source-declared relevance weight used for ranking,
/// distinct from the indicator's absolute weight used for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordEntry {
    /// Indicator code the keyword maps to (e.g. "C12-3")
    pub indicator_code: String,
    /// Source-declared relevance weight, used to rank extracted keywords
    pub weight: f64,
    /// Parent indicator code
    pub parent_indicator: String,
}

/// Weight record for a single competency indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWeight {
    /// Absolute weight, observed in the 0..1 range
    pub absolute_weight: f64,
    /// Relative weight, display only
    pub relative_weight: f64,
    /// Human-readable indicator name
    pub name: String,
    /// Competency dimension code this indicator belongs to (e.g. "C11")
    pub level: String,
}

/// One curated teaching record: a knowledge domain, the keywords it
/// serves, and a free-text description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub knowledge_domain: String,
    pub keywords: Vec<String>,
    pub description: String,
}

/// How a corpus entry was matched by [`ReferenceStore::find_relevant_entry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchKind {
    /// Keyword equals a corpus keyword exactly (case-insensitive)
    #[serde(rename = "精确匹配")]
    Exact,
    /// Query keyword is contained in a corpus keyword
    #[serde(rename = "包含匹配")]
    Contains,
    /// A corpus keyword is contained in the query keyword
    #[serde(rename = "被包含匹配")]
    ContainedBy,
    /// Query keyword appears in a domain name
    #[serde(rename = "领域匹配")]
    Domain,
    /// Nothing matched
    #[serde(rename = "无匹配")]
    None,
}

/// Result of a fuzzy corpus lookup.
#[derive(Debug, Clone, Serialize)]
pub struct CorpusMatch {
    pub content: String,
    pub kind: MatchKind,
    pub knowledge_domain: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
}

impl CorpusMatch {
    fn none() -> Self {
        Self {
            content: "未在知识库中找到高度相关的内容。".to_string(),
            kind: MatchKind::None,
            knowledge_domain: "未知".to_string(),
            confidence: 0.0,
            matched_keyword: None,
        }
    }
}

/// Minimum length-ratio score for a containment match to count.
const CONTAINMENT_THRESHOLD: f64 = 0.3;

/// Domain-category tips, resolved once at store build. The first category
/// whose tag appears in a domain name supplies that domain's tip.
const DOMAIN_TIP_CATEGORIES: &[(&str, &str)] = &[
    ("Numpy", "建议结合数组操作实例进行练习"),
    ("pandas", "建议使用真实数据集进行数据处理练习"),
    ("sklearn", "建议理解算法原理后再进行代码实现"),
    ("Matplotlib", "建议多练习不同类型的图表绘制"),
];

/// Metadata about a loaded store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// When the reference data was loaded
    pub loaded_at: Option<DateTime<Utc>>,
    /// Where the reference data came from (bundle directory, "inline", ...)
    pub source: Option<String>,
}

/// The in-memory reference data bundle.
///
/// Construction builds every derived index up front; all lookups
/// afterwards are borrow-only.
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    keyword_mapping: HashMap<String, KeywordEntry>,
    weight_mapping: HashMap<String, IndicatorWeight>,
    corpus: Vec<CorpusEntry>,
    graph: ConceptGraph,
    /// keyword -> indices into `corpus` (one-to-many)
    corpus_index: HashMap<String, Vec<usize>>,
    /// All mapping keywords, longest first (ties alphabetical)
    vocabulary: Vec<String>,
    /// domain name -> study tip, resolved from DOMAIN_TIP_CATEGORIES
    domain_tips: HashMap<String, &'static str>,
    metadata: StoreMetadata,
}

impl ReferenceStore {
    /// Build a store from the four raw tables.
    pub fn new(
        keyword_mapping: HashMap<String, KeywordEntry>,
        weight_mapping: HashMap<String, IndicatorWeight>,
        corpus: Vec<CorpusEntry>,
        graph: ConceptGraph,
    ) -> Self {
        let corpus_index = build_corpus_index(&corpus);
        let vocabulary = build_vocabulary(&keyword_mapping);
        let domain_tips = resolve_domain_tips(&corpus);

        Self {
            keyword_mapping,
            weight_mapping,
            corpus,
            graph,
            corpus_index,
            vocabulary,
            domain_tips,
            metadata: StoreMetadata {
                loaded_at: Some(Utc::now()),
                source: None,
            },
        }
    }

    /// Record where the reference data came from
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.metadata.source = Some(source.into());
        self
    }

    pub fn keyword_mapping(&self) -> &HashMap<String, KeywordEntry> {
        &self.keyword_mapping
    }

    pub fn weight_mapping(&self) -> &HashMap<String, IndicatorWeight> {
        &self.weight_mapping
    }

    pub fn corpus(&self) -> &[CorpusEntry] {
        &self.corpus
    }

    pub fn graph(&self) -> &ConceptGraph {
        &self.graph
    }

    pub fn metadata(&self) -> &StoreMetadata {
        &self.metadata
    }

    /// All known keywords, longest first. Used for substring scanning of
    /// string literals and comments.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Whether a keyword is part of the loaded mapping
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        self.keyword_mapping.contains_key(keyword)
    }

    /// All corpus entries that list the given keyword
    pub fn corpus_entries_for(&self, keyword: &str) -> impl Iterator<Item = &CorpusEntry> {
        self.corpus_index
            .get(keyword)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(|&i| &self.corpus[i])
    }

    /// Resolve a keyword to its indicator weight record, if both the
    /// keyword mapping and the weight table know about it.
    pub fn resolve_weight(&self, keyword: &str) -> Option<&IndicatorWeight> {
        let entry = self.keyword_mapping.get(keyword)?;
        self.weight_mapping.get(&entry.indicator_code)
    }

    /// Study tip for a knowledge domain, if its name matched a tip category
    pub fn domain_tip(&self, domain: &str) -> Option<&'static str> {
        self.domain_tips.get(domain).copied()
    }

    /// Fuzzy corpus lookup: exact keyword match first, then containment in
    /// either direction scored by length ratio, then domain-name fallback.
    pub fn find_relevant_entry(&self, keyword: &str) -> CorpusMatch {
        if self.corpus.is_empty() {
            return CorpusMatch::none();
        }

        let query = keyword.to_lowercase();

        // Exact match
        for entry in &self.corpus {
            for kw in &entry.keywords {
                if kw.trim().to_lowercase() == query {
                    return CorpusMatch {
                        content: entry.description.clone(),
                        kind: MatchKind::Exact,
                        knowledge_domain: entry.knowledge_domain.clone(),
                        confidence: 1.0,
                        matched_keyword: Some(kw.clone()),
                    };
                }
            }
        }

        // Containment in either direction, best length-ratio wins
        let mut best: Option<CorpusMatch> = None;
        let mut best_score = 0.0;
        for entry in &self.corpus {
            for kw in &entry.keywords {
                let candidate = kw.trim().to_lowercase();
                if candidate.is_empty() {
                    continue;
                }
                let (kind, score) = if candidate.contains(&query) {
                    (
                        MatchKind::Contains,
                        query.chars().count() as f64 / candidate.chars().count() as f64,
                    )
                } else if query.contains(&candidate) {
                    (
                        MatchKind::ContainedBy,
                        candidate.chars().count() as f64 / query.chars().count() as f64,
                    )
                } else {
                    continue;
                };
                if score > best_score {
                    best_score = score;
                    best = Some(CorpusMatch {
                        content: entry.description.clone(),
                        kind,
                        knowledge_domain: entry.knowledge_domain.clone(),
                        confidence: score,
                        matched_keyword: Some(kw.clone()),
                    });
                }
            }
        }
        if let Some(m) = best {
            if best_score > CONTAINMENT_THRESHOLD {
                return m;
            }
        }

        // Domain-name fallback
        for entry in &self.corpus {
            if entry.knowledge_domain.to_lowercase().contains(&query) {
                return CorpusMatch {
                    content: format!(
                        "在'{}'领域中找到了相关概念：{}",
                        entry.knowledge_domain, entry.description
                    ),
                    kind: MatchKind::Domain,
                    knowledge_domain: entry.knowledge_domain.clone(),
                    confidence: 0.5,
                    matched_keyword: None,
                };
            }
        }

        CorpusMatch::none()
    }
}

fn build_corpus_index(corpus: &[CorpusEntry]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, entry) in corpus.iter().enumerate() {
        for keyword in &entry.keywords {
            index.entry(keyword.clone()).or_default().push(i);
        }
    }
    index
}

fn build_vocabulary(mapping: &HashMap<String, KeywordEntry>) -> Vec<String> {
    let mut vocabulary: Vec<String> = mapping.keys().cloned().collect();
    // Longest first so substring scans prefer specific matches
    vocabulary.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    vocabulary
}

fn resolve_domain_tips(corpus: &[CorpusEntry]) -> HashMap<String, &'static str> {
    let mut tips = HashMap::new();
    for entry in corpus {
        if tips.contains_key(&entry.knowledge_domain) {
            continue;
        }
        for (tag, tip) in DOMAIN_TIP_CATEGORIES {
            if entry.knowledge_domain.contains(tag) {
                tips.insert(entry.knowledge_domain.clone(), *tip);
                break;
            }
        }
    }
    tips
}
