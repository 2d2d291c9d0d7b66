//! Didact: Teaching-Oriented Code Analysis
//!
//! Didact analyzes a snippet of Python source code and produces a
//! teaching-oriented report: the topical keywords found in the code, their
//! relative pedagogical importance, an inferred competency profile, and a
//! small knowledge graph connecting keywords to curated teaching content.
//!
//! # Core Concepts
//!
//! - **Reference store**: four immutable tables loaded once at startup
//!   (keyword mapping, indicator weights, teaching corpus, concept graph)
//! - **Extraction**: syntax-tree and literal-text token collection, ranked
//!   against the known keyword vocabulary
//! - **Scoring**: importance tiers per matched teaching record, additive
//!   competency-dimension scores per indicator level
//! - **Composition**: a per-request enhanced graph linking keywords to
//!   their knowledge domains, with ego-subgraph and path extraction
//!
//! # Example
//!
//! ```
//! use didact::{ReferenceStore, TeachingAnalyzer};
//!
//! let store = ReferenceStore::new(
//!     Default::default(),
//!     Default::default(),
//!     Vec::new(),
//!     Default::default(),
//! );
//! let analyzer = TeachingAnalyzer::new(store);
//! let report = analyzer.generate_teaching_resource("print('hello')");
//! assert!(report.error.is_some()); // empty vocabulary: no keywords matched
//! ```

pub mod analysis;
pub mod extract;
pub mod graph;
pub mod report;
pub mod store;

pub use analysis::{
    Importance, ImportanceAnalysis, ImportanceScorer, KeywordBreakdown, KnowledgeRecord,
    LiteracyAnalysis, LiteracyScorer, TopDimension, WeightSummary,
};
pub use extract::{rank_keywords, ExtractorConfig, KeywordExtractor};
pub use graph::{
    ConceptEdge, ConceptGraph, ConceptNode, GraphComposer, GraphVisualization, NodeKind,
    RelatedKnowledge, RelatedQuery,
};
pub use report::{AnalysisReport, TeachingAnalyzer};
pub use store::{
    CorpusEntry, CorpusMatch, IndicatorWeight, KeywordEntry, MatchKind, ReferenceBundle,
    ReferenceStore, StoreError, StoreResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
