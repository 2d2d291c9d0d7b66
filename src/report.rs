//! Report assembly: the end-to-end analysis entry point
//!
//! `TeachingAnalyzer` is the explicit context object wiring extraction,
//! ranking, scoring, and graph composition into one call. The public entry
//! point never fails: the no-keyword case and any internal fault are
//! folded into an error-bearing but structurally complete report.

use crate::analysis::{ImportanceAnalysis, ImportanceScorer, LiteracyAnalysis, LiteracyScorer};
use crate::extract::{rank_keywords, KeywordExtractor};
use crate::graph::{GraphComposer, GraphVisualization};
use crate::store::ReferenceStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::any::Any;
use uuid::Uuid;

/// The composite teaching-resource report, one per analysis call
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Unique id of this analysis invocation
    pub report_id: Uuid,
    /// Ranked keywords, highest declared weight first
    pub analyzed_keywords: Vec<String>,
    pub knowledge_importance: ImportanceAnalysis,
    pub literacy_analysis: LiteracyAnalysis,
    pub knowledge_graph: GraphVisualization,
    /// Echo of the analyzed snippet
    pub original_code: String,
    /// Short narrative over the sub-analyses
    pub summary: String,
    /// Present only on failure paths; the report stays structurally
    /// complete either way
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Error-bearing report with the canonical empty sub-analyses
    fn with_error(code: &str, error: String) -> Self {
        Self {
            report_id: Uuid::new_v4(),
            analyzed_keywords: Vec::new(),
            knowledge_importance: ImportanceAnalysis::empty(),
            literacy_analysis: LiteracyAnalysis::empty(),
            knowledge_graph: GraphVisualization::empty(),
            original_code: code.to_string(),
            summary: String::new(),
            error: Some(error),
            generated_at: Utc::now(),
        }
    }
}

/// End-to-end analyzer over a loaded reference store.
///
/// Construct once at startup and pass by reference into each call; every
/// analysis produces a fresh report and a fresh enhanced graph, so
/// sequential requests never share mutable state.
pub struct TeachingAnalyzer {
    store: ReferenceStore,
    extractor: KeywordExtractor,
    composer: GraphComposer,
}

impl TeachingAnalyzer {
    /// Create an analyzer over a reference store
    pub fn new(store: ReferenceStore) -> Self {
        let composer = GraphComposer::new(store.graph().clone());
        Self {
            store,
            extractor: KeywordExtractor::new(),
            composer,
        }
    }

    /// The underlying reference store
    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    /// Analyze a code snippet into a teaching-resource report.
    ///
    /// Never panics past this point: any fault below becomes an
    /// error-bearing report instead.
    pub fn generate_teaching_resource(&self, code: &str) -> AnalysisReport {
        let outcome =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.analyze(code)));
        match outcome {
            Ok(report) => report,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(error = %message, "analysis failed");
                AnalysisReport::with_error(code, format!("分析过程中出现错误: {message}"))
            }
        }
    }

    fn analyze(&self, code: &str) -> AnalysisReport {
        let tokens = self.extractor.extract(code, self.store.vocabulary());
        let keywords = rank_keywords(&tokens, self.store.keyword_mapping());
        tracing::debug!(tokens = tokens.len(), keywords = keywords.len(), "extraction done");

        if keywords.is_empty() {
            return AnalysisReport::with_error(code, "未提取到有效关键词".to_string());
        }

        let knowledge_importance = ImportanceScorer::new(&self.store).analyze(&keywords);
        let literacy_analysis = LiteracyScorer::new(&self.store).analyze(&keywords);

        let enhanced = self
            .composer
            .enhance_with_keywords(&keywords, self.store.corpus());
        let knowledge_graph = self
            .composer
            .visualize_knowledge_paths(&enhanced, &keywords[0]);

        let summary = compose_summary(&keywords, &knowledge_importance, &literacy_analysis);

        AnalysisReport {
            report_id: Uuid::new_v4(),
            analyzed_keywords: keywords,
            knowledge_importance,
            literacy_analysis,
            knowledge_graph,
            original_code: code.to_string(),
            summary,
            error: None,
            generated_at: Utc::now(),
        }
    }
}

fn compose_summary(
    keywords: &[String],
    importance: &ImportanceAnalysis,
    literacy: &LiteracyAnalysis,
) -> String {
    let mut parts = vec![format!("从代码中提取了 {} 个关键词", keywords.len())];

    if importance.total_analyzed > 0 {
        parts.push(format!(
            "识别出 {} 个重点知识点",
            importance.important_knowledge.len()
        ));
    }

    if literacy.top_dimension.name != "无" {
        parts.push(format!("主要能力维度：{}", literacy.top_dimension.name));
    }

    parts.join("\n")
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知错误".to_string()
    }
}
