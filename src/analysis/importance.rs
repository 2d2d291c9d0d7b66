//! Knowledge importance scoring
//!
//! For each ranked keyword, looks up matching teaching-corpus entries,
//! resolves a weight score through the indicator tables, assigns an
//! importance tier, partitions into important vs secondary knowledge, and
//! synthesizes learning suggestions plus a weight summary.

use super::round4;
use crate::store::ReferenceStore;
use serde::Serialize;
use std::cmp::Ordering;

/// Tier thresholds on the resolved weight score
const HIGH_THRESHOLD: f64 = 0.08;
const MEDIUM_HIGH_THRESHOLD: f64 = 0.05;
const MEDIUM_THRESHOLD: f64 = 0.03;

/// Default weight score when a keyword resolves to no indicator
const UNCLASSIFIED_SCORE: f64 = 0.1;

/// Both knowledge partitions are capped at this many records
const PARTITION_CAP: usize = 5;

/// How many important records get a full suggestion paragraph
const SUGGESTION_DETAIL_CAP: usize = 3;

/// How many secondary records get a one-line mention
const SUGGESTION_MENTION_CAP: usize = 2;

/// Description excerpt length in the suggestion paragraphs
const DESCRIPTION_EXCERPT_CHARS: usize = 100;

/// Generic study tips appended to every non-empty suggestion list
const GENERAL_TIPS: &[&str] = &[
    "• 循序渐进，先掌握重点内容再扩展到次要内容",
    "• 结合实际项目或数据集进行练习",
    "• 查阅官方文档获取更详细的信息",
    "• 参与开源项目或在线课程加深理解",
];

/// Categorical importance tier of a matched teaching record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Importance {
    #[serde(rename = "高")]
    High,
    #[serde(rename = "中高")]
    MediumHigh,
    #[serde(rename = "中")]
    Medium,
    #[serde(rename = "低")]
    Low,
}

impl Importance {
    /// Classify a resolved weight score against the fixed thresholds
    pub fn from_score(weight_score: f64) -> Self {
        if weight_score >= HIGH_THRESHOLD {
            Self::High
        } else if weight_score >= MEDIUM_HIGH_THRESHOLD {
            Self::MediumHigh
        } else if weight_score >= MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Display label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "高",
            Self::MediumHigh => "中高",
            Self::Medium => "中",
            Self::Low => "低",
        }
    }

    /// Whether this tier lands in the important partition
    pub fn is_important(&self) -> bool {
        matches!(self, Self::High | Self::MediumHigh)
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matched teaching record with its resolved weight and tier
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeRecord {
    pub keyword: String,
    pub knowledge_domain: String,
    pub description: String,
    pub weight_score: f64,
    pub indicator_name: String,
    pub indicator_level: String,
    pub importance: Importance,
}

/// Weight summary over the original ranked keyword list
#[derive(Debug, Clone, Default, Serialize)]
pub struct WeightSummary {
    /// Number of keywords with a resolvable indicator
    pub count: usize,
    /// Sum of resolved absolute weights, rounded to 4 decimal places
    pub total_weight: f64,
    /// "name(relative_weight)" display strings
    pub indicators: Vec<String>,
}

/// Result of the importance analysis
#[derive(Debug, Clone, Serialize)]
pub struct ImportanceAnalysis {
    pub important_knowledge: Vec<KnowledgeRecord>,
    pub secondary_knowledge: Vec<KnowledgeRecord>,
    pub learning_suggestions: Vec<String>,
    pub weight_summary: WeightSummary,
    /// Matched record count; may exceed the keyword count because one
    /// keyword can match several corpus entries
    pub total_analyzed: usize,
}

impl ImportanceAnalysis {
    /// Canonical empty result for a keyword-less analysis
    pub fn empty() -> Self {
        Self {
            important_knowledge: Vec::new(),
            secondary_knowledge: Vec::new(),
            learning_suggestions: vec!["未检测到有效的关键词，请检查代码内容".to_string()],
            weight_summary: WeightSummary::default(),
            total_analyzed: 0,
        }
    }
}

/// Scores ranked keywords against the teaching corpus and weight tables
#[derive(Debug)]
pub struct ImportanceScorer<'a> {
    store: &'a ReferenceStore,
}

impl<'a> ImportanceScorer<'a> {
    pub fn new(store: &'a ReferenceStore) -> Self {
        Self { store }
    }

    /// Run the full importance analysis over a ranked keyword list
    pub fn analyze(&self, keywords: &[String]) -> ImportanceAnalysis {
        if keywords.is_empty() {
            return ImportanceAnalysis::empty();
        }

        let mut records = self.match_teaching_content(keywords);

        // Stable sort: equal scores keep keyword-rank order
        records.sort_by(|a, b| {
            b.weight_score
                .partial_cmp(&a.weight_score)
                .unwrap_or(Ordering::Equal)
        });
        let total_analyzed = records.len();

        let important: Vec<KnowledgeRecord> = records
            .iter()
            .filter(|r| r.importance.is_important())
            .take(PARTITION_CAP)
            .cloned()
            .collect();
        let secondary: Vec<KnowledgeRecord> = records
            .iter()
            .filter(|r| !r.importance.is_important())
            .take(PARTITION_CAP)
            .cloned()
            .collect();

        let learning_suggestions = self.generate_suggestions(&important, &secondary);
        let weight_summary = self.weight_summary(keywords);

        ImportanceAnalysis {
            important_knowledge: important,
            secondary_knowledge: secondary,
            learning_suggestions,
            weight_summary,
            total_analyzed,
        }
    }

    /// Match every keyword against the corpus. Keywords without corpus
    /// coverage synthesize a placeholder record, so each keyword yields at
    /// least one matched record.
    fn match_teaching_content(&self, keywords: &[String]) -> Vec<KnowledgeRecord> {
        let mut records = Vec::new();

        for keyword in keywords {
            let mut matched_any = false;
            for entry in self.store.corpus_entries_for(keyword) {
                matched_any = true;
                records.push(self.build_record(
                    keyword,
                    entry.knowledge_domain.clone(),
                    entry.description.clone(),
                ));
            }
            if !matched_any {
                records.push(self.build_record(
                    keyword,
                    "未知领域".to_string(),
                    format!("暂无关于\"{keyword}\"的详细教学内容"),
                ));
            }
        }

        records
    }

    /// Resolve the weight score and indicator labels for one record;
    /// unresolvable keywords fall back to the unclassified defaults.
    fn build_record(
        &self,
        keyword: &str,
        knowledge_domain: String,
        description: String,
    ) -> KnowledgeRecord {
        let (weight_score, indicator_name, indicator_level) =
            match self.store.resolve_weight(keyword) {
                Some(weight) => (
                    weight.absolute_weight,
                    weight.name.clone(),
                    weight.level.clone(),
                ),
                None => (UNCLASSIFIED_SCORE, "未分类".to_string(), "未知".to_string()),
            };

        KnowledgeRecord {
            keyword: keyword.to_string(),
            knowledge_domain,
            description,
            weight_score,
            indicator_name,
            indicator_level,
            importance: Importance::from_score(weight_score),
        }
    }

    fn generate_suggestions(
        &self,
        important: &[KnowledgeRecord],
        secondary: &[KnowledgeRecord],
    ) -> Vec<String> {
        let mut suggestions = Vec::new();

        if !important.is_empty() {
            suggestions.push("🎯 **重点学习内容（按重要性排序）：**".to_string());
            for (i, record) in important.iter().take(SUGGESTION_DETAIL_CAP).enumerate() {
                suggestions.push(format!(
                    "{}. **{}** ({})",
                    i + 1,
                    record.keyword,
                    record.knowledge_domain
                ));
                let excerpt: String = record
                    .description
                    .chars()
                    .take(DESCRIPTION_EXCERPT_CHARS)
                    .collect();
                suggestions.push(format!("   {excerpt}..."));

                if let Some(tip) = self.store.domain_tip(&record.knowledge_domain) {
                    suggestions.push(format!("   💡 {tip}"));
                }
            }
        }

        if !secondary.is_empty() {
            suggestions.push("\n📚 **次要学习内容：**".to_string());
            for record in secondary.iter().take(SUGGESTION_MENTION_CAP) {
                suggestions.push(format!("• **{}**: 了解基本概念和使用方法", record.keyword));
            }
        }

        suggestions.push("\n💡 **通用学习建议：**".to_string());
        for tip in GENERAL_TIPS {
            suggestions.push(tip.to_string());
        }

        suggestions
    }

    /// Re-walk the original ranked keyword list (not the deduplicated
    /// matched records) accumulating resolved absolute weights.
    fn weight_summary(&self, keywords: &[String]) -> WeightSummary {
        let mut total_weight = 0.0;
        let mut count = 0;
        let mut indicators = Vec::new();

        for keyword in keywords {
            if let Some(weight) = self.store.resolve_weight(keyword) {
                total_weight += weight.absolute_weight;
                count += 1;
                indicators.push(format!("{}({})", weight.name, weight.relative_weight));
            }
        }

        WeightSummary {
            count,
            total_weight: round4(total_weight),
            indicators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ConceptGraph;
    use crate::store::{CorpusEntry, IndicatorWeight, KeywordEntry};
    use std::collections::HashMap;

    fn store_with(
        keywords: &[(&str, &str, f64)],
        indicators: &[(&str, f64, f64, &str, &str)],
        corpus: &[(&str, &[&str], &str)],
    ) -> ReferenceStore {
        let mapping: HashMap<String, KeywordEntry> = keywords
            .iter()
            .map(|(kw, code, weight)| {
                (
                    kw.to_string(),
                    KeywordEntry {
                        indicator_code: code.to_string(),
                        weight: *weight,
                        parent_indicator: "B1".to_string(),
                    },
                )
            })
            .collect();
        let weights: HashMap<String, IndicatorWeight> = indicators
            .iter()
            .map(|(code, abs, rel, name, level)| {
                (
                    code.to_string(),
                    IndicatorWeight {
                        absolute_weight: *abs,
                        relative_weight: *rel,
                        name: name.to_string(),
                        level: level.to_string(),
                    },
                )
            })
            .collect();
        let corpus: Vec<CorpusEntry> = corpus
            .iter()
            .map(|(domain, kws, desc)| CorpusEntry {
                knowledge_domain: domain.to_string(),
                keywords: kws.iter().map(|k| k.to_string()).collect(),
                description: desc.to_string(),
            })
            .collect();
        ReferenceStore::new(mapping, weights, corpus, ConceptGraph::new())
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Importance::from_score(0.08), Importance::High);
        assert_eq!(Importance::from_score(0.05), Importance::MediumHigh);
        assert_eq!(Importance::from_score(0.03), Importance::Medium);
        assert_eq!(Importance::from_score(0.02), Importance::Low);
    }

    #[test]
    fn test_keyword_without_corpus_gets_placeholder() {
        let store = store_with(
            &[("fit", "X1", 0.7)],
            &[("X1", 0.09, 0.3, "模型训练", "C12")],
            &[],
        );
        let result = ImportanceScorer::new(&store).analyze(&["fit".to_string()]);

        assert_eq!(result.total_analyzed, 1);
        let record = &result.important_knowledge[0];
        assert_eq!(record.knowledge_domain, "未知领域");
        assert_eq!(record.description, "暂无关于\"fit\"的详细教学内容");
        assert_eq!(record.importance, Importance::High);
    }

    #[test]
    fn test_unresolvable_keyword_defaults_to_unclassified() {
        // "mystery" maps to an indicator missing from the weight table
        let store = store_with(
            &[("mystery", "Z9", 0.5)],
            &[],
            &[("某领域", &["mystery"], "描述")],
        );
        let result = ImportanceScorer::new(&store).analyze(&["mystery".to_string()]);

        let record = &result.important_knowledge[0];
        assert_eq!(record.weight_score, 0.1);
        assert_eq!(record.indicator_name, "未分类");
        assert_eq!(record.indicator_level, "未知");
        assert_eq!(record.importance, Importance::High); // 0.1 >= 0.08
    }

    #[test]
    fn test_partitions_capped_at_five() {
        let keywords: Vec<(String, String)> = (0..7)
            .map(|i| (format!("kw{i}"), format!("X{i}")))
            .collect();
        let keyword_rows: Vec<(&str, &str, f64)> = keywords
            .iter()
            .map(|(kw, code)| (kw.as_str(), code.as_str(), 0.5))
            .collect();
        let indicator_rows: Vec<(&str, f64, f64, &str, &str)> = keywords
            .iter()
            .map(|(_, code)| (code.as_str(), 0.09, 0.3, "指标", "C11"))
            .collect();
        let store = store_with(&keyword_rows, &indicator_rows, &[]);

        let ranked: Vec<String> = keywords.iter().map(|(kw, _)| kw.clone()).collect();
        let result = ImportanceScorer::new(&store).analyze(&ranked);

        assert_eq!(result.total_analyzed, 7);
        assert_eq!(result.important_knowledge.len(), 5);
        assert!(result.secondary_knowledge.is_empty());
    }

    #[test]
    fn test_records_sorted_descending_by_weight() {
        let store = store_with(
            &[("low", "L1", 0.2), ("high", "H1", 0.9)],
            &[
                ("L1", 0.03, 0.1, "次要", "C21"),
                ("H1", 0.09, 0.3, "重要", "C11"),
            ],
            &[
                ("领域A", &["low"], "低权重描述"),
                ("领域B", &["high"], "高权重描述"),
            ],
        );
        let result = ImportanceScorer::new(&store)
            .analyze(&["high".to_string(), "low".to_string()]);

        assert_eq!(result.important_knowledge[0].keyword, "high");
        assert_eq!(result.secondary_knowledge[0].keyword, "low");
    }

    #[test]
    fn test_one_keyword_can_match_several_entries() {
        let store = store_with(
            &[("groupby", "X1", 0.9)],
            &[("X1", 0.09, 0.3, "数据变换", "C11")],
            &[
                ("pandas分组聚合", &["groupby"], "分组聚合。"),
                ("sklearn评估", &["groupby"], "评估中的分组。"),
            ],
        );
        let result = ImportanceScorer::new(&store).analyze(&["groupby".to_string()]);
        assert_eq!(result.total_analyzed, 2);
        assert_eq!(result.important_knowledge.len(), 2);
    }

    #[test]
    fn test_suggestions_structure() {
        let store = store_with(
            &[("groupby", "X1", 0.9), ("iloc", "X2", 0.3)],
            &[
                ("X1", 0.09, 0.3, "数据变换", "C11"),
                ("X2", 0.02, 0.1, "索引", "C11"),
            ],
            &[
                ("pandas分组聚合", &["groupby"], "分组聚合用于按键拆分数据并汇总。"),
                ("DataFrame索引", &["iloc"], "按位置索引行列。"),
            ],
        );
        let result = ImportanceScorer::new(&store)
            .analyze(&["groupby".to_string(), "iloc".to_string()]);

        let suggestions = &result.learning_suggestions;
        assert_eq!(suggestions[0], "🎯 **重点学习内容（按重要性排序）：**");
        assert_eq!(suggestions[1], "1. **groupby** (pandas分组聚合)");
        assert!(suggestions[2].starts_with("   分组聚合"));
        assert!(suggestions[2].ends_with("..."));
        // Domain tip resolved from the pandas category
        assert_eq!(suggestions[3], "   💡 建议使用真实数据集进行数据处理练习");
        assert!(suggestions.contains(&"\n📚 **次要学习内容：**".to_string()));
        assert!(suggestions.contains(&"\n💡 **通用学习建议：**".to_string()));
        // The four generic tips always close the list
        assert_eq!(suggestions[suggestions.len() - 4..].len(), 4);
        assert_eq!(
            suggestions.last().unwrap(),
            "• 参与开源项目或在线课程加深理解"
        );
    }

    #[test]
    fn test_weight_summary_walks_ranked_list() {
        let store = store_with(
            &[("a", "X1", 0.9), ("b", "X1", 0.8), ("c", "MISSING", 0.7)],
            &[("X1", 0.09, 0.3, "数据变换", "C11")],
            &[],
        );
        let result = ImportanceScorer::new(&store).analyze(&[
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);

        // a and b both resolve through X1; c's indicator is missing
        assert_eq!(result.weight_summary.count, 2);
        assert_eq!(result.weight_summary.total_weight, 0.18);
        assert_eq!(
            result.weight_summary.indicators,
            vec!["数据变换(0.3)".to_string(), "数据变换(0.3)".to_string()]
        );
    }

    #[test]
    fn test_empty_keywords_yield_canonical_empty() {
        let store = store_with(&[], &[], &[]);
        let result = ImportanceScorer::new(&store).analyze(&[]);

        assert!(result.important_knowledge.is_empty());
        assert!(result.secondary_knowledge.is_empty());
        assert_eq!(
            result.learning_suggestions,
            vec!["未检测到有效的关键词，请检查代码内容".to_string()]
        );
        assert_eq!(result.weight_summary.count, 0);
        assert_eq!(result.total_analyzed, 0);
    }
}
