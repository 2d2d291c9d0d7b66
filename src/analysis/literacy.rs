//! Literacy/competency scoring
//!
//! Aggregates indicator weights by their competency dimension ("level"),
//! determines the dominant dimension, and produces a per-dimension score
//! table plus a narrative summary.

use super::round4;
use crate::store::ReferenceStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Resolve a dimension code to its display name; unknown codes display raw
pub fn level_display_name(code: &str) -> &str {
    match code {
        "B1" => "系统性认知",
        "B2" => "构建式能力",
        "B3" => "创造与思辨",
        "B4" => "人本与责任",
        "C11" => "数据与知识",
        "C12" => "算法与模型",
        "C13" => "算力与系统",
        "C14" => "交叉与应用",
        "C15" => "可信与安全",
        "C21" => "问题抽象与定义",
        "C22" => "分解与模块化",
        "C23" => "工具选择与模型构建",
        "C24" => "验证、评估与迭代",
        "C25" => "结果解释与沟通",
        other => other,
    }
}

/// The dominant competency dimension
#[derive(Debug, Clone, Serialize)]
pub struct TopDimension {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub score: f64,
}

impl TopDimension {
    /// The "none" dimension reported when nothing scored
    pub fn none() -> Self {
        Self {
            name: "无".to_string(),
            code: None,
            score: 0.0,
        }
    }
}

/// Per-keyword indicator breakdown
#[derive(Debug, Clone, Serialize)]
pub struct KeywordBreakdown {
    pub keyword: String,
    pub matched_indicator: Option<String>,
    pub indicator_name: Option<String>,
    pub weight: f64,
    pub level: Option<String>,
}

/// Result of the literacy analysis
#[derive(Debug, Clone, Serialize)]
pub struct LiteracyAnalysis {
    pub top_dimension: TopDimension,
    /// Dimension code -> accumulated weight, rounded to 4 decimal places
    pub dimension_scores: BTreeMap<String, f64>,
    /// Indicator codes in first-seen order, deduplicated
    pub matched_indicators: Vec<String>,
    pub analysis_summary: String,
    pub detailed_analysis: Vec<KeywordBreakdown>,
}

impl LiteracyAnalysis {
    /// Canonical empty result for a keyword-less analysis
    pub fn empty() -> Self {
        Self {
            top_dimension: TopDimension::none(),
            dimension_scores: BTreeMap::new(),
            matched_indicators: Vec::new(),
            analysis_summary: "未检测到关键词，无法进行素养分析".to_string(),
            detailed_analysis: Vec::new(),
        }
    }
}

/// Scores ranked keywords into competency dimensions
#[derive(Debug)]
pub struct LiteracyScorer<'a> {
    store: &'a ReferenceStore,
}

impl<'a> LiteracyScorer<'a> {
    pub fn new(store: &'a ReferenceStore) -> Self {
        Self { store }
    }

    /// Run the literacy analysis over a ranked keyword list
    pub fn analyze(&self, keywords: &[String]) -> LiteracyAnalysis {
        if keywords.is_empty() {
            return LiteracyAnalysis::empty();
        }

        let matched_indicators = self.matched_indicators(keywords);
        let accumulated = self.accumulate_dimension_scores(&matched_indicators);
        let top_dimension = top_dimension(&accumulated);
        let analysis_summary =
            self.summarize(keywords, &matched_indicators, &accumulated, &top_dimension);
        let detailed_analysis = self.detail_keywords(keywords);

        let dimension_scores: BTreeMap<String, f64> = accumulated
            .iter()
            .map(|(level, score)| (level.clone(), round4(*score)))
            .collect();

        LiteracyAnalysis {
            top_dimension,
            dimension_scores,
            matched_indicators,
            analysis_summary,
            detailed_analysis,
        }
    }

    /// Map keywords to indicator codes, deduplicated in first-seen order
    fn matched_indicators(&self, keywords: &[String]) -> Vec<String> {
        let mut indicators: Vec<String> = Vec::new();
        for keyword in keywords {
            if let Some(entry) = self.store.keyword_mapping().get(keyword) {
                if !indicators.contains(&entry.indicator_code) {
                    indicators.push(entry.indicator_code.clone());
                }
            }
        }
        indicators
    }

    /// Additive per-level accumulation, insertion-ordered so score ties
    /// resolve to the first dimension encountered
    fn accumulate_dimension_scores(&self, indicators: &[String]) -> Vec<(String, f64)> {
        let mut accumulated: Vec<(String, f64)> = Vec::new();
        for code in indicators {
            if let Some(weight) = self.store.weight_mapping().get(code) {
                match accumulated.iter_mut().find(|(level, _)| level == &weight.level) {
                    Some((_, score)) => *score += weight.absolute_weight,
                    None => accumulated.push((weight.level.clone(), weight.absolute_weight)),
                }
            }
        }
        accumulated
    }

    fn summarize(
        &self,
        keywords: &[String],
        matched_indicators: &[String],
        accumulated: &[(String, f64)],
        top_dimension: &TopDimension,
    ) -> String {
        let mut parts = vec![format!(
            "检测到 {} 个关键词，匹配 {} 个能力指标",
            keywords.len(),
            matched_indicators.len()
        )];

        if top_dimension.name != "无" {
            parts.push(format!(
                "主要能力维度：{}（得分：{}）",
                top_dimension.name, top_dimension.score
            ));
        }

        if !accumulated.is_empty() {
            parts.push("各维度得分情况：".to_string());
            let mut sorted = accumulated.to_vec();
            sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            for (level, score) in sorted {
                parts.push(format!("- {}：{:.4}", level_display_name(&level), score));
            }
        }

        parts.join("\n")
    }

    /// Per-keyword indicator/weight breakdown
    fn detail_keywords(&self, keywords: &[String]) -> Vec<KeywordBreakdown> {
        keywords
            .iter()
            .map(|keyword| match self.store.keyword_mapping().get(keyword) {
                Some(entry) => {
                    let weight = self.store.weight_mapping().get(&entry.indicator_code);
                    KeywordBreakdown {
                        keyword: keyword.clone(),
                        matched_indicator: Some(entry.indicator_code.clone()),
                        indicator_name: weight.map(|w| w.name.clone()),
                        weight: weight.map(|w| w.absolute_weight).unwrap_or(0.0),
                        level: weight.map(|w| w.level.clone()),
                    }
                }
                None => KeywordBreakdown {
                    keyword: keyword.clone(),
                    matched_indicator: None,
                    indicator_name: None,
                    weight: 0.0,
                    level: None,
                },
            })
            .collect()
    }
}

/// Pick the dimension with the maximum accumulated score; strictly-greater
/// comparison keeps the first-seen dimension on ties.
fn top_dimension(accumulated: &[(String, f64)]) -> TopDimension {
    let mut best: Option<&(String, f64)> = None;
    for entry in accumulated {
        match best {
            Some((_, score)) if entry.1 <= *score => {}
            _ => best = Some(entry),
        }
    }

    match best {
        Some((level, score)) => TopDimension {
            name: level_display_name(level).to_string(),
            code: Some(level.clone()),
            score: round4(*score),
        },
        None => TopDimension::none(),
    }
}
