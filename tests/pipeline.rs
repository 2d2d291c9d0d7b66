//! End-to-end pipeline properties over a synthetic reference store.

use didact::{
    ConceptGraph, CorpusEntry, IndicatorWeight, KeywordEntry, ReferenceBundle, ReferenceStore,
    TeachingAnalyzer,
};
use std::collections::HashMap;

/// Build a small but realistic reference store: five keywords across three
/// indicators and two dimensions, a corpus with shared and missing
/// coverage, and a concept graph containing the corpus domains.
fn build_store() -> ReferenceStore {
    let mut mapping = HashMap::new();
    for (keyword, code, weight) in [
        ("groupby", "X1", 0.9),
        ("merge", "X1", 0.8),
        ("read_csv", "X2", 0.6),
        ("fit", "Y1", 0.7),
        ("predict", "Y1", 0.7),
    ] {
        mapping.insert(
            keyword.to_string(),
            KeywordEntry {
                indicator_code: code.to_string(),
                weight,
                parent_indicator: "B1".to_string(),
            },
        );
    }

    let mut weights = HashMap::new();
    for (code, absolute, relative, name, level) in [
        ("X1", 0.09, 0.3, "数据变换", "C11"),
        ("X2", 0.04, 0.2, "数据读取", "C11"),
        ("Y1", 0.06, 0.25, "模型训练", "C12"),
    ] {
        weights.insert(
            code.to_string(),
            IndicatorWeight {
                absolute_weight: absolute,
                relative_weight: relative,
                name: name.to_string(),
                level: level.to_string(),
            },
        );
    }

    let corpus = vec![
        CorpusEntry {
            knowledge_domain: "pandas分组聚合".to_string(),
            keywords: vec!["groupby".to_string(), "merge".to_string()],
            description: "分组聚合用于按键拆分数据、应用函数并汇总结果。".to_string(),
        },
        CorpusEntry {
            knowledge_domain: "pandas与CSV".to_string(),
            keywords: vec!["read_csv".to_string()],
            description: "read_csv将CSV文件读入DataFrame。".to_string(),
        },
        CorpusEntry {
            knowledge_domain: "sklearn模型训练".to_string(),
            keywords: vec!["fit".to_string(), "predict".to_string()],
            description: "fit在训练集上估计模型参数，predict产出预测。".to_string(),
        },
    ];

    let mut graph = ConceptGraph::new();
    for domain in ["pandas分组聚合", "pandas与CSV", "sklearn模型训练", "数据分析", "机器学习"] {
        graph.add_concept(domain);
    }
    graph.add_edge("pandas分组聚合", "数据分析", "part_of");
    graph.add_edge("pandas与CSV", "数据分析", "part_of");
    graph.add_edge("sklearn模型训练", "机器学习", "part_of");
    graph.add_edge("数据分析", "机器学习", "related_to");

    ReferenceStore::new(mapping, weights, corpus, graph)
}

const SAMPLE: &str = r#"
import pandas as pd
from sklearn.ensemble import RandomForestClassifier

data = pd.read_csv('data.csv')
grouped = data.groupby('city').mean()

model = RandomForestClassifier()
model.fit(grouped, data['target'])
pred = model.predict(grouped)
"#;

fn report_for(code: &str) -> didact::AnalysisReport {
    TeachingAnalyzer::new(build_store()).generate_teaching_resource(code)
}

#[test]
fn report_is_structurally_complete_for_any_input() {
    for input in [SAMPLE, "", "def broken(:", "no keywords here", "数据 = 1"] {
        let report = report_for(input);
        // Every field present and internally consistent, error or not
        assert_eq!(report.original_code, input);
        assert!(report.error.is_some() || !report.analyzed_keywords.is_empty());
        assert!(!report.knowledge_importance.learning_suggestions.is_empty());
        assert!(!report.literacy_analysis.analysis_summary.is_empty());
    }
}

#[test]
fn ranking_is_weight_descending() {
    let report = report_for(SAMPLE);
    assert_eq!(
        report.analyzed_keywords,
        vec!["groupby", "fit", "predict", "read_csv"]
    );
}

#[test]
fn analyzed_keywords_stay_within_the_mapping() {
    let analyzer = TeachingAnalyzer::new(build_store());
    let report = analyzer.generate_teaching_resource(SAMPLE);

    // pandas, RandomForestClassifier, mean... are extracted but unmapped
    for keyword in &report.analyzed_keywords {
        assert!(analyzer.store().contains_keyword(keyword));
    }
}

#[test]
fn importance_tiers_follow_the_thresholds() {
    let report = report_for(SAMPLE);
    let importance = &report.knowledge_importance;

    // groupby resolves X1=0.09 -> 高; fit/predict resolve Y1=0.06 -> 中高
    let groupby = importance
        .important_knowledge
        .iter()
        .find(|r| r.keyword == "groupby")
        .unwrap();
    assert_eq!(groupby.importance.as_str(), "高");
    assert_eq!(groupby.weight_score, 0.09);

    let fit = importance
        .important_knowledge
        .iter()
        .find(|r| r.keyword == "fit")
        .unwrap();
    assert_eq!(fit.importance.as_str(), "中高");

    // read_csv resolves X2=0.04 -> 中, lands in the secondary partition
    let read_csv = importance
        .secondary_knowledge
        .iter()
        .find(|r| r.keyword == "read_csv")
        .unwrap();
    assert_eq!(read_csv.importance.as_str(), "中");
}

#[test]
fn partitions_never_exceed_five_records() {
    let report = report_for(SAMPLE);
    assert!(report.knowledge_importance.important_knowledge.len() <= 5);
    assert!(report.knowledge_importance.secondary_knowledge.len() <= 5);
}

#[test]
fn dimension_scores_are_permutation_invariant() {
    let analyzer = TeachingAnalyzer::new(build_store());

    let forward = analyzer.generate_teaching_resource(SAMPLE);
    // Same calls, reversed order in the source
    let reversed = analyzer.generate_teaching_resource(
        "pred = model.predict(g)\nmodel.fit(g, y)\ng = data.groupby('c')\ndata = pd.read_csv('d')\n",
    );

    assert_eq!(
        forward.literacy_analysis.dimension_scores,
        reversed.literacy_analysis.dimension_scores
    );
}

#[test]
fn groupby_round_trip() {
    let report = report_for("df.groupby('city').sum()\n");

    assert_eq!(report.analyzed_keywords, vec!["groupby"]);
    assert_eq!(
        report.knowledge_importance.important_knowledge[0]
            .importance
            .as_str(),
        "高"
    );
    assert!(report.literacy_analysis.dimension_scores["C11"] >= 0.09);
    assert_eq!(
        report.literacy_analysis.top_dimension.code.as_deref(),
        Some("C11")
    );
    assert_eq!(report.literacy_analysis.top_dimension.name, "数据与知识");
}

#[test]
fn empty_input_produces_canonical_empty_result() {
    let report = report_for("");

    assert_eq!(report.error.as_deref(), Some("未提取到有效关键词"));
    assert!(report.literacy_analysis.dimension_scores.is_empty());
    assert_eq!(report.literacy_analysis.top_dimension.name, "无");
    assert_eq!(report.knowledge_importance.total_analyzed, 0);
    assert_eq!(
        report.knowledge_importance.learning_suggestions,
        vec!["未检测到有效的关键词，请检查代码内容".to_string()]
    );
}

#[test]
fn knowledge_graph_paths_are_capped_and_nontrivial() {
    let report = report_for(SAMPLE);
    assert!(!report.knowledge_graph.nodes.is_empty());

    // Re-run the extraction explicitly to inspect paths
    let analyzer = TeachingAnalyzer::new(build_store());
    let store = analyzer.store();
    let composer = didact::GraphComposer::new(store.graph().clone());
    let enhanced = composer.enhance_with_keywords(
        &["groupby".to_string(), "fit".to_string()],
        store.corpus(),
    );
    let related = didact::RelatedQuery::from("groupby").execute(&enhanced);

    assert!(related.paths.len() <= 5);
    for path in &related.paths {
        assert!(path.len() > 1);
        assert_eq!(path[0], "groupby");
    }
}

#[test]
fn enhancement_is_idempotent_for_existing_nodes() {
    let store = build_store();
    let composer = didact::GraphComposer::new(store.graph().clone());

    let keywords = vec!["groupby".to_string()];
    let once = composer.enhance_with_keywords(&keywords, store.corpus());
    let twice = composer.enhance_with_keywords(
        &["groupby".to_string(), "groupby".to_string()],
        store.corpus(),
    );

    assert_eq!(once.node_count(), twice.node_count());
    assert_eq!(
        once.node("groupby").unwrap().descriptions,
        twice.node("groupby").unwrap().descriptions
    );
}

#[test]
fn weight_summary_matches_ranked_keywords() {
    let report = report_for(SAMPLE);
    let summary = &report.knowledge_importance.weight_summary;

    // groupby(X1) + fit(Y1) + predict(Y1) + read_csv(X2)
    assert_eq!(summary.count, 4);
    assert_eq!(summary.total_weight, 0.25);
    assert_eq!(summary.indicators.len(), 4);
    assert_eq!(summary.indicators[0], "数据变换(0.3)");
}

#[test]
fn loader_round_trips_a_bundle() {
    let dir = tempfile::tempdir().unwrap();

    std::fs::write(
        dir.path().join("keyword_mapping.json"),
        r#"[{"keyword": "groupby", "indicator_code": "X1", "weight": 0.9, "parent_indicator": "B1"}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("weights.json"),
        r#"[{"indicator_code": "X1", "absolute_weight": 0.09, "relative_weight": 0.3, "name": "数据变换", "level": "C11"}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("teaching_corpus.json"),
        r#"[{"knowledge_domain": "pandas分组聚合", "keywords": ["groupby"], "description": "分组聚合。"}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("concept_graph.json"),
        r#"[{"head": "pandas分组聚合", "tail": "数据分析", "relation": "part_of"}]"#,
    )
    .unwrap();

    let store = ReferenceBundle::open(dir.path()).load().unwrap();
    let analyzer = TeachingAnalyzer::new(store);
    let report = analyzer.generate_teaching_resource("df.groupby('x')\n");

    assert!(report.error.is_none());
    assert_eq!(report.analyzed_keywords, vec!["groupby"]);
    assert_eq!(
        report.knowledge_importance.important_knowledge[0].knowledge_domain,
        "pandas分组聚合"
    );
}
