//! Didact CLI — teaching-resource analysis for Python snippets.
//!
//! Usage:
//!   didact analyze <file> [--data-dir path] [--json]
//!   didact vocab [--data-dir path]

use clap::{Parser, Subcommand};
use didact::{ReferenceBundle, ReferenceStore, TeachingAnalyzer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "didact",
    version,
    about = "Teaching-oriented code analyzer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a Python source file and print the teaching report
    Analyze {
        /// Path to the code snippet to analyze
        file: PathBuf,
        /// Directory holding the reference bundle
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the loaded keyword vocabulary with weights
    Vocab {
        /// Directory holding the reference bundle
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

/// Get the default bundle directory (~/.local/share/didact)
fn default_data_dir() -> PathBuf {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".local/share"));
    data_dir.join("didact")
}

fn load_store(data_dir: Option<PathBuf>) -> Result<ReferenceStore, String> {
    let dir = data_dir.unwrap_or_else(default_data_dir);
    ReferenceBundle::open(&dir)
        .load()
        .map_err(|e| format!("Failed to load reference bundle from {}: {}", dir.display(), e))
}

fn cmd_analyze(file: &PathBuf, data_dir: Option<PathBuf>, json: bool) -> i32 {
    let code = match std::fs::read_to_string(file) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", file.display(), e);
            return 1;
        }
    };

    let store = match load_store(data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let analyzer = TeachingAnalyzer::new(store);
    let report = analyzer.generate_teaching_resource(&code);

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => {
                eprintln!("Error: cannot serialize report: {e}");
                return 1;
            }
        }
        return 0;
    }

    if let Some(error) = &report.error {
        eprintln!("Warning: {error}");
    }

    println!("关键词：{}", report.analyzed_keywords.join(", "));
    println!();
    println!("摘要：");
    println!("{}", report.summary);
    println!();
    println!("学习建议：");
    for line in &report.knowledge_importance.learning_suggestions {
        println!("{line}");
    }
    println!();
    println!("素养分析：");
    println!("{}", report.literacy_analysis.analysis_summary);

    0
}

fn cmd_vocab(data_dir: Option<PathBuf>) -> i32 {
    let store = match load_store(data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let mut entries: Vec<_> = store.keyword_mapping().iter().collect();
    entries.sort_by(|a, b| {
        b.1.weight
            .partial_cmp(&a.1.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    for (keyword, entry) in entries {
        println!("{keyword}\t{}\t{}", entry.indicator_code, entry.weight);
    }

    0
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let code = match cli.command {
        Commands::Analyze {
            file,
            data_dir,
            json,
        } => cmd_analyze(&file, data_dir, json),
        Commands::Vocab { data_dir } => cmd_vocab(data_dir),
    };

    std::process::exit(code);
}
