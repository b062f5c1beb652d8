//! Analyze command - extract fields from one page of OCR lines.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use hoken_core::rules;
use hoken_core::{Analyzer, AnalyzerKind, Page};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input file: JSON page of OCR lines
    #[arg(required = true)]
    input: PathBuf,

    /// Document category
    #[arg(short, long, value_enum, default_value = "main")]
    category: Category,

    /// Custom pattern table (JSON); builtin table when omitted
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum Category {
    /// 主保険 main insurance card
    Main,
    /// 公費 public aid certificate
    PublicAid,
}

impl From<Category> for AnalyzerKind {
    fn from(category: Category) -> Self {
        match category {
            Category::Main => AnalyzerKind::MainCard,
            Category::PublicAid => AnalyzerKind::PublicAid,
        }
    }
}

pub fn run(args: AnalyzeArgs) -> anyhow::Result<()> {
    let content = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let page: Page = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse page from {}", args.input.display()))?;

    let analyzer = match &args.table {
        Some(path) => {
            let table = rules::load_table(path)?;
            Analyzer::with_table(args.category.into(), table)?
        }
        None => Analyzer::new(args.category.into())?,
    };

    info!(lines = page.len(), category = ?args.category, "analyzing page");
    let info = analyzer.analyze(&page);
    let json = serde_json::to_string_pretty(&info.to_json(analyzer.fields()))?;

    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
