//! The `starmark validate` command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use starmark_core::model::{Roadmap, WeeklyTest};
use starmark_core::validate::{validate_roadmap, validate_weekly_test, ValidationWarning};
use starmark_store::JsonStore;

pub async fn execute(
    roadmap: Option<PathBuf>,
    test: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    if roadmap.is_none() && test.is_none() && data_dir.is_none() {
        bail!("nothing to validate; pass --roadmap, --test, or --data-dir");
    }

    let mut total_warnings = 0;

    if let Some(path) = roadmap {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read roadmap file: {}", path.display()))?;
        let roadmap: Roadmap = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse roadmap file: {}", path.display()))?;

        println!("Roadmap: {} ({} months)", path.display(), roadmap.months.len());
        total_warnings += print_warnings(&validate_roadmap(&roadmap));
    }

    if let Some(path) = test {
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read test file: {}", path.display()))?;
        let test: WeeklyTest = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse test file: {}", path.display()))?;

        println!(
            "Test: {} (month {} week {}, {} questions)",
            path.display(),
            test.month,
            test.week,
            test.questions.len()
        );
        total_warnings += print_warnings(&validate_weekly_test(&test));
    }

    if let Some(dir) = data_dir {
        let store = JsonStore::new(&dir);
        let issues = store.audit().await?;
        println!("Data directory: {}", dir.display());
        for issue in &issues {
            println!("  [{}] WARNING: {}", issue.path.display(), issue.problem);
        }
        total_warnings += issues.len();
    }

    if total_warnings == 0 {
        println!("All documents valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}

fn print_warnings(warnings: &[ValidationWarning]) -> usize {
    for w in warnings {
        let prefix = w
            .context
            .as_ref()
            .map(|c| format!("  [{c}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }
    warnings.len()
}
