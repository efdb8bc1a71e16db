//! The `starmark submit` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use starmark_core::model::WeeklyTestResult;

pub async fn execute(
    user: &str,
    month: u32,
    week: u32,
    answers: &Path,
    data_dir: Option<PathBuf>,
    config: Option<&Path>,
) -> Result<()> {
    let raw = std::fs::read_to_string(answers)
        .with_context(|| format!("Failed to read answers file: {}", answers.display()))?;
    let answers: Vec<Option<String>> =
        serde_json::from_str(&raw).context("Answers file must be a JSON array of strings or nulls")?;

    let engine = super::build_engine(config, data_dir).await?;
    let result = engine.submit_weekly_test(user, month, week, &answers).await?;

    print_result(&result);

    let completed = engine.completed_skills(user, month, week).await?;
    if !completed.is_empty() {
        println!("Skills completed as of month {month} week {week}:");
        for skill in completed {
            println!("  - {skill}");
        }
    }

    Ok(())
}

fn print_result(result: &WeeklyTestResult) {
    use comfy_table::{Cell, Table};

    println!(
        "Month {} week {}: {:.1}/{:.1} marks ({:.1}%), {}/{} correct",
        result.month,
        result.week,
        result.score,
        result.max_score,
        result.overall_percentage,
        result.correct,
        result.total,
    );

    let mut table = Table::new();
    table.set_header(vec!["Topic", "Correct", "Marks", "Percentage"]);

    for (topic, score) in &result.skill_performance {
        table.add_row(vec![
            Cell::new(topic),
            Cell::new(format!("{}/{}", score.correct, score.total)),
            Cell::new(format!("{:.1}/{:.1}", score.score, score.max_score)),
            Cell::new(format!("{:.1}%", score.percentage)),
        ]);
    }

    println!("{table}");
}
