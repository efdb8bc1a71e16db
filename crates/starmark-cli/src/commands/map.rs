//! The `starmark map` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use starmark_core::model::SkillWeekMapping;

pub async fn execute(
    user: &str,
    data_dir: Option<PathBuf>,
    config: Option<&Path>,
) -> Result<()> {
    let engine = super::build_engine(config, data_dir).await?;
    let mapping = engine.generate_skill_mappings(user).await?;

    if mapping.months.is_empty() {
        println!("No roadmap found for user {user}; nothing to map.");
        return Ok(());
    }

    print_mapping(&mapping);
    Ok(())
}

fn print_mapping(mapping: &SkillWeekMapping) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Month", "Skill", "Weeks"]);

    for (month, skill, weeks) in mapping.rows() {
        let weeks = weeks
            .iter()
            .map(|w| w.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![Cell::new(month), Cell::new(skill), Cell::new(weeks)]);
    }

    println!("{table}");
}
