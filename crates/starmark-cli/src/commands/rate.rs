//! The `starmark rate` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use starmark_core::model::SkillRating;

pub async fn execute(
    user: &str,
    skill: Option<&str>,
    data_dir: Option<PathBuf>,
    config: Option<&Path>,
) -> Result<()> {
    let engine = super::build_engine(config, data_dir).await?;
    let ratings = engine.get_skill_ratings(user).await?;

    if ratings.is_empty() {
        println!("No resume skills found for user {user}; nothing to rate.");
        return Ok(());
    }

    let filter = skill.map(str::to_lowercase);
    let rows: Vec<_> = ratings
        .iter()
        .filter(|(name, _)| match &filter {
            Some(f) => name.to_lowercase().contains(f),
            None => true,
        })
        .collect();

    if rows.is_empty() {
        println!("No resume skill matches the given filter.");
        return Ok(());
    }

    print_ratings(&rows);
    Ok(())
}

fn print_ratings(rows: &[(&String, &SkillRating)]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Skill", "Stars", "Average", "Evidence"]);

    for (name, rating) in rows {
        match rating {
            SkillRating::Rated {
                average_percentage,
                stars,
                evidence,
            } => {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new(star_bar(*stars)),
                    Cell::new(format!("{average_percentage:.1}%")),
                    Cell::new(format!("{} week(s)", evidence.len())),
                ]);
            }
            SkillRating::NotYetRated => {
                table.add_row(vec![
                    Cell::new(name),
                    Cell::new("not yet rated"),
                    Cell::new("-"),
                    Cell::new("-"),
                ]);
            }
        }
    }

    println!("{table}");
}

/// Renders 0..=3 stars as a fixed-width bar, e.g. `★★☆` for two of three.
fn star_bar(stars: u8) -> String {
    let stars = stars.min(3) as usize;
    format!("{}{}", "★".repeat(stars), "☆".repeat(3 - stars))
}
