//! The `starmark init` command.

use std::path::PathBuf;

use anyhow::Result;

use starmark_core::model::{MonthPlan, Question, ResumeProfile, Roadmap, WeeklyTest};
use starmark_store::JsonStore;

/// Demo user seeded by `init`; any stored variant of this number
/// resolves to it.
const DEMO_USER: &str = "8864862270";

pub async fn execute(dir: Option<PathBuf>) -> Result<()> {
    let root = dir.unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&root)?;

    let config_path = root.join("starmark.toml");
    if config_path.exists() {
        println!("starmark.toml already exists, skipping.");
    } else {
        std::fs::write(&config_path, SAMPLE_CONFIG)?;
        println!("Created starmark.toml");
    }

    let store = JsonStore::new(root.join("starmark-data"));
    if store.root().join(DEMO_USER).exists() {
        println!("Demo records already exist, skipping.");
    } else {
        store.put_roadmap(DEMO_USER, &demo_roadmap()).await?;
        store.put_weekly_test(DEMO_USER, &demo_test()).await?;
        store.put_resume(DEMO_USER, &demo_resume()).await?;
        println!(
            "Seeded demo records for user {DEMO_USER} under {}",
            store.root().display()
        );
    }

    let answers_path = root.join("answers-example.json");
    if answers_path.exists() {
        println!("answers-example.json already exists, skipping.");
    } else {
        std::fs::write(&answers_path, DEMO_ANSWERS)?;
        println!("Created answers-example.json");
    }

    println!("\nNext steps:");
    println!("  1. starmark map --user {DEMO_USER}");
    println!(
        "  2. starmark submit --user {DEMO_USER} --month 1 --week 2 \
         --answers answers-example.json"
    );
    println!("  3. starmark rate --user {DEMO_USER}");

    Ok(())
}

fn demo_roadmap() -> Roadmap {
    let mut roadmap = Roadmap::default();
    roadmap.months.insert(
        "month_1".to_string(),
        MonthPlan {
            skill_focus: "Python, SQL, Pandas".to_string(),
            weekly_plan: vec![
                "Week 1: Python basics, syntax, and control flow".to_string(),
                "Week 2: Python functions plus introductory SQL queries".to_string(),
                "Week 3: SQL joins and aggregations".to_string(),
                "Week 4: Pandas dataframes and data cleaning".to_string(),
            ],
        },
    );
    roadmap
}

fn demo_test() -> WeeklyTest {
    WeeklyTest {
        month: 1,
        week: 2,
        questions: vec![
            Question {
                question: "What does len(\"abc\") return?".to_string(),
                options: vec![
                    "A) 2".to_string(),
                    "B) 3".to_string(),
                    "C) 4".to_string(),
                    "D) an error".to_string(),
                ],
                topic: "Python".to_string(),
                correct_answer: "B".to_string(),
                marks: 1.0,
            },
            Question {
                question: "Which keyword defines a function in Python?".to_string(),
                options: vec![
                    "A) func".to_string(),
                    "B) function".to_string(),
                    "C) def".to_string(),
                    "D) fn".to_string(),
                ],
                topic: "Python".to_string(),
                correct_answer: "C".to_string(),
                marks: 1.0,
            },
            Question {
                question: "Which SQL clause filters rows?".to_string(),
                options: vec![
                    "A) WHERE".to_string(),
                    "B) ORDER BY".to_string(),
                    "C) GROUP BY".to_string(),
                    "D) LIMIT".to_string(),
                ],
                topic: "SQL".to_string(),
                correct_answer: "A".to_string(),
                marks: 1.0,
            },
            Question {
                question: "Which SQL statement reads data?".to_string(),
                options: vec![
                    "A) INSERT".to_string(),
                    "B) UPDATE".to_string(),
                    "C) DELETE".to_string(),
                    "D) SELECT".to_string(),
                ],
                topic: "SQL".to_string(),
                correct_answer: "D".to_string(),
                marks: 1.0,
            },
        ],
    }
}

fn demo_resume() -> ResumeProfile {
    ResumeProfile {
        skills: vec!["Python".to_string(), "SQL & Pandas".to_string()],
    }
}

const SAMPLE_CONFIG: &str = r#"# starmark configuration

data_dir = "./starmark-data"

[engine]
similarity_threshold = 0.3
embed_timeout_secs = 10
fallback_week = "last"
country_code = "91"

[embedder]
backend = "mock"

# For real semantic matching, switch to an OpenAI-compatible endpoint:
#
# [embedder]
# backend = "remote"
# api_key = "${STARMARK_API_KEY}"
# model = "text-embedding-3-small"
# dimensions = 1536
"#;

const DEMO_ANSWERS: &str = r#"["B) 3", null, "A) WHERE", "D) SELECT"]
"#;
