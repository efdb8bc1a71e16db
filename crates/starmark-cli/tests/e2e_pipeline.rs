//! End-to-end pipeline tests over the in-memory store and mock embedder.
//!
//! These tests verify that the whole flow (map -> submit -> rate) works
//! correctly across the store, embedder, and engine crates, without
//! touching the filesystem or any network.

use std::sync::Arc;

use starmark_core::engine::{EngineConfig, RatingEngine};
use starmark_core::model::{
    MonthPlan, Question, ResumeProfile, Roadmap, SkillRating, WeeklyTest,
};
use starmark_embed::MockEmbedder;
use starmark_store::MemoryStore;

const USER: &str = "8864862270";

fn make_engine(store: Arc<MemoryStore>) -> RatingEngine {
    RatingEngine::new(store, Arc::new(MockEmbedder::default()), EngineConfig::default())
}

fn make_roadmap(focus: &str, weeks: &[&str]) -> Roadmap {
    let mut roadmap = Roadmap::default();
    roadmap.months.insert(
        "month_1".to_string(),
        MonthPlan {
            skill_focus: focus.to_string(),
            weekly_plan: weeks.iter().map(|s| s.to_string()).collect(),
        },
    );
    roadmap
}

fn make_question(topic: &str, correct: &str, marks: f64) -> Question {
    Question {
        question: format!("a question about {topic}"),
        options: vec![
            "A) first".into(),
            "B) second".into(),
            "C) third".into(),
            "D) fourth".into(),
        ],
        topic: topic.into(),
        correct_answer: correct.into(),
        marks,
    }
}

fn resume(skills: &[&str]) -> ResumeProfile {
    ResumeProfile {
        skills: skills.iter().map(|s| s.to_string()).collect(),
    }
}

fn answers(picks: &[Option<&str>]) -> Vec<Option<String>> {
    picks.iter().map(|p| p.map(str::to_string)).collect()
}

// --- The full happy path ---

#[tokio::test]
async fn e2e_map_submit_rate() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_roadmap(
            USER,
            make_roadmap(
                "Python, SQL",
                &[
                    "Week 1: Python basics and control flow",
                    "Week 2: Python functions plus introductory SQL queries",
                    "Week 3: SQL joins and aggregations",
                    "Week 4: capstone project",
                ],
            ),
        )
        .await;
    store
        .put_weekly_test(
            USER,
            WeeklyTest {
                month: 1,
                week: 2,
                questions: vec![
                    make_question("Python", "A", 1.0),
                    make_question("Python", "C", 1.0),
                    make_question("SQL", "A", 1.0),
                    make_question("SQL", "D", 1.0),
                ],
            },
        )
        .await;
    store.put_resume(USER, resume(&["Python", "SQL & Pandas"])).await;

    let engine = make_engine(Arc::clone(&store));

    let mapping = engine.generate_skill_mappings(USER).await.unwrap();
    assert_eq!(mapping.weeks_for(1, "Python"), Some(&[1u32, 2][..]));
    assert_eq!(mapping.weeks_for(1, "SQL"), Some(&[2u32, 3][..]));

    // Python finishes at week 2, SQL at week 3.
    let completed = engine.completed_skills(USER, 1, 2).await.unwrap();
    assert_eq!(completed, vec!["Python".to_string()]);

    // Correct, unanswered, correct, correct: Python 50%, SQL 100%.
    let result = engine
        .submit_weekly_test(
            USER,
            1,
            2,
            &answers(&[Some("A) first"), None, Some("A) first"), Some("D) fourth")]),
        )
        .await
        .unwrap();
    assert_eq!(result.correct, 3);
    assert_eq!(result.overall_percentage, 75.0);
    assert_eq!(result.skill_performance["Python"].percentage, 50.0);
    assert_eq!(result.skill_performance["SQL"].percentage, 100.0);

    let ratings = engine.get_skill_ratings(USER).await.unwrap();
    // The compound "SQL & Pandas" entry splits into atomic skills.
    assert_eq!(ratings.len(), 3);
    match &ratings["Python"] {
        SkillRating::Rated {
            average_percentage,
            stars,
            evidence,
        } => {
            assert_eq!(*average_percentage, 50.0);
            assert_eq!(*stars, 1);
            assert_eq!(evidence.len(), 1);
            assert_eq!(evidence[0].topic, "Python");
        }
        SkillRating::NotYetRated => panic!("Python should be rated"),
    }
    assert_eq!(ratings["SQL"].stars(), Some(3));
    // Pandas is in the resume but nowhere in the roadmap.
    assert_eq!(ratings["Pandas"], SkillRating::NotYetRated);
}

// --- Rating source: matched topic percentage, never the overall ---

#[tokio::test]
async fn e2e_rating_uses_topic_percentage_not_overall() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_roadmap(
            USER,
            make_roadmap(
                "Machine Learning Models",
                &[
                    "Week 1: data cleaning warm-up",
                    "Week 2: train machine learning models on real data",
                ],
            ),
        )
        .await;
    // Topic labels differ from both the roadmap text and the resume
    // label, so matching must go through embeddings.
    store
        .put_weekly_test(
            USER,
            WeeklyTest {
                month: 1,
                week: 2,
                questions: vec![
                    make_question("machine learning model drills", "A", 9.0),
                    make_question("machine learning model drills", "B", 1.0),
                    make_question("statistics formulas revision", "A", 5.0),
                    make_question("statistics formulas revision", "B", 5.0),
                ],
            },
        )
        .await;
    store.put_resume(USER, resume(&["Machine Learning Models"])).await;

    let engine = make_engine(Arc::clone(&store));
    engine.generate_skill_mappings(USER).await.unwrap();

    // The models topic scores 90%, statistics drags the overall to 70%.
    let result = engine
        .submit_weekly_test(
            USER,
            1,
            2,
            &answers(&[Some("A) first"), None, Some("A) first"), None]),
        )
        .await
        .unwrap();
    assert_eq!(result.overall_percentage, 70.0);

    let ratings = engine.get_skill_ratings(USER).await.unwrap();
    match &ratings["Machine Learning Models"] {
        SkillRating::Rated {
            average_percentage,
            stars,
            evidence,
        } => {
            assert_eq!(*average_percentage, 90.0);
            assert_eq!(*stars, 3);
            assert_eq!(evidence[0].topic, "machine learning model drills");
            assert!(evidence[0].similarity > 0.3);
        }
        SkillRating::NotYetRated => panic!("expected a rated skill"),
    }
}

// --- Identifier variants ---

#[tokio::test]
async fn e2e_identifier_variants_share_records() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_roadmap(USER, make_roadmap("Python", &["Week 1: Python basics"]))
        .await;
    store
        .put_weekly_test(
            USER,
            WeeklyTest {
                month: 1,
                week: 1,
                questions: vec![make_question("Python", "A", 1.0)],
            },
        )
        .await;
    store.put_resume(USER, resume(&["Python"])).await;

    let engine = make_engine(Arc::clone(&store));

    // Every operation uses a different display variant of the same number.
    engine.generate_skill_mappings("+91 8864862270").await.unwrap();
    engine
        .submit_weekly_test("+918864862270", 1, 1, &answers(&[Some("A) first")]))
        .await
        .unwrap();

    let ratings = engine.get_skill_ratings(USER).await.unwrap();
    assert_eq!(ratings["Python"].stars(), Some(3));
}

// --- Resubmission ---

#[tokio::test]
async fn e2e_resubmission_replaces_the_week() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_roadmap(USER, make_roadmap("Python", &["Week 1: Python basics"]))
        .await;
    store
        .put_weekly_test(
            USER,
            WeeklyTest {
                month: 1,
                week: 1,
                questions: vec![make_question("Python", "A", 1.0), make_question("Python", "B", 1.0)],
            },
        )
        .await;
    store.put_resume(USER, resume(&["Python"])).await;

    let engine = make_engine(Arc::clone(&store));
    engine.generate_skill_mappings(USER).await.unwrap();

    engine
        .submit_weekly_test(USER, 1, 1, &answers(&[None, None]))
        .await
        .unwrap();
    let ratings = engine.get_skill_ratings(USER).await.unwrap();
    assert_eq!(ratings["Python"].stars(), Some(0));

    // A retake fully replaces the week; nothing averages across attempts.
    engine
        .submit_weekly_test(USER, 1, 1, &answers(&[Some("A) first"), Some("B) second")]))
        .await
        .unwrap();
    let ratings = engine.get_skill_ratings(USER).await.unwrap();
    match &ratings["Python"] {
        SkillRating::Rated {
            average_percentage,
            evidence,
            ..
        } => {
            assert_eq!(*average_percentage, 100.0);
            assert_eq!(evidence.len(), 1);
        }
        SkillRating::NotYetRated => panic!("expected a rated skill"),
    }
}

// --- Threshold behavior ---

#[tokio::test]
async fn e2e_unrelated_topics_leave_skill_unrated() {
    let store = Arc::new(MemoryStore::new());
    store
        .put_roadmap(
            USER,
            make_roadmap("Kubernetes", &["Week 1: Kubernetes cluster basics"]),
        )
        .await;
    // The only graded topic shares no vocabulary with the skill.
    store
        .put_weekly_test(
            USER,
            WeeklyTest {
                month: 1,
                week: 1,
                questions: vec![make_question("French grammar drills", "A", 1.0)],
            },
        )
        .await;
    store.put_resume(USER, resume(&["Kubernetes"])).await;

    let engine = make_engine(Arc::clone(&store));
    engine.generate_skill_mappings(USER).await.unwrap();
    engine
        .submit_weekly_test(USER, 1, 1, &answers(&[Some("A) first")]))
        .await
        .unwrap();

    // The mapped week has a result, but no topic clears the threshold.
    let ratings = engine.get_skill_ratings(USER).await.unwrap();
    assert_eq!(ratings["Kubernetes"], SkillRating::NotYetRated);
}
