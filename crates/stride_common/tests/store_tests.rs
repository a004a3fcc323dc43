//! Tests for the file-backed progress store.

use chrono::{Duration, TimeZone, Utc};
use stride_common::curriculum::Curriculum;
use stride_common::navigator::locate;
use stride_common::store::ProgressStore;
use stride_common::StrideError;
use tempfile::tempdir;

const STRUCTURE: &str = r#"{
    "course_name": "Striver A2Z",
    "description": "DSA sheet",
    "steps": [
        {"step_name": "Learn the basics", "topics": [
            {"topic_name": "Patterns", "problems": [
                {"problem_name": "Pattern 1", "difficulty": "Easy"},
                {"problem_name": "Pattern 2", "difficulty": "Easy"}
            ]}
        ]},
        {"step_name": "Arrays", "topics": [
            {"topic_name": "Medium", "problems": [
                {"problem_name": "Two sum", "difficulty": "Medium", "leetcode_link": "https://leetcode.com/problems/two-sum/"}
            ]}
        ]}
    ]
}"#;

#[test]
fn test_ensure_is_idempotent() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::new(dir.path());
    let curriculum = Curriculum::from_structure_json(STRUCTURE).unwrap();
    let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();

    let (mut doc, created) = store.ensure("u1", Some(&curriculum), "cpp", t0).unwrap();
    assert!(created);
    assert_eq!(doc.curriculum_id, "striver-a2z");
    assert_eq!(doc.progress.problem_count(), 3);

    locate(&mut doc.progress, 1, 0, 0).unwrap().problem.set_completed(true, t0);
    store.save(&mut doc, t0 + Duration::minutes(5)).unwrap();

    // A second init must not reset the tree
    let (again, created) = store
        .ensure("u1", Some(&curriculum), "python", t0 + Duration::hours(1))
        .unwrap();
    assert!(!created);
    assert_eq!(again.created_at, t0);
    assert_eq!(again.updated_at, t0 + Duration::minutes(5));
    assert!(again.progress.steps[1].topics[0].problems[0].completed);
    assert_eq!(again.progress.steps[0].topics[0].problems[0].code_language, "cpp");
}

#[test]
fn test_documents_are_per_user() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::new(dir.path());
    let curriculum = Curriculum::from_structure_json(STRUCTURE).unwrap();
    let now = Utc::now();

    let (_, a) = store.ensure("alice", Some(&curriculum), "cpp", now).unwrap();
    let (_, b) = store.ensure("bob", Some(&curriculum), "cpp", now).unwrap();
    assert!(a && b);
    assert!(store.load("alice", "striver-a2z").unwrap().is_some());
    assert!(store.load("carol", "striver-a2z").unwrap().is_none());
}

#[test]
fn test_corrupt_document_is_error() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::new(dir.path());
    let curriculum = Curriculum::from_structure_json(STRUCTURE).unwrap();
    store.ensure("u1", Some(&curriculum), "cpp", Utc::now()).unwrap();

    let path = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.extension().map_or(false, |e| e == "json"))
        .unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    assert!(store.load("u1", "striver-a2z").is_err());
    assert!(store.ensure("u1", Some(&curriculum), "cpp", Utc::now()).is_err());
}

#[test]
fn test_similar_user_ids_get_separate_documents() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::new(dir.path());
    let curriculum = Curriculum::from_structure_json(STRUCTURE).unwrap();
    let now = Utc::now();

    let (mut dotted, created) = store.ensure("alice.smith", Some(&curriculum), "cpp", now).unwrap();
    assert!(created);
    locate(&mut dotted.progress, 0, 0, 0).unwrap().problem.set_completed(true, now);
    store.save(&mut dotted, now).unwrap();

    let (underscored, created) = store.ensure("alice_smith", Some(&curriculum), "cpp", now).unwrap();
    assert!(created);
    assert_eq!(underscored.user_id, "alice_smith");
    assert!(!underscored.progress.steps[0].topics[0].problems[0].completed);

    let reloaded = store.load("alice.smith", "striver-a2z").unwrap().unwrap();
    assert_eq!(reloaded.user_id, "alice.smith");
    assert!(reloaded.progress.steps[0].topics[0].problems[0].completed);
}

#[test]
fn test_document_of_another_owner_is_rejected() {
    let dir = tempdir().unwrap();
    let store = ProgressStore::new(dir.path());
    let curriculum = Curriculum::from_structure_json(STRUCTURE).unwrap();
    store.ensure("alice", Some(&curriculum), "cpp", Utc::now()).unwrap();

    std::fs::copy(
        store.document_path("alice", "striver-a2z"),
        store.document_path("bob", "striver-a2z"),
    )
    .unwrap();

    match store.load("bob", "striver-a2z") {
        Err(StrideError::OwnerMismatch { user_id, .. }) => assert_eq!(user_id, "alice"),
        other => panic!("expected owner mismatch, got {:?}", other.map(|d| d.map(|d| d.user_id))),
    }
    assert!(store.ensure("bob", Some(&curriculum), "cpp", Utc::now()).is_err());
}
