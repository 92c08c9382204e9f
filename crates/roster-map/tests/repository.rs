use std::fs;
use std::path::PathBuf;

use roster_map::{KnowledgeBase, KnowledgeRepository, MappingStore, StoredKnowledgeBase};
use roster_model::{Confidence, FieldKind, MatchType};

fn temp_repo_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("roster_map_repo_{label}_{stamp}"));
    dir
}

fn cleanup_dir(dir: &PathBuf) {
    let _ = fs::remove_dir_all(dir);
}

fn sample_knowledge() -> KnowledgeBase {
    let mut knowledge = KnowledgeBase::new();
    knowledge.add(
        FieldKind::Npi,
        "PROV_NPI",
        Confidence::new(80.0),
        MatchType::ValuePattern,
    );
    knowledge.add(
        FieldKind::Gender,
        "Sex",
        Confidence::MAX,
        MatchType::ExactHeader,
    );
    knowledge.add(
        FieldKind::Gender,
        "Provider Gender",
        Confidence::MAX,
        MatchType::ExactHeader,
    );
    knowledge
}

#[test]
fn repository_save_and_load() {
    let dir = temp_repo_dir("save_load");
    let repo = KnowledgeRepository::new(&dir).expect("create repo");

    let path = repo
        .save("acme-health", &sample_knowledge())
        .expect("save knowledge");
    assert!(path.exists());
    assert!(path.to_string_lossy().ends_with("ACME_HEALTH.json"));

    let loaded = repo
        .load("ACME HEALTH")
        .expect("load knowledge")
        .expect("knowledge should exist");
    assert_eq!(loaded, sample_knowledge());
    assert!(loaded.find(FieldKind::Npi, "prov_npi").is_some());

    cleanup_dir(&dir);
}

#[test]
fn repository_load_nonexistent() {
    let dir = temp_repo_dir("nonexistent");
    let repo = KnowledgeRepository::new(&dir).expect("create repo");

    assert!(repo.load("nobody").expect("load attempt").is_none());
    assert!(
        repo.load_or_default("nobody")
            .expect("load attempt")
            .is_empty()
    );

    cleanup_dir(&dir);
}

#[test]
fn repository_exists_and_delete() {
    let dir = temp_repo_dir("delete");
    let repo = KnowledgeRepository::new(&dir).expect("create repo");

    assert!(!repo.exists("default"));
    repo.save("default", &KnowledgeBase::new()).expect("save");
    assert!(repo.exists("default"));

    assert!(repo.delete("default").expect("delete"));
    assert!(!repo.exists("default"));
    assert!(!repo.delete("default").expect("delete again"));

    cleanup_dir(&dir);
}

#[test]
fn repository_keeps_description() {
    let dir = temp_repo_dir("description");
    let repo = KnowledgeRepository::new(&dir).expect("create repo");

    let stored = StoredKnowledgeBase::new(sample_knowledge()).with_description("imported");
    repo.save_stored("default", &stored).expect("save");

    let loaded = repo
        .load_stored("default")
        .expect("load")
        .expect("stored knowledge");
    assert_eq!(loaded.description.as_deref(), Some("imported"));
    assert_eq!(loaded.version, "1.0");
    assert!(loaded.saved_at.is_some());

    cleanup_dir(&dir);
}

#[test]
fn repository_list_skips_unreadable_files() {
    let dir = temp_repo_dir("list");
    let repo = KnowledgeRepository::new(&dir).expect("create repo");

    repo.save("zeta", &KnowledgeBase::new()).expect("save zeta");
    repo.save("alpha", &sample_knowledge()).expect("save alpha");
    fs::write(dir.join("broken.json"), "{ not json").expect("write broken");
    fs::write(dir.join("notes.txt"), "ignored").expect("write notes");

    let listed = repo.list().expect("list");
    let profiles: Vec<&str> = listed.iter().map(|meta| meta.profile.as_str()).collect();
    assert_eq!(profiles, ["ALPHA", "ZETA"]);
    assert_eq!(listed[0].entry_count, 3);
    assert_eq!(listed[0].category_count, 2);
    assert_eq!(listed[1].entry_count, 0);

    cleanup_dir(&dir);
}
