use keeper_rs_protocol::IdStrategy;
use keeper_rs_store::{MemoryDraft, RecordFilter, RuleDraft, RuleStoreOptions, StoreError};
use keeper_rs_test_utils::{StoreFixture, memory_draft, rule_draft};
use pretty_assertions::assert_eq;

fn ids<'a>(records: impl IntoIterator<Item = &'a keeper_rs_store::RuleRecord>) -> Vec<String> {
    records.into_iter().map(|record| record.id.clone()).collect()
}

#[test]
fn monotonic_ids_never_reuse_a_deleted_number() {
    let fixture = StoreFixture::new();
    let mut store = fixture.rule_store(IdStrategy::Monotonic);
    for title in ["rebase", "squash", "sign"] {
        store.create(rule_draft(title, "git")).expect("create");
    }
    assert_eq!(
        ids(store.list_by_category("git").expect("git")),
        vec!["git-001", "git-002", "git-003"]
    );

    store.delete("git-002").expect("delete");
    let created = store.create(rule_draft("tag releases", "git")).expect("create");
    assert_eq!(created.id, "git-004");
    assert_eq!(
        ids(store.list_by_category("git").expect("git")),
        vec!["git-001", "git-003", "git-004"]
    );
}

#[test]
fn count_based_ids_collide_after_a_delete() {
    let fixture = StoreFixture::new();
    let mut store = fixture.rule_store(IdStrategy::CountBased);
    for title in ["rebase", "squash", "sign"] {
        store.create(rule_draft(title, "git")).expect("create");
    }
    store.delete("git-002").expect("delete");

    let err = store
        .create(rule_draft("tag releases", "git"))
        .expect_err("collision");
    match err {
        StoreError::DuplicateId(id) => assert_eq!(id, "git-003"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(store.len(), 2);
}

#[test]
fn monotonic_counter_survives_reopen() {
    let fixture = StoreFixture::new();
    {
        let mut store = fixture.rule_store(IdStrategy::Monotonic);
        store.create(rule_draft("one", "testing")).expect("create");
        store.create(rule_draft("two", "testing")).expect("create");
        store.delete("tes-002").expect("delete");
    }
    let mut reopened = fixture.rule_store(IdStrategy::Monotonic);
    let created = reopened.create(rule_draft("three", "testing")).expect("create");
    assert_eq!(created.id, "tes-003");
}

#[test]
fn title_match_outranks_tag_match_for_memories() {
    let fixture = StoreFixture::new();
    let mut store = fixture.memory_store();
    let titled = store
        .create(MemoryDraft {
            title: "User Authentication".to_string(),
            content: "session cookies expire after an hour".to_string(),
            category: "backend".to_string(),
            ..MemoryDraft::default()
        })
        .expect("create");
    let tagged = store
        .create(MemoryDraft {
            title: "Login flow".to_string(),
            content: "redirect to the sign-in page".to_string(),
            category: "frontend".to_string(),
            tags: vec!["auth".to_string()],
            ..MemoryDraft::default()
        })
        .expect("create");
    store.create(memory_draft("unrelated", "misc")).expect("create");

    let results = store
        .search("auth", &RecordFilter::default(), 10)
        .expect("search");
    let found: Vec<&str> = results.iter().map(|hit| hit.record.id.as_str()).collect();
    assert_eq!(found, vec![titled.id.as_str(), tagged.id.as_str()]);
    assert!(results[0].score > results[1].score);
}

#[test]
fn title_match_outranks_tag_match_for_rules() {
    let fixture = StoreFixture::new();
    let mut store = fixture.rule_store(IdStrategy::Monotonic);
    store
        .create(RuleDraft {
            tags: vec!["auth".to_string()],
            ..rule_draft("use short-lived tokens", "security")
        })
        .expect("create");
    store
        .create(RuleDraft {
            content: "validate credentials on the server".to_string(),
            ..rule_draft("User Authentication", "backend")
        })
        .expect("create");

    let results = store
        .search("auth", &RecordFilter::default(), 5)
        .expect("search");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].record.title, "User Authentication");
    assert_eq!(results[0].score, 50);
    assert_eq!(results[1].score, 40);
}

#[test]
fn invalid_pattern_keeps_lexical_signals() {
    let fixture = StoreFixture::new();
    let mut store = fixture.memory_store();
    store
        .create(MemoryDraft {
            title: "fix (unclosed paren".to_string(),
            content: "fix (unclosed paren".to_string(),
            category: "regex".to_string(),
            ..MemoryDraft::default()
        })
        .expect("create");

    let results = store
        .search("(unclosed", &RecordFilter::default(), 5)
        .expect("search");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 50);
}

#[test]
fn failed_write_is_reported_but_read_failure_degrades() {
    let fixture = StoreFixture::new();
    fixture.storage.fail_writes(true);
    let mut store = fixture.memory_store();
    let err = store
        .create(memory_draft("lost", "misc"))
        .expect_err("write refused");
    assert!(matches!(err, StoreError::Io(_)));

    fixture.storage.fail_writes(false);
    fixture.storage.seed(fixture.memory_path(), "not json");
    let reopened = fixture.memory_store();
    assert_eq!(reopened.len(), 0);
}

#[test]
fn seeding_happens_only_on_first_run() {
    let fixture = StoreFixture::new();
    let options = RuleStoreOptions::default();
    let mut first = fixture.rule_store_with(options);
    assert!(!first.is_empty());
    let seeded = first.len();
    let seeded_id = first.records()[0].id.clone();
    first.delete(&seeded_id).expect("delete");

    let second = fixture.rule_store_with(options);
    assert_eq!(second.len(), seeded - 1);
}

#[test]
fn unknown_rule_category_is_not_found() {
    let fixture = StoreFixture::new();
    let store = fixture.rule_store(IdStrategy::Monotonic);
    let err = store.list_by_category("nope").expect_err("unknown");
    assert!(matches!(err, StoreError::CategoryNotFound(_)));
}

#[test]
fn rule_import_rolls_back_when_an_id_collides_midway() {
    let fixture = StoreFixture::new();
    let mut store = fixture.rule_store(IdStrategy::CountBased);
    for title in ["rebase", "squash", "sign"] {
        store.create(rule_draft(title, "git")).expect("create");
    }
    store.delete("git-002").expect("delete");
    let writes = fixture.storage.write_count();

    let payload = r#"[
        {"id": "doc-001", "title": "readme first", "content": "c", "category": "docs"},
        {"title": "tag releases", "content": "c", "category": "git"}
    ]"#;
    let err = store.import(payload).expect_err("collision");
    assert!(matches!(err, StoreError::DuplicateId(ref id) if id == "git-003"));

    assert_eq!(ids(store.records()), vec!["git-001", "git-003"]);
    let names: Vec<String> = store
        .list_categories()
        .into_iter()
        .map(|summary| summary.name)
        .collect();
    assert_eq!(names, vec!["git"]);
    assert_eq!(fixture.storage.write_count(), writes);
}

#[test]
fn failed_flush_undoes_an_import() {
    let fixture = StoreFixture::new();
    let mut memories = fixture.memory_store();
    let mut rules = fixture.rule_store(IdStrategy::Monotonic);
    fixture.storage.fail_writes(true);

    let memory_err = memories
        .import(r#"[{"title": "t", "content": "c", "category": "x"}]"#)
        .expect_err("write refused");
    assert!(matches!(memory_err, StoreError::Io(_)));
    assert!(memories.is_empty());

    let rule_err = rules
        .import(r#"[{"title": "t", "content": "c", "category": "git"}]"#)
        .expect_err("write refused");
    assert!(matches!(rule_err, StoreError::Io(_)));
    assert!(rules.is_empty());

    fixture.storage.fail_writes(false);
    let created = rules.create(rule_draft("t", "git")).expect("create");
    assert_eq!(created.id, "git-001");
}
