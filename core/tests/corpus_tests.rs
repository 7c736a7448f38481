use faqmatch_core::corpus::load_corpus;
use faqmatch_core::{CorpusError, Engine, EngineConfig};
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_directory_in_path_order() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("b.jsonl"),
        "{\"question\":\"How long does shipping take?\",\"answer\":\"3-5 days.\"}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("a.json"),
        r#"[{"question":"How do I return an item?","answer":"Visit Returns page within 30 days."}]"#,
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let entries = load_corpus(dir.path()).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].question, "How do I return an item?");
    assert_eq!(entries[1].answer, "3-5 days.");

    let engine = Engine::initialize(entries.into_iter().map(Into::<(String, String)>::into), EngineConfig::default()).unwrap();
    assert_eq!(engine.answer("shipping time").matched_document_id, Some(1));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempdir().unwrap();
    assert!(matches!(load_corpus(dir.path()), Err(CorpusError::NoInput(_))));
    assert!(matches!(load_corpus(dir.path().join("nope.json")), Err(CorpusError::NoInput(_))));
}

#[cfg(unix)]
#[test]
fn walk_errors_are_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("faq.jsonl"), "{\"question\":\"Q\",\"answer\":\"A\"}\n").unwrap();
    // a link back to the root makes the walk report a loop for that entry
    std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).unwrap();
    let entries = load_corpus(dir.path()).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].answer, "A");
}
