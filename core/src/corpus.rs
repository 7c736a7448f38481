//! Reading question/answer pairs from JSON and JSONL files.
//!
//! This is the only module that touches the filesystem; the engine itself
//! works on an in-memory list of pairs.

use crate::error::CorpusError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl From<FaqEntry> for (String, String) {
    fn from(e: FaqEntry) -> Self {
        (e.question, e.answer)
    }
}

/// Load entries from a `.json`/`.jsonl` file, or every such file under a
/// directory (sorted by path, symlinks followed). Order within the input is
/// preserved. Entries the walk cannot read are logged and skipped.
pub fn load_corpus<P: AsRef<Path>>(path: P) -> Result<Vec<FaqEntry>, CorpusError> {
    let path = path.as_ref();
    let mut files: Vec<PathBuf> = Vec::new();
    if path.is_dir() {
        for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable corpus entry");
                    continue;
                }
            };
            let p = entry.path();
            if p.is_file() && corpus_extension(p).is_some() {
                files.push(p.to_path_buf());
            }
        }
    } else if path.is_file() {
        files.push(path.to_path_buf());
    }
    if files.is_empty() {
        return Err(CorpusError::NoInput(path.to_path_buf()));
    }

    let mut entries = Vec::new();
    for file in files {
        let reader = BufReader::new(File::open(&file)?);
        let name = file.display().to_string();
        let mut parsed = match corpus_extension(&file) {
            Some("jsonl") => parse_jsonl(reader, &name)?,
            _ => parse_json(reader, &name)?,
        };
        tracing::debug!(file = %name, entries = parsed.len(), "read corpus file");
        entries.append(&mut parsed);
    }
    tracing::info!(entries = entries.len(), path = %path.display(), "loaded corpus");
    Ok(entries)
}

fn corpus_extension(p: &Path) -> Option<&str> {
    p.extension().and_then(|s| s.to_str()).filter(|ext| matches!(*ext, "json" | "jsonl"))
}

/// One JSON object per line; blank lines are skipped.
pub fn parse_jsonl<R: BufRead>(reader: R, name: &str) -> Result<Vec<FaqEntry>, CorpusError> {
    let mut entries = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: FaqEntry = serde_json::from_str(&line)
            .map_err(|source| CorpusError::Json { path: format!("{name}:{}", lineno + 1), source })?;
        entries.push(entry);
    }
    Ok(entries)
}

/// A JSON array of objects, or a single object.
pub fn parse_json<R: Read>(reader: R, name: &str) -> Result<Vec<FaqEntry>, CorpusError> {
    let json_err = |source| CorpusError::Json { path: name.to_string(), source };
    let json: serde_json::Value = serde_json::from_reader(reader).map_err(json_err)?;
    match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(json_err))
            .collect(),
        serde_json::Value::Object(_) => Ok(vec![serde_json::from_value(json).map_err(json_err)?]),
        _ => {
            tracing::warn!(file = name, "corpus file is neither an array nor an object; skipping");
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn jsonl_skips_blank_lines_and_ignores_extra_fields() {
        let data = "{\"question\":\"Q1\",\"answer\":\"A1\",\"id\":7}\n\n{\"question\":\"Q2\",\"answer\":\"A2\"}\n";
        let entries = parse_jsonl(Cursor::new(data), "mem").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], FaqEntry { question: "Q2".into(), answer: "A2".into() });
    }

    #[test]
    fn jsonl_reports_line_of_bad_record() {
        let data = "{\"question\":\"Q1\",\"answer\":\"A1\"}\n{\"question\":\"Q2\"}\n";
        match parse_jsonl(Cursor::new(data), "mem") {
            Err(CorpusError::Json { path, .. }) => assert_eq!(path, "mem:2"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn json_accepts_array_or_object() {
        let arr = r#"[{"question":"a","answer":"b"},{"question":"c","answer":"d"}]"#;
        assert_eq!(parse_json(Cursor::new(arr), "mem").unwrap().len(), 2);
        let obj = r#"{"question":"a","answer":"b"}"#;
        assert_eq!(parse_json(Cursor::new(obj), "mem").unwrap().len(), 1);
        assert!(parse_json(Cursor::new("42"), "mem").unwrap().is_empty());
    }
}
