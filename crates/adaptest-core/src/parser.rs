//! Question bank parser.
//!
//! Loads bank records from JSON or TOML files and directories, and
//! validates them. A record that does not have the required shape is
//! skipped with a warning; a file that does not parse at all is an error
//! (or skipped, when loading a directory).

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog;
use crate::model::{BankRecord, DifficultyTier};
use crate::source::QuestionBank;

/// Loose on-disk record shape; checked before it becomes a [`BankRecord`].
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    question: String,
    #[serde(default)]
    options: Vec<String>,
    answer: i64,
    #[serde(default)]
    domain: Option<i64>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonBankFile {
    List(Vec<serde_json::Value>),
    Wrapped { questions: Vec<serde_json::Value> },
}

#[derive(Debug, Deserialize)]
struct TomlBankFile {
    #[serde(default)]
    questions: Vec<toml::Value>,
}

/// A record that was dropped during loading.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    /// File the record came from.
    pub source: String,
    /// 1-based position in that file.
    pub index: usize,
    pub reason: String,
}

/// Result of loading one or more bank files.
#[derive(Debug, Clone, Default)]
pub struct BankLoad {
    pub records: Vec<BankRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl BankLoad {
    pub fn into_bank(self) -> QuestionBank {
        QuestionBank::new(self.records)
    }

    fn extend(&mut self, other: BankLoad) {
        self.records.extend(other.records);
        self.rejected.extend(other.rejected);
    }
}

/// Load a bank file, or every bank file under a directory.
pub fn load_bank(path: &Path) -> Result<BankLoad> {
    if path.is_dir() {
        load_bank_directory(path)
    } else {
        load_bank_file(path)
    }
}

/// Load a single `.json` or `.toml` bank file.
pub fn load_bank_file(path: &Path) -> Result<BankLoad> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;
    let format = BankFormat::from_path(path)
        .with_context(|| format!("unsupported bank file type: {}", path.display()))?;
    load_bank_str(&content, format, path)
}

/// On-disk encodings of a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    Json,
    Toml,
}

impl BankFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(BankFormat::Json),
            "toml" => Some(BankFormat::Toml),
            _ => None,
        }
    }
}

/// Parse bank content (useful for testing). `source_path` names the file
/// in messages and supplies the stem for synthesized ids.
pub fn load_bank_str(content: &str, format: BankFormat, source_path: &Path) -> Result<BankLoad> {
    let source = source_path.display().to_string();
    let stem = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("bank")
        .to_string();

    let raw: Vec<Result<RawRecord, String>> = match format {
        BankFormat::Json => {
            let file: JsonBankFile = serde_json::from_str(content)
                .with_context(|| format!("failed to parse JSON: {source}"))?;
            let values = match file {
                JsonBankFile::List(v) => v,
                JsonBankFile::Wrapped { questions } => questions,
            };
            values
                .into_iter()
                .map(|v| serde_json::from_value(v).map_err(|e| e.to_string()))
                .collect()
        }
        BankFormat::Toml => {
            let file: TomlBankFile = toml::from_str(content)
                .with_context(|| format!("failed to parse TOML: {source}"))?;
            file.questions
                .into_iter()
                .map(|v| v.try_into().map_err(|e: toml::de::Error| e.to_string()))
                .collect()
        }
    };

    let mut load = BankLoad::default();
    for (i, entry) in raw.into_iter().enumerate() {
        let index = i + 1;
        match entry.and_then(|r| check_record(r, &stem, index)) {
            Ok(record) => load.records.push(record),
            Err(reason) => {
                tracing::warn!("skipping record {index} of {source}: {reason}");
                load.rejected.push(RejectedRecord {
                    source: source.clone(),
                    index,
                    reason,
                });
            }
        }
    }

    tracing::debug!(
        file = %source,
        loaded = load.records.len(),
        skipped = load.rejected.len(),
        "bank file parsed"
    );
    Ok(load)
}

fn check_record(raw: RawRecord, stem: &str, index: usize) -> Result<BankRecord, String> {
    if raw.question.trim().is_empty() {
        return Err("missing question".into());
    }
    let options: [String; 4] = raw
        .options
        .try_into()
        .map_err(|v: Vec<String>| format!("need exactly 4 options, got {}", v.len()))?;
    let answer = u8::try_from(raw.answer)
        .ok()
        .filter(|a| *a <= 3)
        .ok_or_else(|| "answer must be 0-3".to_string())?;
    let domain = raw
        .domain
        .map(|d| {
            u8::try_from(d)
                .ok()
                .filter(|d| catalog::domain(*d).is_some())
                .ok_or_else(|| format!("domain {d} is not 1-{}", catalog::DOMAINS.len()))
        })
        .transpose()?;
    let difficulty = raw
        .difficulty
        .map(|d| d.parse::<DifficultyTier>())
        .transpose()?;
    let id = raw
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("{stem}-{index}"));

    Ok(BankRecord {
        id,
        question: raw.question,
        options,
        answer,
        domain,
        difficulty,
        topic: raw.topic.filter(|t| !t.trim().is_empty()),
        explanation: raw.explanation.filter(|e| !e.trim().is_empty()),
    })
}

/// Recursively load every `.json`/`.toml` bank file under `dir`, in path order.
pub fn load_bank_directory(dir: &Path) -> Result<BankLoad> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    collect_bank_files(dir, &mut files)?;
    files.sort();

    let mut load = BankLoad::default();
    for path in files {
        match load_bank_file(&path) {
            Ok(file) => load.extend(file),
            Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
        }
    }
    Ok(load)
}

fn collect_bank_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            collect_bank_files(&path, out)?;
        } else if BankFormat::from_path(&path).is_some() {
            out.push(path);
        }
    }
    Ok(())
}

/// A warning from bank validation.
#[derive(Debug, Clone, PartialEq)]
pub struct BankWarning {
    /// The record id (if applicable).
    pub record_id: Option<String>,
    pub message: String,
}

/// Validate a loaded bank for common issues.
pub fn validate_bank(load: &BankLoad) -> Vec<BankWarning> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    for record in &load.records {
        if !seen.insert(record.id.as_str()) {
            warnings.push(BankWarning {
                record_id: Some(record.id.clone()),
                message: format!("duplicate record ID: {}", record.id),
            });
        }
    }

    for record in &load.records {
        if record.explanation.is_none() {
            warnings.push(BankWarning {
                record_id: Some(record.id.clone()),
                message: "no explanation; a placeholder will be shown".into(),
            });
        }
    }

    // Untagged records can serve any domain.
    if load.records.iter().all(|r| r.domain.is_some()) {
        let covered: BTreeSet<u8> = load.records.iter().filter_map(|r| r.domain).collect();
        for domain in catalog::DOMAINS.iter().filter(|d| !covered.contains(&d.id)) {
            warnings.push(BankWarning {
                record_id: None,
                message: format!("no records for domain {} ({})", domain.id, domain.short),
            });
        }
    }

    for rejected in &load.rejected {
        warnings.push(BankWarning {
            record_id: None,
            message: format!(
                "unusable record {} in {}: {}",
                rejected.index, rejected.source, rejected.reason
            ),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON_BANK: &str = r#"[
        {
            "id": "rm-1",
            "question": "What is the FIRST step of risk management?",
            "options": ["Identify assets", "Buy insurance", "Patch servers", "Hire staff"],
            "answer": 0,
            "domain": 1,
            "difficulty": "easy",
            "topic": "Risk management",
            "explanation": "Assets must be known before risk can be assessed."
        },
        {
            "question": "Which control is BEST for data at rest?",
            "options": ["TLS", "Full-disk encryption", "IDS", "NAT"],
            "answer": 1,
            "domain": 2
        }
    ]"#;

    #[test]
    fn parse_json_array() {
        let load = load_bank_str(JSON_BANK, BankFormat::Json, Path::new("sample.json")).unwrap();
        assert_eq!(load.records.len(), 2);
        assert!(load.rejected.is_empty());
        assert_eq!(load.records[0].difficulty, Some(DifficultyTier::Easy));
        assert_eq!(load.records[1].id, "sample-2");
        assert!(load.records[1].difficulty.is_none());
    }

    #[test]
    fn parse_wrapped_json() {
        let wrapped = format!(r#"{{"questions": {JSON_BANK}}}"#);
        let load = load_bank_str(&wrapped, BankFormat::Json, Path::new("w.json")).unwrap();
        assert_eq!(load.records.len(), 2);
    }

    #[test]
    fn parse_toml_bank() {
        let toml = r#"
[[questions]]
id = "iam-1"
question = "Which model uses labels?"
options = ["DAC", "MAC", "RBAC", "ABAC"]
answer = 1
domain = 5
difficulty = "Applied"
"#;
        let load = load_bank_str(toml, BankFormat::Toml, Path::new("iam.toml")).unwrap();
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].difficulty, Some(DifficultyTier::Medium));
        assert_eq!(load.records[0].domain, Some(5));
    }

    #[test]
    fn malformed_records_are_skipped() {
        let json = r#"[
            {"question": "Three options?", "options": ["a", "b", "c"], "answer": 0},
            {"question": "Bad answer?", "options": ["a", "b", "c", "d"], "answer": 7},
            {"question": "", "options": ["a", "b", "c", "d"], "answer": 0},
            {"question": "Bad domain?", "options": ["a", "b", "c", "d"], "answer": 0, "domain": 9},
            {"question": "No answer", "options": ["a", "b", "c", "d"]},
            {"question": "Fine?", "options": ["a", "b", "c", "d"], "answer": 3}
        ]"#;
        let load = load_bank_str(json, BankFormat::Json, Path::new("mixed.json")).unwrap();
        assert_eq!(load.records.len(), 1);
        assert_eq!(load.records[0].id, "mixed-6");
        assert_eq!(load.rejected.len(), 5);
        assert!(load.rejected[0].reason.contains("need exactly 4 options"));
        assert!(load.rejected[1].reason.contains("answer must be 0-3"));
        assert!(load.rejected[2].reason.contains("missing question"));
    }

    #[test]
    fn parse_malformed_file() {
        let result = load_bank_str("{ not json", BankFormat::Json, Path::new("bad.json"));
        assert!(result.is_err());
        let result = load_bank_str("this is not [valid toml }{", BankFormat::Toml, Path::new("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn validate_reports_issues() {
        let json = r#"[
            {"id": "dup", "question": "Q1?", "options": ["a","b","c","d"], "answer": 0, "domain": 1, "explanation": "x"},
            {"id": "dup", "question": "Q2?", "options": ["a","b","c","d"], "answer": 0, "domain": 1},
            {"question": "Q3?", "options": ["a","b"], "answer": 0}
        ]"#;
        let load = load_bank_str(json, BankFormat::Json, Path::new("v.json")).unwrap();
        let warnings = validate_bank(&load);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("no explanation")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("no records for domain 8")));
        assert!(warnings.iter().any(|w| w.message.contains("unusable record 3")));
    }

    #[test]
    fn load_directory_recursively() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("a.json"), JSON_BANK).unwrap();
        std::fs::write(
            dir.path().join("nested").join("b.toml"),
            "[[questions]]\nquestion = \"Q?\"\noptions = [\"a\",\"b\",\"c\",\"d\"]\nanswer = 2\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "][").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let load = load_bank(dir.path()).unwrap();
        assert_eq!(load.records.len(), 3);
        assert_eq!(load.records[2].id, "b-1");
        assert_eq!(load.into_bank().len(), 3);
    }
}
