//! On-disk loaders for audit records and criterion catalogs.
//!
//! All parsing happens here so the engine only ever sees well-formed data.
//! A record file holds either a single record object or an array of them;
//! a catalog file maps criterion id to either a bare question string or a
//! `{question, category}` object (the older catalog exports use the bare
//! form).

use crate::model::{AuditRecord, CriterionDefinition};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{path} does not exist")]
    Missing { path: PathBuf },
    #[error("failed to read {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    One(AuditRecord),
    Many(Vec<AuditRecord>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogEntry {
    Question(String),
    Full {
        question: String,
        #[serde(default = "general_category", alias = "categoria")]
        category: String,
    },
}

fn general_category() -> String {
    "general".to_string()
}

/// Read every `*.json` file under `dir`, in file-name order.
pub fn load_audit_records(dir: &Path) -> Result<Vec<AuditRecord>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::Missing {
            path: dir.to_path_buf(),
        });
    }
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Unreadable {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        let raw = fs::read_to_string(&path).map_err(|source| LoadError::Unreadable {
            path: path.clone(),
            source,
        })?;
        let parsed: RecordFile =
            serde_json::from_str(&raw).map_err(|source| LoadError::Corrupt {
                path: path.clone(),
                source,
            })?;
        match parsed {
            RecordFile::One(record) => records.push(record),
            RecordFile::Many(batch) => records.extend(batch),
        }
    }
    tracing::debug!(records = records.len(), dir = %dir.display(), "loaded audit records");
    Ok(records)
}

/// Read a criterion catalog file, returning definitions in id order.
pub fn load_criterion_catalog(path: &Path) -> Result<Vec<CriterionDefinition>, LoadError> {
    if !path.is_file() {
        return Err(LoadError::Missing {
            path: path.to_path_buf(),
        });
    }
    let raw = fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: BTreeMap<String, CatalogEntry> =
        serde_json::from_str(&raw).map_err(|source| LoadError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(entries
        .into_iter()
        .map(|(id, entry)| match entry {
            CatalogEntry::Question(question) => CriterionDefinition {
                id,
                question,
                category: general_category(),
            },
            CatalogEntry::Full { question, category } => CriterionDefinition {
                id,
                question,
                category,
            },
        })
        .collect())
}

/// Directory searched for audit records when `--data` is not given.
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|base| base.join("archgov").join("audits"))
}
