//! Backend-agnostic record store.
//!
//! The running process talks to exactly one backend for its whole lifetime:
//! either the spreadsheet bridge ([`RemoteStore`]) or the on-disk key-value
//! fallback ([`LocalStore`]). The choice is made once by [`open`] from the
//! startup [`Config`](crate::config::Config) and the resulting store is
//! injected into the application state.

mod local;
mod remote;

pub use local::LocalStore;
pub use remote::{ProcessBridge, RemoteStore};

use crate::config::{BackendChoice, Config};
use crate::model::{AllData, GradeBatch, GradeRecord, Student};
use anyhow::Context;

/// Placeholder first name for bulk lines without a comma.
pub const MISSING_FIRST_NAME: &str = "---";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("remote procedure {procedure} failed ({code}): {message}")]
    Remote {
        procedure: String,
        code: String,
        message: String,
    },
    #[error("bridge closed while waiting for {procedure}")]
    BridgeClosed { procedure: String },
    #[error("bridge protocol error: {0}")]
    Protocol(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Record operations shared by both backends.
///
/// Every method persists before returning. Nothing here validates input;
/// selections and score bounds are checked by the calling view.
pub trait DataStore {
    /// Short name used in logs and `health`.
    fn backend_name(&self) -> &'static str;

    fn get_all_data(&mut self) -> Result<AllData, StoreError>;

    fn get_students(&mut self) -> Result<Vec<Student>, StoreError> {
        Ok(self.get_all_data()?.estudiantes)
    }

    fn get_records(&mut self) -> Result<Vec<GradeRecord>, StoreError> {
        Ok(self.get_all_data()?.registros)
    }

    fn add_student(
        &mut self,
        last_name: &str,
        first_name: &str,
        grade: &str,
    ) -> Result<(), StoreError>;

    /// Creates one student per non-blank line of `text` and returns how many
    /// were created.
    fn add_students_bulk(&mut self, text: &str, grade: &str) -> Result<usize, StoreError>;

    /// Appends one record per score entry. Existing records with the same
    /// date/subject/category are left alone.
    fn save_grade_batch(&mut self, batch: &GradeBatch) -> Result<(), StoreError>;

    /// Replaces the score of the record with `id`. Unknown ids are a no-op.
    fn edit_record(&mut self, id: &str, new_score: f64) -> Result<(), StoreError>;

    /// Removes the record with `id`. Unknown ids are a no-op.
    fn delete_record(&mut self, id: &str) -> Result<(), StoreError>;

    /// Local database file, if this backend has one (used by backups).
    fn database_path(&self) -> Option<&std::path::Path> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkName {
    pub last_name: String,
    pub first_name: String,
}

/// Non-blank lines of a bulk import, trimmed.
pub fn bulk_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// `"Last, First"` splits at the first comma; anything else is a last name
/// with the placeholder first name.
pub fn split_bulk_line(line: &str) -> BulkName {
    match line.split_once(',') {
        Some((last, first)) => BulkName {
            last_name: last.trim().to_string(),
            first_name: first.trim().to_string(),
        },
        None => BulkName {
            last_name: line.trim().to_string(),
            first_name: MISSING_FIRST_NAME.to_string(),
        },
    }
}

/// Opens the backend chosen at startup. A bridge program that cannot be
/// found counts as no bridge at all.
pub fn open(config: &Config) -> anyhow::Result<Box<dyn DataStore>> {
    if let BackendChoice::Remote { program, args } = &config.backend {
        match ProcessBridge::spawn(program, args) {
            Ok(bridge) => {
                tracing::info!(program = %program.display(), "using remote spreadsheet backend");
                return Ok(Box::new(RemoteStore::new(bridge)));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(program = %program.display(), error = %e, "bridge program not found");
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to start bridge {}", program.display()));
            }
        }
    }
    let store = LocalStore::open(&config.data_dir)?;
    tracing::info!(
        data_dir = %config.data_dir.display(),
        "bridge not detected, using local storage backend"
    );
    Ok(Box::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_lines_skip_blank_and_whitespace_lines() {
        let lines = bulk_lines("Alvarenga, Juan\n\n   \r\nFlores, Maria\r\n");
        assert_eq!(lines, vec!["Alvarenga, Juan", "Flores, Maria"]);
    }

    #[test]
    fn split_uses_first_comma_only() {
        let n = split_bulk_line("de la Cruz , Ana, María");
        assert_eq!(n.last_name, "de la Cruz");
        assert_eq!(n.first_name, "Ana, María");
    }

    #[test]
    fn missing_bridge_program_falls_back_to_local() {
        let data_dir = std::env::temp_dir()
            .join(format!("edugrade-open-{}", uuid::Uuid::new_v4().simple()));
        let config = Config {
            backend: BackendChoice::Remote {
                program: std::path::PathBuf::from("no-such-gas-bridge-xyz"),
                args: vec!["--sheet".to_string(), "grades".to_string()],
            },
            data_dir: data_dir.clone(),
        };
        let store = open(&config).expect("local fallback");
        assert_eq!(store.backend_name(), "local");
        assert!(store.database_path().is_some());
        let _ = std::fs::remove_dir_all(data_dir);
    }

    #[test]
    fn split_without_comma_uses_placeholder() {
        let n = split_bulk_line("Sura");
        assert_eq!(n.last_name, "Sura");
        assert_eq!(n.first_name, MISSING_FIRST_NAME);
    }
}
