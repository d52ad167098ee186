use super::{bulk_lines, split_bulk_line, DataStore, StoreError};
use crate::model::{AllData, GradeBatch, GradeRecord, Student};
use rusqlite::{Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub const DB_FILE: &str = "edugrade.sqlite3";
pub const STUDENTS_KEY: &str = "edugrade_students";
pub const RECORDS_KEY: &str = "edugrade_records";

/// Key-value fallback store. Each collection lives under one key as a JSON
/// array; every operation rewrites the whole array in a single statement.
pub struct LocalStore {
    conn: Connection,
    path: PathBuf,
}

impl LocalStore {
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(DB_FILE);
        let conn = Connection::open(&path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS local_storage(
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn, path })
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?",
                [key],
                |r| r.get(0),
            )
            .optional()?;
        match raw {
            Some(text) => Ok(serde_json::from_str(&text)?),
            None => Ok(Vec::new()),
        }
    }

    fn write<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let text = serde_json::to_string(items)?;
        self.conn.execute(
            "INSERT INTO local_storage(key, value) VALUES(?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, &text),
        )?;
        Ok(())
    }

    fn append_students(&mut self, new: Vec<(String, String)>, grade: &str) -> Result<usize, StoreError> {
        let mut students: Vec<Student> = self.read(STUDENTS_KEY)?;
        let mut taken: HashSet<String> = students.iter().map(|s| s.id.clone()).collect();
        let count = new.len();
        for (last_name, first_name) in new {
            let id = fresh_id("STU", &mut taken);
            students.push(Student {
                id,
                last_name,
                first_name,
                grade: grade.to_string(),
            });
        }
        self.write(STUDENTS_KEY, &students)?;
        Ok(count)
    }
}

/// `<prefix>-<unix millis>-<8 hex>`, regenerated until it is not in `taken`.
fn fresh_id(prefix: &str, taken: &mut HashSet<String>) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let id = format!("{}-{}-{}", prefix, millis, &suffix[..8]);
        if taken.insert(id.clone()) {
            return id;
        }
    }
}

impl DataStore for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn get_all_data(&mut self) -> Result<AllData, StoreError> {
        Ok(AllData {
            estudiantes: self.read(STUDENTS_KEY)?,
            registros: self.read(RECORDS_KEY)?,
        })
    }

    fn add_student(
        &mut self,
        last_name: &str,
        first_name: &str,
        grade: &str,
    ) -> Result<(), StoreError> {
        self.append_students(vec![(last_name.to_string(), first_name.to_string())], grade)?;
        tracing::info!(grade, "student added");
        Ok(())
    }

    fn add_students_bulk(&mut self, text: &str, grade: &str) -> Result<usize, StoreError> {
        let names = bulk_lines(text)
            .into_iter()
            .map(split_bulk_line)
            .map(|n| (n.last_name, n.first_name))
            .collect::<Vec<_>>();
        let count = self.append_students(names, grade)?;
        tracing::info!(grade, count, "bulk students added");
        Ok(count)
    }

    fn save_grade_batch(&mut self, batch: &GradeBatch) -> Result<(), StoreError> {
        let mut records: Vec<GradeRecord> = self.read(RECORDS_KEY)?;
        let mut taken: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
        for entry in &batch.scores {
            records.push(GradeRecord {
                id: fresh_id("REG", &mut taken),
                date: batch.date,
                student_id: entry.student_id.clone(),
                full_name: entry.full_name.clone(),
                grade: batch.grade.clone(),
                subject: batch.subject.clone(),
                category: batch.category.clone(),
                score: entry.score,
                teacher: entry.teacher.clone(),
            });
        }
        self.write(RECORDS_KEY, &records)?;
        tracing::info!(
            grade = %batch.grade,
            subject = %batch.subject,
            category = %batch.category,
            count = batch.scores.len(),
            "grade batch saved"
        );
        Ok(())
    }

    fn edit_record(&mut self, id: &str, new_score: f64) -> Result<(), StoreError> {
        let mut records: Vec<GradeRecord> = self.read(RECORDS_KEY)?;
        let Some(rec) = records.iter_mut().find(|r| r.id == id) else {
            tracing::debug!(id, "edit of unknown record ignored");
            return Ok(());
        };
        rec.score = new_score;
        self.write(RECORDS_KEY, &records)?;
        tracing::info!(id, score = new_score, "record score updated");
        Ok(())
    }

    fn delete_record(&mut self, id: &str) -> Result<(), StoreError> {
        let mut records: Vec<GradeRecord> = self.read(RECORDS_KEY)?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            tracing::debug!(id, "delete of unknown record ignored");
            return Ok(());
        }
        self.write(RECORDS_KEY, &records)?;
        tracing::info!(id, "record deleted");
        Ok(())
    }

    fn database_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
