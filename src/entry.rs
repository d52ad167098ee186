//! Grade entry form: cascading class selection, per-student raw score input
//! and the batch save.

use crate::catalog;
use crate::error::{AppError, ValidationError};
use crate::model::{format_day, parse_day, score_or_zero, GradeBatch, ScoreEntry, Student};
use crate::shell::DirtyObserver;
use crate::store::DataStore;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

pub const SAVED_NOTICE: &str = "Sincronizado con Google Sheets";
pub const SAVE_FAILED_NOTICE: &str = "Error de sincronización";
pub const ROSTER_FAILED_NOTICE: &str = "Error al cargar estudiantes";

#[derive(Debug, Clone)]
pub struct GradeEntry {
    teacher: String,
    subject: String,
    grade: String,
    category: String,
    date: NaiveDate,
    roster: Vec<Student>,
    /// Raw text typed per student id, parsed only on save.
    scores: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRow {
    pub student_id: String,
    pub full_name: String,
    pub input: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySnapshot {
    pub teacher: String,
    pub subject: String,
    pub grade: String,
    pub category: String,
    pub date: String,
    pub subject_options: Vec<&'static str>,
    pub grade_options: Vec<&'static str>,
    pub category_options: Vec<&'static str>,
    pub rows: Vec<EntryRow>,
    pub dirty: bool,
}

impl GradeEntry {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            teacher: String::new(),
            subject: String::new(),
            grade: String::new(),
            category: String::new(),
            date: today,
            roster: Vec::new(),
            scores: HashMap::new(),
        }
    }

    pub fn teacher(&self) -> &str {
        &self.teacher
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn roster(&self) -> &[Student] {
        &self.roster
    }

    /// True when any typed score is non-blank.
    pub fn is_dirty(&self) -> bool {
        self.scores.values().any(|v| !v.trim().is_empty())
    }

    /// Resets subject, grade and category, whatever the new teacher is.
    pub fn set_teacher(&mut self, teacher: &str, observer: &mut dyn DirtyObserver) {
        self.teacher = teacher.to_string();
        self.subject.clear();
        self.grade.clear();
        self.category.clear();
        self.clear_roster(observer);
    }

    pub fn set_subject(
        &mut self,
        subject: &str,
        observer: &mut dyn DirtyObserver,
    ) -> Result<(), ValidationError> {
        if !subject.is_empty() && self.teacher.is_empty() {
            return Err(ValidationError::UpstreamNotSelected("el maestro"));
        }
        self.subject = subject.to_string();
        self.grade.clear();
        self.category.clear();
        self.clear_roster(observer);
        Ok(())
    }

    /// Selecting a grade loads its roster and resets every score input to
    /// the empty string.
    pub fn set_grade(
        &mut self,
        grade: &str,
        store: &mut dyn DataStore,
        observer: &mut dyn DirtyObserver,
    ) -> Result<(), AppError> {
        if !grade.is_empty() && self.subject.is_empty() {
            return Err(ValidationError::UpstreamNotSelected("la materia").into());
        }
        self.grade = grade.to_string();
        self.category.clear();
        self.clear_roster(observer);
        if grade.is_empty() {
            return Ok(());
        }

        let students = store
            .get_students()
            .map_err(AppError::sync(ROSTER_FAILED_NOTICE))?;
        self.roster = students.into_iter().filter(|s| s.grade == grade).collect();
        self.scores = self
            .roster
            .iter()
            .map(|s| (s.id.clone(), String::new()))
            .collect();
        tracing::debug!(grade, students = self.roster.len(), "roster loaded");
        observer.dirty_changed(self.is_dirty());
        Ok(())
    }

    pub fn set_category(&mut self, category: &str) -> Result<(), ValidationError> {
        if !category.is_empty() && self.grade.is_empty() {
            return Err(ValidationError::UpstreamNotSelected("el grado"));
        }
        self.category = category.to_string();
        Ok(())
    }

    pub fn set_date(&mut self, raw: &str) -> Result<(), ValidationError> {
        self.date = parse_day(raw).ok_or(ValidationError::InvalidDate)?;
        Ok(())
    }

    pub fn set_score(
        &mut self,
        student_id: &str,
        raw: &str,
        observer: &mut dyn DirtyObserver,
    ) -> Result<(), ValidationError> {
        let Some(slot) = self.scores.get_mut(student_id) else {
            return Err(ValidationError::UnknownStudent);
        };
        *slot = raw.to_string();
        observer.dirty_changed(self.is_dirty());
        Ok(())
    }

    /// One entry per roster student; blank or unparsable input counts as 0.
    pub fn build_batch(&self) -> Result<GradeBatch, ValidationError> {
        if self.teacher.is_empty()
            || self.subject.is_empty()
            || self.grade.is_empty()
            || self.category.is_empty()
        {
            return Err(ValidationError::IncompleteSelection);
        }
        let scores = self
            .roster
            .iter()
            .map(|s| ScoreEntry {
                student_id: s.id.clone(),
                full_name: s.full_name(),
                score: self
                    .scores
                    .get(&s.id)
                    .map(|raw| score_or_zero(raw))
                    .unwrap_or(0.0),
                teacher: self.teacher.clone(),
            })
            .collect();
        Ok(GradeBatch {
            date: self.date,
            grade: self.grade.clone(),
            subject: self.subject.clone(),
            category: self.category.clone(),
            scores,
        })
    }

    /// Submits the batch. On success every input is blanked (the roster
    /// stays) and the unsaved flag is cleared; on failure inputs are kept.
    pub fn save(
        &mut self,
        store: &mut dyn DataStore,
        observer: &mut dyn DirtyObserver,
    ) -> Result<usize, AppError> {
        let batch = self.build_batch()?;
        store
            .save_grade_batch(&batch)
            .map_err(AppError::sync(SAVE_FAILED_NOTICE))?;
        for v in self.scores.values_mut() {
            v.clear();
        }
        observer.dirty_changed(false);
        Ok(batch.scores.len())
    }

    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            teacher: self.teacher.clone(),
            subject: self.subject.clone(),
            grade: self.grade.clone(),
            category: self.category.clone(),
            date: format_day(self.date),
            subject_options: if self.teacher.is_empty() {
                Vec::new()
            } else {
                catalog::all_unique_subjects()
            },
            grade_options: if self.subject.is_empty() {
                Vec::new()
            } else {
                catalog::GRADES.to_vec()
            },
            category_options: if self.grade.is_empty() {
                Vec::new()
            } else {
                catalog::CATEGORIES.to_vec()
            },
            rows: self
                .roster
                .iter()
                .map(|s| EntryRow {
                    student_id: s.id.clone(),
                    full_name: s.full_name(),
                    input: self.scores.get(&s.id).cloned().unwrap_or_default(),
                })
                .collect(),
            dirty: self.is_dirty(),
        }
    }

    fn clear_roster(&mut self, observer: &mut dyn DirtyObserver) {
        self.roster.clear();
        self.scores.clear();
        observer.dirty_changed(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AllData, GradeRecord};
    use crate::store::StoreError;

    #[derive(Default)]
    struct Flag {
        seen: Vec<bool>,
    }

    impl DirtyObserver for Flag {
        fn dirty_changed(&mut self, dirty: bool) {
            self.seen.push(dirty);
        }
    }

    impl Flag {
        fn last(&self) -> Option<bool> {
            self.seen.last().copied()
        }
    }

    /// In-memory store that can be told to fail.
    #[derive(Default)]
    struct MemStore {
        students: Vec<Student>,
        batches: Vec<GradeBatch>,
        fail: bool,
    }

    impl MemStore {
        fn with_roster(grade: &str, names: &[(&str, &str)]) -> Self {
            Self {
                students: names
                    .iter()
                    .enumerate()
                    .map(|(i, (last, first))| Student {
                        id: format!("STU-{i}"),
                        last_name: last.to_string(),
                        first_name: first.to_string(),
                        grade: grade.to_string(),
                    })
                    .collect(),
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Protocol("offline".to_string()));
            }
            Ok(())
        }
    }

    impl DataStore for MemStore {
        fn backend_name(&self) -> &'static str {
            "memory"
        }
        fn get_all_data(&mut self) -> Result<AllData, StoreError> {
            self.check()?;
            Ok(AllData {
                estudiantes: self.students.clone(),
                registros: Vec::<GradeRecord>::new(),
            })
        }
        fn add_student(&mut self, _: &str, _: &str, _: &str) -> Result<(), StoreError> {
            self.check()
        }
        fn add_students_bulk(&mut self, _: &str, _: &str) -> Result<usize, StoreError> {
            self.check().map(|_| 0)
        }
        fn save_grade_batch(&mut self, batch: &GradeBatch) -> Result<(), StoreError> {
            self.check()?;
            self.batches.push(batch.clone());
            Ok(())
        }
        fn edit_record(&mut self, _: &str, _: f64) -> Result<(), StoreError> {
            self.check()
        }
        fn delete_record(&mut self, _: &str) -> Result<(), StoreError> {
            self.check()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 20).expect("date")
    }

    fn selected(store: &mut MemStore, flag: &mut Flag) -> GradeEntry {
        let mut entry = GradeEntry::new(today());
        entry.set_teacher("Iván Lemus", flag);
        entry.set_subject("Math", flag).expect("subject");
        entry.set_grade("3rd Grade", store, flag).expect("grade");
        entry.set_category("Actividad 1").expect("category");
        entry
    }

    #[test]
    fn teacher_change_resets_downstream_selections() {
        let mut store = MemStore::with_roster("3rd Grade", &[("A", "One")]);
        let mut flag = Flag::default();
        let mut entry = selected(&mut store, &mut flag);

        entry.set_teacher("Iván Lemus", &mut flag);
        assert_eq!(entry.subject(), "");
        assert_eq!(entry.grade(), "");
        assert_eq!(entry.category(), "");
        assert!(entry.roster().is_empty());
    }

    #[test]
    fn subject_and_grade_changes_cascade() {
        let mut store = MemStore::with_roster("3rd Grade", &[("A", "One")]);
        let mut flag = Flag::default();
        let mut entry = selected(&mut store, &mut flag);

        entry.set_grade("3rd Grade", &mut store, &mut flag).expect("grade");
        assert_eq!(entry.category(), "");
        assert_eq!(entry.subject(), "Math");

        entry.set_category("Tareas").expect("category");
        entry.set_subject("Science", &mut flag).expect("subject");
        assert_eq!(entry.grade(), "");
        assert_eq!(entry.category(), "");
        assert_eq!(entry.teacher(), "Iván Lemus");
    }

    #[test]
    fn downstream_fields_need_upstream_selection() {
        let mut store = MemStore::default();
        let mut flag = Flag::default();
        let mut entry = GradeEntry::new(today());
        assert_eq!(
            entry.set_subject("Math", &mut flag),
            Err(ValidationError::UpstreamNotSelected("el maestro"))
        );
        assert!(matches!(
            entry.set_grade("1st Grade", &mut store, &mut flag),
            Err(AppError::Validation(ValidationError::UpstreamNotSelected(_)))
        ));
        assert!(entry.set_category("Tareas").is_err());
    }

    #[test]
    fn grade_selection_loads_only_that_roster() {
        let mut store = MemStore::with_roster("3rd Grade", &[("A", "One"), ("B", "Two")]);
        store.students.push(Student {
            id: "STU-x".to_string(),
            last_name: "Other".to_string(),
            first_name: "Grade".to_string(),
            grade: "4th Grade".to_string(),
        });
        let mut flag = Flag::default();
        let entry = selected(&mut store, &mut flag);
        assert_eq!(entry.roster().len(), 2);
        let snap = entry.snapshot();
        assert_eq!(snap.rows.len(), 2);
        assert!(snap.rows.iter().all(|r| r.input.is_empty()));
        assert_eq!(snap.rows[0].full_name, "A, One");
    }

    #[test]
    fn roster_failure_leaves_empty_roster() {
        let mut store = MemStore::with_roster("3rd Grade", &[("A", "One")]);
        let mut flag = Flag::default();
        let mut entry = GradeEntry::new(today());
        entry.set_teacher("Iván Lemus", &mut flag);
        entry.set_subject("Math", &mut flag).expect("subject");
        store.fail = true;
        let e = entry
            .set_grade("3rd Grade", &mut store, &mut flag)
            .expect_err("fails");
        assert_eq!(e.notice(), ROSTER_FAILED_NOTICE);
        assert!(entry.roster().is_empty());
        assert_eq!(entry.grade(), "3rd Grade");
    }

    #[test]
    fn dirty_tracks_non_blank_input() {
        let mut store = MemStore::with_roster("3rd Grade", &[("A", "One"), ("B", "Two")]);
        let mut flag = Flag::default();
        let mut entry = selected(&mut store, &mut flag);
        assert!(!entry.is_dirty());

        entry.set_score("STU-0", "   ", &mut flag).expect("score");
        assert!(!entry.is_dirty());
        assert_eq!(flag.last(), Some(false));

        entry.set_score("STU-1", " 7 ", &mut flag).expect("score");
        assert!(entry.is_dirty());
        assert_eq!(flag.last(), Some(true));

        entry.set_score("STU-1", "", &mut flag).expect("score");
        assert_eq!(flag.last(), Some(false));

        assert_eq!(
            entry.set_score("STU-9", "5", &mut flag),
            Err(ValidationError::UnknownStudent)
        );
    }

    #[test]
    fn save_requires_full_selection_and_never_calls_store() {
        let mut store = MemStore::with_roster("3rd Grade", &[("A", "One")]);
        let mut flag = Flag::default();
        let mut entry = GradeEntry::new(today());
        entry.set_teacher("Iván Lemus", &mut flag);
        entry.set_subject("Math", &mut flag).expect("subject");
        entry.set_grade("3rd Grade", &mut store, &mut flag).expect("grade");
        let e = entry.save(&mut store, &mut flag).expect_err("no category");
        assert_eq!(e.code(), "validation_failed");
        assert_eq!(e.notice(), "Completa toda la configuración requerida");
        assert!(store.batches.is_empty());
    }

    #[test]
    fn save_submits_one_score_per_roster_student() {
        let mut store =
            MemStore::with_roster("3rd Grade", &[("A", "One"), ("B", "Two"), ("C", "Three")]);
        let mut flag = Flag::default();
        let mut entry = selected(&mut store, &mut flag);
        entry.set_date("2026-04-01").expect("date");
        entry.set_score("STU-0", "8.5", &mut flag).expect("score");
        entry.set_score("STU-2", "abc", &mut flag).expect("score");

        let n = entry.save(&mut store, &mut flag).expect("save");
        assert_eq!(n, 3);
        let batch = &store.batches[0];
        let scores: Vec<f64> = batch.scores.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![8.5, 0.0, 0.0]);
        assert!(batch.scores.iter().all(|s| s.teacher == "Iván Lemus"));
        assert_eq!(batch.date, NaiveDate::from_ymd_opt(2026, 4, 1).expect("date"));
        assert_eq!(batch.category, "Actividad 1");

        assert!(!entry.is_dirty());
        assert_eq!(flag.last(), Some(false));
        assert_eq!(entry.roster().len(), 3);
        assert!(entry.snapshot().rows.iter().all(|r| r.input.is_empty()));
    }

    #[test]
    fn failed_save_keeps_inputs() {
        let mut store = MemStore::with_roster("3rd Grade", &[("A", "One")]);
        let mut flag = Flag::default();
        let mut entry = selected(&mut store, &mut flag);
        entry.set_score("STU-0", "9", &mut flag).expect("score");
        store.fail = true;
        let e = entry.save(&mut store, &mut flag).expect_err("offline");
        assert_eq!(e.code(), "sync_failed");
        assert_eq!(e.notice(), SAVE_FAILED_NOTICE);
        assert!(entry.is_dirty());
    }

    #[test]
    fn invalid_date_is_rejected() {
        let mut entry = GradeEntry::new(today());
        assert_eq!(entry.set_date("31/12/2026"), Err(ValidationError::InvalidDate));
        assert_eq!(entry.set_date("2026-04-01xyz"), Err(ValidationError::InvalidDate));
        assert_eq!(entry.date(), today());
    }

    #[test]
    fn options_follow_the_cascade() {
        let mut flag = Flag::default();
        let mut entry = GradeEntry::new(today());
        let snap = entry.snapshot();
        assert!(snap.subject_options.is_empty());
        entry.set_teacher("Alex Sura", &mut flag);
        let snap = entry.snapshot();
        assert_eq!(snap.subject_options, catalog::all_unique_subjects());
        assert!(snap.grade_options.is_empty());
    }
}
