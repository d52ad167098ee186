//! Consolidated report grid over every saved grade record.

use crate::catalog::{self, REPORT_COLUMNS};
use crate::error::{AppError, ValidationError};
use crate::model::{parse_leading_float, GradeRecord};
use crate::store::DataStore;
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

pub const LOAD_FAILED_NOTICE: &str = "Error al leer de la hoja de cálculo";
pub const EDITED_NOTICE: &str = "Nota actualizada correctamente";
pub const EDIT_FAILED_NOTICE: &str = "Error al actualizar nota";
pub const DELETED_NOTICE: &str = "Nota eliminada";
pub const DELETE_FAILED_NOTICE: &str = "Error al eliminar nota";

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

const CARNE_LEN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportFilters {
    pub grade: String,
    pub teacher: String,
}

impl ReportFilters {
    /// Empty filter values match everything.
    pub fn matches(&self, rec: &GradeRecord) -> bool {
        (self.grade.is_empty() || rec.grade == self.grade)
            && (self.teacher.is_empty() || rec.teacher == self.teacher)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub index: usize,
    pub record_id: String,
    pub carne: String,
    pub full_name: String,
    pub category: String,
    pub score: f64,
    /// One value per report column; only the column matching the record's
    /// category carries the score.
    pub cells: Vec<f64>,
    pub shown_in_grid: bool,
    pub known_category: bool,
}

impl ReportRow {
    fn from_record(index: usize, rec: &GradeRecord) -> Self {
        let cells: Vec<f64> = REPORT_COLUMNS
            .iter()
            .map(|col| {
                if rec.category == col.category {
                    rec.score
                } else {
                    0.0
                }
            })
            .collect();
        Self {
            index,
            record_id: rec.id.clone(),
            carne: rec
                .student_id
                .chars()
                .take(CARNE_LEN)
                .collect::<String>()
                .to_uppercase(),
            full_name: rec.full_name.clone(),
            category: rec.category.clone(),
            score: rec.score,
            cells,
            shown_in_grid: REPORT_COLUMNS.iter().any(|c| c.category == rec.category),
            known_category: catalog::is_known_category(&rec.category),
        }
    }
}

/// Validates a typed replacement score: a number in [0, 10].
pub fn parse_edit_score(raw: &str) -> Result<f64, ValidationError> {
    match parse_leading_float(raw) {
        Some(v) if (MIN_SCORE..=MAX_SCORE).contains(&v) => Ok(v),
        _ => Err(ValidationError::InvalidScore),
    }
}

/// A change the store accepted, with the outcome of the reload after it.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub reload: Result<usize, AppError>,
}

#[derive(Debug, Default)]
pub struct ReportsView {
    records: Vec<GradeRecord>,
    filters: ReportFilters,
    loaded: bool,
}

impl ReportsView {
    /// Replaces the loaded set with a fresh copy from the store. On failure
    /// the previous set is kept.
    pub fn load(&mut self, store: &mut dyn DataStore) -> Result<usize, AppError> {
        let data = store
            .get_all_data()
            .map_err(AppError::sync(LOAD_FAILED_NOTICE))?;
        self.records = data.registros;
        self.loaded = true;
        tracing::debug!(records = self.records.len(), "report records loaded");
        Ok(self.records.len())
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn filters(&self) -> &ReportFilters {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: ReportFilters) {
        self.filters = filters;
    }

    /// Loaded records passing the filters, in load order.
    pub fn filtered(&self) -> Vec<&GradeRecord> {
        self.records
            .iter()
            .filter(|r| self.filters.matches(r))
            .collect()
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.filtered()
            .into_iter()
            .enumerate()
            .map(|(i, rec)| ReportRow::from_record(i + 1, rec))
            .collect()
    }

    /// Validates first; the store is only touched for a score in range.
    /// Once the store accepts the score the edit stands, whatever the
    /// refresh that follows does.
    pub fn edit_score(
        &mut self,
        store: &mut dyn DataStore,
        record_id: &str,
        raw: &str,
    ) -> Result<Applied<f64>, AppError> {
        let score = parse_edit_score(raw)?;
        store
            .edit_record(record_id, score)
            .map_err(AppError::sync(EDIT_FAILED_NOTICE))?;
        Ok(Applied {
            value: score,
            reload: self.load(store),
        })
    }

    pub fn delete_record(
        &mut self,
        store: &mut dyn DataStore,
        record_id: &str,
    ) -> Result<Applied<()>, AppError> {
        store
            .delete_record(record_id)
            .map_err(AppError::sync(DELETE_FAILED_NOTICE))?;
        Ok(Applied {
            value: (),
            reload: self.load(store),
        })
    }

    /// Writes the filtered grid as CSV. Returns the number of data rows.
    pub fn export_csv(&self, out_path: &Path) -> anyhow::Result<usize> {
        if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let mut out = std::fs::File::create(out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;

        let mut header = vec!["#", "Carné", "Nombre"];
        header.extend(REPORT_COLUMNS.iter().map(|c| c.header));
        writeln!(out, "{}", header.join(","))?;

        let rows = self.rows();
        for row in &rows {
            let mut fields = vec![
                row.index.to_string(),
                csv_quote(&row.carne),
                csv_quote(&row.full_name),
            ];
            fields.extend(row.cells.iter().map(|v| format!("{:.2}", v)));
            writeln!(out, "{}", fields.join(","))?;
        }
        Ok(rows.len())
    }
}

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
