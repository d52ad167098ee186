//! Roster management forms: single student registration and bulk import.

use crate::catalog;
use crate::error::{AppError, ValidationError};
use crate::model::Student;
use crate::store::DataStore;
use serde::Serialize;

pub const SAVED_NOTICE: &str = "Estudiante guardado en Google Sheets";
pub const SAVE_FAILED_NOTICE: &str = "Error al guardar estudiante";
pub const BULK_FAILED_NOTICE: &str = "Error en la carga masiva";
pub const LIST_FAILED_NOTICE: &str = "Error al cargar estudiantes";

pub fn bulk_saved_notice(count: usize) -> String {
    format!("¡Éxito! Se han importado {} estudiantes a la hoja", count)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndividualForm {
    pub last_name: String,
    pub first_name: String,
    pub grade: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkForm {
    pub text: String,
    pub grade: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentForms {
    pub individual: IndividualForm,
    pub bulk: BulkForm,
}

impl Default for StudentForms {
    fn default() -> Self {
        Self {
            individual: IndividualForm {
                last_name: String::new(),
                first_name: String::new(),
                grade: catalog::first_grade().to_string(),
            },
            bulk: BulkForm {
                text: String::new(),
                grade: catalog::first_grade().to_string(),
            },
        }
    }
}

impl StudentForms {
    /// Registers one student. The grade is kept afterwards so several
    /// students of the same grade can be typed in a row.
    pub fn submit_individual(&mut self, store: &mut dyn DataStore) -> Result<(), AppError> {
        let form = &mut self.individual;
        if form.first_name.is_empty() || form.last_name.is_empty() {
            return Err(ValidationError::MissingNames.into());
        }
        store
            .add_student(&form.last_name, &form.first_name, &form.grade)
            .map_err(AppError::sync(SAVE_FAILED_NOTICE))?;
        form.last_name.clear();
        form.first_name.clear();
        Ok(())
    }

    /// Imports the pasted list; returns how many students the store created.
    pub fn submit_bulk(&mut self, store: &mut dyn DataStore) -> Result<usize, AppError> {
        let form = &mut self.bulk;
        if form.text.trim().is_empty() {
            return Err(ValidationError::EmptyBulkList.into());
        }
        let count = store
            .add_students_bulk(&form.text, &form.grade)
            .map_err(AppError::sync(BULK_FAILED_NOTICE))?;
        form.text.clear();
        Ok(count)
    }
}

/// Roster listing, optionally narrowed to one grade.
pub fn list(store: &mut dyn DataStore, grade: Option<&str>) -> Result<Vec<Student>, AppError> {
    let students = store
        .get_students()
        .map_err(AppError::sync(LIST_FAILED_NOTICE))?;
    Ok(match grade.filter(|g| !g.is_empty()) {
        Some(g) => students.into_iter().filter(|s| s.grade == g).collect(),
        None => students,
    })
}
