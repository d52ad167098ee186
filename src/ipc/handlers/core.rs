use crate::catalog;
use crate::error::AppError;
use crate::ipc::error::{fail, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "backend": state.store.backend_name(),
            "dataDir": state.config.data_dir.to_string_lossy(),
        }),
    )
}

fn handle_catalog_get(_state: &mut AppState, req: &Request) -> serde_json::Value {
    let subjects_by_grade: serde_json::Map<String, serde_json::Value> = catalog::GRADES
        .iter()
        .map(|grade| (grade.to_string(), json!(catalog::subjects_for_grade(grade))))
        .collect();
    let report_columns: Vec<serde_json::Value> = catalog::REPORT_COLUMNS
        .iter()
        .map(|c| json!({ "header": c.header, "category": c.category }))
        .collect();
    ok(
        &req.id,
        json!({
            "teachers": catalog::TEACHERS,
            "grades": catalog::GRADES,
            "subjects": catalog::all_unique_subjects(),
            "subjectsByGrade": subjects_by_grade,
            "categories": catalog::CATEGORIES,
            "reportColumns": report_columns,
        }),
    )
}

fn handle_data_get_all(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.store.get_all_data() {
        Ok(data) => ok(
            &req.id,
            json!({
                "estudiantes": data.estudiantes,
                "registros": data.registros,
            }),
        ),
        Err(e) => fail(
            state,
            req,
            AppError::Sync {
                notice: "Error de sincronización",
                source: e,
            },
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "catalog.get" => Some(handle_catalog_get(state, req)),
        "data.getAll" => Some(handle_data_get_all(state, req)),
        _ => None,
    }
}
