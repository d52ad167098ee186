use crate::catalog::REPORT_COLUMNS;
use crate::error::AppError;
use crate::ipc::error::{err, fail, ok, optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::reports::{ReportFilters, DELETED_NOTICE, EDITED_NOTICE};
use serde_json::json;
use std::path::PathBuf;

fn rows_json(state: &AppState) -> serde_json::Value {
    json!(state.reports.rows())
}

/// A refresh after a saved change only raises its own notice; the change
/// itself already succeeded.
fn note_reload(state: &mut AppState, reload: Result<usize, AppError>) -> bool {
    match reload {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, cause = ?e.details(), "report reload after change failed");
            state.shell.error(e.notice());
            false
        }
    }
}

fn handle_reports_load(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.reports.load(state.store.as_mut()) {
        Ok(count) => ok(&req.id, json!({ "count": count })),
        Err(e) => fail(state, req, e),
    }
}

fn handle_reports_set_filters(state: &mut AppState, req: &Request) -> serde_json::Value {
    let mut filters = state.reports.filters().clone();
    if let Some(v) = optional_str(req, "grade") {
        filters.grade = v.to_string();
    }
    if let Some(v) = optional_str(req, "teacher") {
        filters.teacher = v.to_string();
    }
    state.reports.set_filters(filters);
    ok(&req.id, json!({ "rows": rows_json(state) }))
}

fn handle_reports_rows(state: &mut AppState, req: &Request) -> serde_json::Value {
    let columns: Vec<&str> = REPORT_COLUMNS.iter().map(|c| c.header).collect();
    let filters: &ReportFilters = state.reports.filters();
    ok(
        &req.id,
        json!({
            "loaded": state.reports.is_loaded(),
            "filters": filters,
            "columns": columns,
            "rows": rows_json(state),
        }),
    )
}

fn handle_reports_edit_score(state: &mut AppState, req: &Request) -> serde_json::Value {
    let record_id = match required_str(req, "recordId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let value = match required_str(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state
        .reports
        .edit_score(state.store.as_mut(), &record_id, &value)
    {
        Ok(applied) => {
            state.shell.success(EDITED_NOTICE);
            let reloaded = note_reload(state, applied.reload);
            ok(
                &req.id,
                json!({
                    "score": applied.value,
                    "reloaded": reloaded,
                    "rows": rows_json(state),
                }),
            )
        }
        Err(e) => fail(state, req, e),
    }
}

fn handle_reports_delete_record(state: &mut AppState, req: &Request) -> serde_json::Value {
    let record_id = match required_str(req, "recordId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match state
        .reports
        .delete_record(state.store.as_mut(), &record_id)
    {
        Ok(applied) => {
            state.shell.success(DELETED_NOTICE);
            let reloaded = note_reload(state, applied.reload);
            ok(
                &req.id,
                json!({ "reloaded": reloaded, "rows": rows_json(state) }),
            )
        }
        Err(e) => fail(state, req, e),
    }
}

fn handle_reports_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_str(req, "outPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };
    match state.reports.export_csv(&out_path) {
        Ok(row_count) => ok(
            &req.id,
            json!({
                "rowCount": row_count,
                "path": out_path.to_string_lossy(),
            }),
        ),
        Err(e) => err(
            &req.id,
            "export_failed",
            format!("{e:#}"),
            Some(json!({ "outPath": out_path.to_string_lossy() })),
        ),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.load" => Some(handle_reports_load(state, req)),
        "reports.setFilters" => Some(handle_reports_set_filters(state, req)),
        "reports.rows" => Some(handle_reports_rows(state, req)),
        "reports.editScore" => Some(handle_reports_edit_score(state, req)),
        "reports.deleteRecord" => Some(handle_reports_delete_record(state, req)),
        "reports.exportCsv" => Some(handle_reports_export_csv(state, req)),
        _ => None,
    }
}
