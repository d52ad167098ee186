use crate::backup;
use crate::ipc::error::{err, ok, required_str};
use crate::ipc::types::{AppState, Request};
use crate::reports::ReportsView;
use crate::store::LocalStore;
use serde_json::json;
use std::path::PathBuf;

/// Bundles only exist for the local store; the remote backend keeps its own
/// data.
fn local_db_path(state: &AppState, req: &Request) -> Result<PathBuf, serde_json::Value> {
    state
        .store
        .database_path()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| {
            err(
                &req.id,
                "unsupported_backend",
                "backups are only available for the local store",
                Some(json!({ "backend": state.store.backend_name() })),
            )
        })
}

fn handle_export_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_str(req, "outPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };
    let db_path = match local_db_path(state, req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    match backup::export_bundle(&db_path, &out_path) {
        Ok(summary) => {
            tracing::info!(path = %out_path.display(), "backup bundle exported");
            ok(
                &req.id,
                json!({
                    "bundleFormat": summary.bundle_format,
                    "entryCount": summary.entry_count,
                    "sha256": summary.sha256,
                }),
            )
        }
        Err(e) => err(
            &req.id,
            "backup_failed",
            format!("{e:#}"),
            Some(json!({ "outPath": out_path.to_string_lossy() })),
        ),
    }
}

fn handle_import_bundle(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match required_str(req, "inPath") {
        Ok(v) => PathBuf::from(v),
        Err(resp) => return resp,
    };
    let db_path = match local_db_path(state, req) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let summary = match backup::import_bundle(&in_path, &db_path) {
        Ok(s) => s,
        Err(e) => {
            return err(
                &req.id,
                "backup_failed",
                format!("{e:#}"),
                Some(json!({ "inPath": in_path.to_string_lossy() })),
            )
        }
    };

    // The open connection still points at the replaced file.
    match LocalStore::open(&state.config.data_dir) {
        Ok(store) => state.store = Box::new(store),
        Err(e) => {
            return err(
                &req.id,
                "backup_failed",
                format!("{e:#}"),
                Some(json!({ "dataDir": state.config.data_dir.to_string_lossy() })),
            )
        }
    }
    state.reports = ReportsView::default();
    tracing::info!(
        path = %in_path.display(),
        format = %summary.bundle_format_detected,
        "backup bundle imported"
    );
    ok(
        &req.id,
        json!({ "bundleFormatDetected": summary.bundle_format_detected }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportBundle" => Some(handle_export_bundle(state, req)),
        "backup.importBundle" => Some(handle_import_bundle(state, req)),
        _ => None,
    }
}
