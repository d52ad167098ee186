use crate::error::AppError;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Failed user action: raises the error notification and answers with the
/// flattened code.
pub fn fail(state: &mut AppState, req: &Request, e: AppError) -> serde_json::Value {
    match &e {
        AppError::Validation(v) => {
            tracing::debug!(method = %req.method, reason = %v, "input rejected");
        }
        AppError::Sync { source, .. } => {
            tracing::warn!(method = %req.method, error = %source, "backend call failed");
        }
    }
    state.shell.error(e.notice());
    err(
        &req.id,
        e.code(),
        e.notice(),
        e.details().map(|d| json!({ "cause": d })),
    )
}

pub fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}
