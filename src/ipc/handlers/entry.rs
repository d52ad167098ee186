use crate::entry::SAVED_NOTICE;
use crate::error::AppError;
use crate::ipc::error::{fail, ok, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn snapshot(state: &AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(state.entry.snapshot()))
}

fn handle_entry_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let value = match required_str(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let res: Result<(), AppError> = match req.method.as_str() {
        "entry.setTeacher" => {
            state.entry.set_teacher(&value, &mut state.shell);
            Ok(())
        }
        "entry.setSubject" => state
            .entry
            .set_subject(&value, &mut state.shell)
            .map_err(AppError::from),
        "entry.setGrade" => state
            .entry
            .set_grade(&value, state.store.as_mut(), &mut state.shell),
        "entry.setCategory" => state.entry.set_category(&value).map_err(AppError::from),
        _ => state.entry.set_date(&value).map_err(AppError::from),
    };
    match res {
        Ok(()) => snapshot(state, req),
        Err(e) => fail(state, req, e),
    }
}

fn handle_entry_set_score(state: &mut AppState, req: &Request) -> serde_json::Value {
    let student_id = match required_str(req, "studentId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let value = match required_str(req, "value") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if let Err(e) = state
        .entry
        .set_score(&student_id, &value, &mut state.shell)
    {
        return fail(state, req, e.into());
    }
    ok(&req.id, json!({ "dirty": state.entry.is_dirty() }))
}

fn handle_entry_save(state: &mut AppState, req: &Request) -> serde_json::Value {
    match state.entry.save(state.store.as_mut(), &mut state.shell) {
        Ok(saved) => {
            state.shell.success(SAVED_NOTICE);
            ok(&req.id, json!({ "saved": saved }))
        }
        Err(e) => fail(state, req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "entry.state" => Some(snapshot(state, req)),
        "entry.setTeacher" | "entry.setSubject" | "entry.setGrade" | "entry.setCategory"
        | "entry.setDate" => Some(handle_entry_set(state, req)),
        "entry.setScore" => Some(handle_entry_set_score(state, req)),
        "entry.save" => Some(handle_entry_save(state, req)),
        _ => None,
    }
}
