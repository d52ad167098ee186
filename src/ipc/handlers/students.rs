use crate::ipc::error::{fail, ok, optional_str};
use crate::ipc::types::{AppState, Request};
use crate::students::{self, bulk_saved_notice, SAVED_NOTICE};
use serde_json::json;

fn apply_individual(state: &mut AppState, req: &Request) {
    let form = &mut state.students.individual;
    if let Some(v) = optional_str(req, "lastName") {
        form.last_name = v.trim().to_string();
    }
    if let Some(v) = optional_str(req, "firstName") {
        form.first_name = v.trim().to_string();
    }
    if let Some(v) = optional_str(req, "grade") {
        form.grade = v.to_string();
    }
}

fn apply_bulk(state: &mut AppState, req: &Request) {
    let form = &mut state.students.bulk;
    if let Some(v) = optional_str(req, "text") {
        form.text = v.to_string();
    }
    if let Some(v) = optional_str(req, "grade") {
        form.grade = v.to_string();
    }
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match students::list(state.store.as_mut(), optional_str(req, "grade")) {
        Ok(list) => ok(&req.id, json!({ "students": list })),
        Err(e) => fail(state, req, e),
    }
}

fn handle_students_set_individual(state: &mut AppState, req: &Request) -> serde_json::Value {
    apply_individual(state, req);
    ok(&req.id, json!(state.students.individual))
}

fn handle_students_create_individual(state: &mut AppState, req: &Request) -> serde_json::Value {
    apply_individual(state, req);
    match state.students.submit_individual(state.store.as_mut()) {
        Ok(()) => {
            state.shell.success(SAVED_NOTICE);
            ok(&req.id, json!(state.students.individual))
        }
        Err(e) => fail(state, req, e),
    }
}

fn handle_students_set_bulk(state: &mut AppState, req: &Request) -> serde_json::Value {
    apply_bulk(state, req);
    ok(&req.id, json!(state.students.bulk))
}

fn handle_students_create_bulk(state: &mut AppState, req: &Request) -> serde_json::Value {
    apply_bulk(state, req);
    match state.students.submit_bulk(state.store.as_mut()) {
        Ok(count) => {
            state.shell.success(bulk_saved_notice(count));
            ok(&req.id, json!({ "count": count }))
        }
        Err(e) => fail(state, req, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.setIndividual" => Some(handle_students_set_individual(state, req)),
        "students.createIndividual" => Some(handle_students_create_individual(state, req)),
        "students.setBulk" => Some(handle_students_set_bulk(state, req)),
        "students.createBulk" => Some(handle_students_create_bulk(state, req)),
        _ => None,
    }
}
