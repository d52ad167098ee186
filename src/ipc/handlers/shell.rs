use crate::entry::GradeEntry;
use crate::ipc::error::{err, ok, required_str};
use crate::ipc::types::{today, AppState, Request};
use crate::reports::ReportsView;
use crate::shell::{Tab, TabChange};
use crate::students::StudentForms;
use serde_json::json;

fn handle_shell_state(state: &mut AppState, req: &Request) -> serde_json::Value {
    let notification = state.shell.take_notification();
    ok(
        &req.id,
        json!({
            "activeTab": state.shell.active_tab(),
            "dirty": state.shell.is_dirty(),
            "notification": notification,
        }),
    )
}

fn handle_shell_select_tab(state: &mut AppState, req: &Request) -> serde_json::Value {
    let raw = match required_str(req, "tab") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let Some(tab) = Tab::parse(&raw) else {
        return err(
            &req.id,
            "bad_params",
            "tab must be one of: entry, students, reports",
            Some(json!({ "tab": raw })),
        );
    };
    let confirmed = req
        .params
        .get("confirmed")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let change = state.shell.select_tab(tab, confirmed);
    if let TabChange::Switched { from } = change {
        tracing::debug!(?from, to = ?tab, "tab switched");
        // Leaving a view drops whatever was typed in it.
        match from {
            Tab::Entry => state.entry = GradeEntry::new(today()),
            Tab::Students => state.students = StudentForms::default(),
            Tab::Reports => state.reports = ReportsView::default(),
        }
        if tab == Tab::Reports {
            // The switch stands even when the records cannot be read.
            if let Err(e) = state.reports.load(state.store.as_mut()) {
                tracing::warn!(error = %e, cause = ?e.details(), "report load on tab switch failed");
                state.shell.error(e.notice());
            }
        }
    }

    ok(
        &req.id,
        json!({
            "activeTab": state.shell.active_tab(),
            "switched": matches!(change, TabChange::Switched { .. }),
            "needsConfirmation": change == TabChange::NeedsConfirmation,
        }),
    )
}

fn handle_shell_before_unload(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({ "confirmRequired": state.shell.confirm_before_unload() }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "shell.state" => Some(handle_shell_state(state, req)),
        "shell.selectTab" => Some(handle_shell_select_tab(state, req)),
        "shell.beforeUnload" => Some(handle_shell_before_unload(state, req)),
        _ => None,
    }
}
