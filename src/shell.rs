use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Tab {
    #[default]
    Entry,
    Students,
    Reports,
}

impl Tab {
    pub fn parse(raw: &str) -> Option<Tab> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "entry" => Some(Tab::Entry),
            "students" => Some(Tab::Students),
            "reports" => Some(Tab::Reports),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub message: String,
    pub kind: NoticeKind,
}

/// Receives the recomputed unsaved-changes flag whenever grade entry input
/// changes.
pub trait DirtyObserver {
    fn dirty_changed(&mut self, dirty: bool);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabChange {
    Unchanged,
    Switched { from: Tab },
    NeedsConfirmation,
}

#[derive(Debug, Default)]
pub struct Shell {
    active: Tab,
    dirty: bool,
    notification: Option<Notification>,
}

impl Shell {
    pub fn active_tab(&self) -> Tab {
        self.active
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Switching away while there is unsaved input needs `confirmed`.
    /// A successful switch always clears the unsaved flag.
    pub fn select_tab(&mut self, tab: Tab, confirmed: bool) -> TabChange {
        if tab == self.active {
            return TabChange::Unchanged;
        }
        if self.dirty && !confirmed {
            return TabChange::NeedsConfirmation;
        }
        let from = self.active;
        self.dirty = false;
        self.active = tab;
        TabChange::Switched { from }
    }

    /// Whether closing the UI has to be confirmed.
    pub fn confirm_before_unload(&self) -> bool {
        self.dirty
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NoticeKind) {
        self.notification = Some(Notification {
            message: message.into(),
            kind,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.notify(message, NoticeKind::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.notify(message, NoticeKind::Error);
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }
}

impl DirtyObserver for Shell {
    fn dirty_changed(&mut self, dirty: bool) {
        self.dirty = dirty;
    }
}
