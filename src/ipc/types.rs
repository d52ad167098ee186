use crate::config::Config;
use crate::entry::GradeEntry;
use crate::reports::ReportsView;
use crate::shell::Shell;
use crate::store::DataStore;
use crate::students::StudentForms;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub store: Box<dyn DataStore>,
    pub shell: Shell,
    pub entry: GradeEntry,
    pub students: StudentForms,
    pub reports: ReportsView,
}

impl AppState {
    pub fn new(config: Config, store: Box<dyn DataStore>) -> Self {
        Self {
            config,
            store,
            shell: Shell::default(),
            entry: GradeEntry::new(today()),
            students: StudentForms::default(),
            reports: ReportsView::default(),
        }
    }
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
