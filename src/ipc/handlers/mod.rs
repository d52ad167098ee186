pub mod backup;
pub mod core;
pub mod entry;
pub mod reports;
pub mod shell;
pub mod students;
