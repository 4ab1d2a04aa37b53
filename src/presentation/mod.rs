//! Terminal views: pure state mapping plus askama text templates.

pub mod detail;
pub mod form;
pub mod format;
pub mod list;
pub mod shell;
pub mod views;
