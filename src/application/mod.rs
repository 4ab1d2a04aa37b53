//! Application services layer.

pub mod api;
pub mod error;
pub mod form;
pub mod shell;
