//! BlogSpace: terminal reader and authoring client for a remote blog collection.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
