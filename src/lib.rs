//! Employee records: an axum service storing records and their photos, plus
//! the client-side form logic that drives it.

pub mod app;
pub mod client;
pub mod config;
pub mod employees;
pub mod error;
pub mod images;
pub mod state;
pub mod storage;
