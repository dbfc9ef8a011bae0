//! Persistence layer — libSQL-backed lead ledger and follow-up calendar.

pub mod libsql_backend;
pub mod migrations;

pub use libsql_backend::LibSqlBackend;
