//! Core domain logic for candidate profile management.
//! This crate is the single source of truth for member invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schema;

pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::age::age_in_years;
pub use model::member::Member;
pub use model::value::{Address, Email, Height, MemberValidationError, Weight};
pub use repo::member_repo::{MemberRepository, RepoError, RepoResult, SqliteMemberRepository};
pub use schema::{
    dump_tables, Column, DumpOptions, DumpReport, Platform, SchemaError, SchemaInspector,
    SchemaResult, Table,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
