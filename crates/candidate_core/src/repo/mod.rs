//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the member storage port used by callers.
//! - Isolate SQLite query details from everything above it.
//!
//! # Invariants
//! - Repository writes must enforce `Member::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors, which pass through unmodified.

pub mod member_repo;
