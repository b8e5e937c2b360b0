//! Candidate profile domain model.
//!
//! # Responsibility
//! - Define the `Member` record and the small value objects it is built from.
//! - Own the age policy applied to a member's birth instant.
//!
//! # Invariants
//! - Every value object is validated at construction and immutable afterwards.
//! - A member is identified by its username.

pub mod age;
pub mod member;
pub mod value;
