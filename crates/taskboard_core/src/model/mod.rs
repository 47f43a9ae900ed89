//! Domain model for users and tasks.
//!
//! # Responsibility
//! - Define persisted records and the candidate shapes submitted by callers.
//! - Keep identity types explicit in signatures.
//!
//! # Invariants
//! - Record ids are assigned by storage and never change.
//! - Candidates (`UserDraft`, `TaskDraft`) are unvalidated; only
//!   `crate::validation` turns them into persistable field sets.

pub mod task;
pub mod user;
