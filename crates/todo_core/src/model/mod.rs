//! Domain model for todos, archived todos and their comments.
//!
//! # Invariants
//! - Every entity is identified by a stable UUID key assigned at creation.
//! - A todo key addresses exactly one collection (active or archived) at a
//!   time; archived todos share the key of their active origin.
//! - Comments reference their parent todo by key only; they are never
//!   embedded in the todo record.

pub mod comment;
pub mod payload;
pub mod todo;
pub mod user;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
}
