//! Todo use-case services.
//!
//! # Responsibility
//! - `lifecycle`: archive/unarchive/delete transitions and comment cascades.
//! - `listing`: paginated and tag-filtered listing, distinct tag aggregation.
//! - `todo_service`: authorization-first facade over both, plus field edits.
//!
//! # Invariants
//! - Services never bypass repository validation.
//! - Services stay storage-agnostic; they only see repository traits.

pub mod error;
pub mod lifecycle;
pub mod listing;
pub mod todo_service;
