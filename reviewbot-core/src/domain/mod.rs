//! Core domain types
//!
//! These types are produced by the review API client and consumed by the
//! poll loop and the message formatter.

pub mod checkpoint;
pub mod submission;
