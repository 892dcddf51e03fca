//! Reviewbot Core
//!
//! Core types for the homework review notifier.
//!
//! This crate contains:
//! - Domain types: submissions, review statuses and the polling checkpoint
//! - DTOs: tolerant parsing of the review API response
//! - Formatting: turning a submission into the notification text

pub mod domain;
pub mod dto;
pub mod format;

pub use domain::checkpoint::Checkpoint;
pub use domain::submission::{ReviewStatus, SubmissionRecord};
pub use format::{FormatError, MAX_MESSAGE_CHARS, MessageFormatter, truncate_chars};
