//! Scheduler layer for the runner
//!
//! This layer drives the poll cycle: fetching status updates, formatting
//! and delivering verdicts, and backing off after failures.

pub mod backoff;
pub mod poller;

pub use poller::PollLoop;
