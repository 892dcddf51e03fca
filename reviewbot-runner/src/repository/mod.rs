//! Repository layer
//!
//! Repositories abstract communication with the two external services.
//! They are trait-based so the poll loop can be driven by fakes in tests.

mod notifier;
mod statuses;

// Re-export traits
pub use notifier::Notifier;
pub use statuses::StatusFetcher;
