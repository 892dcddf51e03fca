//! Poll cycle errors

use reviewbot_client::{DeliveryError, FetchError};
use reviewbot_core::FormatError;
use thiserror::Error;

/// Anything that can make a single poll cycle fail
///
/// None of these are fatal; the poll loop logs them, reports them and
/// carries on after a backoff.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
