//! Review status repository

use async_trait::async_trait;
use reviewbot_client::{FetchError, HomeworkStatuses, ReviewApiClient};
use reviewbot_core::Checkpoint;

/// Source of homework status updates
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Fetches submissions updated since `since` (now, when `None`)
    ///
    /// Returns the submissions newest first together with the checkpoint the
    /// next query should start from, if the service supplied one.
    async fn fetch(&self, since: Option<Checkpoint>) -> Result<HomeworkStatuses, FetchError>;
}

#[async_trait]
impl StatusFetcher for ReviewApiClient {
    async fn fetch(&self, since: Option<Checkpoint>) -> Result<HomeworkStatuses, FetchError> {
        self.fetch_statuses(since).await
    }
}
