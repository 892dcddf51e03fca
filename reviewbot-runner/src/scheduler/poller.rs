//! Status poller
//!
//! Polls the review API for status updates, turns the newest one into a
//! notification and delivers it. Failures never stop the loop: they are
//! logged, reported once through the notifier and followed by a backoff.

use reviewbot_core::{Checkpoint, MessageFormatter, SubmissionRecord};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, Duration};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::CycleError;
use crate::repository::{Notifier, StatusFetcher};
use crate::scheduler::backoff::Backoff;

/// Poll loop that checks for review verdicts until shutdown
pub struct PollLoop {
    fetcher: Arc<dyn StatusFetcher>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    backoff: Backoff,
    /// `from_date` of the next query
    checkpoint: Checkpoint,
    /// Last failure text that reached the recipient
    last_report: Option<String>,
}

impl PollLoop {
    /// Creates a poll loop starting from the current time
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn StatusFetcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            poll_interval: config.poll_interval,
            backoff: Backoff::new(config.error_backoff, config.max_error_backoff),
            checkpoint: Checkpoint::now(),
            last_report: None,
        }
    }

    /// Runs poll cycles until `shutdown` flips to `true`
    ///
    /// The flag is only observed while waiting between cycles, so an
    /// in-flight cycle always finishes.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting poll loop (interval: {:?}, checkpoint: {})",
            self.poll_interval, self.checkpoint
        );

        loop {
            let delay = match self.poll_once().await {
                Ok(notified) => {
                    if notified {
                        info!("Delivered status update, checkpoint now {}", self.checkpoint);
                    }
                    self.backoff.reset();
                    self.last_report = None;
                    self.poll_interval
                }
                Err(e) => self.recover(&e).await,
            };

            debug!("Next poll in {:?}", delay);

            if sleep_or_shutdown(delay, &mut shutdown).await {
                info!("Poll loop stopped");
                return;
            }
        }
    }

    /// Performs a single poll cycle
    ///
    /// Returns whether a verdict was delivered. The checkpoint is kept when
    /// delivery fails so the same update is fetched again next cycle.
    async fn poll_once(&mut self) -> Result<bool, CycleError> {
        debug!("Polling for status updates since {}", self.checkpoint);

        let statuses = self.fetcher.fetch(Some(self.checkpoint)).await?;

        let result = self.deliver_latest(&statuses.homeworks).await;

        if !matches!(result, Err(CycleError::Delivery(_))) {
            self.advance_checkpoint(statuses.current_date);
        }

        result
    }

    async fn deliver_latest(&self, homeworks: &[SubmissionRecord]) -> Result<bool, CycleError> {
        let Some(latest) = homeworks.first() else {
            debug!("No status updates");
            return Ok(false);
        };

        if homeworks.len() > 1 {
            debug!("{} updates received, reporting the newest", homeworks.len());
        }

        let message = MessageFormatter::format(latest)?;
        self.notifier.notify(&message).await?;

        Ok(true)
    }

    fn advance_checkpoint(&mut self, next: Option<Checkpoint>) {
        let Some(next) = next else {
            return;
        };

        if !self.checkpoint.advance(next) {
            warn!(
                "Ignoring checkpoint {} earlier than current {}",
                next, self.checkpoint
            );
        }
    }

    /// Logs and reports a failed cycle, returning how long to back off
    ///
    /// The report is a single best-effort attempt; if it fails too, that is
    /// only logged. A report identical to the last delivered one is skipped.
    async fn recover(&mut self, error: &CycleError) -> Duration {
        error!("Poll cycle failed: {}", error);

        let report = MessageFormatter::failure(error);

        if self.last_report.as_deref() == Some(report.as_str()) {
            debug!("Same failure already reported, not notifying again");
        } else {
            match self.notifier.notify(&report).await {
                Ok(()) => self.last_report = Some(report),
                Err(e) => error!("Failed to report poll failure: {}", e),
            }
        }

        let delay = self.backoff.next_delay();
        warn!("Retrying in {:?}", delay);
        delay
    }
}

/// Sleeps for `delay`; returns `true` early if shutdown is requested
async fn sleep_or_shutdown(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }

    tokio::select! {
        _ = time::sleep(delay) => false,
        // A dropped sender also ends the loop
        _ = shutdown.wait_for(|stop| *stop) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reviewbot_client::{ClientError, DeliveryError, FetchError, HomeworkStatuses};
    use reviewbot_core::ReviewStatus;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses, then requests shutdown
    struct ScriptedFetcher {
        script: Mutex<VecDeque<Result<HomeworkStatuses, FetchError>>>,
        calls: Mutex<Vec<Option<Checkpoint>>>,
        shutdown: watch::Sender<bool>,
    }

    #[async_trait]
    impl StatusFetcher for ScriptedFetcher {
        async fn fetch(&self, since: Option<Checkpoint>) -> Result<HomeworkStatuses, FetchError> {
            self.calls.lock().unwrap().push(since);
            match self.script.lock().unwrap().pop_front() {
                Some(response) => response,
                None => {
                    let _ = self.shutdown.send(true);
                    Ok(HomeworkStatuses::default())
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        fail: bool,
        attempts: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) -> Result<(), DeliveryError> {
            self.attempts.lock().unwrap().push(message.to_string());
            if self.fail {
                return Err(ClientError::api_error(403, "Forbidden: bot was blocked by the user").into());
            }
            Ok(())
        }
    }

    fn test_config() -> Config {
        let mut config = Config::new("review".to_string(), "bot".to_string(), "42".to_string());
        config.poll_interval = Duration::from_millis(1);
        config.error_backoff = Duration::from_millis(1);
        config.max_error_backoff = Duration::from_millis(4);
        config
    }

    fn statuses(records: Vec<SubmissionRecord>, current_date: Option<i64>) -> HomeworkStatuses {
        HomeworkStatuses {
            homeworks: records,
            current_date: current_date.map(Checkpoint::new),
        }
    }

    fn unavailable() -> FetchError {
        ClientError::api_error(503, "unavailable").into()
    }

    struct Harness {
        poll_loop: PollLoop,
        fetcher: Arc<ScriptedFetcher>,
        notifier: Arc<RecordingNotifier>,
        shutdown: watch::Receiver<bool>,
    }

    fn harness(
        script: Vec<Result<HomeworkStatuses, FetchError>>,
        notifier: RecordingNotifier,
    ) -> Harness {
        let (tx, rx) = watch::channel(false);
        let fetcher = Arc::new(ScriptedFetcher {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            shutdown: tx,
        });
        let notifier = Arc::new(notifier);
        let mut poll_loop = PollLoop::new(&test_config(), fetcher.clone(), notifier.clone());
        poll_loop.checkpoint = Checkpoint::new(900);

        Harness {
            poll_loop,
            fetcher,
            notifier,
            shutdown: rx,
        }
    }

    impl Harness {
        async fn run(&mut self) {
            self.poll_loop.run(self.shutdown.clone()).await;
        }

        fn fetch_calls(&self) -> Vec<i64> {
            self.fetcher
                .calls
                .lock()
                .unwrap()
                .iter()
                .map(|since| since.map(Checkpoint::as_secs).unwrap_or(-1))
                .collect()
        }
    }

    #[tokio::test]
    async fn test_delivers_approved_verdict_and_advances() {
        let mut h = harness(
            vec![Ok(statuses(
                vec![SubmissionRecord::new("project1__abc.py", ReviewStatus::Approved)],
                Some(1000),
            ))],
            RecordingNotifier::default(),
        );

        h.run().await;

        assert_eq!(
            h.notifier.attempts(),
            vec![
                "Your work \"project1\" was reviewed!\n\nThe reviewer liked everything; you may proceed to the next lesson."
                    .to_string()
            ]
        );
        assert_eq!(h.poll_loop.checkpoint, Checkpoint::new(1000));
        assert_eq!(h.fetch_calls(), vec![900, 1000]);
    }

    #[tokio::test]
    async fn test_only_newest_submission_is_reported() {
        let mut h = harness(
            vec![Ok(statuses(
                vec![
                    SubmissionRecord::new("second__b.zip", ReviewStatus::Reviewing),
                    SubmissionRecord::new("first__a.zip", ReviewStatus::Rejected),
                ],
                Some(1000),
            ))],
            RecordingNotifier::default(),
        );

        h.run().await;

        let attempts = h.notifier.attempts();
        assert_eq!(attempts.len(), 1);
        assert!(attempts[0].starts_with("Your work \"second\""));
    }

    #[tokio::test]
    async fn test_empty_update_advances_without_notifying() {
        let mut h = harness(
            vec![Ok(statuses(vec![], Some(1200)))],
            RecordingNotifier::default(),
        );

        h.run().await;

        assert!(h.notifier.attempts().is_empty());
        assert_eq!(h.poll_loop.checkpoint, Checkpoint::new(1200));
        assert_eq!(h.fetch_calls(), vec![900, 1200]);
    }

    #[tokio::test]
    async fn test_missing_current_date_keeps_checkpoint() {
        let mut h = harness(vec![Ok(statuses(vec![], None))], RecordingNotifier::default());

        h.run().await;

        assert_eq!(h.poll_loop.checkpoint, Checkpoint::new(900));
    }

    #[tokio::test]
    async fn test_checkpoint_never_moves_backwards() {
        let mut h = harness(
            vec![
                Ok(statuses(vec![], Some(1000))),
                Ok(statuses(vec![], Some(950))),
                Ok(statuses(vec![], Some(1100))),
            ],
            RecordingNotifier::default(),
        );

        h.run().await;

        assert_eq!(h.fetch_calls(), vec![900, 1000, 1000, 1100]);
        assert_eq!(h.poll_loop.checkpoint, Checkpoint::new(1100));
    }

    #[tokio::test]
    async fn test_fetch_error_is_reported_and_polling_resumes() {
        let mut h = harness(
            vec![Err(unavailable()), Ok(statuses(vec![], Some(1000)))],
            RecordingNotifier::default(),
        );

        h.run().await;

        assert_eq!(
            h.notifier.attempts(),
            vec![
                "The bot encountered an error: failed to fetch homework statuses: API error (status 503): unavailable"
                    .to_string()
            ]
        );
        assert_eq!(h.fetch_calls(), vec![900, 900, 1000]);
        assert_eq!(h.poll_loop.checkpoint, Checkpoint::new(1000));
    }

    #[tokio::test]
    async fn test_unknown_status_is_reported_not_guessed() {
        let mut h = harness(
            vec![Ok(statuses(
                vec![SubmissionRecord::new(
                    "project1__abc.py",
                    ReviewStatus::Unknown(Some("pending".to_string())),
                )],
                Some(1000),
            ))],
            RecordingNotifier::default(),
        );

        h.run().await;

        assert_eq!(
            h.notifier.attempts(),
            vec!["The bot encountered an error: unknown homework status: pending".to_string()]
        );
        // The record cannot be formatted on a retry either, so it is skipped
        assert_eq!(h.poll_loop.checkpoint, Checkpoint::new(1000));
        assert_eq!(h.fetch_calls(), vec![900, 1000]);
    }

    #[tokio::test]
    async fn test_delivery_failure_reports_once_and_keeps_checkpoint() {
        let mut h = harness(
            vec![Ok(statuses(
                vec![SubmissionRecord::new("project1__abc.py", ReviewStatus::Approved)],
                Some(1000),
            ))],
            RecordingNotifier::failing(),
        );

        h.run().await;

        let attempts = h.notifier.attempts();
        assert_eq!(attempts.len(), 2, "verdict plus a single failure report");
        assert!(attempts[0].starts_with("Your work \"project1\""));
        assert!(attempts[1].starts_with("The bot encountered an error: failed to deliver message"));
        assert_eq!(h.poll_loop.checkpoint, Checkpoint::new(900));
        assert_eq!(h.fetch_calls(), vec![900, 900]);
    }

    #[tokio::test]
    async fn test_repeated_failure_reported_once_until_recovery() {
        let mut h = harness(
            vec![
                Err(unavailable()),
                Err(unavailable()),
                Err(unavailable()),
                Ok(statuses(vec![], Some(1000))),
                Err(unavailable()),
            ],
            RecordingNotifier::default(),
        );

        h.run().await;

        assert_eq!(h.notifier.attempts().len(), 2);
    }

    #[tokio::test]
    async fn test_recover_backs_off_exponentially() {
        let mut h = harness(vec![], RecordingNotifier::failing());
        let error = CycleError::from(unavailable());

        let mut delays = Vec::new();
        for _ in 0..4 {
            delays.push(h.poll_loop.recover(&error).await);
        }

        assert_eq!(
            delays,
            vec![
                Duration::from_millis(1),
                Duration::from_millis(2),
                Duration::from_millis(4),
                Duration::from_millis(4),
            ]
        );
        // Reports that never got through are retried on the next failure
        assert_eq!(h.notifier.attempts().len(), 4);
    }

    #[tokio::test]
    async fn test_sleep_or_shutdown() {
        let (tx, mut rx) = watch::channel(false);
        assert!(!sleep_or_shutdown(Duration::from_millis(1), &mut rx).await);

        tx.send(true).unwrap();
        assert!(sleep_or_shutdown(Duration::from_secs(3600), &mut rx).await);
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_stops_waiting() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        assert!(sleep_or_shutdown(Duration::from_secs(3600), &mut rx).await);
    }
}
