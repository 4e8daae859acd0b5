//! Status poller
//!
//! Polls the status API, notifies on a changed homework status, and reports
//! failures. Both kinds of notification are deduplicated: a message identical
//! to the last one of its kind is not sent again.

use std::sync::Arc;

use homework_client::ClientError;
use homework_core::{SchemaError, TranslateError, translate, validate};
use thiserror::Error;
use tokio::time::{self, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::repository::{HomeworkRepository, PollRequest};
use crate::service::Notifier;

/// Prefix of every failure report sent to the chat
const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// Anything that aborts a single poll cycle
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

impl CycleError {
    /// Text sent to the chat for this failure
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", FAILURE_PREFIX, self)
    }
}

/// State carried from one cycle to the next
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollState {
    /// Lower bound for the next status request
    pub timestamp: i64,
    /// Last status message sent
    pub last_notified_message: Option<String>,
    /// Last failure report sent since the most recent successful cycle
    pub last_error_message: Option<String>,
}

/// What a single cycle ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The API reported no homework changes
    NoUpdates,
    /// The latest status was already reported
    Unchanged,
    /// A status change was sent
    Notified,
    /// The cycle failed; `reported` is false when the failure was a repeat
    Failed { reported: bool },
}

/// Poller that checks homework statuses on a fixed interval
pub struct StatusPoller {
    repository: Arc<dyn HomeworkRepository>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    state: PollState,
}

impl StatusPoller {
    /// Creates a poller starting from `timestamp = 0`
    pub fn new(
        repository: Arc<dyn HomeworkRepository>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
    ) -> Self {
        Self::with_state(repository, notifier, interval, PollState::default())
    }

    /// Creates a poller resuming from an explicit state
    pub fn with_state(
        repository: Arc<dyn HomeworkRepository>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        state: PollState,
    ) -> Self {
        Self {
            repository,
            notifier,
            interval,
            state,
        }
    }

    /// Current cross-cycle state
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Starts the polling loop
    ///
    /// Never returns. The first cycle runs immediately; later cycles start one
    /// interval after the previous start, or right away if a cycle overran.
    pub async fn run(mut self) {
        info!("Starting status poller (interval: {:?})", self.interval);

        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let outcome = self.run_cycle().await;
            debug!(
                "Cycle finished: {:?}, next poll from {}",
                outcome,
                self.state().timestamp
            );
        }
    }

    /// Performs a single poll cycle
    ///
    /// Errors never escape: they are turned into a failure report, which is
    /// sent only if it differs from the last one.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.poll_once().await {
            Ok(outcome) => {
                self.state.last_error_message = None;
                outcome
            }
            Err(e) => {
                error!("Error during poll cycle: {}", e);
                let reported = self.report_failure(e.diagnostic()).await;
                CycleOutcome::Failed { reported }
            }
        }
    }

    async fn poll_once(&mut self) -> Result<CycleOutcome, CycleError> {
        let request = PollRequest {
            from_timestamp: self.state.timestamp,
        };
        debug!("Polling homework statuses from {}", request.from_timestamp);
        let response = self.repository.fetch(request).await?;
        let validated = validate(&response)?;

        let outcome = match validated.latest() {
            None => {
                debug!("Homework list is empty");
                CycleOutcome::NoUpdates
            }
            Some(homework) => {
                let message = translate(homework)?;
                if self.state.last_notified_message.as_deref() == Some(message.as_str()) {
                    debug!("Status unchanged, not notifying");
                    CycleOutcome::Unchanged
                } else {
                    info!("Homework status changed: {}", message);
                    self.send(&message).await;
                    self.state.last_notified_message = Some(message);
                    CycleOutcome::Notified
                }
            }
        };

        // Falling back to the local clock can drift from server time.
        self.state.timestamp = validated.current_date.unwrap_or_else(|| {
            warn!("current_date is not an integer, using local time");
            chrono::Utc::now().timestamp()
        });

        Ok(outcome)
    }

    async fn report_failure(&mut self, diagnostic: String) -> bool {
        if self.state.last_error_message.as_deref() == Some(diagnostic.as_str()) {
            warn!("Same failure as last cycle, not notifying again");
            return false;
        }

        self.send(&diagnostic).await;
        self.state.last_error_message = Some(diagnostic);
        true
    }

    /// Hands a message to the notifier; an undelivered message is not retried
    async fn send(&self, message: &str) {
        if !self.notifier.notify(message).await {
            warn!("Notification was not delivered and will not be resent");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays queued responses and records requested timestamps
    #[derive(Default)]
    struct ScriptedRepository {
        responses: Mutex<VecDeque<Result<Value, ClientError>>>,
        requests: Mutex<Vec<i64>>,
    }

    impl ScriptedRepository {
        fn push_ok(&self, body: Value) {
            self.responses.lock().unwrap().push_back(Ok(body));
        }

        fn push_err(&self, err: ClientError) {
            self.responses.lock().unwrap().push_back(Err(err));
        }

        fn requests(&self) -> Vec<i64> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HomeworkRepository for ScriptedRepository {
        async fn fetch(&self, request: PollRequest) -> Result<Value, ClientError> {
            self.requests.lock().unwrap().push(request.from_timestamp);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    struct RecordingNotifier {
        sent: Mutex<Vec<String>>,
        delivers: bool,
    }

    impl RecordingNotifier {
        fn new(delivers: bool) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                delivers,
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) -> bool {
            self.sent.lock().unwrap().push(message.to_string());
            self.delivers
        }
    }

    fn setup() -> (Arc<ScriptedRepository>, Arc<RecordingNotifier>, StatusPoller) {
        setup_with(RecordingNotifier::new(true))
    }

    fn setup_with(
        notifier: RecordingNotifier,
    ) -> (Arc<ScriptedRepository>, Arc<RecordingNotifier>, StatusPoller) {
        let repository = Arc::new(ScriptedRepository::default());
        let notifier = Arc::new(notifier);
        let poller = StatusPoller::new(
            repository.clone(),
            notifier.clone(),
            Duration::from_secs(600),
        );
        (repository, notifier, poller)
    }

    fn homework(name: &str, status: &str, current_date: i64) -> Value {
        json!({
            "homeworks": [{"homework_name": name, "status": status}],
            "current_date": current_date
        })
    }

    const UNKNOWN_STATUS_REPORT: &str =
        "Сбой в работе программы: Неизвестный статус домашней работы: lost";

    #[tokio::test]
    async fn test_empty_homeworks_advances_timestamp_without_notifying() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(json!({"homeworks": [], "current_date": 1000}));

        let outcome = poller.run_cycle().await;

        assert_eq!(outcome, CycleOutcome::NoUpdates);
        assert!(notifier.sent().is_empty());
        assert_eq!(poller.state().timestamp, 1000);
        assert_eq!(repository.requests(), vec![0]);
    }

    #[tokio::test]
    async fn test_same_homework_twice_notifies_once() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(homework("Y", "rejected", 100));
        repository.push_ok(homework("Y", "rejected", 200));

        assert_eq!(poller.run_cycle().await, CycleOutcome::Notified);
        assert_eq!(poller.run_cycle().await, CycleOutcome::Unchanged);

        assert_eq!(
            notifier.sent(),
            vec!["Изменился статус проверки работы \"Y\". Работа проверена: у ревьюера есть замечания."]
        );
        assert_eq!(repository.requests(), vec![0, 100]);
        assert_eq!(poller.state().timestamp, 200);
    }

    #[tokio::test]
    async fn test_dedup_is_by_message_not_status() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(homework("A", "approved", 1));
        repository.push_ok(homework("B", "approved", 2));
        repository.push_ok(homework("B", "approved", 3));

        for _ in 0..3 {
            poller.run_cycle().await;
        }

        let sent = notifier.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].contains("\"A\""));
        assert!(sent[1].contains("\"B\""));
    }

    #[tokio::test]
    async fn test_status_change_notifies_again() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(homework("hw", "reviewing", 1));
        repository.push_ok(homework("hw", "approved", 2));

        poller.run_cycle().await;
        poller.run_cycle().await;

        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_only_first_homework_is_reported() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(json!({
            "homeworks": [
                {"homework_name": "newest", "status": "approved"},
                {"homework_name": "older", "status": "rejected"}
            ],
            "current_date": 10
        }));

        poller.run_cycle().await;

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("\"newest\""));
    }

    #[tokio::test]
    async fn test_repeated_error_is_reported_once() {
        let (repository, notifier, mut poller) = setup();
        for _ in 0..3 {
            repository.push_ok(homework("X", "lost", 500));
        }

        assert_eq!(poller.run_cycle().await, CycleOutcome::Failed { reported: true });
        assert_eq!(poller.run_cycle().await, CycleOutcome::Failed { reported: false });
        assert_eq!(poller.run_cycle().await, CycleOutcome::Failed { reported: false });

        assert_eq!(notifier.sent(), vec![UNKNOWN_STATUS_REPORT]);
        // A failed cycle must not move the window forward.
        assert_eq!(poller.state().timestamp, 0);
        assert_eq!(repository.requests(), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn test_distinct_errors_are_each_reported() {
        let (repository, notifier, mut poller) = setup();
        repository.push_err(ClientError::api_error(500, "Internal Server Error"));
        repository.push_ok(homework("X", "lost", 1));
        repository.push_err(ClientError::api_error(500, "Internal Server Error"));

        for _ in 0..3 {
            poller.run_cycle().await;
        }

        assert_eq!(
            notifier.sent(),
            vec![
                "Сбой в работе программы: Эндпоинт недоступен. Код ответа API: 500 (Internal Server Error)",
                UNKNOWN_STATUS_REPORT,
                "Сбой в работе программы: Эндпоинт недоступен. Код ответа API: 500 (Internal Server Error)",
            ]
        );
    }

    #[tokio::test]
    async fn test_recovery_resets_error_dedup() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(homework("X", "lost", 1));
        repository.push_ok(json!({"homeworks": [], "current_date": 2}));
        repository.push_ok(homework("X", "lost", 3));

        poller.run_cycle().await;
        assert!(poller.state().last_error_message.is_some());

        assert_eq!(poller.run_cycle().await, CycleOutcome::NoUpdates);
        assert_eq!(poller.state().last_error_message, None);

        assert_eq!(poller.run_cycle().await, CycleOutcome::Failed { reported: true });
        assert_eq!(
            notifier.sent(),
            vec![UNKNOWN_STATUS_REPORT, UNKNOWN_STATUS_REPORT]
        );
    }

    #[tokio::test]
    async fn test_malformed_payload_is_reported() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(json!({"homeworks": "oops", "current_date": 1}));
        repository.push_ok(json!({"current_date": 1}));

        poller.run_cycle().await;
        poller.run_cycle().await;

        assert_eq!(
            notifier.sent(),
            vec![
                "Сбой в работе программы: Значение ключа \"homeworks\" ответа API не является списком",
                "Сбой в работе программы: В ответе API отсутствует ключ \"homeworks\"",
            ]
        );
        assert_eq!(poller.state().timestamp, 0);
    }

    #[tokio::test]
    async fn test_missing_homework_key_is_reported() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(json!({"homeworks": [{"status": "approved"}], "current_date": 1}));

        poller.run_cycle().await;

        assert_eq!(
            notifier.sent(),
            vec!["Сбой в работе программы: В ответе API домашней работы отсутствует ключ \"homework_name\""]
        );
    }

    #[tokio::test]
    async fn test_error_does_not_reset_status_dedup() {
        let (repository, notifier, mut poller) = setup();
        repository.push_ok(homework("hw", "approved", 1));
        repository.push_err(ClientError::api_error(502, "Bad Gateway"));
        repository.push_ok(homework("hw", "approved", 2));

        poller.run_cycle().await;
        poller.run_cycle().await;
        assert_eq!(poller.run_cycle().await, CycleOutcome::Unchanged);

        assert_eq!(notifier.sent().len(), 2);
        assert_eq!(repository.requests(), vec![0, 1, 1]);
    }

    #[tokio::test]
    async fn test_non_integer_current_date_falls_back_to_clock() {
        let (repository, _notifier, mut poller) = setup();
        repository.push_ok(json!({"homeworks": [], "current_date": null}));

        let before = chrono::Utc::now().timestamp();
        poller.run_cycle().await;
        let after = chrono::Utc::now().timestamp();

        let timestamp = poller.state().timestamp;
        assert!(before <= timestamp && timestamp <= after);
    }

    #[tokio::test]
    async fn test_undelivered_notification_still_updates_state() {
        let (repository, notifier, mut poller) = setup_with(RecordingNotifier::new(false));
        repository.push_ok(homework("hw", "approved", 7));
        repository.push_ok(homework("hw", "approved", 8));

        assert_eq!(poller.run_cycle().await, CycleOutcome::Notified);
        assert_eq!(poller.run_cycle().await, CycleOutcome::Unchanged);

        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(poller.state().timestamp, 8);
    }

    #[tokio::test]
    async fn test_undelivered_failure_report_is_not_repeated() {
        let (repository, notifier, mut poller) = setup_with(RecordingNotifier::new(false));
        repository.push_ok(homework("X", "lost", 1));
        repository.push_ok(homework("X", "lost", 2));

        assert_eq!(poller.run_cycle().await, CycleOutcome::Failed { reported: true });
        assert_eq!(poller.run_cycle().await, CycleOutcome::Failed { reported: false });

        assert_eq!(notifier.sent(), vec![UNKNOWN_STATUS_REPORT]);
    }

    #[tokio::test]
    async fn test_resumes_from_given_state() {
        let repository = Arc::new(ScriptedRepository::default());
        let notifier = Arc::new(RecordingNotifier::new(true));
        let state = PollState {
            timestamp: 1_700_000_000,
            ..PollState::default()
        };
        let mut poller = StatusPoller::with_state(
            repository.clone(),
            notifier.clone(),
            Duration::from_secs(1),
            state,
        );
        repository.push_ok(json!({"homeworks": [], "current_date": 1_700_000_600}));

        poller.run_cycle().await;

        assert_eq!(repository.requests(), vec![1_700_000_000]);
        assert_eq!(poller.state().timestamp, 1_700_000_600);
    }
}
