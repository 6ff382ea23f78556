//! Poll a remote resource until it reaches a terminal status
//!
//! The loop only distinguishes terminal from non-terminal statuses; a status
//! it has never seen is treated as still running. A remote failure is a
//! terminal status the caller inspects, not an error here.

use std::future::Future;
use std::time::Duration;

use log::{debug, info};

use super::clock::Timing;
use crate::error::{ApiError, Result};

/// Statuses after which a scan no longer changes.
pub const TERMINAL_STATES: &[&str] = &["completed", "failed", "cancelled"];

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(20);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(2 * 60 * 60);

/// Fixed-cadence polling parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
    pub terminal: Vec<String>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
            terminal: TERMINAL_STATES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PollOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn terminal_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.terminal = states.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive membership in the terminal set.
    pub fn is_terminal(&self, status: &str) -> bool {
        self.terminal
            .iter()
            .any(|t| t.eq_ignore_ascii_case(status.trim()))
    }
}

/// Fetch until `status_of` reports a terminal status, then return the resource.
///
/// Elapsed time is checked after each non-terminal fetch; once it exceeds
/// `options.timeout` the loop fails with [`ApiError::Timeout`]. No sleep
/// follows a terminal fetch.
pub async fn wait_until_terminal<R, F, Fut, S>(
    label: &str,
    options: &PollOptions,
    timing: &Timing,
    mut fetch: F,
    status_of: S,
) -> Result<R>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<R>>,
    S: Fn(&R) -> Option<String>,
{
    let start = timing.clock.now();
    let mut polls = 0u32;

    loop {
        let resource = fetch().await?;
        polls += 1;
        let status = status_of(&resource);
        info!(
            "{} status: {}",
            label,
            status.as_deref().unwrap_or("unknown")
        );

        if status.as_deref().is_some_and(|s| options.is_terminal(s)) {
            debug!("{} reached terminal state after {} polls", label, polls);
            return Ok(resource);
        }

        let elapsed = timing.clock.now().saturating_duration_since(start);
        if elapsed > options.timeout {
            return Err(ApiError::Timeout(format!(
                "{} did not reach a terminal state within {}s (last status: {})",
                label,
                options.timeout.as_secs(),
                status.as_deref().unwrap_or("unknown")
            ))
            .into());
        }

        timing.sleeper.sleep(options.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::sync::Arc;

    use super::*;
    use crate::client::clock::{Clock, ManualClock, RecordingSleeper};
    use crate::error::Error;

    fn manual_timing() -> (Timing, Arc<ManualClock>, Arc<RecordingSleeper>) {
        let clock = Arc::new(ManualClock::new());
        let sleeper = Arc::new(RecordingSleeper::driving(clock.clone()));
        (Timing::new(clock.clone(), sleeper.clone()), clock, sleeper)
    }

    #[tokio::test]
    async fn test_returns_on_terminal_without_trailing_sleep() {
        let (timing, _clock, sleeper) = manual_timing();
        let statuses = RefCell::new(VecDeque::from(vec!["running", "running", "completed"]));
        let fetches = RefCell::new(0);

        let result = wait_until_terminal(
            "scan s1",
            &PollOptions::default(),
            &timing,
            || {
                *fetches.borrow_mut() += 1;
                let status = statuses.borrow_mut().pop_front().unwrap_or("running");
                async move { Ok(status.to_string()) }
            },
            |s: &String| Some(s.clone()),
        )
        .await
        .unwrap();

        assert_eq!(result, "completed");
        assert_eq!(*fetches.borrow(), 3);
        assert_eq!(sleeper.calls(), vec![DEFAULT_POLL_INTERVAL; 2]);
    }

    #[tokio::test]
    async fn test_failed_is_terminal_not_error() {
        let (timing, _clock, sleeper) = manual_timing();
        let result = wait_until_terminal(
            "scan s1",
            &PollOptions::default(),
            &timing,
            || async { Ok("FAILED".to_string()) },
            |s: &String| Some(s.clone()),
        )
        .await
        .unwrap();

        assert_eq!(result, "FAILED");
        assert!(sleeper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_times_out_within_one_interval() {
        let (timing, clock, sleeper) = manual_timing();
        let start = clock.now();
        let options = PollOptions::new()
            .interval(Duration::from_secs(20))
            .timeout(Duration::from_secs(60));

        let err = wait_until_terminal(
            "scan s1",
            &options,
            &timing,
            || async { Ok("running".to_string()) },
            |s: &String| Some(s.clone()),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Api(ApiError::Timeout(_))));
        let elapsed = clock.now() - start;
        assert!(elapsed > options.timeout);
        assert!(elapsed <= options.timeout + options.interval);
        assert_eq!(sleeper.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_and_missing_status_keep_polling() {
        let (timing, _clock, _sleeper) = manual_timing();
        let statuses = RefCell::new(VecDeque::from(vec![
            None,
            Some("provisioning"),
            Some("cancelled"),
        ]));

        let result = wait_until_terminal(
            "scan s1",
            &PollOptions::default(),
            &timing,
            || {
                let status = statuses.borrow_mut().pop_front().flatten();
                async move { Ok(status.map(String::from)) }
            },
            |s: &Option<String>| s.clone(),
        )
        .await
        .unwrap();

        assert_eq!(result.as_deref(), Some("cancelled"));
    }

    #[tokio::test]
    async fn test_fetch_error_stops_polling() {
        let (timing, _clock, sleeper) = manual_timing();
        let result: Result<String> = wait_until_terminal(
            "scan s1",
            &PollOptions::default(),
            &timing,
            || async { Err(Error::Api(ApiError::Connection("down".into()))) },
            |s: &String| Some(s.clone()),
        )
        .await;

        assert!(matches!(result, Err(Error::Api(ApiError::Connection(_)))));
        assert!(sleeper.calls().is_empty());
    }

    #[test]
    fn test_custom_terminal_set() {
        let options = PollOptions::new().terminal_states(["done"]);
        assert!(options.is_terminal("DONE"));
        assert!(!options.is_terminal("completed"));
    }
}
