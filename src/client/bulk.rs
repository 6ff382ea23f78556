//! Sequential multi-ID operations that keep going past per-item failures

use std::future::Future;

use log::warn;
use serde::Serialize;

use crate::error::{Error, Result};

/// A per-ID failure recorded during a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub id: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl BatchFailure {
    fn from_error(id: String, err: &Error) -> Self {
        Self {
            id,
            error: err.to_string(),
            status: err.as_api().and_then(|e| e.status()),
        }
    }
}

/// Successes and failures of a batch, each in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<(String, T)>,
    pub failed: Vec<BatchFailure>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn values(self) -> Vec<T> {
        self.succeeded.into_iter().map(|(_, v)| v).collect()
    }
}

/// Run `op` for each ID, one at a time, recording failures instead of aborting.
pub async fn for_each_id<T, F, Fut>(ids: &[String], mut op: F) -> BatchOutcome<T>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut outcome = BatchOutcome::default();
    for id in ids {
        match op(id.clone()).await {
            Ok(value) => outcome.succeeded.push((id.clone(), value)),
            Err(err) => {
                warn!("{} failed: {}", id, err);
                outcome.failed.push(BatchFailure::from_error(id.clone(), &err));
            }
        }
    }
    outcome
}
