//! Execution results and accessors.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{FetchError, Result};
use crate::executor;
use crate::headers::{self, HeaderBlock};
use crate::request::FetchPlan;

/// Transport-reported facts about a completed (or failed) transfer,
/// distinct from the response body.
#[derive(Clone, Debug, Serialize)]
pub struct TransferInfo {
    /// Effective URL of the transfer.
    pub url: String,
    /// HTTP status code; 0 when the transfer failed before a response.
    pub status: u16,
    /// Content-Type reported by the server.
    pub content_type: Option<String>,
    /// Content-Length reported by the server, when known.
    pub content_length: Option<u64>,
    /// Wall-clock time spent on the transfer.
    pub total_time: Duration,
    /// Transport error description for failed transfers.
    pub error: Option<String>,
}

/// Result of one executed request.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    /// Captured body; `None` is the transport-failure sentinel. An empty
    /// body on a successful response stays `Some`.
    pub body: Option<Bytes>,
    /// Transfer metadata.
    pub info: TransferInfo,
}

impl ExecutionResult {
    pub(crate) fn failure(url: String, total_time: Duration, error: String) -> Self {
        Self {
            body: None,
            info: TransferInfo {
                url,
                status: 0,
                content_type: None,
                content_length: None,
                total_time,
                error: Some(error),
            },
        }
    }

    /// Whether the transfer failed at the transport level. HTTP 4xx/5xx
    /// responses are not failures; check [`TransferInfo::status`] for those.
    pub fn is_failure(&self) -> bool {
        self.body.is_none()
    }

    /// The captured body as text, lossily converted where it is not UTF-8.
    pub fn text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }

    /// Decode the captured body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| FetchError::InvalidBody("no response body captured".to_string()))?;
        Ok(serde_json::from_slice(body)?)
    }

    /// Parse the captured body as a raw header block. Meaningful only for
    /// executions captured with `include_headers`.
    pub fn header_block(&self) -> Option<HeaderBlock> {
        self.text().map(|text| HeaderBlock::parse(&text))
    }

    /// Redirect target advertised by the response, empty when absent.
    /// Requires a body captured with `include_headers`.
    pub fn redirect_target(&self) -> String {
        self.text()
            .map(|text| headers::redirect_target(&text))
            .unwrap_or_default()
    }
}

/// Outcome of a batch execution.
///
/// Bodies are keyed like the batch input; metadata is kept in input key
/// order over the surviving transfers. Keys whose transfer failed are
/// omitted entirely — the batch path has no empty-body sentinel. This
/// asymmetry with the single path is intentional and load-bearing for
/// callers that treat presence in the mapping as success.
#[derive(Clone, Debug, Default)]
pub struct BatchOutcome {
    bodies: HashMap<String, Bytes>,
    infos: Vec<TransferInfo>,
}

impl BatchOutcome {
    pub(crate) fn new(bodies: HashMap<String, Bytes>, infos: Vec<TransferInfo>) -> Self {
        Self { bodies, infos }
    }

    /// Bodies of the surviving transfers, keyed like the input.
    pub fn bodies(&self) -> &HashMap<String, Bytes> {
        &self.bodies
    }

    /// Body for one batch key, if its transfer produced content.
    pub fn body(&self, key: &str) -> Option<&Bytes> {
        self.bodies.get(key)
    }

    /// Body for one batch key as text, lossily converted where not UTF-8.
    pub fn text(&self, key: &str) -> Option<String> {
        self.bodies
            .get(key)
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }

    /// Metadata of the surviving transfers, in input key order.
    pub fn infos(&self) -> &[TransferInfo] {
        &self.infos
    }

    /// Keys of the surviving transfers.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bodies.keys().map(String::as_str)
    }

    /// Number of surviving transfers.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether no transfer produced content.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Decode every surviving body as JSON, keyed like the input.
    pub fn json<T: DeserializeOwned>(&self) -> Result<HashMap<String, T>> {
        self.bodies
            .iter()
            .map(|(key, body)| Ok((key.clone(), serde_json::from_slice(body)?)))
            .collect()
    }
}

/// Result of executing a plan: one result for a single target, a keyed
/// outcome for a batch target.
#[derive(Clone, Debug)]
pub enum FetchOutcome {
    /// Outcome of a single-target plan.
    Single(ExecutionResult),
    /// Outcome of a batch plan.
    Batch(BatchOutcome),
}

impl FetchOutcome {
    /// The single-target result, if this outcome is one.
    pub fn as_single(&self) -> Option<&ExecutionResult> {
        match self {
            Self::Single(result) => Some(result),
            Self::Batch(_) => None,
        }
    }

    /// The batch outcome, if this outcome is one.
    pub fn as_batch(&self) -> Option<&BatchOutcome> {
        match self {
            Self::Single(_) => None,
            Self::Batch(outcome) => Some(outcome),
        }
    }

    /// Consume into the single-target result, if this outcome is one.
    pub fn into_single(self) -> Option<ExecutionResult> {
        match self {
            Self::Single(result) => Some(result),
            Self::Batch(_) => None,
        }
    }

    /// Consume into the batch outcome, if this outcome is one.
    pub fn into_batch(self) -> Option<BatchOutcome> {
        match self {
            Self::Single(_) => None,
            Self::Batch(outcome) => Some(outcome),
        }
    }
}

/// Thin lazy wrapper over a built plan.
///
/// Holds the plan and executes it on the first [`response`](Self::response)
/// read, caching the outcome for subsequent reads. Laziness lives here and
/// only here; the underlying API stays an explicit build-then-execute pair.
#[derive(Clone, Debug)]
pub struct Fetch {
    plan: FetchPlan,
    outcome: Option<FetchOutcome>,
}

impl Fetch {
    /// Wrap a built plan without executing it.
    pub fn new(plan: FetchPlan) -> Self {
        Self {
            plan,
            outcome: None,
        }
    }

    /// The wrapped plan.
    pub fn plan(&self) -> &FetchPlan {
        &self.plan
    }

    /// Whether an outcome has been captured.
    pub fn is_executed(&self) -> bool {
        self.outcome.is_some()
    }

    /// The captured outcome, executing the plan first if no execution has
    /// happened yet.
    pub fn response(&mut self) -> Result<&FetchOutcome> {
        if self.outcome.is_none() {
            self.outcome = Some(executor::execute(&self.plan)?);
        }
        Ok(self.outcome.as_ref().expect("outcome captured above"))
    }

    /// Discard any cached outcome so the next read re-executes the plan.
    pub fn reset(&mut self) {
        self.outcome = None;
    }
}
