//! Single and batch execution.
//!
//! Both paths create a current-thread reactor owned by the invocation:
//! every transfer is advanced cooperatively on the calling thread, the
//! thread parks only in the reactor's bounded I/O readiness wait, and the
//! reactor is torn down before the call returns. No state — connections,
//! handles, timers — survives an execution.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::runtime::Runtime;

use crate::error::{FetchError, Result};
use crate::handle::TransportHandle;
use crate::request::{FetchPlan, RequestDescriptor};
use crate::response::{BatchOutcome, ExecutionResult, FetchOutcome, TransferInfo};

/// Execute a plan to completion, blocking the calling thread until every
/// transfer reaches a terminal state.
pub fn execute(plan: &FetchPlan) -> Result<FetchOutcome> {
    match plan {
        FetchPlan::Single(descriptor) => Ok(FetchOutcome::Single(execute_single(descriptor)?)),
        FetchPlan::Batch(entries) => Ok(FetchOutcome::Batch(execute_batch(entries)?)),
    }
}

fn reactor() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| FetchError::Runtime(err.to_string()))
}

/// Run one request to completion.
///
/// Transport-level failures (DNS, connect, TLS, timeout) surface as an
/// absent body with whatever metadata was observed; HTTP error statuses are
/// ordinary results.
fn execute_single(descriptor: &RequestDescriptor) -> Result<ExecutionResult> {
    let handle = match TransportHandle::build(descriptor) {
        Ok(handle) => handle,
        Err(err) => {
            tracing::debug!(
                target: "horizon_fetch::executor",
                url = %descriptor.url,
                error = %err,
                "handle construction failed"
            );
            return Ok(ExecutionResult::failure(
                descriptor.url.clone(),
                Duration::ZERO,
                err.to_string(),
            ));
        }
    };
    let reactor = reactor()?;
    Ok(reactor.block_on(run_transfer(handle)))
}

/// Run a keyed collection of independent requests concurrently.
///
/// Every handle is registered before any transfer is driven, all transfers
/// start immediately with no concurrency cap, and the batch returns only
/// once each one has reached a terminal state. Completion order across
/// transfers is unspecified; the drained metadata keeps input key order.
/// Keys whose transfer produced no content are omitted from the outcome —
/// unlike the single path, which reports an explicit empty-body sentinel.
fn execute_batch(entries: &[(String, RequestDescriptor)]) -> Result<BatchOutcome> {
    let mut transfers = Vec::with_capacity(entries.len());
    for (key, descriptor) in entries {
        let handle = match TransportHandle::build(descriptor) {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::debug!(
                    target: "horizon_fetch::executor",
                    key = %key,
                    url = %descriptor.url,
                    error = %err,
                    "handle construction failed"
                );
                None
            }
        };
        transfers.push((key.clone(), descriptor.url.clone(), handle));
    }

    let reactor = reactor()?;
    let settled = reactor.block_on(join_all(transfers.into_iter().map(
        |(key, url, handle)| async move {
            let result = match handle {
                Some(handle) => run_transfer(handle).await,
                None => ExecutionResult::failure(
                    url,
                    Duration::ZERO,
                    "transport handle could not be constructed".to_string(),
                ),
            };
            (key, result)
        },
    )));

    let mut bodies = HashMap::with_capacity(settled.len());
    let mut infos = Vec::with_capacity(settled.len());
    for (key, result) in settled {
        match result.body {
            Some(body) => {
                bodies.insert(key, body);
                infos.push(result.info);
            }
            None => tracing::debug!(
                target: "horizon_fetch::executor",
                key = %key,
                url = %result.info.url,
                "transfer produced no content; omitting from batch outcome"
            ),
        }
    }
    Ok(BatchOutcome::new(bodies, infos))
}

/// Drive one handle to a terminal state and capture its content and
/// metadata. The handle is consumed and released unconditionally.
async fn run_transfer(handle: TransportHandle) -> ExecutionResult {
    let TransportHandle {
        client,
        request,
        include_headers,
    } = handle;
    let requested = request.url().to_string();
    let started = Instant::now();

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::debug!(
                target: "horizon_fetch::executor",
                url = %requested,
                error = %err,
                "transport failure"
            );
            return ExecutionResult::failure(requested, started.elapsed(), err.to_string());
        }
    };

    let status = response.status();
    let version = response.version();
    let effective_url = response.url().to_string();
    let headers = response.headers().clone();
    let content_type = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let content_length = response.content_length();

    let payload = match response.bytes().await {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!(
                target: "horizon_fetch::executor",
                url = %effective_url,
                error = %err,
                "body capture failed"
            );
            return ExecutionResult::failure(effective_url, started.elapsed(), err.to_string());
        }
    };

    let body = if include_headers {
        crate::headers::prepend_header_block(version, status, &headers, &payload)
    } else {
        payload
    };
    ExecutionResult {
        body: Some(body),
        info: TransferInfo {
            url: effective_url,
            status: status.as_u16(),
            content_type,
            content_length,
            total_time: started.elapsed(),
            error: None,
        },
    }
}
