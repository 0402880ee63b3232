//! Configurable HTTP fetch facade.
//!
//! This crate resolves a fluent configuration — a target (one URL or a
//! keyed collection of URLs), a method, request data, and transport
//! options — into immutable request descriptors, executes them, and exposes
//! the raw body, transfer metadata, and (optionally) the raw response
//! header block. A single target runs as one blocking call; a batch target
//! runs every transfer concurrently on a reactor owned by the call, with
//! no per-request threads.
//!
//! Certificate verification is disabled by policy and redirects are never
//! followed; this client is built for scraping-style fetching where the
//! caller inspects status, headers, and redirect targets itself.
//!
//! # Single request
//!
//! ```ignore
//! use horizon_fetch::FetchBuilder;
//!
//! let outcome = FetchBuilder::url("https://api.example.com/item")
//!     .data("id=7")
//!     .timeout_ms(5000)
//!     .get()?;
//! let result = outcome.as_single().unwrap();
//! println!("status: {}", result.info.status);
//! println!("body: {}", result.text().unwrap_or_default());
//! ```
//!
//! # Batch requests
//!
//! ```ignore
//! use horizon_fetch::FetchBuilder;
//!
//! let outcome = FetchBuilder::batch([
//!     ("news", "https://example.com/news"),
//!     ("user", "https://example.com/user"),
//! ])
//! .get()?;
//! let batch = outcome.as_batch().unwrap();
//! // Failed transfers are omitted; presence in the mapping means success.
//! for key in batch.keys() {
//!     println!("{key}: {} bytes", batch.body(key).unwrap().len());
//! }
//! ```
//!
//! # Two-phase use and lazy execution
//!
//! ```ignore
//! use horizon_fetch::{execute, FetchBuilder};
//!
//! // Build once, execute explicitly.
//! let plan = FetchBuilder::url("https://example.com").build()?;
//! let outcome = execute(&plan)?;
//!
//! // Or defer: the plan executes on the first read.
//! let mut fetch = FetchBuilder::url("https://example.com").lazy()?;
//! let outcome = fetch.response()?;
//! ```
//!
//! # Header inspection
//!
//! ```ignore
//! use horizon_fetch::FetchBuilder;
//!
//! let block = FetchBuilder::url("https://example.com/moved").response_header_block()?;
//! println!("status line: {}", block.status_line());
//!
//! let target = FetchBuilder::url("https://example.com/moved").redirect_target()?;
//! if !target.is_empty() {
//!     println!("redirects to {target}");
//! }
//! ```

mod error;
mod executor;
mod handle;
mod headers;
mod request;
mod response;

pub use error::{FetchError, Result};
pub use executor::execute;
pub use headers::{redirect_target, HeaderBlock};
pub use request::{
    FetchBuilder, FetchOptions, FetchPlan, FetchTarget, HttpMethod, RequestDescriptor,
    DEFAULT_USER_AGENT,
};
pub use response::{BatchOutcome, ExecutionResult, Fetch, FetchOutcome, TransferInfo};
