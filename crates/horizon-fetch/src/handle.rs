//! Transport handle construction.

use std::time::Duration;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, COOKIE, REFERER};
use reqwest::redirect::Policy;

use crate::error::Result;
use crate::request::{HttpMethod, RequestDescriptor};

/// One opaque, single-use transport unit: a dedicated client plus the fully
/// built request it will run.
///
/// A handle is owned by exactly one executor invocation, never shared
/// across requests, and dropped once its content has been drained. Carrying
/// the client inside the handle keeps connection state from surviving the
/// execution that created it.
pub(crate) struct TransportHandle {
    pub(crate) client: reqwest::Client,
    pub(crate) request: reqwest::Request,
    pub(crate) include_headers: bool,
}

impl TransportHandle {
    /// Build a handle from a descriptor.
    ///
    /// Certificate and hostname verification are disabled by policy;
    /// callers that need verification must not use this client unmodified.
    /// Redirects are never followed — redirect targets are exposed as a
    /// query on the captured headers instead. The transport negotiates
    /// gzip content encoding and decompresses transparently, and the whole
    /// body is captured in memory.
    pub(crate) fn build(descriptor: &RequestDescriptor) -> Result<Self> {
        let url: url::Url = descriptor.url.parse()?;

        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .redirect(Policy::none())
            .gzip(true);
        if !descriptor.user_agent.is_empty() {
            builder = builder.user_agent(descriptor.user_agent.as_str());
        }
        let client = builder.build()?;

        let method = if descriptor.head_only {
            reqwest::Method::HEAD
        } else {
            descriptor.method.to_reqwest()
        };
        let mut request = client.request(method, url);

        for line in &descriptor.header_lines {
            match parse_header_line(line) {
                Some((name, value)) => request = request.header(name, value),
                None => tracing::warn!(
                    target: "horizon_fetch::handle",
                    line = %line,
                    "skipping malformed header line"
                ),
            }
        }
        if !descriptor.cookie.is_empty() {
            request = request.header(COOKIE, descriptor.cookie.as_str());
        }
        if !descriptor.referer.is_empty() {
            request = request.header(REFERER, descriptor.referer.as_str());
        }
        if descriptor.method != HttpMethod::Get && !descriptor.head_only {
            if let Some(body) = &descriptor.body {
                request = request.body(body.clone());
                if !names_content_type(&descriptor.header_lines) {
                    request = request.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
                }
            }
        }

        let request = request
            .timeout(Duration::from_millis(descriptor.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            request,
            include_headers: descriptor.include_headers,
        })
    }
}

/// Split a raw `Name: value` line into typed header parts. Lines that do
/// not form a valid header yield `None`.
fn parse_header_line(line: &str) -> Option<(HeaderName, HeaderValue)> {
    let (name, value) = line.split_once(':')?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).ok()?;
    let value = HeaderValue::from_str(value.trim()).ok()?;
    Some((name, value))
}

fn names_content_type(header_lines: &[String]) -> bool {
    header_lines.iter().any(|line| {
        line.split_once(':')
            .is_some_and(|(name, _)| name.trim().eq_ignore_ascii_case("content-type"))
    })
}
