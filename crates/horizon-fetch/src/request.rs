//! Request configuration: fluent builder, transport options, and the
//! immutable per-request descriptors an execution plan is made of.

use std::collections::HashMap;
use std::fmt;

use url::form_urlencoded;

use crate::error::{FetchError, Result};
use crate::executor;
use crate::headers::{self, HeaderBlock};
use crate::response::{Fetch, FetchOutcome};

/// HTTP request methods supported by the fetch client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP DELETE method.
    Delete,
}

impl HttpMethod {
    /// Convert to reqwest method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// User agent presented when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; U; Android 4.0.4; es-mx; HTC_One_X Build/IMM76D) AppleWebKit/534.30 (KHTML, like Gecko) Version/4.0";

/// Transport options shared by every request a plan derives.
#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Raw `Name: value` header lines sent with every request.
    pub header_lines: Vec<String>,
    /// Cookie header value; empty sends none.
    pub cookie: String,
    /// Referer header value; empty sends none.
    pub referer: String,
    /// User agent; empty sends none.
    pub user_agent: String,
    /// Issue the request as HEAD instead of transferring a body.
    pub head_only: bool,
    /// Hard per-request timeout in milliseconds. Must be non-zero.
    pub timeout_ms: u64,
    /// Prepend the raw response header block to the captured body.
    pub include_headers: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            header_lines: vec![
                "Accept: application/json".to_string(),
                "Accept-Language: zh-CN,zh;q=0.8".to_string(),
                "Connection: close".to_string(),
            ],
            cookie: String::new(),
            referer: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            head_only: false,
            timeout_ms: 3000,
            include_headers: false,
        }
    }
}

/// Where a plan sends its requests.
#[derive(Clone, Debug)]
pub enum FetchTarget {
    /// One URL, executed with a plain blocking call.
    Single(String),
    /// Keyed URL collection, executed concurrently in one batch.
    Batch(Vec<(String, String)>),
}

/// Immutable description of one transport request.
///
/// Built once per logical request by [`FetchBuilder::build`] and never
/// modified afterwards. For GET requests the configured data has already
/// been folded into the URL's query component and `body` is `None`; for
/// every other method the data (possibly empty) is carried in `body` and
/// never appended to the URL.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    /// Resolved request URL.
    pub url: String,
    /// The HTTP method.
    pub method: HttpMethod,
    /// Payload for non-GET requests.
    pub body: Option<String>,
    /// Raw `Name: value` header lines.
    pub header_lines: Vec<String>,
    /// Cookie header value; empty sends none.
    pub cookie: String,
    /// Referer header value; empty sends none.
    pub referer: String,
    /// User agent; empty sends none.
    pub user_agent: String,
    /// Hard per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Issue the request as HEAD.
    pub head_only: bool,
    /// Prepend the raw response header block to the captured body.
    pub include_headers: bool,
}

/// An immutable, validated execution plan: one descriptor for a single
/// target, or one per key for a batch target.
#[derive(Clone, Debug)]
pub enum FetchPlan {
    /// Plan for one URL.
    Single(RequestDescriptor),
    /// Plan for a keyed URL collection, in input order.
    Batch(Vec<(String, RequestDescriptor)>),
}

impl FetchPlan {
    /// Execute the plan to completion, blocking the calling thread.
    pub fn execute(&self) -> Result<FetchOutcome> {
        executor::execute(self)
    }
}

/// Fluent accumulator for a fetch plan.
///
/// Collects the target, method, data, and transport options, then produces
/// an immutable [`FetchPlan`] via [`build`](Self::build). The per-method
/// helpers ([`get`](Self::get), [`post`](Self::post), ...) build and execute
/// in one call.
#[derive(Clone, Debug)]
pub struct FetchBuilder {
    target: FetchTarget,
    method: HttpMethod,
    data: Option<String>,
    options: FetchOptions,
}

impl FetchBuilder {
    /// Start a plan for a single URL.
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            target: FetchTarget::Single(url.into()),
            method: HttpMethod::Get,
            data: None,
            options: FetchOptions::default(),
        }
    }

    /// Start a plan for a keyed collection of URLs, executed concurrently.
    pub fn batch<K, U>(entries: impl IntoIterator<Item = (K, U)>) -> Self
    where
        K: Into<String>,
        U: Into<String>,
    {
        Self {
            target: FetchTarget::Batch(
                entries
                    .into_iter()
                    .map(|(key, url)| (key.into(), url.into()))
                    .collect(),
            ),
            method: HttpMethod::Get,
            data: None,
            options: FetchOptions::default(),
        }
    }

    /// Start a batch plan keyed by ordinal index (`"0"`, `"1"`, ...).
    pub fn batch_urls<U: Into<String>>(urls: impl IntoIterator<Item = U>) -> Self {
        Self::batch(
            urls.into_iter()
                .enumerate()
                .map(|(index, url)| (index.to_string(), url.into())),
        )
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Set pre-encoded request data.
    ///
    /// For GET the data is folded into the URL's query component at build
    /// time; for every other method it is sent as the request payload.
    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set request data from a key/value mapping, form-encoded immediately.
    pub fn form(mut self, fields: HashMap<String, String>) -> Self {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields.iter())
            .finish();
        self.data = Some(encoded);
        self
    }

    /// Replace the header line list.
    pub fn header_lines<L: Into<String>>(mut self, lines: impl IntoIterator<Item = L>) -> Self {
        self.options.header_lines = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Set the Cookie header value.
    pub fn cookie(mut self, cookie: impl Into<String>) -> Self {
        self.options.cookie = cookie.into();
        self
    }

    /// Set the Referer header value.
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.options.referer = referer.into();
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.options.user_agent = user_agent.into();
        self
    }

    /// Issue the request as HEAD instead of transferring a body.
    pub fn head_only(mut self, head_only: bool) -> Self {
        self.options.head_only = head_only;
        self
    }

    /// Set the hard per-request timeout in milliseconds.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.options.timeout_ms = timeout_ms;
        self
    }

    /// Prepend the raw response header block to the captured body.
    pub fn include_headers(mut self, include_headers: bool) -> Self {
        self.options.include_headers = include_headers;
        self
    }

    /// Replace the complete option set.
    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the immutable execution plan.
    ///
    /// Validates the configuration and resolves one descriptor per target
    /// entry; batch entries share every non-URL setting.
    pub fn build(self) -> Result<FetchPlan> {
        if self.options.timeout_ms == 0 {
            return Err(FetchError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }
        let plan = match &self.target {
            FetchTarget::Single(url) => FetchPlan::Single(self.descriptor(url.clone())),
            FetchTarget::Batch(entries) => FetchPlan::Batch(
                entries
                    .iter()
                    .map(|(key, url)| (key.clone(), self.descriptor(url.clone())))
                    .collect(),
            ),
        };
        Ok(plan)
    }

    /// Build the plan and execute it, blocking until every transfer
    /// reaches a terminal state.
    pub fn send(self) -> Result<FetchOutcome> {
        self.build()?.execute()
    }

    /// Execute as a GET request.
    pub fn get(self) -> Result<FetchOutcome> {
        self.method(HttpMethod::Get).send()
    }

    /// Execute as a POST request.
    pub fn post(self) -> Result<FetchOutcome> {
        self.method(HttpMethod::Post).send()
    }

    /// Execute as a PUT request.
    pub fn put(self) -> Result<FetchOutcome> {
        self.method(HttpMethod::Put).send()
    }

    /// Execute as a DELETE request.
    pub fn delete(self) -> Result<FetchOutcome> {
        self.method(HttpMethod::Delete).send()
    }

    /// Build the plan into a lazy wrapper that executes on first read.
    pub fn lazy(self) -> Result<Fetch> {
        Ok(Fetch::new(self.build()?))
    }

    /// Execute in head-only, include-headers mode and return the raw
    /// response header block. Single targets only.
    pub fn response_headers_raw(self) -> Result<String> {
        let outcome = self.headers_probe()?;
        match outcome {
            FetchOutcome::Single(result) => result.text().ok_or_else(|| {
                FetchError::InvalidBody("header probe produced no response".to_string())
            }),
            FetchOutcome::Batch(_) => Err(header_probe_target_error()),
        }
    }

    /// Execute in head-only, include-headers mode and return the parsed
    /// header block. Single targets only.
    pub fn response_header_block(self) -> Result<HeaderBlock> {
        Ok(HeaderBlock::parse(&self.response_headers_raw()?))
    }

    /// Redirect target advertised by the response, empty when the response
    /// carries no `Location` header. Single targets only.
    pub fn redirect_target(self) -> Result<String> {
        Ok(headers::redirect_target(&self.response_headers_raw()?))
    }

    fn headers_probe(self) -> Result<FetchOutcome> {
        if matches!(self.target, FetchTarget::Batch(_)) {
            return Err(header_probe_target_error());
        }
        self.head_only(true).include_headers(true).send()
    }

    /// Resolve one immutable descriptor for the given URL.
    fn descriptor(&self, url: String) -> RequestDescriptor {
        let (url, body) = match self.method {
            HttpMethod::Get => (fold_query(url, self.data.as_deref()), None),
            _ => (url, Some(self.data.clone().unwrap_or_default())),
        };
        RequestDescriptor {
            url,
            method: self.method,
            body,
            header_lines: self.options.header_lines.clone(),
            cookie: self.options.cookie.clone(),
            referer: self.options.referer.clone(),
            user_agent: self.options.user_agent.clone(),
            timeout_ms: self.options.timeout_ms,
            head_only: self.options.head_only,
            include_headers: self.options.include_headers,
        }
    }
}

fn header_probe_target_error() -> FetchError {
    FetchError::Config("header inspection requires a single target".to_string())
}

/// Append already-encoded data to a URL's query component, with `?` when no
/// query exists yet and `&` otherwise. Empty data leaves the URL untouched.
fn fold_query(url: String, data: Option<&str>) -> String {
    match data {
        None | Some("") => url,
        Some(data) => {
            let separator = if url.contains('?') { '&' } else { '?' };
            format!("{url}{separator}{data}")
        }
    }
}
