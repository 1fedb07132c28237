//! Client for the exegesis backend.
//!
//! `TafsirClient` marshals the four backend operations (token login, tafsir
//! lookup, reflection, topic search) into [`HttpRequest`]s and normalizes every
//! reply into `Result<payload, ClientError>`. The wire itself sits behind the
//! [`Transport`] trait:
//! - `UreqTransport` performs blocking HTTP with ureq.
//! - `MockTransport` replays canned responses and records requests for tests.
//!
//! The session token is passed explicitly into each read call. Under
//! [`AuthPolicy::Required`] a missing token aborts before anything is sent.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Author, Language};
use crate::config::BasirahConfig;

/// Token-issuing endpoint.
pub const TOKEN_PATH: &str = "/token";
/// Reflection endpoint.
pub const REFLECT_PATH: &str = "/reflect";

// ---------------------------------------------------------------------------
// Client error
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ClientError {
    #[error("authentication required")]
    #[diagnostic(
        code(basirah::client::auth_required),
        help("Log in first (`basirah login`) and pass the token with --token or BASIRAH_TOKEN.")
    )]
    AuthRequired,

    /// Non-2xx reply. Displays the response body exactly as received.
    #[error("{body}")]
    #[diagnostic(code(basirah::client::backend))]
    Backend { status: u16, body: String },

    #[error("request failed: {message}")]
    #[diagnostic(
        code(basirah::client::transport),
        help("Check the backend URL (--base-url or BASIRAH_API_URL) and your network connection.")
    )]
    Transport { message: String },

    #[error("unexpected response from server: {message}")]
    #[diagnostic(code(basirah::client::decode), help("Backend version mismatch?"))]
    Decode { message: String },

    #[error("login rejected (HTTP {status})")]
    #[diagnostic(
        code(basirah::client::login_rejected),
        help("Please check your credentials.")
    )]
    LoginRejected { status: u16 },
}

pub type ClientResult<T> = Result<T, ClientError>;

// ---------------------------------------------------------------------------
// Endpoint / policy selection
// ---------------------------------------------------------------------------

/// Route of the topic search operation; differs between backend deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchEndpoint {
    /// `/tafsir/topic`
    #[default]
    TafsirTopic,
    /// `/search`
    Search,
}

impl SearchEndpoint {
    pub fn path(self) -> &'static str {
        match self {
            SearchEndpoint::TafsirTopic => "/tafsir/topic",
            SearchEndpoint::Search => "/search",
        }
    }
}

/// Whether read operations may be sent without a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    /// Attach a token when one is available.
    #[default]
    Optional,
    /// Refuse read operations without a token.
    Required,
}

// ---------------------------------------------------------------------------
// HTTP primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A fully marshaled request, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub base_url: String,
    pub path: String,
    /// Query parameters in insertion order (unencoded).
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    /// Form-encoded body; empty for GET requests.
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    fn new(method: Method, base_url: &str, path: impl Into<String>) -> Self {
        Self {
            method,
            base_url: base_url.to_string(),
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            form: Vec::new(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_keys(&self) -> Vec<&str> {
        self.query.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// One blocking round trip. Any HTTP status is a successful send; only
/// connection-level failures are errors.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> ClientResult<HttpResponse>;
}

// ---------------------------------------------------------------------------
// UreqTransport
// ---------------------------------------------------------------------------

/// Blocking transport over a shared `ureq::Agent` (library default timeouts).
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new(),
        }
    }

}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> ClientResult<HttpResponse> {
        let url = request.url();
        let mut req = match request.method {
            Method::Get => self.agent.get(&url),
            Method::Post => self.agent.post(&url),
        };
        for (key, value) in &request.query {
            req = req.query(key, value);
        }
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        let result = match request.method {
            Method::Get => req.call(),
            Method::Post => {
                let form: Vec<(&str, &str)> = request
                    .form
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                req.send_form(&form)
            }
        };

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.into_string().map_err(|e| ClientError::Decode {
                    message: format!("failed to read body: {e}"),
                })?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().map_err(|e| {
                    tracing::warn!(status, error = %e, "failed to read error body");
                    ClientError::Decode {
                        message: format!("failed to read error body (HTTP {status}): {e}"),
                    }
                })?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Transport(transport)) => Err(ClientError::Transport {
                message: transport.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// In-memory transport for tests.
///
/// Queue replies with `push_*`; every request passed to `send` is recorded
/// and available through `requests()`. An empty queue answers with a
/// transport error.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<ClientResult<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: HttpResponse) {
        self.lock_replies().push_back(Ok(response));
    }

    pub fn push_json(&self, status: u16, value: serde_json::Value) {
        self.push_response(HttpResponse::json(status, &value));
    }

    /// Simulate a connection failure.
    pub fn push_transport_failure(&self, message: &str) {
        self.lock_replies().push_back(Err(ClientError::Transport {
            message: message.to_string(),
        }));
    }

    /// All requests sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<ClientResult<HttpResponse>>> {
        self.replies.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> ClientResult<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.lock_replies()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ClientError::Transport {
                    message: "no canned response queued".into(),
                })
            })
    }
}

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TafsirQuery {
    pub author: Author,
    pub surah: u16,
    pub ayah: u16,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionQuery {
    pub author: Author,
    pub surah: u16,
    pub from_ayah: u16,
    pub to_ayah: u16,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicQuery {
    pub query: String,
    /// `None` searches every author.
    pub author: Option<Author>,
    /// `None` (or 0) searches every surah.
    pub surah: Option<u16>,
    pub language: Language,
    pub top_k: u8,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TafsirResponse {
    pub tafsir_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReflectionResponse {
    pub reflection: String,
}

/// Ranked matches in backend order (not re-sorted).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(deserialize_with = "lenient::ayah_number")]
    pub surah: u16,
    #[serde(deserialize_with = "lenient::ayah_range")]
    pub ayah_range: AyahRange,
    pub score: f64,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub translated_text: String,
    #[serde(default)]
    pub surah_name_english: Option<String>,
}

#[derive(Deserialize)]
struct ErrorPayload {
    error: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AyahRange {
    pub start: u16,
    pub end: u16,
}

/// The backend emits surah and ayah numbers either as JSON numbers or as
/// numeric strings.
mod lenient {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use super::AyahRange;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    impl NumberOrString {
        fn to_u16<E: serde::de::Error>(&self) -> Result<u16, E> {
            match self {
                NumberOrString::Number(n) => {
                    u16::try_from(*n).map_err(|_| E::custom(format!("number out of range: {n}")))
                }
                NumberOrString::Text(s) => s
                    .trim()
                    .parse()
                    .map_err(|_| E::custom(format!("not a number: \"{s}\""))),
            }
        }
    }

    pub fn ayah_number<'de, D: Deserializer<'de>>(de: D) -> Result<u16, D::Error> {
        NumberOrString::deserialize(de)?.to_u16()
    }

    pub fn ayah_range<'de, D: Deserializer<'de>>(de: D) -> Result<AyahRange, D::Error> {
        let raw = Vec::<NumberOrString>::deserialize(de)?;
        let (Some(first), Some(last)) = (raw.first(), raw.last()) else {
            return Err(D::Error::custom("empty ayah_range"));
        };
        Ok(AyahRange {
            start: first.to_u16()?,
            end: last.to_u16()?,
        })
    }
}

// ---------------------------------------------------------------------------
// TafsirClient
// ---------------------------------------------------------------------------

/// Stateless request/response client for the exegesis backend.
#[derive(Debug)]
pub struct TafsirClient<T = UreqTransport> {
    base_url: String,
    search_endpoint: SearchEndpoint,
    auth: AuthPolicy,
    transport: T,
}

impl TafsirClient<UreqTransport> {
    /// Build a real HTTP client from the effective configuration.
    pub fn from_config(config: &BasirahConfig) -> Self {
        let auth = if config.require_auth {
            AuthPolicy::Required
        } else {
            AuthPolicy::Optional
        };
        TafsirClient::new(&config.base_url, UreqTransport::new())
            .with_search_endpoint(config.search_endpoint)
            .with_auth_policy(auth)
    }
}

impl<T: Transport> TafsirClient<T> {
    pub fn new(base_url: &str, transport: T) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            search_endpoint: SearchEndpoint::default(),
            auth: AuthPolicy::default(),
            transport,
        }
    }

    pub fn with_search_endpoint(mut self, endpoint: SearchEndpoint) -> Self {
        self.search_endpoint = endpoint;
        self
    }

    pub fn with_auth_policy(mut self, auth: AuthPolicy) -> Self {
        self.auth = auth;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_policy(&self) -> AuthPolicy {
        self.auth
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exchange credentials for a bearer token.
    ///
    /// Only HTTP 200 with an `access_token` field counts as success; any
    /// other status is reported as [`ClientError::LoginRejected`] without
    /// the body.
    pub fn login(&self, username: &str, password: &str) -> ClientResult<String> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
        }

        let mut req = HttpRequest::new(Method::Post, &self.base_url, TOKEN_PATH);
        req.form = vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ];
        tracing::debug!(path = TOKEN_PATH, "requesting access token");

        let resp = self.transport.send(&req)?;
        if resp.status != 200 {
            tracing::warn!(status = resp.status, "token request rejected");
            return Err(ClientError::LoginRejected {
                status: resp.status,
            });
        }
        let token: TokenResponse =
            serde_json::from_str(&resp.body).map_err(|e| ClientError::Decode {
                message: format!("token response: {e}"),
            })?;
        Ok(token.access_token)
    }

    /// `GET /tafsir/{author}/{surah}/{ayah}?lang=..`
    pub fn fetch_tafsir(
        &self,
        token: Option<&str>,
        query: &TafsirQuery,
    ) -> ClientResult<TafsirResponse> {
        let path = format!(
            "/tafsir/{}/{}/{}",
            query.author.slug(),
            query.surah,
            query.ayah
        );
        self.get_json(token, path, vec![("lang", query.language.code().to_string())])
    }

    /// `GET /reflect?author=..&surah=..&from_ayah=..&to_ayah=..&lang=..`
    pub fn fetch_reflection(
        &self,
        token: Option<&str>,
        query: &ReflectionQuery,
    ) -> ClientResult<ReflectionResponse> {
        self.get_json(
            token,
            REFLECT_PATH,
            vec![
                ("author", query.author.slug().to_string()),
                ("surah", query.surah.to_string()),
                ("from_ayah", query.from_ayah.to_string()),
                ("to_ayah", query.to_ayah.to_string()),
                ("lang", query.language.code().to_string()),
            ],
        )
    }

    /// Topic search. `author` and `surah` are left out of the query string
    /// entirely when no filter is chosen.
    pub fn search_topic(
        &self,
        token: Option<&str>,
        query: &TopicQuery,
    ) -> ClientResult<SearchResponse> {
        let mut params = vec![
            ("q", query.query.clone()),
            ("lang", query.language.code().to_string()),
            ("top_k", query.top_k.to_string()),
        ];
        if let Some(author) = query.author {
            params.push(("author", author.slug().to_string()));
        }
        if let Some(surah) = query.surah.filter(|&s| s > 0) {
            params.push(("surah", surah.to_string()));
        }
        self.get_json(token, self.search_endpoint.path(), params)
    }

    fn get_json<R: serde::de::DeserializeOwned>(
        &self,
        token: Option<&str>,
        path: impl Into<String>,
        params: Vec<(&str, String)>,
    ) -> ClientResult<R> {
        if self.auth == AuthPolicy::Required && token.is_none() {
            return Err(ClientError::AuthRequired);
        }

        let mut req = HttpRequest::new(Method::Get, &self.base_url, path);
        req.query = params
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        if let Some(token) = token {
            req.headers
                .push(("Authorization".to_string(), format!("Bearer {token}")));
        }
        tracing::debug!(
            path = %req.path,
            params = ?req.query_keys(),
            bearer = token.is_some(),
            "GET"
        );

        let resp = self.transport.send(&req)?;
        if !resp.is_success() {
            tracing::warn!(path = %req.path, status = resp.status, "backend returned an error");
            return Err(ClientError::Backend {
                status: resp.status,
                body: resp.body,
            });
        }
        // The backend also reports failures as `{"error": ".."}` with a 2xx status.
        if let Ok(ErrorPayload { error }) = serde_json::from_str(&resp.body) {
            tracing::warn!(path = %req.path, status = resp.status, "backend returned an error payload");
            return Err(ClientError::Backend {
                status: resp.status,
                body: error,
            });
        }
        serde_json::from_str(&resp.body).map_err(|e| ClientError::Decode {
            message: format!("{}: {e}", req.path),
        })
    }
}
