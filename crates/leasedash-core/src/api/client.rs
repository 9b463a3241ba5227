//! API client for the lease-accounting REST service.
//!
//! `ApiClient` owns the session it authenticates with. Reads go through
//! `request`, which attaches the bearer token and turns every non-success
//! response into an `ApiError`. `login`, `logout` and `bootstrap` change
//! the session and therefore take `&mut self`.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::SessionStore;
use crate::models::{NewReport, Report, Template, User};

use super::error::{ApiError, ClientError, Result};
use super::token::{self, extract_token};

const USER_AGENT: &str = concat!("leasedash/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    device_name: &'a str,
}

/// List endpoints answer with either a bare array or a `data` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) | ListResponse::Wrapped { data: items } => items,
        }
    }
}

/// Outcome of a completed login handshake.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

/// Transport settings. No timeout is applied unless one is set.
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

/// Method, body and extra headers for a single `request`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    /// Sent after the defaults, so these win on conflict.
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    user: Option<User>,
}

impl ApiClient {
    /// Create a client for `base_url` authenticating with `session`.
    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self> {
        Self::with_options(base_url, session, ClientOptions::default())
    }

    pub fn with_options(
        base_url: impl Into<String>,
        session: SessionStore,
        options: ClientOptions,
    ) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(options.user_agent.as_deref().unwrap_or(USER_AGENT));
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            user: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_present()
    }

    /// User cached by the last successful login or bootstrap.
    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(token) = self.session.token() {
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        Ok(headers)
    }

    // ===== Session lifecycle =====

    /// Exchange credentials for a bearer token, persist it, and look up
    /// the user it belongs to.
    ///
    /// The token is taken from the response body or headers when present,
    /// otherwise a local placeholder is stored so the session can proceed
    /// in demo mode. If the identity lookup fails the session is cleared
    /// again and the lookup error is returned.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        device_label: &str,
    ) -> Result<LoginResult> {
        let url = self.url("/login");
        debug!(url = %url, "Sending login request");

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&LoginRequest {
                email,
                password,
                device_name: device_label,
            })
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Login rejected");
            return Err(ApiError::from_login_response(status, &body).into());
        }

        let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        let token = match extract_token(&payload, &headers) {
            Some(token) => token,
            None => {
                warn!("Login response carried no token, using a local placeholder");
                token::placeholder_token()
            }
        };

        self.user = None;
        self.session.save(token.clone())?;

        match self.whoami().await {
            Ok(user) => {
                info!(user_id = user.id, "Login successful");
                self.user = Some(user.clone());
                Ok(LoginResult { token, user })
            }
            Err(e) => {
                warn!(error = %e, "Identity lookup after login failed");
                self.drop_session();
                Err(e)
            }
        }
    }

    /// Restore a persisted session at startup.
    ///
    /// Without a stored token this makes no network call. A stored token
    /// that fails the identity lookup is treated as stale: the session is
    /// cleared and `Ok(None)` returned.
    pub async fn bootstrap(&mut self) -> Result<Option<User>> {
        self.user = None;
        if self.session.load()?.is_none() {
            debug!("No stored credential");
            return Ok(None);
        }

        match self.whoami().await {
            Ok(user) => {
                debug!(user_id = user.id, "Session restored");
                self.user = Some(user.clone());
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "Stored credential rejected, clearing session");
                self.drop_session();
                Ok(None)
            }
        }
    }

    /// Forget the credential. No network call.
    pub fn logout(&mut self) -> Result<()> {
        self.user = None;
        self.session.clear()?;
        info!("Logged out");
        Ok(())
    }

    fn drop_session(&mut self) {
        self.user = None;
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear stored credential");
        }
    }

    // ===== Requests =====

    /// Perform an authenticated call and decode the JSON response.
    ///
    /// Non-success statuses become `ClientError::Api`; failures before a
    /// status is available become `ClientError::Transport`. An empty
    /// success body decodes as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let url = self.url(endpoint);
        let mut headers = self.default_headers()?;
        headers.extend(options.headers);

        debug!(method = %options.method, url = %url, "Sending request");

        let mut builder = self.client.request(options.method, &url).headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body.to_string());
        }
        let response = builder.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(status = status.as_u16(), url = %url, "Request failed");
            return Err(ApiError::from_response(status, &body).into());
        }

        decode_body(&body)
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.request(endpoint, RequestOptions::get()).await
    }

    async fn get_list<T: DeserializeOwned>(&self, endpoint: &str) -> Result<Vec<T>> {
        let list: ListResponse<T> = self.get(endpoint).await?;
        Ok(list.into_vec())
    }

    // ===== Data Fetching Methods =====

    /// Look up the user the current token belongs to
    pub async fn whoami(&self) -> Result<User> {
        self.get("/whoami").await
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>> {
        self.get_list("/templates").await
    }

    pub async fn list_reports(&self) -> Result<Vec<Report>> {
        self.get_list("/reports").await
    }

    /// Fetch the reports generated from one template
    pub async fn list_template_reports(&self, template_id: i64) -> Result<Vec<Report>> {
        self.get_list(&format!("/template/{}/reports", template_id)).await
    }

    pub async fn get_report(&self, report_id: i64) -> Result<Report> {
        self.get(&format!("/report/{}", report_id)).await
    }

    /// Submit a new report for generation. Validation failures come back
    /// as an `ApiError` carrying per-field messages.
    pub async fn create_report(&self, new_report: &NewReport) -> Result<Report> {
        let body = serde_json::to_value(new_report)?;
        self.request("/report", RequestOptions::post(body)).await
    }

    /// Liveness check. Returns whatever the service answers with.
    pub async fn ping(&self) -> Result<Value> {
        self.get("/ping").await
    }
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let text = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(text).map_err(|e| ClientError::invalid_response(e, body))
}
