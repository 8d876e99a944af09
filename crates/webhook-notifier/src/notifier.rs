// crates/webhook-notifier/src/notifier.rs
// ============================================================================
// Module: Webhook Notifier
// Description: Posts rendered events to a Webex-compatible webhook.
// Purpose: Deliver one event per call with a single HTTP POST.
// Dependencies: reqwest, tokio, url
// ============================================================================

//! ## Overview
//! [`WebhookNotifier`] captures its endpoint, room, token and HTTP client at
//! construction and holds no mutable state afterwards, so one instance can be
//! shared across tasks.
//! Invariants:
//! - Each `deliver` call sends at most one request; there are no retries.
//! - Redirects are not followed.
//! - Error response bodies are read up to `max_response_bytes`.
//! - Each attempt is reported to the observer exactly once.
//!
//! Security posture: the token travels only in the `Authorization` header,
//! which is marked sensitive.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use reqwest::Client;
use reqwest::Proxy;
use reqwest::Response;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::NotifierConfig;
use crate::context::DeliveryContext;
use crate::error::ConfigurationError;
use crate::error::DeliveryError;
use crate::error::NotifierError;
use crate::error::TransportError;
use crate::event::Event;
use crate::payload::Rendering;
use crate::payload::WebexPayload;
use crate::telemetry::DeliveryObserver;
use crate::telemetry::DeliveryOutcome;
use crate::telemetry::DeliveryRecord;
use crate::telemetry::NoopObserver;
use crate::trust::TrustRoot;

// ============================================================================
// SECTION: Notifier
// ============================================================================

/// Webex webhook notifier.
///
/// # Invariants
/// - `endpoint` is an absolute HTTP(S) URL.
/// - `authorization` is a sensitive `Bearer` header value.
#[derive(Clone)]
pub struct WebhookNotifier {
    /// Composed POST target.
    endpoint: Url,
    /// Destination room.
    channel: String,
    /// Precomputed `Authorization` header.
    authorization: HeaderValue,
    /// HTTP client, optionally bound to a custom trust root.
    client: Client,
    /// Cap on error bodies.
    max_response_bytes: usize,
    /// Attempt observer.
    observer: Arc<dyn DeliveryObserver>,
}

impl WebhookNotifier {
    /// Builds a notifier with default limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the URL or token is invalid, the
    /// trust root cannot be applied, or the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        path_suffix: &str,
        trust_root: Option<&TrustRoot>,
        channel: &str,
        token: &str,
    ) -> Result<Self, ConfigurationError> {
        Self::from_config(&NotifierConfig::new(base_url, path_suffix, channel, token), trust_root)
    }

    /// Builds a notifier from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when validation or client construction fails.
    pub fn from_config(
        config: &NotifierConfig,
        trust_root: Option<&TrustRoot>,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        // URL errors take precedence over client build errors.
        config.endpoint()?;
        let client = build_client(config, trust_root)?;
        Self::with_client(config, client)
    }

    /// Builds a notifier around a caller-supplied HTTP client.
    ///
    /// Timeout, proxy and user agent settings in `config` are ignored; they
    /// belong to the client.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when the URL, token or limits are invalid.
    pub fn with_client(config: &NotifierConfig, client: Client) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let endpoint = config.endpoint()?;
        let authorization = bearer_header(&config.token)?;
        Ok(Self {
            endpoint,
            channel: config.channel.clone(),
            authorization,
            client,
            max_response_bytes: config.max_response_bytes,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Replaces the delivery observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DeliveryObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// POST target.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Destination room.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Renders `event` and posts it once.
    ///
    /// The response body of a successful call is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError::Transport`] when no response arrives (including
    /// cancellation and deadline expiry) and [`NotifierError::Delivery`] for
    /// non-2xx responses.
    pub async fn deliver(&self, ctx: &DeliveryContext, event: &Event) -> Result<(), NotifierError> {
        let started = Instant::now();
        let rendering = Rendering::for_event(event);
        let payload = WebexPayload::render(&self.channel, event, rendering);
        let (result, request_bytes) = match payload.to_vec() {
            Ok(body) => {
                let request_bytes = body.len();
                (self.exchange(ctx, body).await, request_bytes)
            }
            Err(err) => (Err(TransportError::Encode(err.to_string()).into()), 0),
        };
        self.observer.record_delivery(self.record(
            rendering,
            &result,
            request_bytes,
            started,
        ));
        result.map(|_| ())
    }

    /// Races the request against the context.
    async fn exchange(&self, ctx: &DeliveryContext, body: Vec<u8>) -> Result<u16, NotifierError> {
        if let Some(err) = ctx.err() {
            return Err(NotifierError::from(err));
        }
        tokio::select! {
            biased;
            err = ctx.done() => Err(NotifierError::from(err)),
            result = self.send_once(body) => result,
        }
    }

    /// Sends the request and classifies the response.
    async fn send_once(&self, body: Vec<u8>) -> Result<u16, NotifierError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, self.authorization.clone())
            .body(body)
            .send()
            .await
            .map_err(TransportError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }
        let (bytes, truncated) = read_limited(response, self.max_response_bytes).await;
        Err(DeliveryError {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&bytes).into_owned(),
            truncated,
        }
        .into())
    }

    /// Builds the telemetry record for one attempt.
    fn record(
        &self,
        rendering: Rendering,
        result: &Result<u16, NotifierError>,
        request_bytes: usize,
        started: Instant,
    ) -> DeliveryRecord {
        let (outcome, status, error_kind) = match result {
            Ok(status) => (DeliveryOutcome::Ok, Some(*status), None),
            Err(err) => (DeliveryOutcome::Error, err.status(), Some(err.kind())),
        };
        DeliveryRecord {
            endpoint_host: self.endpoint.host_str().unwrap_or_default().to_string(),
            channel: self.channel.clone(),
            rendering: rendering.as_str(),
            outcome,
            status,
            error_kind,
            request_bytes,
            latency: started.elapsed(),
        }
    }
}

impl fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("endpoint", &self.endpoint.as_str())
            .field("channel", &self.channel)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the HTTP client for a config and optional trust root.
fn build_client(
    config: &NotifierConfig,
    trust_root: Option<&TrustRoot>,
) -> Result<Client, ConfigurationError> {
    let mut builder = Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .redirect(Policy::none());
    if let Some(trust_root) = trust_root {
        builder = builder.use_preconfigured_tls(trust_root.client_config()?);
    }
    if let Some(proxy_url) = &config.proxy_url {
        let proxy = Proxy::all(proxy_url.as_str())
            .map_err(|err| ConfigurationError::InvalidProxy(err.to_string()))?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(|err| ConfigurationError::ClientBuild(err.to_string()))
}

/// Converts a token into a sensitive bearer header.
fn bearer_header(token: &str) -> Result<HeaderValue, ConfigurationError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ConfigurationError::InvalidToken)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Reads at most `limit` body bytes; the flag is true when more were available.
///
/// A body that fails mid-read keeps the bytes received so far and is flagged
/// as truncated, so the status code is never lost.
async fn read_limited(mut response: Response, limit: usize) -> (Vec<u8>, bool) {
    let mut body = Vec::new();
    loop {
        let chunk = match response.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => return (body, false),
            Err(_) => return (body, true),
        };
        let remaining = limit.saturating_sub(body.len());
        if chunk.len() > remaining {
            body.extend(chunk.iter().take(remaining));
            return (body, true);
        }
        body.extend_from_slice(&chunk);
    }
}
