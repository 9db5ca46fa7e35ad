// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client that attaches the stored bearer token and recovers from an
//! expired token with a single refresh-and-retry.
//!
//! Handles:
//! - `Authorization: Bearer <token>` injection from the credential store
//! - Token refresh when the remote service answers 401
//! - De-duplication of concurrent refreshes (one refresh per 401 burst)
//!
//! HTTP status codes are never turned into errors here. Only transport and
//! credential-store failures are returned as `Err`.

use crate::error::{ClientError, Result};
use crate::store::{keys, CredentialStore};
use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Source of fresh access tokens.
#[async_trait]
pub trait AuthenticationSource: Send + Sync {
    /// Exchange the stored refresh token for a new access token.
    ///
    /// Returns `Ok(true)` only after the new access token has been written
    /// to the credential store under [`keys::TOKEN`].
    async fn refresh_access_token(&self) -> Result<bool>;
}

/// Refresh operation shared by every request that observed the same 401 burst.
type InFlightRefresh = Shared<BoxFuture<'static, bool>>;

/// Extra headers and body for a request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `payload` as the JSON body.
    ///
    /// Sets `Content-Type: application/json` unless a content type was
    /// already supplied.
    pub fn json<B: Serialize + ?Sized>(mut self, payload: &B) -> Result<Self> {
        self.body = Some(serde_json::to_vec(payload)?);
        self.headers
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static("application/json"));
        Ok(self)
    }
}

/// Authenticated client for the remote Flourse service.
///
/// Clones share the HTTP connection pool and the in-flight refresh slot, so
/// the one-refresh-at-a-time guarantee holds across all of them.
#[derive(Clone)]
pub struct AuthenticatedHttpClient {
    http: reqwest::Client,
    store: Arc<dyn CredentialStore>,
    auth: Arc<dyn AuthenticationSource>,
    /// `Some` while a refresh is running. Checked and set under one guard.
    in_flight_refresh: Arc<Mutex<Option<InFlightRefresh>>>,
}

impl AuthenticatedHttpClient {
    pub fn new(
        http: reqwest::Client,
        store: Arc<dyn CredentialStore>,
        auth: Arc<dyn AuthenticationSource>,
    ) -> Self {
        Self {
            http,
            store,
            auth,
            in_flight_refresh: Arc::new(Mutex::new(None)),
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Whether a token refresh is currently in flight.
    pub async fn is_refreshing(&self) -> bool {
        self.in_flight_refresh.lock().await.is_some()
    }

    /// Send a request with the stored bearer token.
    ///
    /// On 401, refreshes the token (joining a refresh that is already in
    /// flight) and re-sends the request once. The retried response is
    /// returned whatever its status. If no refresh token is stored or the
    /// refresh fails, the original 401 response is returned.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let token = self.access_token().await?;
        let response = self.send(&method, url, &options, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::warn!(%method, url, "Access token rejected (401), attempting refresh");

        let refresh_token = self.store.retrieve(keys::REFRESH_TOKEN).await?;
        if refresh_token.map_or(true, |t| t.is_empty()) {
            tracing::warn!("No refresh token present, not attempting refresh");
            return Ok(response);
        }

        if !self.refresh_once().await {
            return Ok(response);
        }

        let Some(token) = self.access_token().await? else {
            tracing::warn!("Refresh reported success but no access token is stored");
            return Ok(response);
        };

        tracing::debug!(%method, url, "Retrying request with refreshed token");
        self.send(&method, url, &options, Some(&token)).await
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.request(Method::GET, url, RequestOptions::new()).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response> {
        self.request(Method::POST, url, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response> {
        self.request(Method::PUT, url, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response> {
        self.request(Method::PATCH, url, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn delete(&self, url: &str) -> Result<Response> {
        self.request(Method::DELETE, url, RequestOptions::new()).await
    }

    /// Current access token. An empty stored value counts as absent.
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .store
            .retrieve(keys::TOKEN)
            .await?
            .filter(|token| !token.is_empty()))
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response> {
        let mut headers = options.headers.clone();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                ClientError::Store("Stored access token is not a valid header value".to_string())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self.http.request(method.clone(), url).headers(headers);
        if let Some(body) = &options.body {
            builder = builder.body(body.clone());
        }

        Ok(builder.send().await?)
    }

    /// Run the refresh, or wait for the one already running.
    ///
    /// Errors from the authentication source count as a failed refresh.
    async fn refresh_once(&self) -> bool {
        let refresh = {
            let mut slot = self.in_flight_refresh.lock().await;
            match slot.as_ref() {
                Some(existing) => {
                    tracing::debug!("Token refresh already in flight, waiting for it");
                    existing.clone()
                }
                None => {
                    let refresh = self.start_refresh();
                    *slot = Some(refresh.clone());
                    refresh
                }
            }
        };

        refresh.await
    }

    /// Build the shared refresh operation.
    ///
    /// The operation empties the in-flight slot itself, before its result
    /// reaches any waiter.
    fn start_refresh(&self) -> InFlightRefresh {
        let auth = Arc::clone(&self.auth);
        let slot = Arc::clone(&self.in_flight_refresh);

        async move {
            let refreshed = match auth.refresh_access_token().await {
                Ok(refreshed) => refreshed,
                Err(e) => {
                    tracing::error!(error = %e, "Token refresh raised an error");
                    false
                }
            };

            if refreshed {
                tracing::info!("Access token refreshed");
            } else {
                tracing::error!("Token refresh failed");
            }

            slot.lock().await.take();
            refreshed
        }
        .boxed()
        .shared()
    }
}
