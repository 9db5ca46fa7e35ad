// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote authentication service client.
//!
//! Handles:
//! - Login (stores access token, refresh token and user profile)
//! - Sign-up and logout
//! - Access token refresh, used by [`AuthenticatedHttpClient`] on 401
//! - Token verification
//!
//! These calls go out on the plain HTTP client: they either carry no
//! credential or carry one explicitly, and must never trigger a refresh.
//!
//! [`AuthenticatedHttpClient`]: crate::services::AuthenticatedHttpClient

use crate::error::{ClientError, Result};
use crate::models::{AuthenticatedUser, UserProfile};
use crate::services::http::AuthenticationSource;
use crate::store::{keys, CredentialStore};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

/// Authentication service client.
#[derive(Clone)]
pub struct AuthService {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
}

impl AuthService {
    pub fn new(http: reqwest::Client, base_url: &str, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    /// Log in and persist the session credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser> {
        tracing::info!(email, "Attempting login");

        let response = self
            .http
            .post(format!("{}/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        tracing::debug!(status = %response.status(), "Login response");

        if !response.status().is_success() {
            return Err(ClientError::from_response(response).await);
        }

        let body: LoginResponse = serde_json::from_slice(&response.bytes().await?)?;
        let user = AuthenticatedUser {
            id: body.user.id,
            email: body.user.email,
            name: body.user.name,
            access_token: body.access_token,
            refresh_token: body.refresh_token,
        };

        let profile = serde_json::to_string(&user.profile())?;
        self.store.store(keys::USER, &profile).await?;
        self.store.store(keys::TOKEN, &user.access_token).await?;
        self.store
            .store(keys::REFRESH_TOKEN, &user.refresh_token)
            .await?;

        tracing::info!(user_id = %user.id, "Login successful, session stored");
        Ok(user)
    }

    /// Create an account. Returns whether the service created it.
    pub async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<bool> {
        tracing::info!(email, "Attempting sign up");

        let response = self
            .http
            .post(format!("{}/signup-direct", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password, "name": name }))
            .send()
            .await?;

        tracing::debug!(status = %response.status(), "Sign up response");
        Ok(response.status() == StatusCode::CREATED)
    }

    /// Forget the session credentials and the stored profile.
    pub async fn log_out(&self) -> Result<bool> {
        self.store.remove(keys::TOKEN).await?;
        self.store.remove(keys::REFRESH_TOKEN).await?;
        self.store.remove(keys::USER).await?;
        tracing::info!("Logged out, session removed");
        Ok(true)
    }

    /// Check an access token against the service.
    pub async fn verify_token(&self, access_token: &str) -> Result<bool> {
        let response = self
            .http
            .get(format!("{}/verify-token", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        Ok(response.status() == StatusCode::OK)
    }

    /// Profile stored by the last login, if any.
    pub async fn current_user(&self) -> Result<Option<UserProfile>> {
        match self.store.retrieve(keys::USER).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl AuthenticationSource for AuthService {
    /// Exchange the stored refresh token for a new access token.
    ///
    /// Any remote or transport failure reports `false`; only credential
    /// store failures are errors.
    async fn refresh_access_token(&self) -> Result<bool> {
        let Some(refresh_token) = self.store.retrieve(keys::REFRESH_TOKEN).await? else {
            tracing::error!("No refresh token found");
            return Ok(false);
        };

        let response = match self
            .http
            .post(format!("{}/refresh-token", self.base_url))
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Token refresh request failed");
                return Ok(false);
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Token refresh rejected");
            return Ok(false);
        }

        let body: RefreshResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse token refresh response");
                return Ok(false);
            }
        };

        self.store.store(keys::TOKEN, &body.access_token).await?;
        tracing::info!("Token refreshed successfully");
        Ok(true)
    }
}

/// Login response from the authentication service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: UserProfile,
}

/// Token refresh response from the authentication service.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
}
