// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Flourse client core: authenticated access to the hosted course service
//!
//! This crate provides the network layer of the Flourse course-management
//! client (bearer tokens with refresh-on-401) and the averaging of
//! peer-evaluation scores shown in reports.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

use config::Config;
use error::Result;
use services::{AuthService, AuthenticatedHttpClient, ReportService};
use std::sync::Arc;
use store::CredentialStore;

/// Shared client services, built once at startup and passed by reference.
pub struct Services {
    pub config: Config,
    pub store: Arc<dyn CredentialStore>,
    pub auth: Arc<AuthService>,
    pub client: AuthenticatedHttpClient,
    pub reports: ReportService,
}

impl Services {
    /// Wire the services together around one HTTP connection pool.
    pub fn new(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        let auth = Arc::new(AuthService::new(
            http.clone(),
            &config.auth_url,
            Arc::clone(&store),
        ));
        let client = AuthenticatedHttpClient::new(http, Arc::clone(&store), auth.clone());
        let reports = ReportService::new(client.clone(), config.database_base());

        Ok(Self {
            config,
            store,
            auth,
            client,
            reports,
        })
    }
}
