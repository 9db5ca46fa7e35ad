// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - network and reporting layer.

pub mod aggregate;
pub mod auth;
pub mod http;
pub mod reports;

pub use aggregate::{average_for_group, average_for_user, average_of, ReportSet};
pub use auth::AuthService;
pub use http::{AuthenticatedHttpClient, AuthenticationSource, RequestOptions};
pub use reports::{ReportFilter, ReportService};
