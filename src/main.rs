// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flourse course report
//!
//! Fetches the peer-evaluation scores of one course with the stored session
//! and prints the per-group and per-student averages.

use anyhow::Context;
use flourse_client::{config::Config, services::ReportSet, store::FileStore, Services};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    let course_id = std::env::args()
        .nth(1)
        .context("usage: flourse-report <course-id>")?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    let store = Arc::new(FileStore::new(config.require_credentials_path()?));
    tracing::info!(path = %store.path().display(), "Using credential file");

    let services = Services::new(config, store).context("Failed to build services")?;

    match services.auth.current_user().await? {
        Some(user) => tracing::info!(user_id = %user.id, email = %user.email, "Session loaded"),
        None => tracing::warn!("No stored user profile, requests may be rejected"),
    }

    let reports = ReportSet::new(
        services
            .reports
            .reports_for_course(&course_id)
            .await
            .with_context(|| format!("Failed to load reports for course {}", course_id))?,
    );
    tracing::info!(course_id = %course_id, count = reports.len(), "Reports loaded");

    println!("Course {} ({} evaluations)", course_id, reports.len());
    for group_id in reports.group_ids() {
        println!("  group {}: {}", group_id, reports.group_average(group_id));
        for user_id in reports.user_ids() {
            let in_group = reports
                .records()
                .iter()
                .any(|r| r.user_id == user_id && r.group_id == group_id);
            if in_group {
                println!(
                    "    student {}: {}",
                    user_id,
                    reports.user_average(user_id, Some(group_id))
                );
            }
        }
    }

    Ok(())
}

/// Initialize structured JSON logging on stderr.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flourse_client=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
