// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Peer-evaluation report repository backed by the remote `EvaluationScore` table.

use crate::error::{ClientError, Result};
use crate::models::ScoreRecord;
use crate::services::http::AuthenticatedHttpClient;
use reqwest::StatusCode;
use serde::Serialize;
use urlencoding::encode;

/// Remote table holding submitted peer-evaluation scores.
const SCORE_TABLE: &str = "EvaluationScore";

/// Which score records to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFilter<'a> {
    Course(&'a str),
    User(&'a str),
    Group(&'a str),
    UserInGroup { user_id: &'a str, group_id: &'a str },
    Evaluation(&'a str),
    Category(&'a str),
}

impl ReportFilter<'_> {
    /// Query-string fragment selecting the records, values percent-encoded.
    fn query(&self) -> String {
        match self {
            ReportFilter::Course(id) => format!("courseID={}", encode(id)),
            ReportFilter::User(id) => format!("userID={}", encode(id)),
            ReportFilter::Group(id) => format!("groupID={}", encode(id)),
            ReportFilter::UserInGroup { user_id, group_id } => {
                format!("userID={}&groupID={}", encode(user_id), encode(group_id))
            }
            ReportFilter::Evaluation(id) => format!("evaluationID={}", encode(id)),
            ReportFilter::Category(id) => format!("categoryID={}", encode(id)),
        }
    }
}

/// Insert request for the score table.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertScores<'a> {
    table_name: &'static str,
    records: [NewScore<'a>; 1],
}

/// Score row as submitted; the remote service assigns `_id`.
#[derive(Serialize)]
struct NewScore<'a> {
    #[serde(rename = "userID")]
    user_id: &'a str,
    #[serde(rename = "evaluationID")]
    evaluation_id: &'a str,
    #[serde(rename = "groupID")]
    group_id: &'a str,
    #[serde(rename = "categoryID")]
    category_id: &'a str,
    punctuality: f64,
    contributions: f64,
    commitment: f64,
    attitude: f64,
}

impl<'a> From<&'a ScoreRecord> for NewScore<'a> {
    fn from(record: &'a ScoreRecord) -> Self {
        Self {
            user_id: &record.user_id,
            evaluation_id: &record.evaluation_id,
            group_id: &record.group_id,
            category_id: &record.category_id,
            punctuality: record.punctuality,
            contributions: record.contributions,
            commitment: record.commitment,
            attitude: record.attitude,
        }
    }
}

/// Reads, submits and deletes score records through the authenticated client.
#[derive(Clone)]
pub struct ReportService {
    client: AuthenticatedHttpClient,
    /// `{database_url}/{database_name}`
    database_base: String,
}

impl ReportService {
    pub fn new(client: AuthenticatedHttpClient, database_base: impl Into<String>) -> Self {
        Self {
            client,
            database_base: database_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the score records matching `filter`.
    ///
    /// A successful response whose body is not a JSON array yields no records.
    pub async fn fetch(&self, filter: ReportFilter<'_>) -> Result<Vec<ScoreRecord>> {
        let url = format!(
            "{}/read?tableName={}&{}",
            self.database_base,
            SCORE_TABLE,
            filter.query()
        );

        let response = self.client.get(&url).await?;
        let status = response.status();
        tracing::debug!(status = %status, ?filter, "Score records response");

        if !status.is_success() {
            tracing::error!(status = %status, ?filter, "Failed to load score records");
            return Err(ClientError::from_response(response).await);
        }

        let body: serde_json::Value = serde_json::from_slice(&response.bytes().await?)?;
        if !body.is_array() {
            tracing::warn!(?filter, "Score records response is not an array, treating as empty");
            return Ok(Vec::new());
        }

        let records: Vec<ScoreRecord> = serde_json::from_value(body)?;
        tracing::info!(count = records.len(), ?filter, "Score records loaded");
        Ok(records)
    }

    pub async fn reports_for_course(&self, course_id: &str) -> Result<Vec<ScoreRecord>> {
        self.fetch(ReportFilter::Course(course_id)).await
    }

    pub async fn reports_by_user(&self, user_id: &str) -> Result<Vec<ScoreRecord>> {
        self.fetch(ReportFilter::User(user_id)).await
    }

    pub async fn reports_by_group(&self, group_id: &str) -> Result<Vec<ScoreRecord>> {
        self.fetch(ReportFilter::Group(group_id)).await
    }

    pub async fn reports_by_user_and_group(
        &self,
        user_id: &str,
        group_id: &str,
    ) -> Result<Vec<ScoreRecord>> {
        self.fetch(ReportFilter::UserInGroup { user_id, group_id })
            .await
    }

    pub async fn reports_by_evaluation(&self, evaluation_id: &str) -> Result<Vec<ScoreRecord>> {
        self.fetch(ReportFilter::Evaluation(evaluation_id)).await
    }

    pub async fn reports_by_category(&self, category_id: &str) -> Result<Vec<ScoreRecord>> {
        self.fetch(ReportFilter::Category(category_id)).await
    }

    /// Submit one peer-evaluation score. `record.id` is ignored.
    pub async fn submit_score(&self, record: &ScoreRecord) -> Result<()> {
        let url = format!("{}/insert", self.database_base);
        let body = InsertScores {
            table_name: SCORE_TABLE,
            records: [NewScore::from(record)],
        };

        let response = self.client.post(&url, &body).await?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                tracing::info!(
                    user_id = %record.user_id,
                    evaluation_id = %record.evaluation_id,
                    "Score submitted"
                );
                Ok(())
            }
            status => {
                tracing::error!(
                    status = %status,
                    user_id = %record.user_id,
                    "Failed to submit score"
                );
                Err(ClientError::from_response(response).await)
            }
        }
    }

    /// Delete one score record.
    pub async fn delete_report(&self, record_id: &str) -> Result<()> {
        let url = format!(
            "{}/delete?tableName={}&_id={}",
            self.database_base,
            SCORE_TABLE,
            encode(record_id)
        );

        let response = self.client.delete(&url).await?;
        match response.status() {
            StatusCode::OK | StatusCode::NO_CONTENT => {
                tracing::info!(record_id, "Score record deleted");
                Ok(())
            }
            status => {
                tracing::error!(status = %status, record_id, "Failed to delete score record");
                Err(ClientError::from_response(response).await)
            }
        }
    }
}
