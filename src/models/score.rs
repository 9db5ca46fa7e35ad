// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Peer-evaluation score records and the averages derived from them.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One evaluator's rating of one teammate for one evaluation.
///
/// Stored remotely in the `EvaluationScore` table. Decoding is lenient:
/// missing identifiers become empty strings and unusable ratings become 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "_id", alias = "id", default, deserialize_with = "lenient_id")]
    pub id: String,
    /// The evaluated teammate
    #[serde(rename = "userID", alias = "userId", default, deserialize_with = "lenient_id")]
    pub user_id: String,
    #[serde(
        rename = "evaluationID",
        alias = "evaluationId",
        default,
        deserialize_with = "lenient_id"
    )]
    pub evaluation_id: String,
    #[serde(rename = "groupID", alias = "groupId", default, deserialize_with = "lenient_id")]
    pub group_id: String,
    #[serde(
        rename = "categoryID",
        alias = "categoryId",
        default,
        deserialize_with = "lenient_id"
    )]
    pub category_id: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub punctuality: f64,
    #[serde(default, deserialize_with = "lenient_score")]
    pub contributions: f64,
    #[serde(default, deserialize_with = "lenient_score")]
    pub commitment: f64,
    #[serde(default, deserialize_with = "lenient_score")]
    pub attitude: f64,
}

impl ScoreRecord {
    /// The four ratings in rubric order.
    pub fn scores(&self) -> [f64; 4] {
        [
            self.punctuality,
            self.contributions,
            self.commitment,
            self.attitude,
        ]
    }
}

/// Mean rating per rubric dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AverageVector {
    pub punctuality: f64,
    pub contributions: f64,
    pub commitment: f64,
    pub attitude: f64,
}

impl AverageVector {
    pub const ZERO: AverageVector = AverageVector {
        punctuality: 0.0,
        contributions: 0.0,
        commitment: 0.0,
        attitude: 0.0,
    };

    /// Components in rubric order.
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.punctuality,
            self.contributions,
            self.commitment,
            self.attitude,
        ]
    }
}

impl From<[f64; 4]> for AverageVector {
    fn from(v: [f64; 4]) -> Self {
        Self {
            punctuality: v[0],
            contributions: v[1],
            commitment: v[2],
            attitude: v[3],
        }
    }
}

impl fmt::Display for AverageVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "punctuality {:.1}, contributions {:.1}, commitment {:.1}, attitude {:.1}",
            self.punctuality, self.contributions, self.commitment, self.attitude
        )
    }
}

/// Accept a string or number identifier; anything else is empty.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Accept a number or numeric string; null, empty and unparseable input is 0.
fn lenient_score<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let score = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        serde_json::Value::Bool(b) => f64::from(u8::from(b)),
        _ => 0.0,
    };
    Ok(if score.is_nan() { 0.0 } else { score })
}
