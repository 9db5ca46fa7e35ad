// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Average peer-evaluation scores per group or per user.
//!
//! Plain sum-then-divide over the matching records. No rounding and no
//! range checks; an empty selection averages to zero.

use crate::models::{AverageVector, ScoreRecord};
use std::collections::BTreeSet;

/// Mean of each rubric dimension over `records`.
pub fn average_of<'a>(records: impl IntoIterator<Item = &'a ScoreRecord>) -> AverageVector {
    let mut sums = [0.0_f64; 4];
    let mut count = 0usize;

    for record in records {
        for (sum, score) in sums.iter_mut().zip(record.scores()) {
            *sum += score;
        }
        count += 1;
    }

    if count == 0 {
        return AverageVector::ZERO;
    }

    AverageVector::from(sums.map(|sum| sum / count as f64))
}

/// Average over the records of one group.
pub fn average_for_group(records: &[ScoreRecord], group_id: &str) -> AverageVector {
    average_of(records.iter().filter(|r| r.group_id == group_id))
}

/// Average over the records of one user, optionally narrowed to one group.
///
/// An empty `group_id` is treated as no group filter.
pub fn average_for_user(
    records: &[ScoreRecord],
    user_id: &str,
    group_id: Option<&str>,
) -> AverageVector {
    let group_id = group_id.filter(|g| !g.is_empty());

    average_of(
        records
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter(|r| group_id.map_or(true, |g| r.group_id == g)),
    )
}

/// Score records fetched for one scope (a course, a group, ...).
#[derive(Debug, Clone, Default)]
pub struct ReportSet {
    records: Vec<ScoreRecord>,
}

impl ReportSet {
    pub fn new(records: Vec<ScoreRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn group_average(&self, group_id: &str) -> AverageVector {
        average_for_group(&self.records, group_id)
    }

    pub fn user_average(&self, user_id: &str, group_id: Option<&str>) -> AverageVector {
        average_for_user(&self.records, user_id, group_id)
    }

    /// Distinct group ids present, sorted.
    pub fn group_ids(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.group_id.as_str()).collect()
    }

    /// Distinct evaluated user ids present, sorted.
    pub fn user_ids(&self) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.user_id.as_str()).collect()
    }

    /// Drop a record after it was deleted remotely.
    pub fn remove(&mut self, record_id: &str) -> Option<ScoreRecord> {
        let index = self.records.iter().position(|r| r.id == record_id)?;
        Some(self.records.remove(index))
    }
}

impl From<Vec<ScoreRecord>> for ReportSet {
    fn from(records: Vec<ScoreRecord>) -> Self {
        Self::new(records)
    }
}
