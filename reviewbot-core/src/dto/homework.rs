//! Homework status response DTO

use serde_json::Value as JsonValue;

use crate::domain::checkpoint::Checkpoint;
use crate::domain::submission::{ReviewStatus, SubmissionRecord};

/// Parsed body of a homework status query
///
/// Expected shape:
/// `{ "homeworks": [ { "homework_name": "...", "status": "..." } ], "current_date": 1000 }`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeworkStatuses {
    /// Submissions in API order (newest first)
    pub homeworks: Vec<SubmissionRecord>,
    /// Server time to use as the next `from_date`
    pub current_date: Option<Checkpoint>,
}

impl HomeworkStatuses {
    /// Parses a response body
    ///
    /// Fails only when the body is not JSON at all. Any JSON document is
    /// accepted: a missing or non-array `homeworks` yields no submissions, a
    /// missing or non-integer `current_date` yields no checkpoint, and
    /// non-string fields inside an entry are treated as absent.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        let value: JsonValue = serde_json::from_str(body)?;
        Ok(Self::from_value(&value))
    }

    pub fn from_value(value: &JsonValue) -> Self {
        let homeworks = value
            .get("homeworks")
            .and_then(JsonValue::as_array)
            .map(|entries| entries.iter().map(submission_from_value).collect())
            .unwrap_or_default();

        let current_date = value
            .get("current_date")
            .and_then(JsonValue::as_i64)
            .map(Checkpoint::new);

        Self {
            homeworks,
            current_date,
        }
    }
}

fn submission_from_value(entry: &JsonValue) -> SubmissionRecord {
    let name = entry
        .get("homework_name")
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let status = ReviewStatus::from_raw(entry.get("status").and_then(JsonValue::as_str));

    SubmissionRecord { name, status }
}
