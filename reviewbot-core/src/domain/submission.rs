//! Submission domain types

use std::fmt;

/// One homework submission as reported by the review API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    /// Raw `homework_name`, e.g. `"project1__abc.py"`; `None` when the API omitted it
    pub name: Option<String>,
    pub status: ReviewStatus,
}

impl SubmissionRecord {
    pub fn new(name: impl Into<String>, status: ReviewStatus) -> Self {
        Self {
            name: Some(name.into()),
            status,
        }
    }
}

/// Review verdict of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewStatus {
    Rejected,
    Reviewing,
    Approved,
    /// Missing (`None`) or unrecognized status value
    Unknown(Option<String>),
}

impl ReviewStatus {
    /// Parses the raw API value; anything unrecognized becomes `Unknown`
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("rejected") => Self::Rejected,
            Some("reviewing") => Self::Reviewing,
            Some("approved") => Self::Approved,
            other => Self::Unknown(other.map(str::to_string)),
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected => write!(f, "rejected"),
            Self::Reviewing => write!(f, "reviewing"),
            Self::Approved => write!(f, "approved"),
            Self::Unknown(Some(raw)) => write!(f, "unknown({raw})"),
            Self::Unknown(None) => write!(f, "missing"),
        }
    }
}
