//! Notification text formatting
//!
//! Turns a [`SubmissionRecord`] into the message sent to the recipient.
//! Missing or unrecognized fields are reported as [`FormatError`] rather
//! than guessed.

use std::fmt::Display;
use thiserror::Error;

use crate::domain::submission::{ReviewStatus, SubmissionRecord};

const NAME_DELIMITER: &str = "__";

/// Telegram rejects `sendMessage` texts longer than this many characters
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// A submission that cannot be turned into a notification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("homework name is missing")]
    MissingName,

    #[error("homework status is missing")]
    MissingStatus,

    #[error("unknown homework status: {0}")]
    UnknownStatus(String),
}

/// Formats review notifications
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFormatter;

impl MessageFormatter {
    /// Composes the two-paragraph notification for a submission
    ///
    /// ```
    /// use reviewbot_core::{MessageFormatter, ReviewStatus, SubmissionRecord};
    ///
    /// let record = SubmissionRecord::new("project1__abc.py", ReviewStatus::Reviewing);
    /// let message = MessageFormatter::format(&record).unwrap();
    /// assert_eq!(message, "Your work \"project1\" was reviewed!\n\nThe work has been taken for review.");
    /// ```
    pub fn format(record: &SubmissionRecord) -> Result<String, FormatError> {
        let name = record.name.as_deref().ok_or(FormatError::MissingName)?;
        let verdict = Self::verdict(&record.status)?;

        Ok(format!(
            "Your work \"{}\" was reviewed!\n\n{}",
            Self::display_name(name),
            verdict
        ))
    }

    /// Part of the name before the first `__`, without any file extension
    pub fn display_name(name: &str) -> &str {
        let base = name.split(NAME_DELIMITER).next().unwrap_or(name);
        base.split('.').next().unwrap_or(base)
    }

    /// Verdict sentence for a status
    pub fn verdict(status: &ReviewStatus) -> Result<&'static str, FormatError> {
        match status {
            ReviewStatus::Rejected => Ok("Unfortunately, errors were found in the work."),
            ReviewStatus::Reviewing => Ok("The work has been taken for review."),
            ReviewStatus::Approved => {
                Ok("The reviewer liked everything; you may proceed to the next lesson.")
            }
            ReviewStatus::Unknown(Some(raw)) => Err(FormatError::UnknownStatus(raw.clone())),
            ReviewStatus::Unknown(None) => Err(FormatError::MissingStatus),
        }
    }

    /// Text of the best-effort report sent when a poll cycle fails
    ///
    /// Capped at [`MAX_MESSAGE_CHARS`] so it can always be delivered.
    pub fn failure(error: &dyn Display) -> String {
        truncate_chars(&format!("The bot encountered an error: {error}"), MAX_MESSAGE_CHARS)
    }
}

/// Shortens `text` to at most `max_chars` characters, ending in `…` when cut
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }

    match text.char_indices().nth(max_chars) {
        Some(_) => {
            let mut cut: String = text.chars().take(max_chars - 1).collect();
            cut.push('…');
            cut
        }
        None => text.to_string(),
    }
}
