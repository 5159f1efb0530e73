use std::str::FromStr;

use folio_core::AppError;
use serde::{Deserialize, Serialize};

/// Editorial decision status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Waiting in the editorial workflow.
    Queued,
    /// Scheduled for a future issue.
    Scheduled,
    /// Published.
    Published,
    /// Declined by the editors.
    Declined,
}

impl SubmissionStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Declined => "declined",
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "queued" => Ok(Self::Queued),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            "declined" => Ok(Self::Declined),
            _ => Err(AppError::Validation(format!(
                "unknown submission status '{value}'"
            ))),
        }
    }
}

/// Workflow stage a submission currently sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    /// Initial screening.
    Submission,
    /// Peer review.
    Review,
    /// Copyediting.
    Copyediting,
    /// Production and layout.
    Production,
}

impl WorkflowStage {
    /// Returns a stable storage value for this stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submission => "submission",
            Self::Review => "review",
            Self::Copyediting => "copyediting",
            Self::Production => "production",
        }
    }
}

impl FromStr for WorkflowStage {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "submission" => Ok(Self::Submission),
            "review" => Ok(Self::Review),
            "copyediting" => Ok(Self::Copyediting),
            "production" => Ok(Self::Production),
            _ => Err(AppError::Validation(format!(
                "unknown workflow stage '{value}'"
            ))),
        }
    }
}

/// Lifecycle status of one publication version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    /// Not yet published.
    Draft,
    /// Assigned to an issue that is not published yet.
    Scheduled,
    /// Publicly available.
    Published,
}

impl PublicationStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
        }
    }
}

impl FromStr for PublicationStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "draft" => Ok(Self::Draft),
            "scheduled" => Ok(Self::Scheduled),
            "published" => Ok(Self::Published),
            _ => Err(AppError::Validation(format!(
                "unknown publication status '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{PublicationStatus, SubmissionStatus, WorkflowStage};

    #[test]
    fn storage_values_parse_back() {
        for status in [
            SubmissionStatus::Queued,
            SubmissionStatus::Scheduled,
            SubmissionStatus::Published,
            SubmissionStatus::Declined,
        ] {
            assert_eq!(SubmissionStatus::from_str(status.as_str()).ok(), Some(status));
        }
        assert_eq!(
            PublicationStatus::from_str("draft").ok(),
            Some(PublicationStatus::Draft)
        );
    }

    #[test]
    fn stages_are_ordered_by_workflow() {
        assert!(WorkflowStage::Submission < WorkflowStage::Review);
        assert!(WorkflowStage::Copyediting < WorkflowStage::Production);
        assert!(WorkflowStage::from_str("layout").is_err());
    }
}
