use std::str::FromStr;

use folio_core::AppError;
use serde::{Deserialize, Serialize};

/// Progress of one review assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Waiting for the reviewer to respond.
    Pending,
    /// Reviewer agreed to review.
    Accepted,
    /// Reviewer declined the request.
    Declined,
    /// Review submitted with a recommendation.
    Completed,
}

impl ReviewStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::Validation(format!(
                "unknown review status '{value}'"
            ))),
        }
    }
}

/// Reviewer recommendation attached to a completed review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewRecommendation {
    /// Accept as is.
    Accept,
    /// Minor revisions required.
    PendingRevisions,
    /// Resubmit for another review round.
    ResubmitForReview,
    /// Resubmit elsewhere.
    ResubmitElsewhere,
    /// Decline.
    Decline,
    /// See reviewer comments.
    SeeComments,
}

impl ReviewRecommendation {
    /// Returns a stable storage value for this recommendation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::PendingRevisions => "pending_revisions",
            Self::ResubmitForReview => "resubmit_for_review",
            Self::ResubmitElsewhere => "resubmit_elsewhere",
            Self::Decline => "decline",
            Self::SeeComments => "see_comments",
        }
    }
}

impl FromStr for ReviewRecommendation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "accept" => Ok(Self::Accept),
            "pending_revisions" => Ok(Self::PendingRevisions),
            "resubmit_for_review" => Ok(Self::ResubmitForReview),
            "resubmit_elsewhere" => Ok(Self::ResubmitElsewhere),
            "decline" => Ok(Self::Decline),
            "see_comments" => Ok(Self::SeeComments),
            _ => Err(AppError::Validation(format!(
                "unknown review recommendation '{value}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{ReviewRecommendation, ReviewStatus};

    #[test]
    fn unknown_values_are_rejected() {
        assert!(ReviewStatus::from_str("done").is_err());
        assert!(ReviewRecommendation::from_str("maybe").is_err());
    }

    #[test]
    fn recommendation_storage_value_parses_back() {
        let parsed = ReviewRecommendation::from_str(ReviewRecommendation::PendingRevisions.as_str());
        assert_eq!(parsed.ok(), Some(ReviewRecommendation::PendingRevisions));
    }
}
