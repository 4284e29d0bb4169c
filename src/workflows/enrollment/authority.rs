use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::domain::ApplicantRecord;
use crate::config::EnrollmentConfig;

/// Decision-maker that accepts or rejects an applicant record.
pub trait ApprovalAuthority: Send + Sync {
    fn review_and_decide(&self, record: &ApplicantRecord)
        -> Result<ApprovalDecision, AuthorityError>;

    /// Rationale for the most recent rejection. Only meaningful after a
    /// `Rejected` decision.
    fn ask_rejection_reason(&self) -> Result<String, AuthorityError>;
}

/// Binary verdict returned by an approval authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

impl ApprovalDecision {
    pub const fn is_approved(self) -> bool {
        matches!(self, ApprovalDecision::Approved)
    }
}

impl From<bool> for ApprovalDecision {
    fn from(approved: bool) -> Self {
        if approved {
            ApprovalDecision::Approved
        } else {
            ApprovalDecision::Rejected
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    #[error("no rejection is awaiting a rationale")]
    NoPendingRejection,
    #[error("approval authority unavailable: {0}")]
    Unavailable(String),
}

/// Rule-based authority checking the applicant's contact details and
/// certificate format against the configured policy.
#[derive(Debug)]
pub struct CertificatePolicyAuthority {
    accepted_extensions: Vec<String>,
    pending_reason: Mutex<Option<String>>,
}

impl CertificatePolicyAuthority {
    pub fn new<I, S>(accepted_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted_extensions: accepted_extensions
                .into_iter()
                .map(|ext| {
                    let ext: String = ext.into();
                    ext.trim().trim_start_matches('.').to_ascii_lowercase()
                })
                .collect(),
            pending_reason: Mutex::new(None),
        }
    }

    pub fn from_config(config: &EnrollmentConfig) -> Self {
        Self::new(config.accepted_certificate_extensions.iter().cloned())
    }

    fn rejection_for(&self, record: &ApplicantRecord) -> Option<String> {
        if record.full_name().trim().is_empty() {
            return Some("Applicant name is required".to_string());
        }

        if !record.contact_email().contains('@') {
            return Some(format!(
                "Contact email {} is not deliverable",
                record.contact_email()
            ));
        }

        let accepted = record
            .health_certificate()
            .extension()
            .is_some_and(|ext| self.accepted_extensions.iter().any(|allowed| *allowed == ext));
        if !accepted {
            return Some(format!(
                "Health certificate must be one of: {}",
                self.accepted_extensions.join(", ")
            ));
        }

        None
    }
}

impl ApprovalAuthority for CertificatePolicyAuthority {
    fn review_and_decide(
        &self,
        record: &ApplicantRecord,
    ) -> Result<ApprovalDecision, AuthorityError> {
        let rejection = self.rejection_for(record);
        let decision = ApprovalDecision::from(rejection.is_none());

        *self
            .pending_reason
            .lock()
            .map_err(|_| AuthorityError::Unavailable("decision log poisoned".to_string()))? =
            rejection;

        Ok(decision)
    }

    fn ask_rejection_reason(&self) -> Result<String, AuthorityError> {
        self.pending_reason
            .lock()
            .map_err(|_| AuthorityError::Unavailable("decision log poisoned".to_string()))?
            .take()
            .ok_or(AuthorityError::NoPendingRejection)
    }
}
