use std::sync::Arc;

use tracing::{debug, info};

use super::authority::{ApprovalAuthority, ApprovalDecision, AuthorityError};
use super::domain::{ApplicantRecord, StatusTransitionError};
use super::intake::{ApplicantIntake, IntakeError};
use super::store::{RecordStore, StoreError};

/// Orchestrates a single enrollment attempt across intake, approval, and storage.
pub struct EnrollmentWorkflow<I, A, S> {
    intake: Arc<I>,
    authority: Arc<A>,
    store: Arc<S>,
}

/// What a completed invocation concluded. The rejected record itself is not
/// retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    Enrolled,
    Rejected { reason: String },
}

impl<I, A, S> EnrollmentWorkflow<I, A, S>
where
    I: ApplicantIntake,
    A: ApprovalAuthority,
    S: RecordStore,
{
    pub fn new(intake: Arc<I>, authority: Arc<A>, store: Arc<S>) -> Self {
        Self {
            intake,
            authority,
            store,
        }
    }

    /// Run one enrollment attempt end to end.
    ///
    /// Exactly one of persist-then-notify-success or notify-rejected happens.
    /// Collaborator failures are returned as-is and stop the attempt at the
    /// failing call.
    pub fn process_enrollment(&self) -> Result<EnrollmentOutcome, EnrollmentError> {
        let name = self.intake.ask_name()?;
        let email = self.intake.ask_email()?;
        let certificate = self.intake.ask_health_certificate()?;

        let mut record = ApplicantRecord::new(name, email, certificate);
        debug!(
            email = record.contact_email(),
            certificate = %record.health_certificate(),
            "applicant record submitted for review"
        );

        match self.authority.review_and_decide(&record)? {
            ApprovalDecision::Approved => {
                record.mark_enrolled()?;
                self.store.save(record.clone())?;
                self.intake.notify_success(&record)?;
                info!(email = record.contact_email(), "applicant enrolled");
                Ok(EnrollmentOutcome::Enrolled)
            }
            ApprovalDecision::Rejected => {
                let reason = self.authority.ask_rejection_reason()?;
                record.mark_rejected()?;
                self.intake.notify_rejected(&record, &reason)?;
                info!(email = record.contact_email(), %reason, "applicant rejected");
                Ok(EnrollmentOutcome::Rejected { reason })
            }
        }
    }
}

/// Error surfaced by the workflow; collaborator errors pass through untouched.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Authority(#[from] AuthorityError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] StatusTransitionError),
}
