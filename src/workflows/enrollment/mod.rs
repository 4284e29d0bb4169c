//! Student enrollment: intake, approval, and roster persistence.
//!
//! [`EnrollmentWorkflow`] holds the business logic. Intake, approval, and
//! storage are traits so the service, the CLI, and tests can each plug in
//! their own collaborators.

pub mod authority;
pub mod domain;
pub mod intake;
pub mod router;
pub mod store;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use authority::{
    ApprovalAuthority, ApprovalDecision, AuthorityError, CertificatePolicyAuthority,
};
pub use domain::{ApplicantRecord, CertificateRef, EnrollmentStatus, StatusTransitionError};
pub use intake::{
    read_submissions, ApplicantIntake, EnrollmentNotice, IntakeError, SubmittedApplicant,
    SubmittedIntake,
};
pub use router::enrollment_router;
pub use store::{write_roster, InMemoryRecordStore, RecordStore, StoreError};
pub use workflow::{EnrollmentError, EnrollmentOutcome, EnrollmentWorkflow};
