use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to the health certificate file an applicant supplied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateRef(PathBuf);

impl CertificateRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Lower-cased file extension, if the reference carries one.
    pub fn extension(&self) -> Option<String> {
        self.0
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

impl fmt::Display for CertificateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl From<&str> for CertificateRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<PathBuf> for CertificateRef {
    fn from(value: PathBuf) -> Self {
        Self(value)
    }
}

/// Where an applicant stands in the enrollment workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Enrolled,
    Rejected,
}

impl EnrollmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "pending",
            EnrollmentStatus::Enrolled => "enrolled",
            EnrollmentStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, EnrollmentStatus::Pending)
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raised when a record is asked to leave a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("applicant record cannot move from {from} to {to}")]
pub struct StatusTransitionError {
    pub from: EnrollmentStatus,
    pub to: EnrollmentStatus,
}

/// In-memory representation of one enrollment attempt.
///
/// Status starts at `Pending` and moves exactly once, to either `Enrolled` or
/// `Rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantRecord {
    full_name: String,
    contact_email: String,
    health_certificate: CertificateRef,
    status: EnrollmentStatus,
    created_at: DateTime<Utc>,
}

impl ApplicantRecord {
    pub fn new(
        full_name: impl Into<String>,
        contact_email: impl Into<String>,
        health_certificate: CertificateRef,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            contact_email: contact_email.into(),
            health_certificate,
            status: EnrollmentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }

    pub fn health_certificate(&self) -> &CertificateRef {
        &self.health_certificate
    }

    pub fn status(&self) -> EnrollmentStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn mark_enrolled(&mut self) -> Result<(), StatusTransitionError> {
        self.transition(EnrollmentStatus::Enrolled)
    }

    pub fn mark_rejected(&mut self) -> Result<(), StatusTransitionError> {
        self.transition(EnrollmentStatus::Rejected)
    }

    fn transition(&mut self, to: EnrollmentStatus) -> Result<(), StatusTransitionError> {
        if self.status.is_terminal() || !to.is_terminal() {
            return Err(StatusTransitionError {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ApplicantRecord {
        ApplicantRecord::new("Ana Ruiz", "ana@x.com", CertificateRef::from("cert.pdf"))
    }

    #[test]
    fn new_records_start_pending() {
        let record = record();
        assert_eq!(record.status(), EnrollmentStatus::Pending);
        assert_eq!(record.full_name(), "Ana Ruiz");
        assert_eq!(record.contact_email(), "ana@x.com");
        assert_eq!(record.health_certificate().path(), Path::new("cert.pdf"));
    }

    #[test]
    fn pending_moves_to_either_terminal_status() {
        let mut enrolled = record();
        enrolled.mark_enrolled().expect("pending can enroll");
        assert_eq!(enrolled.status(), EnrollmentStatus::Enrolled);

        let mut rejected = record();
        rejected.mark_rejected().expect("pending can reject");
        assert_eq!(rejected.status(), EnrollmentStatus::Rejected);
    }

    #[test]
    fn terminal_statuses_refuse_further_transitions() {
        let mut record = record();
        record.mark_enrolled().expect("first transition");

        let err = record.mark_rejected().expect_err("enrolled is terminal");
        assert_eq!(
            err,
            StatusTransitionError {
                from: EnrollmentStatus::Enrolled,
                to: EnrollmentStatus::Rejected,
            }
        );
        assert!(record.mark_enrolled().is_err());
        assert_eq!(record.status(), EnrollmentStatus::Enrolled);
        assert_eq!(
            err.to_string(),
            "applicant record cannot move from enrolled to rejected"
        );
    }

    #[test]
    fn certificate_extension_is_lowercased() {
        assert_eq!(
            CertificateRef::from("scans/Cert.PDF").extension().as_deref(),
            Some("pdf")
        );
        assert_eq!(CertificateRef::from("cert").extension(), None);
    }

    #[test]
    fn status_serializes_as_label() {
        let json = serde_json::to_value(record()).expect("record serializes");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["health_certificate"], "cert.pdf");
    }
}
