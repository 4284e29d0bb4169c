use std::io::Read;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicantRecord, CertificateRef};

/// Source of applicant-provided fields and sink for outcome notifications.
pub trait ApplicantIntake: Send + Sync {
    fn ask_name(&self) -> Result<String, IntakeError>;
    fn ask_email(&self) -> Result<String, IntakeError>;
    fn ask_health_certificate(&self) -> Result<CertificateRef, IntakeError>;
    fn notify_success(&self, record: &ApplicantRecord) -> Result<(), IntakeError>;
    fn notify_rejected(&self, record: &ApplicantRecord, reason: &str) -> Result<(), IntakeError>;
}

/// Failures raised by intake sources and notification channels.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("applicant did not provide `{0}`")]
    MissingField(&'static str),
    #[error("notification channel unavailable: {0}")]
    Notification(String),
    #[error("intake unavailable: {0}")]
    Unavailable(String),
    #[error("invalid applicant batch: {0}")]
    Batch(#[from] csv::Error),
}

/// Raw applicant answers as captured by a form, CLI flags, or a CSV row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedApplicant {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub health_certificate: String,
}

/// Outcome notification delivered back to the applicant channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EnrollmentNotice {
    Enrolled {
        record: ApplicantRecord,
    },
    Rejected {
        record: ApplicantRecord,
        reason: String,
    },
}

impl EnrollmentNotice {
    pub fn record(&self) -> &ApplicantRecord {
        match self {
            EnrollmentNotice::Enrolled { record } | EnrollmentNotice::Rejected { record, .. } => {
                record
            }
        }
    }

    pub fn is_enrolled(&self) -> bool {
        matches!(self, EnrollmentNotice::Enrolled { .. })
    }
}

/// Intake answering from a pre-collected submission and keeping every notice it receives.
#[derive(Debug, Default)]
pub struct SubmittedIntake {
    applicant: SubmittedApplicant,
    notices: Mutex<Vec<EnrollmentNotice>>,
}

impl SubmittedIntake {
    pub fn new(applicant: SubmittedApplicant) -> Self {
        Self {
            applicant,
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn notices(&self) -> Vec<EnrollmentNotice> {
        self.notices.lock().expect("notice mutex poisoned").clone()
    }

    pub fn last_notice(&self) -> Option<EnrollmentNotice> {
        self.notices
            .lock()
            .expect("notice mutex poisoned")
            .last()
            .cloned()
    }

    fn record_notice(&self, notice: EnrollmentNotice) -> Result<(), IntakeError> {
        self.notices
            .lock()
            .map_err(|_| IntakeError::Notification("notice log poisoned".to_string()))?
            .push(notice);
        Ok(())
    }
}

fn present(value: &str, field: &'static str) -> Result<String, IntakeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(IntakeError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

impl ApplicantIntake for SubmittedIntake {
    fn ask_name(&self) -> Result<String, IntakeError> {
        present(&self.applicant.full_name, "full_name")
    }

    fn ask_email(&self) -> Result<String, IntakeError> {
        present(&self.applicant.contact_email, "contact_email")
    }

    fn ask_health_certificate(&self) -> Result<CertificateRef, IntakeError> {
        present(&self.applicant.health_certificate, "health_certificate")
            .map(|path| CertificateRef::new(path))
    }

    fn notify_success(&self, record: &ApplicantRecord) -> Result<(), IntakeError> {
        self.record_notice(EnrollmentNotice::Enrolled {
            record: record.clone(),
        })
    }

    fn notify_rejected(&self, record: &ApplicantRecord, reason: &str) -> Result<(), IntakeError> {
        self.record_notice(EnrollmentNotice::Rejected {
            record: record.clone(),
            reason: reason.to_string(),
        })
    }
}

/// Parse a CSV export with `full_name,contact_email,health_certificate` headers.
pub fn read_submissions<R: Read>(reader: R) -> Result<Vec<SubmittedApplicant>, IntakeError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut submissions = Vec::new();
    for row in csv_reader.deserialize::<SubmittedApplicant>() {
        submissions.push(row?);
    }
    Ok(submissions)
}
