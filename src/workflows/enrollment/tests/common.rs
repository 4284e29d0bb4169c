use std::sync::{Arc, Mutex};

use crate::workflows::enrollment::authority::{ApprovalAuthority, ApprovalDecision, AuthorityError};
use crate::workflows::enrollment::domain::{ApplicantRecord, CertificateRef};
use crate::workflows::enrollment::intake::{ApplicantIntake, IntakeError, SubmittedApplicant};
use crate::workflows::enrollment::store::{RecordStore, StoreError};
use crate::workflows::enrollment::EnrollmentWorkflow;

/// Collaborator calls in the order the workflow made them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Call {
    AskName,
    AskEmail,
    AskCertificate,
    Review,
    RejectionReason,
    Save,
    NotifySuccess,
    NotifyRejected,
}

pub(super) type CallLog = Arc<Mutex<Vec<Call>>>;

fn log_call(log: &CallLog, call: Call) {
    log.lock().expect("call log poisoned").push(call);
}

pub(super) struct ScriptedIntake {
    log: CallLog,
    name: String,
    email: String,
    certificate: String,
    fail_on: Option<Call>,
    successes: Mutex<Vec<ApplicantRecord>>,
    rejections: Mutex<Vec<(ApplicantRecord, String)>>,
}

impl ScriptedIntake {
    pub(super) fn successes(&self) -> Vec<ApplicantRecord> {
        self.successes.lock().expect("intake mutex poisoned").clone()
    }

    pub(super) fn rejections(&self) -> Vec<(ApplicantRecord, String)> {
        self.rejections.lock().expect("intake mutex poisoned").clone()
    }

    fn answer(&self, call: Call, value: &str) -> Result<String, IntakeError> {
        log_call(&self.log, call);
        if self.fail_on == Some(call) {
            return Err(IntakeError::Unavailable("registrar desk closed".to_string()));
        }
        Ok(value.to_string())
    }
}

impl ApplicantIntake for ScriptedIntake {
    fn ask_name(&self) -> Result<String, IntakeError> {
        self.answer(Call::AskName, &self.name)
    }

    fn ask_email(&self) -> Result<String, IntakeError> {
        self.answer(Call::AskEmail, &self.email)
    }

    fn ask_health_certificate(&self) -> Result<CertificateRef, IntakeError> {
        self.answer(Call::AskCertificate, &self.certificate)
            .map(|path| CertificateRef::new(path))
    }

    fn notify_success(&self, record: &ApplicantRecord) -> Result<(), IntakeError> {
        self.answer(Call::NotifySuccess, "")?;
        self.successes
            .lock()
            .expect("intake mutex poisoned")
            .push(record.clone());
        Ok(())
    }

    fn notify_rejected(&self, record: &ApplicantRecord, reason: &str) -> Result<(), IntakeError> {
        self.answer(Call::NotifyRejected, "")?;
        self.rejections
            .lock()
            .expect("intake mutex poisoned")
            .push((record.clone(), reason.to_string()));
        Ok(())
    }
}

pub(super) struct ScriptedAuthority {
    log: CallLog,
    approve: bool,
    reason: String,
    fail_on: Option<Call>,
    reviewed: Mutex<Vec<ApplicantRecord>>,
}

impl ScriptedAuthority {
    pub(super) fn reviewed(&self) -> Vec<ApplicantRecord> {
        self.reviewed.lock().expect("authority mutex poisoned").clone()
    }
}

impl ApprovalAuthority for ScriptedAuthority {
    fn review_and_decide(
        &self,
        record: &ApplicantRecord,
    ) -> Result<ApprovalDecision, AuthorityError> {
        log_call(&self.log, Call::Review);
        if self.fail_on == Some(Call::Review) {
            return Err(AuthorityError::Unavailable("director out of office".to_string()));
        }
        self.reviewed
            .lock()
            .expect("authority mutex poisoned")
            .push(record.clone());
        Ok(ApprovalDecision::from(self.approve))
    }

    fn ask_rejection_reason(&self) -> Result<String, AuthorityError> {
        log_call(&self.log, Call::RejectionReason);
        if self.fail_on == Some(Call::RejectionReason) {
            return Err(AuthorityError::Unavailable("director out of office".to_string()));
        }
        Ok(self.reason.clone())
    }
}

pub(super) struct RecordingStore {
    log: CallLog,
    fail: bool,
    saved: Mutex<Vec<ApplicantRecord>>,
}

impl RecordingStore {
    pub(super) fn saved(&self) -> Vec<ApplicantRecord> {
        self.saved.lock().expect("store mutex poisoned").clone()
    }
}

impl RecordStore for RecordingStore {
    fn save(&self, record: ApplicantRecord) -> Result<(), StoreError> {
        log_call(&self.log, Call::Save);
        if self.fail {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.saved.lock().expect("store mutex poisoned").push(record);
        Ok(())
    }

    fn roster(&self) -> Result<Vec<ApplicantRecord>, StoreError> {
        Ok(self.saved())
    }
}

/// Wiring for one workflow under test plus handles to inspect each fake.
pub(super) struct Harness {
    pub(super) log: CallLog,
    pub(super) intake: Arc<ScriptedIntake>,
    pub(super) authority: Arc<ScriptedAuthority>,
    pub(super) store: Arc<RecordingStore>,
}

impl Harness {
    pub(super) fn workflow(
        &self,
    ) -> EnrollmentWorkflow<ScriptedIntake, ScriptedAuthority, RecordingStore> {
        EnrollmentWorkflow::new(
            Arc::clone(&self.intake),
            Arc::clone(&self.authority),
            Arc::clone(&self.store),
        )
    }

    pub(super) fn calls(&self) -> Vec<Call> {
        self.log.lock().expect("call log poisoned").clone()
    }
}

pub(super) struct HarnessBuilder {
    applicant: (String, String, String),
    approve: bool,
    reason: String,
    fail_on: Option<Call>,
}

impl HarnessBuilder {
    pub(super) fn approving(name: &str, email: &str, certificate: &str) -> Self {
        Self {
            applicant: (name.to_string(), email.to_string(), certificate.to_string()),
            approve: true,
            reason: String::new(),
            fail_on: None,
        }
    }

    pub(super) fn rejecting(name: &str, email: &str, certificate: &str, reason: &str) -> Self {
        Self {
            approve: false,
            reason: reason.to_string(),
            ..Self::approving(name, email, certificate)
        }
    }

    pub(super) fn failing_on(mut self, call: Call) -> Self {
        self.fail_on = Some(call);
        self
    }

    pub(super) fn build(self) -> Harness {
        let log: CallLog = Arc::default();
        let (name, email, certificate) = self.applicant;

        Harness {
            intake: Arc::new(ScriptedIntake {
                log: Arc::clone(&log),
                name,
                email,
                certificate,
                fail_on: self.fail_on,
                successes: Mutex::default(),
                rejections: Mutex::default(),
            }),
            authority: Arc::new(ScriptedAuthority {
                log: Arc::clone(&log),
                approve: self.approve,
                reason: self.reason,
                fail_on: self.fail_on,
                reviewed: Mutex::default(),
            }),
            store: Arc::new(RecordingStore {
                log: Arc::clone(&log),
                fail: self.fail_on == Some(Call::Save),
                saved: Mutex::default(),
            }),
            log,
        }
    }
}

pub(super) fn scenario_a() -> Harness {
    HarnessBuilder::approving("Ana Ruiz", "ana@x.com", "cert.pdf").build()
}

pub(super) fn scenario_b() -> Harness {
    HarnessBuilder::rejecting(
        "Leo Diaz",
        "leo@x.com",
        "cert.pdf",
        "Missing immunization record",
    )
    .build()
}

pub(super) fn applicant(name: &str, email: &str, certificate: &str) -> SubmittedApplicant {
    SubmittedApplicant {
        full_name: name.to_string(),
        contact_email: email.to_string(),
        health_certificate: certificate.to_string(),
    }
}
