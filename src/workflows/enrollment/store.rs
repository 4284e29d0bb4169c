use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;

use super::domain::{ApplicantRecord, EnrollmentStatus};

/// Persistence sink for accepted applicants.
///
/// `save` takes the record by value: once persisted, the store owns its copy.
pub trait RecordStore: Send + Sync {
    fn save(&self, record: ApplicantRecord) -> Result<(), StoreError>;
    fn roster(&self) -> Result<Vec<ApplicantRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("only enrolled records can be persisted (found {0})")]
    NotEnrolled(EnrollmentStatus),
    #[error("an enrollment for {0} already exists")]
    Duplicate(String),
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("roster export failed: {0}")]
    Export(#[from] csv::Error),
}

/// Process-local roster, suitable for the demo service and batch runs.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<Vec<ApplicantRecord>>,
}

impl InMemoryRecordStore {
    pub fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordStore for InMemoryRecordStore {
    fn save(&self, record: ApplicantRecord) -> Result<(), StoreError> {
        if record.status() != EnrollmentStatus::Enrolled {
            return Err(StoreError::NotEnrolled(record.status()));
        }

        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        if guard
            .iter()
            .any(|existing| existing.contact_email().eq_ignore_ascii_case(record.contact_email()))
        {
            return Err(StoreError::Duplicate(record.contact_email().to_string()));
        }
        guard.push(record);
        Ok(())
    }

    fn roster(&self) -> Result<Vec<ApplicantRecord>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

#[derive(Serialize)]
struct RosterRow<'a> {
    full_name: &'a str,
    contact_email: &'a str,
    health_certificate: String,
    status: &'static str,
    created_at: String,
}

/// Write the roster as CSV with a header row.
pub fn write_roster<W: Write>(records: &[ApplicantRecord], writer: W) -> Result<(), StoreError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(RosterRow {
            full_name: record.full_name(),
            contact_email: record.contact_email(),
            health_certificate: record.health_certificate().to_string(),
            status: record.status().label(),
            created_at: record.created_at().to_rfc3339(),
        })?;
    }
    csv_writer
        .flush()
        .map_err(|err| StoreError::Export(err.into()))?;
    Ok(())
}
