use clap::Args;
use enrollment::config::{AppConfig, EnrollmentConfig};
use enrollment::error::AppError;
use enrollment::telemetry;
use enrollment::workflows::enrollment::{
    read_submissions, write_roster, CertificatePolicyAuthority, EnrollmentError,
    EnrollmentNotice, EnrollmentOutcome, EnrollmentWorkflow, InMemoryRecordStore, RecordStore,
    SubmittedApplicant, SubmittedIntake,
};
use serde::Serialize;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub(crate) struct EnrollArgs {
    /// Applicant full name
    #[arg(long)]
    pub(crate) name: String,
    /// Applicant contact email
    #[arg(long)]
    pub(crate) email: String,
    /// Path to the applicant's health certificate
    #[arg(long)]
    pub(crate) certificate: String,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV with full_name, contact_email, health_certificate columns
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Write the resulting roster to this CSV file
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub(crate) struct BatchSummary {
    pub(crate) enrolled: usize,
    pub(crate) rejected: usize,
    pub(crate) failed: usize,
}

/// Run one workflow invocation for a pre-collected applicant.
pub(crate) fn enroll_one<S>(
    store: &Arc<S>,
    config: &EnrollmentConfig,
    applicant: SubmittedApplicant,
) -> Result<Option<EnrollmentNotice>, EnrollmentError>
where
    S: RecordStore,
{
    let intake = Arc::new(SubmittedIntake::new(applicant));
    let authority = Arc::new(CertificatePolicyAuthority::from_config(config));
    EnrollmentWorkflow::new(Arc::clone(&intake), authority, Arc::clone(store))
        .process_enrollment()?;
    Ok(intake.last_notice())
}

pub(crate) fn process_batch<S>(
    store: &Arc<S>,
    config: &EnrollmentConfig,
    applicants: Vec<SubmittedApplicant>,
) -> BatchSummary
where
    S: RecordStore,
{
    let mut summary = BatchSummary::default();
    for (row, applicant) in applicants.into_iter().enumerate() {
        let intake = Arc::new(SubmittedIntake::new(applicant));
        let authority = Arc::new(CertificatePolicyAuthority::from_config(config));
        let workflow = EnrollmentWorkflow::new(intake, authority, Arc::clone(store));

        match workflow.process_enrollment() {
            Ok(EnrollmentOutcome::Enrolled) => summary.enrolled += 1,
            Ok(EnrollmentOutcome::Rejected { .. }) => summary.rejected += 1,
            Err(err) => {
                warn!(row = row + 1, error = %err, "applicant could not be processed");
                summary.failed += 1;
            }
        }
    }
    summary
}

fn init_from_env() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_enroll(args: EnrollArgs) -> Result<(), AppError> {
    let config = init_from_env()?;
    let store = Arc::new(InMemoryRecordStore::default());

    let applicant = SubmittedApplicant {
        full_name: args.name,
        contact_email: args.email,
        health_certificate: args.certificate,
    };

    if let Some(notice) = enroll_one(&store, &config.enrollment, applicant)? {
        println!("{}", serde_json::to_string_pretty(&notice)?);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = init_from_env()?;
    let store = Arc::new(InMemoryRecordStore::default());

    let applicants = read_submissions(File::open(&args.file)?)?;
    info!(file = %args.file.display(), applicants = applicants.len(), "processing enrollment batch");

    let summary = process_batch(&store, &config.enrollment, applicants);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if let Some(path) = args.roster {
        write_roster(&store.roster()?, File::create(&path)?)?;
        info!(roster = %path.display(), enrolled = store.len(), "roster written");
    }
    Ok(())
}
