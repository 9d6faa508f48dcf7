// File: services/studyplan_backend/src/bin/reset_exam_week.rs
//! Clears the exam calendar and recreates the given all-day exams.
//!
//! ```text
//! reset_exam_week --exam "Databases=2025-06-12" --exam "Networks=2025-06-13"
//! ```
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use studyplan_backend::exam_week::{reset_exam_week, ExamEntry, DEFAULT_CALENDAR_NAME};
use studyplan_common::logging;
use studyplan_config::load_config;
use studyplan_gcal::{Capacity, GcalState};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "reset_exam_week", about = "Recreate the exam calendar from scratch")]
struct Args {
    /// Exact name of the calendar to reset
    #[arg(long, default_value = DEFAULT_CALENDAR_NAME)]
    calendar: String,

    /// Exam as `Summary=YYYY-MM-DD`, repeatable
    #[arg(long = "exam", value_parser = parse_exam)]
    exams: Vec<ExamEntry>,

    /// How many existing events to delete at most
    #[arg(long, default_value_t = 250)]
    capacity: u32,
}

fn parse_exam(value: &str) -> Result<ExamEntry, String> {
    value.parse().map_err(|e: studyplan_common::StudyplanError| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init_from_name(&config.logging.level);

    let state = match GcalState::from_config(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to set up the calendar provider: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match reset_exam_week(&state.store, &args.calendar, &args.exams, Capacity::new(args.capacity)).await {
        Ok(report) => {
            info!(
                "Calendar {}: {} deleted, {} left in place, {} created",
                report.calendar_id,
                report.deleted,
                report.not_deleted,
                report.created.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Reset of '{}' failed: {}", args.calendar, e);
            ExitCode::FAILURE
        }
    }
}
