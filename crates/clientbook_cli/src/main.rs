//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `clientbook_core` linkage.
//! - Load settings and the persisted snapshot, then print a short summary.
//!
//! Usage: `clientbook_cli [settings.json]`

use clientbook_core::{
    init_logging_from_settings, load_settings, open_db, AppointmentQuery, ClientService,
    Command, CoreSettings, DateTimeRangeQuery, FindRequest, JsonSnapshotRepository,
    SnapshotRepository, SqliteSnapshotRepository, StorageKind,
};
use log::info;
use std::process::ExitCode;

const DEFAULT_SETTINGS_FILE: &str = "clientbook.settings.json";

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("clientbook: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let settings = load_settings(&settings_path).map_err(|err| err.to_string())?;
    init_logging_from_settings(&settings)?;

    println!("clientbook_core version={}", clientbook_core::core_version());
    println!(
        "storage={} data_path={}",
        settings.storage.as_str(),
        settings.data_path().display()
    );

    match settings.storage {
        StorageKind::Sqlite => {
            let mut conn = open_db(settings.data_path()).map_err(|err| err.to_string())?;
            let repo = SqliteSnapshotRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
            summarize(repo, &settings)
        }
        StorageKind::Json => summarize(JsonSnapshotRepository::new(settings.data_path()), &settings),
    }
}

fn summarize<R: SnapshotRepository>(repo: R, settings: &CoreSettings) -> Result<(), String> {
    let mut service =
        ClientService::load(repo, settings.delete_match_policy).map_err(|err| err.to_string())?;
    println!("persons={}", service.book().persons().len());
    println!("appointments={}", service.book().appointments().len());

    let today = FindRequest::appointments(
        AppointmentQuery::new().with_date_time(DateTimeRangeQuery::today()),
    );
    let result = service
        .execute(Command::Find(today))
        .map_err(|err| err.to_string())?;
    println!("today: {}", result.feedback);
    for appointment in service.filtered_appointments() {
        println!("  {appointment}");
    }
    info!("event=cli_summary module=cli status=ok");
    Ok(())
}

