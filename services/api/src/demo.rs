use bto_housing::config::TelemetryConfig;
use bto_housing::error::AppError;
use bto_housing::telemetry;
use bto_housing::workflows::housing::{
    ApplicationOutcome, DateWindow, FlatSelection, FlatType, HousingError, HousingService,
    MaritalStatus, Nric, Project, ProjectDraft, Session, User, UserRole,
};
use chrono::{Duration, Local, NaiveDate};
use clap::Args;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the demo treats as today (YYYY-MM-DD). Defaults to the local date.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the service's own tracing events alongside the narration.
    #[arg(long)]
    pub(crate) trace: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    if args.trace {
        telemetry::init(&TelemetryConfig {
            log_level: "info".to_string(),
        })?;
    }
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("BTO housing demo ({today})");
    last_units_scenario(today)?;
    officer_overlap_scenario(today)?;
    eligibility_boundary_scenario(today)?;
    Ok(())
}

fn last_units_scenario(today: NaiveDate) -> Result<(), AppError> {
    println!("\nThree singles competing for two 2-room flats");
    let service = HousingService::default();
    let manager = enrol(&service, "T8765432F", "Jessica", 45, MaritalStatus::Married, UserRole::Manager)?;
    let stranger = enrol(&service, "S5678901G", "Michael", 50, MaritalStatus::Married, UserRole::Manager)?;
    let officer = enrol(&service, "T2109876H", "Daniel", 30, MaritalStatus::Married, UserRole::Officer)?;

    let project = service.create_project(
        &manager,
        demo_draft("Acacia Breeze", around(today, 7, 30)?, vec![(FlatType::TwoRoom, 2)], 2),
    )?;
    let registration = service.register_officer(&officer, &project.id)?;
    service.process_registration(&manager, &registration.id, true)?;
    println!(
        "  {} opened with {} two-room units, officer {} approved",
        project.id,
        available(&service, &project)?,
        officer.nric()
    );

    let mut applications = Vec::new();
    for (nric, name, age) in [
        ("S1111111A", "Alice", 40),
        ("S2222222B", "Ben", 36),
        ("S3333333C", "Chloe", 50),
    ] {
        let applicant = enrol(&service, nric, name, age, MaritalStatus::Single, UserRole::Applicant)?;
        let application = service.submit(&applicant, &project.id)?;
        service.decide(&manager, &application.id, ApplicationOutcome::Successful)?;
        println!("  {name} ({nric}) filed {} and was marked successful", application.id);
        applications.push((applicant, application));
    }

    for (applicant, application) in &applications {
        match service.book(&officer, &application.id, FlatSelection::any(FlatType::TwoRoom)) {
            Ok(booking) => println!(
                "  {} booked flat {} ({} left)",
                applicant.nric(),
                booking.flat.id,
                available(&service, &project)?
            ),
            Err(err) => println!("  {} could not book: {err}", applicant.nric()),
        }
    }

    let (first_applicant, first_application) = &applications[0];
    let request = service.request_withdrawal(first_applicant, &first_application.id, "relocating")?;
    println!("  {} requested withdrawal {}", first_applicant.nric(), request.id);

    match service.process_withdrawal(&stranger, &request.id, true) {
        Err(err @ HousingError::NotAuthorized { .. }) => {
            println!("  Another project's manager was refused: {err}")
        }
        Err(err) => return Err(err.into()),
        Ok(_) => println!("  Unexpected: another project's manager processed the withdrawal"),
    }

    service.process_withdrawal(&manager, &request.id, true)?;
    println!(
        "  Withdrawal approved by the project manager, {} two-room unit(s) back on offer",
        available(&service, &project)?
    );

    let (last_applicant, last_application) = &applications[2];
    let booking = service.book(&officer, &last_application.id, FlatSelection::any(FlatType::TwoRoom))?;
    println!(
        "  {} booked the released flat {}",
        last_applicant.nric(),
        booking.flat.id
    );
    Ok(())
}

fn officer_overlap_scenario(today: NaiveDate) -> Result<(), AppError> {
    println!("\nOfficer registering for overlapping projects");
    let service = HousingService::default();
    let first_manager = enrol(&service, "T8765432F", "Jessica", 45, MaritalStatus::Married, UserRole::Manager)?;
    let second_manager = enrol(&service, "S5678901G", "Michael", 50, MaritalStatus::Married, UserRole::Manager)?;
    let officer = enrol(&service, "T2109876H", "Daniel", 30, MaritalStatus::Married, UserRole::Officer)?;

    let first = service.create_project(
        &first_manager,
        demo_draft("Jurong Vista", around(today, 0, 30)?, vec![(FlatType::ThreeRoom, 5)], 1),
    )?;
    let second = service.create_project(
        &second_manager,
        demo_draft("Tengah Grove", around(today, -14, 45)?, vec![(FlatType::ThreeRoom, 5)], 1),
    )?;

    let registration = service.register_officer(&officer, &first.id)?;
    println!("  {} filed {} for {}", officer.nric(), registration.id, first.id);
    match service.register_officer(&officer, &second.id) {
        Err(err) => println!("  Registration for {} refused: {err}", second.id),
        Ok(registration) => println!("  Unexpected: {} accepted", registration.id),
    }
    Ok(())
}

fn eligibility_boundary_scenario(today: NaiveDate) -> Result<(), AppError> {
    println!("\nAge thresholds");
    let service = HousingService::default();
    let manager = enrol(&service, "T8765432F", "Jessica", 45, MaritalStatus::Married, UserRole::Manager)?;
    let project = service.create_project(
        &manager,
        demo_draft(
            "Punggol Bay",
            around(today, 7, 30)?,
            vec![(FlatType::TwoRoom, 10), (FlatType::ThreeRoom, 10)],
            1,
        ),
    )?;

    for (nric, name, age, marital) in [
        ("S9876543C", "Grace", 34, MaritalStatus::Single),
        ("S1234567A", "John", 35, MaritalStatus::Single),
        ("T2345678D", "Rachel", 20, MaritalStatus::Married),
        ("T7654321B", "Sarah", 21, MaritalStatus::Married),
    ] {
        let applicant = enrol(&service, nric, name, age, marital, UserRole::Applicant)?;
        match service.submit(&applicant, &project.id) {
            Ok(application) => println!("  {name} ({age}, {marital}) accepted as {}", application.id),
            Err(err) => println!("  {name} ({age}, {marital}) refused: {err}"),
        }
    }
    Ok(())
}

fn enrol(
    service: &HousingService,
    nric: &str,
    name: &str,
    age: u8,
    marital_status: MaritalStatus,
    role: UserRole,
) -> Result<Session, HousingError> {
    let user = service.register_user(User {
        nric: Nric::from(nric),
        name: name.to_string(),
        age,
        marital_status,
        role,
    })?;
    service.open_session(&user.nric)
}

fn demo_draft(
    name: &str,
    window: DateWindow,
    units: Vec<(FlatType, u32)>,
    officer_slots: u32,
) -> ProjectDraft {
    ProjectDraft {
        name: name.to_string(),
        neighbourhood: "Demo".to_string(),
        window,
        units,
        officer_slots,
        visible: true,
    }
}

fn around(today: NaiveDate, opened_days_ago: i64, closes_in_days: i64) -> Result<DateWindow, HousingError> {
    DateWindow::new(
        today - Duration::days(opened_days_ago),
        today + Duration::days(closes_in_days),
    )
}

fn available(service: &HousingService, project: &Project) -> Result<u32, HousingError> {
    Ok(service.units(&project.id)?.available(FlatType::TwoRoom))
}
