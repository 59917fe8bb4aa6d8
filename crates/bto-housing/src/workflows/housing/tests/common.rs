use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::housing::{
    housing_router, Application, ApplicationOutcome, DateWindow, FlatType, HousingService,
    MaritalStatus, Nric, Project, ProjectDraft, Session, User, UserRole,
};

pub(super) const MANAGER: &str = "T8765432F";
pub(super) const OTHER_MANAGER: &str = "S5678901G";
pub(super) const OFFICER: &str = "T2109876H";
pub(super) const OTHER_OFFICER: &str = "S6543210I";
pub(super) const SINGLE_APPLICANT: &str = "S1234567A";
pub(super) const MARRIED_APPLICANT: &str = "T7654321B";
pub(super) const YOUNG_SINGLE: &str = "S9876543C";
pub(super) const YOUNG_MARRIED: &str = "T2345678D";

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn window(opens: NaiveDate, closes: NaiveDate) -> DateWindow {
    DateWindow::new(opens, closes).expect("valid window")
}

pub(super) fn user(
    nric: &str,
    name: &str,
    age: u8,
    marital_status: MaritalStatus,
    role: UserRole,
) -> User {
    User {
        nric: Nric::from(nric),
        name: name.to_string(),
        age,
        marital_status,
        role,
    }
}

pub(super) fn draft(name: &str, window: DateWindow, units: &[(FlatType, u32)]) -> ProjectDraft {
    ProjectDraft {
        name: name.to_string(),
        neighbourhood: "Yishun".to_string(),
        window,
        units: units.to_vec(),
        officer_slots: 3,
        visible: true,
    }
}

/// Service with one account per role the tests exercise.
pub(super) fn service_with_users() -> HousingService {
    let service = HousingService::default();
    for account in [
        user(MANAGER, "Jessica", 26, MaritalStatus::Married, UserRole::Manager),
        user(OTHER_MANAGER, "Michael", 36, MaritalStatus::Married, UserRole::Manager),
        user(OFFICER, "Daniel", 36, MaritalStatus::Single, UserRole::Officer),
        user(OTHER_OFFICER, "Emily", 28, MaritalStatus::Single, UserRole::Officer),
        user(SINGLE_APPLICANT, "John", 35, MaritalStatus::Single, UserRole::Applicant),
        user(MARRIED_APPLICANT, "Sarah", 40, MaritalStatus::Married, UserRole::Applicant),
        user(YOUNG_SINGLE, "Grace", 34, MaritalStatus::Single, UserRole::Applicant),
        user(YOUNG_MARRIED, "Rachel", 20, MaritalStatus::Married, UserRole::Applicant),
    ] {
        service.register_user(account).expect("fixture user registers");
    }
    service
}

pub(super) fn session(service: &HousingService, nric: &str) -> Session {
    service
        .open_session(&Nric::from(nric))
        .expect("fixture session opens")
}

pub(super) struct Fixture {
    pub(super) service: HousingService,
    pub(super) manager: Session,
    pub(super) officer: Session,
    pub(super) project: Project,
}

/// Project managed by [`MANAGER`] with [`OFFICER`] already approved to handle it.
pub(super) fn fixture(units: &[(FlatType, u32)]) -> Fixture {
    let service = service_with_users();
    let manager = session(&service, MANAGER);
    let officer = session(&service, OFFICER);
    let project = service
        .create_project(
            &manager,
            draft("Acacia Breeze", window(date(2025, 2, 15), date(2025, 3, 20)), units),
        )
        .expect("project created");

    let registration = service
        .register_officer(&officer, &project.id)
        .expect("officer registers");
    service
        .process_registration(&manager, &registration.id, true)
        .expect("registration approved");
    let project = service.project(&project.id).expect("project exists");

    Fixture {
        service,
        manager,
        officer,
        project,
    }
}

impl Fixture {
    pub(super) fn applicant(&self, nric: &str) -> Session {
        session(&self.service, nric)
    }

    /// Submit for `nric` and have the manager mark the application successful.
    pub(super) fn successful_application(&self, nric: &str) -> Application {
        let application = self
            .service
            .submit(&self.applicant(nric), &self.project.id)
            .expect("submission accepted");
        self.service
            .decide(&self.manager, &application.id, ApplicationOutcome::Successful)
            .expect("decision recorded")
    }

    pub(super) fn available(&self, flat_type: FlatType) -> u32 {
        self.service
            .units(&self.project.id)
            .expect("project exists")
            .available(flat_type)
    }
}

pub(super) fn router_for(service: HousingService) -> (Router, Arc<HousingService>) {
    let service = Arc::new(service);
    (housing_router(service.clone()), service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
