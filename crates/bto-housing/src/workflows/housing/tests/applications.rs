use super::common::*;
use crate::workflows::housing::{
    ApplicationId, ApplicationOutcome, ApplicationStatus, EligibilityPolicy, FlatSelection,
    FlatType, HousingError, HousingService, Nric,
};

#[test]
fn submit_records_a_pending_application() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let applicant = fixture.applicant(SINGLE_APPLICANT);

    let application = fixture
        .service
        .submit(&applicant, &fixture.project.id)
        .expect("eligible single applicant");

    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.applicant, Nric::from(SINGLE_APPLICANT));
    assert!(application.flat.is_none());
    assert_eq!(
        fixture.service.application_history(&applicant).expect("history"),
        vec![application.clone()]
    );
    assert_eq!(
        fixture
            .service
            .active_application_for(&Nric::from(SINGLE_APPLICANT))
            .expect("known user"),
        Some(application)
    );
}

#[test]
fn second_active_application_is_rejected() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let applicant = fixture.applicant(SINGLE_APPLICANT);
    let first = fixture
        .service
        .submit(&applicant, &fixture.project.id)
        .expect("first submission");

    match fixture.service.submit(&applicant, &fixture.project.id) {
        Err(HousingError::DuplicateActiveApplication { existing, .. }) => {
            assert_eq!(existing, first.id)
        }
        other => panic!("expected duplicate active application, got {other:?}"),
    }
    assert_eq!(
        fixture.service.application_history(&applicant).expect("history").len(),
        1
    );
}

#[test]
fn unsuccessful_applicants_may_apply_again() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let applicant = fixture.applicant(SINGLE_APPLICANT);
    let first = fixture
        .service
        .submit(&applicant, &fixture.project.id)
        .expect("first submission");
    fixture
        .service
        .decide(&fixture.manager, &first.id, ApplicationOutcome::Unsuccessful)
        .expect("decision recorded");

    let second = fixture
        .service
        .submit(&applicant, &fixture.project.id)
        .expect("inactive history does not block");
    assert_ne!(first.id, second.id);
}

#[test]
fn managers_cannot_apply() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    assert!(matches!(
        fixture.service.submit(&fixture.manager, &fixture.project.id),
        Err(HousingError::NotAuthorized { .. })
    ));
}

#[test]
fn officers_cannot_apply_for_projects_they_handle() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    assert!(matches!(
        fixture.service.submit(&fixture.officer, &fixture.project.id),
        Err(HousingError::ConflictOfInterest { .. })
    ));
}

#[test]
fn deciding_twice_reports_already_decided() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let application = fixture.successful_application(SINGLE_APPLICANT);

    match fixture
        .service
        .decide(&fixture.manager, &application.id, ApplicationOutcome::Unsuccessful)
    {
        Err(HousingError::AlreadyDecided { status, .. }) => {
            assert_eq!(status, ApplicationStatus::Successful)
        }
        other => panic!("expected already decided, got {other:?}"),
    }
    let stored = fixture.service.application(&application.id).expect("stored");
    assert_eq!(stored.status, ApplicationStatus::Successful);
}

#[test]
fn only_the_manager_in_charge_decides() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let application = fixture
        .service
        .submit(&fixture.applicant(SINGLE_APPLICANT), &fixture.project.id)
        .expect("submission");
    let stranger = session(&fixture.service, OTHER_MANAGER);

    assert!(matches!(
        fixture
            .service
            .decide(&stranger, &application.id, ApplicationOutcome::Successful),
        Err(HousingError::NotAuthorized { .. })
    ));
    assert_eq!(
        fixture.service.application(&application.id).expect("stored").status,
        ApplicationStatus::Pending
    );
}

#[test]
fn decision_leaves_inventory_untouched() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    fixture.successful_application(SINGLE_APPLICANT);
    assert_eq!(fixture.available(FlatType::TwoRoom), 2);
}

#[test]
fn booking_consumes_one_unit_and_links_the_flat() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2), (FlatType::ThreeRoom, 1)]);
    let application = fixture.successful_application(SINGLE_APPLICANT);

    let booking = fixture
        .service
        .book(
            &fixture.officer,
            &application.id,
            FlatSelection::any(FlatType::TwoRoom),
        )
        .expect("booking succeeds");

    assert_eq!(booking.application.status, ApplicationStatus::Booked);
    assert_eq!(booking.application.flat.as_ref(), Some(&booking.flat.id));
    assert_eq!(booking.flat.application.as_ref(), Some(&application.id));
    assert!(booking.flat.is_booked());
    assert_eq!(booking.flat.flat_type, FlatType::TwoRoom);
    assert_eq!(fixture.available(FlatType::TwoRoom), 1);
    assert_eq!(fixture.available(FlatType::ThreeRoom), 1);
    assert_eq!(
        fixture
            .service
            .booked_flat(&Nric::from(SINGLE_APPLICANT))
            .expect("known user"),
        Some(booking.flat)
    );
}

#[test]
fn pending_applications_cannot_be_booked() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let application = fixture
        .service
        .submit(&fixture.applicant(SINGLE_APPLICANT), &fixture.project.id)
        .expect("submission");

    assert_eq!(
        fixture
            .service
            .book(
                &fixture.officer,
                &application.id,
                FlatSelection::any(FlatType::TwoRoom)
            )
            .map(|booking| booking.application.status),
        Err(HousingError::InvalidTransition {
            from: ApplicationStatus::Pending,
            to: ApplicationStatus::Booked,
        })
    );
    assert_eq!(fixture.available(FlatType::TwoRoom), 2);
}

#[test]
fn unassigned_officers_cannot_book() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let application = fixture.successful_application(SINGLE_APPLICANT);
    let stranger = session(&fixture.service, OTHER_OFFICER);

    assert!(matches!(
        fixture
            .service
            .book(&stranger, &application.id, FlatSelection::any(FlatType::TwoRoom)),
        Err(HousingError::NotAuthorized { .. })
    ));
    assert_eq!(fixture.available(FlatType::TwoRoom), 2);
}

#[test]
fn singles_may_only_book_two_room_flats() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2), (FlatType::ThreeRoom, 2)]);
    let application = fixture.successful_application(SINGLE_APPLICANT);

    assert!(matches!(
        fixture
            .service
            .book(&fixture.officer, &application.id, FlatSelection::any(FlatType::ThreeRoom)),
        Err(HousingError::IneligibleApplicant { .. })
    ));
    assert_eq!(fixture.available(FlatType::ThreeRoom), 2);
}

#[test]
fn a_booked_flat_cannot_be_booked_again() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let first = fixture.successful_application(SINGLE_APPLICANT);
    let second = fixture.successful_application(MARRIED_APPLICANT);

    fixture
        .service
        .book(&fixture.officer, &first.id, FlatSelection::unit("f1", FlatType::TwoRoom))
        .expect("first booking");

    assert!(matches!(
        fixture
            .service
            .book(&fixture.officer, &second.id, FlatSelection::unit("f1", FlatType::TwoRoom)),
        Err(HousingError::FlatUnavailable { .. })
    ));
    assert_eq!(fixture.available(FlatType::TwoRoom), 1);
    assert_eq!(
        fixture.service.application(&second.id).expect("stored").status,
        ApplicationStatus::Successful
    );
}

#[test]
fn available_projects_follow_visibility_window_and_eligibility() {
    let fixture = fixture(&[(FlatType::ThreeRoom, 2)]);
    let during = date(2025, 3, 1);
    let single = fixture.applicant(SINGLE_APPLICANT);
    let married = fixture.applicant(MARRIED_APPLICANT);

    assert!(fixture.service.available_projects(&single, during).is_empty());
    assert_eq!(
        fixture.service.available_projects(&married, during).len(),
        1
    );
    assert!(fixture
        .service
        .available_projects(&married, date(2025, 4, 1))
        .is_empty());

    fixture
        .service
        .set_visibility(&fixture.manager, &fixture.project.id, false)
        .expect("manager toggles visibility");
    assert!(fixture.service.available_projects(&married, during).is_empty());
    assert_eq!(
        fixture.service.available_projects(&fixture.manager, during).len(),
        1
    );
}

#[test]
fn handling_officers_do_not_see_their_own_projects() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let during = date(2025, 3, 1);

    assert!(fixture
        .service
        .available_projects(&fixture.officer, during)
        .is_empty());
    assert_eq!(
        fixture
            .service
            .available_projects(&fixture.applicant(SINGLE_APPLICANT), during)
            .len(),
        1
    );
}

#[test]
fn managers_cannot_run_overlapping_projects() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let overlapping = draft(
        "Tengah Grove",
        window(date(2025, 3, 1), date(2025, 4, 1)),
        &[(FlatType::TwoRoom, 1)],
    );

    match fixture.service.create_project(&fixture.manager, overlapping) {
        Err(HousingError::SchedulingConflict { conflicting, .. }) => {
            assert_eq!(conflicting, fixture.project.id)
        }
        other => panic!("expected scheduling conflict, got {other:?}"),
    }

    let other_manager = session(&fixture.service, OTHER_MANAGER);
    let parallel = draft(
        "Tengah Grove",
        window(date(2025, 3, 1), date(2025, 4, 1)),
        &[(FlatType::TwoRoom, 1)],
    );
    fixture
        .service
        .create_project(&other_manager, parallel)
        .expect("different manager may overlap");
}

#[test]
fn unit_totals_can_shrink_below_availability() {
    let fixture = fixture(&[(FlatType::TwoRoom, 3)]);
    let count = fixture
        .service
        .set_unit_total(&fixture.manager, &fixture.project.id, FlatType::TwoRoom, 1)
        .expect("manager edits totals");

    assert_eq!(count.total, 1);
    assert_eq!(count.available, 1);
    assert!(matches!(
        fixture.service.set_unit_total(
            &fixture.officer,
            &fixture.project.id,
            FlatType::TwoRoom,
            5
        ),
        Err(HousingError::NotAuthorized { .. })
    ));
}

#[test]
fn applicants_holding_a_flat_cannot_apply_again() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let applicant = fixture.applicant(SINGLE_APPLICANT);
    let application = fixture.successful_application(SINGLE_APPLICANT);
    let booking = fixture
        .service
        .book(&fixture.officer, &application.id, FlatSelection::any(FlatType::TwoRoom))
        .expect("booked");

    match fixture.service.submit(&applicant, &fixture.project.id) {
        Err(HousingError::AlreadyBooked { applicant, flat }) => {
            assert_eq!(applicant, Nric::from(SINGLE_APPLICANT));
            assert_eq!(flat, booking.flat.id);
        }
        other => panic!("expected already booked, got {other:?}"),
    }
    assert_eq!(
        fixture.service.application_history(&applicant).expect("history").len(),
        1
    );
    assert_eq!(fixture.available(FlatType::TwoRoom), 1);
}

#[test]
fn booking_refuses_applicants_who_already_hold_a_flat() {
    let fixture = fixture(&[(FlatType::TwoRoom, 2)]);
    let application = fixture.successful_application(SINGLE_APPLICANT);
    fixture
        .service
        .book(&fixture.officer, &application.id, FlatSelection::any(FlatType::TwoRoom))
        .expect("booked");

    let mut snapshot = fixture.service.snapshot();
    let mut second = snapshot.applications[0].clone();
    second.id = ApplicationId::from("APP-900000");
    second.status = ApplicationStatus::Successful;
    second.flat = None;
    second.created_at += chrono::Duration::seconds(1);
    snapshot.applications.push(second.clone());
    let restored = HousingService::restore(snapshot, EligibilityPolicy::default())
        .expect("one booked and one successful application");

    let officer = session(&restored, OFFICER);
    assert!(matches!(
        restored.book(&officer, &second.id, FlatSelection::any(FlatType::TwoRoom)),
        Err(HousingError::AlreadyBooked { .. })
    ));
    assert_eq!(
        restored.application(&second.id).expect("stored").status,
        ApplicationStatus::Successful
    );
    assert_eq!(
        restored
            .units(&fixture.project.id)
            .expect("project")
            .available(FlatType::TwoRoom),
        1
    );
}
