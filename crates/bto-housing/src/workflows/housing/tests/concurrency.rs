use std::sync::Barrier;
use std::thread;

use super::common::*;
use crate::workflows::housing::{
    ApplicationStatus, FlatSelection, FlatType, HousingError, MaritalStatus, User, UserRole,
};

#[test]
fn the_last_unit_goes_to_exactly_one_booking() {
    let fixture = fixture(&[(FlatType::TwoRoom, 1)]);
    let first = fixture.successful_application(SINGLE_APPLICANT);
    let second = fixture.successful_application(MARRIED_APPLICANT);
    let barrier = Barrier::new(2);

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = [&first, &second]
            .into_iter()
            .map(|application| {
                let fixture = &fixture;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    fixture.service.book(
                        &fixture.officer,
                        &application.id,
                        FlatSelection::any(FlatType::TwoRoom),
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("booking thread"))
            .collect()
    });

    let booked = results.iter().filter(|result| result.is_ok()).count();
    let sold_out = results
        .iter()
        .filter(|result| matches!(result, Err(HousingError::NoUnitsAvailable { .. })))
        .count();
    assert_eq!((booked, sold_out), (1, 1));
    assert_eq!(fixture.available(FlatType::TwoRoom), 0);

    let statuses: Vec<_> = [&first, &second]
        .into_iter()
        .map(|application| {
            fixture
                .service
                .application(&application.id)
                .expect("stored")
                .status
        })
        .collect();
    assert!(statuses.contains(&ApplicationStatus::Booked));
    assert!(statuses.contains(&ApplicationStatus::Successful));
}

#[test]
fn racing_submissions_leave_one_active_application() {
    let fixture = fixture(&[(FlatType::TwoRoom, 4)]);
    let applicant = fixture.applicant(SINGLE_APPLICANT);
    let barrier = Barrier::new(8);

    let accepted = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    fixture.service.submit(&applicant, &fixture.project.id)
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|handle| handle.join().expect("submit thread").ok())
            .count()
    });

    assert_eq!(accepted, 1);
    assert_eq!(
        fixture.service.application_history(&applicant).expect("history").len(),
        1
    );
}

#[test]
fn parallel_bookings_never_oversell() {
    let fixture = fixture(&[(FlatType::TwoRoom, 3)]);
    let applicants: Vec<String> = (0..6).map(|index| format!("S{:07}Z", 1_000_000 + index)).collect();
    for nric in &applicants {
        fixture
            .service
            .register_user(User {
                nric: nric.as_str().into(),
                name: format!("Applicant {nric}"),
                age: 40,
                marital_status: MaritalStatus::Single,
                role: UserRole::Applicant,
            })
            .expect("user registers");
    }
    let applications: Vec<_> = applicants
        .iter()
        .map(|nric| fixture.successful_application(nric))
        .collect();

    let booked = thread::scope(|scope| {
        let handles: Vec<_> = applications
            .iter()
            .map(|application| {
                let fixture = &fixture;
                scope.spawn(move || {
                    fixture.service.book(
                        &fixture.officer,
                        &application.id,
                        FlatSelection::any(FlatType::TwoRoom),
                    )
                })
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|handle| handle.join().expect("booking thread").ok())
            .collect::<Vec<_>>()
    });

    assert_eq!(booked.len(), 3);
    assert_eq!(fixture.available(FlatType::TwoRoom), 0);
    let mut flats: Vec<_> = booked.iter().map(|booking| booking.flat.id.clone()).collect();
    flats.sort();
    flats.dedup();
    assert_eq!(flats.len(), 3);
}
