use super::common::*;
use crate::workflows::housing::{
    EligibilityDecision, EligibilityEngine, EligibilityPolicy, FlatType, HousingError,
    IneligibilityReason, MaritalStatus, UnitInventory,
};

fn two_room_only() -> UnitInventory {
    UnitInventory::with_totals([(FlatType::TwoRoom, 2)])
}

#[test]
fn single_age_boundary_is_thirty_five() {
    let engine = EligibilityEngine::default();
    let units = two_room_only();

    assert_eq!(
        engine.evaluate(34, MaritalStatus::Single, &units),
        EligibilityDecision::Ineligible(IneligibilityReason::BelowMinimumAge {
            marital_status: MaritalStatus::Single,
            minimum: 35,
            age: 34,
        })
    );
    assert_eq!(
        engine.evaluate(35, MaritalStatus::Single, &units),
        EligibilityDecision::Eligible {
            flat_types: vec![FlatType::TwoRoom]
        }
    );
}

#[test]
fn married_age_boundary_is_twenty_one() {
    let engine = EligibilityEngine::default();
    let units = two_room_only();

    assert!(!engine.evaluate(20, MaritalStatus::Married, &units).is_eligible());
    assert!(engine.evaluate(21, MaritalStatus::Married, &units).is_eligible());
}

#[test]
fn singles_need_a_two_room_offering() {
    let engine = EligibilityEngine::default();
    let three_room_only = UnitInventory::with_totals([(FlatType::ThreeRoom, 4)]);

    assert_eq!(
        engine.evaluate(50, MaritalStatus::Single, &three_room_only),
        EligibilityDecision::Ineligible(IneligibilityReason::NoSuitableFlatType {
            marital_status: MaritalStatus::Single,
        })
    );
    assert!(engine
        .evaluate(21, MaritalStatus::Married, &three_room_only)
        .is_eligible());
}

#[test]
fn sold_out_types_still_count_as_offered() {
    let engine = EligibilityEngine::default();
    let mut units = two_room_only();
    units.decrement(FlatType::TwoRoom).expect("first unit");
    units.decrement(FlatType::TwoRoom).expect("second unit");

    assert!(engine.evaluate(40, MaritalStatus::Single, &units).is_eligible());
}

#[test]
fn unparsed_marital_status_is_rejected() {
    let fixture = fixture(&[(FlatType::TwoRoom, 1)]);
    let engine = fixture.service.engine();

    assert_eq!(engine.eligible_raw(35, "single", &fixture.project), Ok(true));
    assert_eq!(
        engine.eligible_raw(35, "DIVORCED", &fixture.project),
        Err(HousingError::InvalidMaritalStatus {
            value: "DIVORCED".to_string()
        })
    );
}

#[test]
fn policy_thresholds_are_configurable() {
    let engine = EligibilityEngine::new(EligibilityPolicy {
        single_min_age: 30,
        married_min_age: 18,
    });
    let units = two_room_only();

    assert!(engine.evaluate(30, MaritalStatus::Single, &units).is_eligible());
    assert!(engine.evaluate(18, MaritalStatus::Married, &units).is_eligible());
    assert!(!engine.evaluate(17, MaritalStatus::Married, &units).is_eligible());
}

#[test]
fn submission_enforces_the_boundaries() {
    let fixture = fixture(&[(FlatType::TwoRoom, 4)]);

    for nric in [YOUNG_SINGLE, YOUNG_MARRIED] {
        assert!(matches!(
            fixture
                .service
                .submit(&fixture.applicant(nric), &fixture.project.id),
            Err(HousingError::IneligibleApplicant { .. })
        ));
    }
    for nric in [SINGLE_APPLICANT, MARRIED_APPLICANT] {
        fixture
            .service
            .submit(&fixture.applicant(nric), &fixture.project.id)
            .expect("applicant at or above the threshold");
    }
}
