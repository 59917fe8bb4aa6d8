use std::fmt;

use serde::{Deserialize, Serialize};

use super::super::domain::{FlatType, MaritalStatus};
use super::super::inventory::UnitInventory;
use super::config::EligibilityPolicy;

/// Why an applicant may not take a unit in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IneligibilityReason {
    BelowMinimumAge {
        marital_status: MaritalStatus,
        minimum: u8,
        age: u8,
    },
    NoSuitableFlatType {
        marital_status: MaritalStatus,
    },
    FlatTypeNotPermitted {
        marital_status: MaritalStatus,
        flat_type: FlatType,
    },
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibilityReason::BelowMinimumAge {
                marital_status,
                minimum,
                age,
            } => write!(
                f,
                "{marital_status} applicants must be at least {minimum} (age {age})"
            ),
            IneligibilityReason::NoSuitableFlatType { marital_status } => {
                write!(f, "project offers no flat type open to {marital_status} applicants")
            }
            IneligibilityReason::FlatTypeNotPermitted {
                marital_status,
                flat_type,
            } => write!(f, "{flat_type} is not open to {marital_status} applicants"),
        }
    }
}

/// Flat types an applicant may take from the project's offered types.
pub(crate) fn permitted_flat_types(
    marital_status: MaritalStatus,
    units: &UnitInventory,
) -> Vec<FlatType> {
    match marital_status {
        MaritalStatus::Single => {
            if units.offers(FlatType::TwoRoom) {
                vec![FlatType::TwoRoom]
            } else {
                Vec::new()
            }
        }
        MaritalStatus::Married => units.offered_types(),
    }
}

pub(crate) fn decide_eligibility(
    policy: &EligibilityPolicy,
    age: u8,
    marital_status: MaritalStatus,
    units: &UnitInventory,
) -> Result<Vec<FlatType>, IneligibilityReason> {
    let minimum = match marital_status {
        MaritalStatus::Single => policy.single_min_age,
        MaritalStatus::Married => policy.married_min_age,
    };
    if age < minimum {
        return Err(IneligibilityReason::BelowMinimumAge {
            marital_status,
            minimum,
            age,
        });
    }

    let flat_types = permitted_flat_types(marital_status, units);
    if marital_status == MaritalStatus::Single && flat_types.is_empty() {
        return Err(IneligibilityReason::NoSuitableFlatType { marital_status });
    }

    Ok(flat_types)
}

/// Flat type a withdrawn application would have taken when no flat was attached.
pub(crate) fn inferred_flat_type(marital_status: MaritalStatus, units: &UnitInventory) -> FlatType {
    match marital_status {
        MaritalStatus::Married if units.offers(FlatType::ThreeRoom) => FlatType::ThreeRoom,
        _ => FlatType::TwoRoom,
    }
}
