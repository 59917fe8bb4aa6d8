mod config;
mod policy;

pub use config::{EligibilityPolicy, DEFAULT_MARRIED_MIN_AGE, DEFAULT_SINGLE_MIN_AGE};
pub use policy::IneligibilityReason;

use super::domain::{FlatType, MaritalStatus};
use super::error::HousingError;
use super::inventory::UnitInventory;
use super::project::Project;
use policy::{decide_eligibility, inferred_flat_type, permitted_flat_types};
use serde::{Deserialize, Serialize};

/// Stateless evaluator that applies the age and flat type rules to an applicant.
#[derive(Debug, Clone, Default)]
pub struct EligibilityEngine {
    policy: EligibilityPolicy,
}

impl EligibilityEngine {
    pub fn new(policy: EligibilityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    pub fn evaluate(
        &self,
        age: u8,
        marital_status: MaritalStatus,
        units: &UnitInventory,
    ) -> EligibilityDecision {
        match decide_eligibility(&self.policy, age, marital_status, units) {
            Ok(flat_types) => EligibilityDecision::Eligible { flat_types },
            Err(reason) => EligibilityDecision::Ineligible(reason),
        }
    }

    pub fn eligible(&self, age: u8, marital_status: MaritalStatus, project: &Project) -> bool {
        self.evaluate(age, marital_status, &project.units)
            .is_eligible()
    }

    /// Same as [`Self::eligible`] for a marital status that has not been parsed yet.
    pub fn eligible_raw(
        &self,
        age: u8,
        marital_status: &str,
        project: &Project,
    ) -> Result<bool, HousingError> {
        let marital_status = marital_status.parse::<MaritalStatus>()?;
        Ok(self.eligible(age, marital_status, project))
    }

    pub fn permits(
        &self,
        marital_status: MaritalStatus,
        flat_type: FlatType,
        units: &UnitInventory,
    ) -> bool {
        permitted_flat_types(marital_status, units).contains(&flat_type)
    }

    pub fn inferred_flat_type(
        &self,
        marital_status: MaritalStatus,
        units: &UnitInventory,
    ) -> FlatType {
        inferred_flat_type(marital_status, units)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EligibilityDecision {
    Eligible { flat_types: Vec<FlatType> },
    Ineligible(IneligibilityReason),
}

impl EligibilityDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityDecision::Eligible { .. })
    }
}
