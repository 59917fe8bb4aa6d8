//! Transition tables for applications and review requests.

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationOutcome, ApplicationStatus, Nric, OfficerRegistration, ReviewStatus,
    WithdrawalRequest,
};
use super::error::HousingError;

/// Events that move an application between statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationTransition {
    Decide(ApplicationOutcome),
    Book,
    Withdraw,
}

impl ApplicationTransition {
    pub const fn target(self) -> ApplicationStatus {
        match self {
            Self::Decide(ApplicationOutcome::Successful) => ApplicationStatus::Successful,
            Self::Decide(ApplicationOutcome::Unsuccessful) => ApplicationStatus::Unsuccessful,
            Self::Book => ApplicationStatus::Booked,
            Self::Withdraw => ApplicationStatus::Unsuccessful,
        }
    }
}

impl ApplicationStatus {
    /// Resolve the status reached by `transition`, or the error describing why it is illegal.
    pub fn apply(self, transition: ApplicationTransition) -> Result<Self, HousingError> {
        let legal = match transition {
            ApplicationTransition::Decide(_) => self == Self::Pending,
            ApplicationTransition::Book => self == Self::Successful,
            ApplicationTransition::Withdraw => {
                matches!(self, Self::Pending | Self::Successful | Self::Booked)
            }
        };

        if legal {
            Ok(transition.target())
        } else {
            Err(HousingError::InvalidTransition {
                from: self,
                to: transition.target(),
            })
        }
    }
}

impl Application {
    pub(crate) fn transition(
        &mut self,
        transition: ApplicationTransition,
        at: DateTime<Utc>,
    ) -> Result<ApplicationStatus, HousingError> {
        let next = self.status.apply(transition)?;
        self.enter(next, at);
        Ok(next)
    }

    /// Commit a status already resolved through [`ApplicationStatus::apply`].
    pub(crate) fn enter(&mut self, status: ApplicationStatus, at: DateTime<Utc>) {
        self.status = status;
        self.status_changed_at = at;
    }
}

impl ReviewStatus {
    /// Terminal status for a pending request, or `AlreadyProcessed` naming `request`.
    pub fn resolve(self, approve: bool, request: &str) -> Result<Self, HousingError> {
        if self != ReviewStatus::Pending {
            return Err(HousingError::AlreadyProcessed {
                request: request.to_string(),
                status: self,
            });
        }
        Ok(if approve {
            ReviewStatus::Approved
        } else {
            ReviewStatus::Rejected
        })
    }
}

impl OfficerRegistration {
    pub(crate) fn verdict(&self, approve: bool) -> Result<ReviewStatus, HousingError> {
        self.status.resolve(approve, self.id.as_str())
    }

    pub(crate) fn record_review(&mut self, verdict: ReviewStatus, manager: &Nric, at: DateTime<Utc>) {
        self.status = verdict;
        self.processed_by = Some(manager.clone());
        self.updated_at = at;
    }
}

impl WithdrawalRequest {
    pub(crate) fn verdict(&self, approve: bool) -> Result<ReviewStatus, HousingError> {
        self.status.resolve(approve, self.id.as_str())
    }

    pub(crate) fn record_review(&mut self, verdict: ReviewStatus, manager: &Nric, at: DateTime<Utc>) {
        self.status = verdict;
        self.processed_by = Some(manager.clone());
        self.updated_at = at;
    }
}
