use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Account, HousingService};
use crate::workflows::housing::domain::{
    Application, ApplicationId, ApplicationOutcome, ApplicationStatus, Flat, FlatId, FlatType,
    Nric, ProjectId, ReviewStatus, Session, UserRole, WithdrawalId, WithdrawalRequest,
};
use crate::workflows::housing::eligibility::{EligibilityDecision, IneligibilityReason};
use crate::workflows::housing::error::HousingError;
use crate::workflows::housing::lifecycle::ApplicationTransition;
use crate::workflows::housing::roles;
use crate::workflows::housing::store::lock;

/// Which flat an officer books for a successful applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatSelection {
    pub flat_type: FlatType,
    /// Named flat to book; a vacant flat is picked or allocated when absent.
    #[serde(default)]
    pub flat: Option<FlatId>,
}

impl FlatSelection {
    pub fn any(flat_type: FlatType) -> Self {
        Self {
            flat_type,
            flat: None,
        }
    }

    pub fn unit(flat: impl Into<String>, flat_type: FlatType) -> Self {
        Self {
            flat_type,
            flat: Some(FlatId(flat.into())),
        }
    }
}

/// Result of a successful booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub application: Application,
    pub flat: Flat,
}

impl HousingService {
    /// Create a PENDING application for the session user.
    pub fn submit(
        &self,
        session: &Session,
        project_id: &ProjectId,
    ) -> Result<Application, HousingError> {
        roles::require_applicant(session)?;
        let account_handle = self.account_handle(session.nric())?;
        let mut account = lock(&account_handle);

        if let Some(existing) = self.active_application(&account) {
            return Err(HousingError::DuplicateActiveApplication {
                applicant: session.nric().clone(),
                existing,
            });
        }
        if let Some(flat) = account.booked_flat.clone() {
            return Err(HousingError::AlreadyBooked {
                applicant: session.nric().clone(),
                flat,
            });
        }

        let ledger_handle = self.ledger_handle(project_id)?;
        let ledger = lock(&ledger_handle);

        if ledger.project.is_handled_by(session.nric())
            || self.has_open_registration(&account, project_id)
        {
            return Err(HousingError::ConflictOfInterest {
                user: session.nric().clone(),
                project: project_id.clone(),
            });
        }

        let user = &account.user;
        if let EligibilityDecision::Ineligible(reason) =
            self.engine
                .evaluate(user.age, user.marital_status, &ledger.project.units)
        {
            warn!(
                nric = %user.nric,
                project_id = %project_id,
                %reason,
                "application rejected as ineligible"
            );
            return Err(HousingError::IneligibleApplicant {
                applicant: user.nric.clone(),
                project: project_id.clone(),
                reason,
            });
        }

        let now = Utc::now();
        let application = Application {
            id: ApplicationId(self.next_id("APP")),
            applicant: user.nric.clone(),
            project: project_id.clone(),
            status: ApplicationStatus::Pending,
            created_at: now,
            status_changed_at: now,
            flat: None,
        };
        self.applications
            .insert(application.id.clone(), application.clone());
        account.applications.push(application.id.clone());

        info!(
            application_id = %application.id,
            nric = %application.applicant,
            project_id = %project_id,
            "application submitted"
        );
        Ok(application)
    }

    /// Manager decision on a PENDING application. Inventory is untouched until booking.
    pub fn decide(
        &self,
        session: &Session,
        application_id: &ApplicationId,
        outcome: ApplicationOutcome,
    ) -> Result<Application, HousingError> {
        roles::require_role(session, UserRole::Manager, "decide applications")?;
        let project_id = self.application_handle(application_id).map(|handle| {
            let application = lock(&handle);
            application.project.clone()
        })?;

        let ledger_handle = self.ledger_handle(&project_id)?;
        let ledger = lock(&ledger_handle);
        roles::require_manager_of(session, &ledger.project, "decide applications")?;

        let application_handle = self.application_handle(application_id)?;
        let mut application = lock(&application_handle);
        if application.status != ApplicationStatus::Pending {
            return Err(HousingError::AlreadyDecided {
                application: application.id.clone(),
                status: application.status,
            });
        }
        let status = application.transition(ApplicationTransition::Decide(outcome), Utc::now())?;

        info!(
            application_id = %application.id,
            manager = %session.nric(),
            %status,
            "application decided"
        );
        Ok(application.clone())
    }

    /// Officer books a flat for a SUCCESSFUL application, consuming one unit.
    pub fn book(
        &self,
        session: &Session,
        application_id: &ApplicationId,
        selection: FlatSelection,
    ) -> Result<Booking, HousingError> {
        roles::require_role(session, UserRole::Officer, "book a flat")?;
        let (applicant, project_id) = self.application_parties(application_id)?;

        let account_handle = self.account_handle(&applicant)?;
        let mut account = lock(&account_handle);
        let ledger_handle = self.ledger_handle(&project_id)?;
        let mut ledger = lock(&ledger_handle);
        roles::require_officer_of(session, &ledger.project, "book a flat")?;
        let application_handle = self.application_handle(application_id)?;
        let mut application = lock(&application_handle);

        let next = application.status.apply(ApplicationTransition::Book)?;
        if let Some(flat) = account.booked_flat.clone() {
            return Err(HousingError::AlreadyBooked { applicant, flat });
        }
        let flat_type = selection.flat_type;
        let marital_status = account.user.marital_status;
        if !self
            .engine
            .permits(marital_status, flat_type, &ledger.project.units)
        {
            return Err(HousingError::IneligibleApplicant {
                applicant,
                project: project_id,
                reason: IneligibilityReason::FlatTypeNotPermitted {
                    marital_status,
                    flat_type,
                },
            });
        }

        let flat_id = match selection.flat {
            Some(flat_id) => match ledger.flats.get(&flat_id) {
                Some(flat) if flat.is_booked() || flat.flat_type != flat_type => {
                    return Err(HousingError::FlatUnavailable { flat: flat_id });
                }
                _ => flat_id,
            },
            None => ledger
                .vacant_flat(flat_type)
                .unwrap_or_else(|| ledger.next_flat_id(flat_type)),
        };

        let remaining = ledger.project.reserve_unit(flat_type)?;

        let flat = ledger
            .flats
            .entry(flat_id.clone())
            .or_insert_with(|| Flat {
                id: flat_id.clone(),
                project: project_id.clone(),
                flat_type,
                application: None,
            });
        flat.application = Some(application.id.clone());
        let flat = flat.clone();

        application.flat = Some(flat_id.clone());
        application.enter(next, Utc::now());
        account.booked_flat = Some(flat_id);

        info!(
            application_id = %application.id,
            flat_id = %flat.id,
            %flat_type,
            remaining,
            officer = %session.nric(),
            "flat booked"
        );
        Ok(Booking {
            application: application.clone(),
            flat,
        })
    }

    /// Applicant asks to withdraw one of their own applications.
    pub fn request_withdrawal(
        &self,
        session: &Session,
        application_id: &ApplicationId,
        reason: &str,
    ) -> Result<WithdrawalRequest, HousingError> {
        let application_handle = self.application_handle(application_id)?;
        let application = lock(&application_handle);
        if application.applicant != *session.nric() {
            return Err(HousingError::NotAuthorized {
                user: session.nric().clone(),
                action: "withdraw another applicant's application",
            });
        }
        application.status.apply(ApplicationTransition::Withdraw)?;

        if let Some(pending) = self.withdrawals.values().into_iter().find(|request| {
            request.application == *application_id && request.status == ReviewStatus::Pending
        }) {
            return Err(HousingError::WithdrawalPending {
                application: application_id.clone(),
                request: pending.id,
            });
        }

        let now = Utc::now();
        let request = WithdrawalRequest {
            id: WithdrawalId(self.next_id("WDR")),
            application: application_id.clone(),
            reason: reason.trim().to_string(),
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
            processed_by: None,
        };
        self.withdrawals.insert(request.id.clone(), request.clone());

        info!(
            withdrawal_id = %request.id,
            application_id = %application_id,
            status = %application.status,
            "withdrawal requested"
        );
        Ok(request)
    }

    /// Manager approves or rejects a pending withdrawal.
    ///
    /// Approval returns the unit to inventory when the application was SUCCESSFUL or BOOKED,
    /// detaches any booked flat, and leaves the application UNSUCCESSFUL.
    pub fn process_withdrawal(
        &self,
        session: &Session,
        withdrawal_id: &WithdrawalId,
        approve: bool,
    ) -> Result<WithdrawalRequest, HousingError> {
        roles::require_role(session, UserRole::Manager, "process withdrawals")?;
        let application_id = self.withdrawal_handle(withdrawal_id).map(|handle| {
            let request = lock(&handle);
            request.application.clone()
        })?;
        let (applicant, project_id) = self.application_parties(&application_id)?;

        let account_handle = self.account_handle(&applicant)?;
        let mut account = lock(&account_handle);
        let ledger_handle = self.ledger_handle(&project_id)?;
        let mut ledger = lock(&ledger_handle);
        roles::require_manager_of(session, &ledger.project, "process withdrawals")?;
        let application_handle = self.application_handle(&application_id)?;
        let mut application = lock(&application_handle);
        let request_handle = self.withdrawal_handle(withdrawal_id)?;
        let mut request = lock(&request_handle);

        let verdict = request.verdict(approve)?;
        let now = Utc::now();
        if verdict == ReviewStatus::Rejected {
            request.record_review(verdict, session.nric(), now);
            info!(withdrawal_id = %request.id, manager = %session.nric(), "withdrawal rejected");
            return Ok(request.clone());
        }

        let prior = application.status;
        let next = prior.apply(ApplicationTransition::Withdraw)?;
        let released = match prior {
            ApplicationStatus::Successful | ApplicationStatus::Booked => {
                Some(match &application.flat {
                    Some(flat_id) => ledger
                        .flats
                        .get(flat_id)
                        .map(|flat| flat.flat_type)
                        .ok_or_else(|| {
                            HousingError::InconsistentSnapshot(format!(
                                "application {} holds unknown flat {flat_id}",
                                application.id
                            ))
                        })?,
                    None => self
                        .engine
                        .inferred_flat_type(account.user.marital_status, &ledger.project.units),
                })
            }
            ApplicationStatus::Pending | ApplicationStatus::Unsuccessful => None,
        };

        if let Some(flat_type) = released {
            ledger.project.release_unit(flat_type)?;
        }
        if let Some(flat_id) = application.flat.take() {
            if let Some(flat) = ledger.flats.get_mut(&flat_id) {
                flat.application = None;
            }
            if account.booked_flat.as_ref() == Some(&flat_id) {
                account.booked_flat = None;
            }
        }
        application.enter(next, now);
        request.record_review(verdict, session.nric(), now);

        info!(
            withdrawal_id = %request.id,
            application_id = %application.id,
            from = %prior,
            released = ?released,
            manager = %session.nric(),
            "withdrawal approved"
        );
        Ok(request.clone())
    }

    pub fn application(&self, application_id: &ApplicationId) -> Result<Application, HousingError> {
        self.applications
            .read(application_id)
            .ok_or_else(|| HousingError::UnknownApplication(application_id.clone()))
    }

    /// Applications of the session user, oldest first.
    pub fn application_history(&self, session: &Session) -> Result<Vec<Application>, HousingError> {
        let account = self.account_handle(session.nric())?;
        let ids = lock(&account).applications.clone();
        Ok(ids
            .iter()
            .filter_map(|id| self.applications.read(id))
            .collect())
    }

    pub fn active_application_for(&self, nric: &Nric) -> Result<Option<Application>, HousingError> {
        let account_handle = self.account_handle(nric)?;
        let account = lock(&account_handle);
        Ok(self
            .active_application(&account)
            .and_then(|id| self.applications.read(&id)))
    }

    pub fn booked_flat(&self, nric: &Nric) -> Result<Option<Flat>, HousingError> {
        let account_handle = self.account_handle(nric)?;
        let account = lock(&account_handle);
        let Some(flat_id) = account.booked_flat.clone() else {
            return Ok(None);
        };
        let project_id = account
            .applications
            .iter()
            .filter_map(|id| self.applications.read(id))
            .find(|application| application.flat.as_ref() == Some(&flat_id))
            .map(|application| application.project);
        let Some(project_id) = project_id else {
            return Ok(None);
        };
        let ledger_handle = self.ledger_handle(&project_id)?;
        let ledger = lock(&ledger_handle);
        Ok(ledger.flats.get(&flat_id).cloned())
    }

    pub fn withdrawal(&self, withdrawal_id: &WithdrawalId) -> Result<WithdrawalRequest, HousingError> {
        self.withdrawals
            .read(withdrawal_id)
            .ok_or_else(|| HousingError::UnknownWithdrawal(withdrawal_id.clone()))
    }

    fn active_application(&self, account: &Account) -> Option<ApplicationId> {
        account
            .applications
            .iter()
            .filter_map(|id| self.applications.read(id))
            .find(|application| application.status.is_active())
            .map(|application| application.id)
    }

    fn application_parties(
        &self,
        application_id: &ApplicationId,
    ) -> Result<(Nric, ProjectId), HousingError> {
        let handle = self.application_handle(application_id)?;
        let application = lock(&handle);
        Ok((application.applicant.clone(), application.project.clone()))
    }
}
