use chrono::Utc;
use tracing::{info, warn};

use super::{Account, HousingService};
use crate::workflows::housing::domain::{
    OfficerRegistration, ProjectId, RegistrationId, ReviewStatus, Session, UserRole,
};
use crate::workflows::housing::error::HousingError;
use crate::workflows::housing::roles;
use crate::workflows::housing::store::lock;

impl HousingService {
    /// Officer asks to handle a project. Pending and approved registrations both block
    /// overlapping windows.
    pub fn register_officer(
        &self,
        session: &Session,
        project_id: &ProjectId,
    ) -> Result<OfficerRegistration, HousingError> {
        roles::require_role(session, UserRole::Officer, "register to handle a project")?;
        let officer = session.nric();
        let account_handle = self.account_handle(officer)?;
        let mut account = lock(&account_handle);
        let target = self.project_copy(project_id)?;

        for registration in self.open_registrations(&account) {
            if registration.project == *project_id {
                return Err(HousingError::AlreadyRegistered {
                    officer: officer.clone(),
                    project: project_id.clone(),
                    registration: registration.id,
                });
            }
            let other = self.project_copy(&registration.project)?;
            if other.window.overlaps(&target.window) {
                warn!(
                    officer = %officer,
                    project_id = %project_id,
                    conflicting = %other.id,
                    "officer registration overlaps another project"
                );
                return Err(HousingError::SchedulingConflict {
                    project: project_id.clone(),
                    conflicting: other.id,
                });
            }
        }

        let applied = account
            .applications
            .iter()
            .filter_map(|id| self.applications.read(id))
            .any(|application| application.project == *project_id);
        if applied {
            return Err(HousingError::ConflictOfInterest {
                user: officer.clone(),
                project: project_id.clone(),
            });
        }

        let now = Utc::now();
        let registration = OfficerRegistration {
            id: RegistrationId(self.next_id("REG")),
            officer: officer.clone(),
            project: project_id.clone(),
            status: ReviewStatus::Pending,
            created_at: now,
            updated_at: now,
            processed_by: None,
        };
        self.registrations
            .insert(registration.id.clone(), registration.clone());
        account.registrations.push(registration.id.clone());

        info!(
            registration_id = %registration.id,
            officer = %officer,
            project_id = %project_id,
            "officer registration submitted"
        );
        Ok(registration)
    }

    /// Manager decision on a pending registration. Approval seats the officer and consumes a
    /// slot; without a free slot the registration stays PENDING.
    pub fn process_registration(
        &self,
        session: &Session,
        registration_id: &RegistrationId,
        approve: bool,
    ) -> Result<OfficerRegistration, HousingError> {
        roles::require_role(session, UserRole::Manager, "process officer registrations")?;
        let project_id = self.registration_handle(registration_id).map(|handle| {
            let registration = lock(&handle);
            registration.project.clone()
        })?;

        let ledger_handle = self.ledger_handle(&project_id)?;
        let mut ledger = lock(&ledger_handle);
        roles::require_manager_of(session, &ledger.project, "process officer registrations")?;
        let registration_handle = self.registration_handle(registration_id)?;
        let mut registration = lock(&registration_handle);

        let verdict = registration.verdict(approve)?;
        if verdict == ReviewStatus::Approved {
            ledger.project.assign_officer(&registration.officer)?;
        }
        registration.record_review(verdict, session.nric(), Utc::now());

        info!(
            registration_id = %registration.id,
            officer = %registration.officer,
            project_id = %project_id,
            status = %verdict,
            slots_left = ledger.project.officer_slots.available,
            "officer registration processed"
        );
        Ok(registration.clone())
    }

    pub fn registration(
        &self,
        registration_id: &RegistrationId,
    ) -> Result<OfficerRegistration, HousingError> {
        self.registrations
            .read(registration_id)
            .ok_or_else(|| HousingError::UnknownRegistration(registration_id.clone()))
    }

    /// Registrations filed by the session officer, oldest first.
    pub fn my_registrations(&self, session: &Session) -> Result<Vec<OfficerRegistration>, HousingError> {
        let account = self.account_handle(session.nric())?;
        let ids = lock(&account).registrations.clone();
        Ok(ids
            .iter()
            .filter_map(|id| self.registrations.read(id))
            .collect())
    }

    pub fn pending_registrations(
        &self,
        session: &Session,
        project_id: &ProjectId,
    ) -> Result<Vec<OfficerRegistration>, HousingError> {
        let project = self.project_copy(project_id)?;
        roles::require_manager_of(session, &project, "review officer registrations")?;
        let mut pending: Vec<OfficerRegistration> = self
            .registrations
            .values()
            .into_iter()
            .filter(|registration| {
                registration.project == *project_id && registration.status == ReviewStatus::Pending
            })
            .collect();
        pending.sort_by(|left, right| left.created_at.cmp(&right.created_at).then(left.id.cmp(&right.id)));
        Ok(pending)
    }

    /// Whether the account holds a PENDING or APPROVED registration for `project_id`.
    pub(super) fn has_open_registration(&self, account: &Account, project_id: &ProjectId) -> bool {
        self.open_registrations(account)
            .iter()
            .any(|registration| registration.project == *project_id)
    }

    fn open_registrations(&self, account: &Account) -> Vec<OfficerRegistration> {
        account
            .registrations
            .iter()
            .filter_map(|id| self.registrations.read(id))
            .filter(|registration| registration.status != ReviewStatus::Rejected)
            .collect()
    }
}
