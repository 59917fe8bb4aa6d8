use chrono::NaiveDate;
use tracing::{info, warn};

use super::{HousingService, ProjectLedger};
use crate::workflows::housing::domain::{
    Application, Flat, FlatType, Nric, ProjectId, ReviewStatus, Session, UserRole,
    WithdrawalRequest,
};
use crate::workflows::housing::error::HousingError;
use crate::workflows::housing::inventory::{UnitCount, UnitInventory};
use crate::workflows::housing::project::{Project, ProjectDraft};
use crate::workflows::housing::roles;
use crate::workflows::housing::store::lock;

impl HousingService {
    /// Manager creates a project. A manager runs at most one project per window.
    pub fn create_project(
        &self,
        session: &Session,
        draft: ProjectDraft,
    ) -> Result<Project, HousingError> {
        roles::require_role(session, UserRole::Manager, "create projects")?;
        draft.validate()?;
        let manager_handle = self.account_handle(session.nric())?;
        let _manager = lock(&manager_handle);
        let project_id = ProjectId(self.next_id("PRJ"));

        if let Some(conflicting) = self
            .projects()
            .into_iter()
            .find(|project| project.is_managed_by(session.nric()) && project.window.overlaps(&draft.window))
        {
            warn!(
                manager = %session.nric(),
                conflicting = %conflicting.id,
                "project window overlaps an existing project"
            );
            return Err(HousingError::SchedulingConflict {
                project: project_id,
                conflicting: conflicting.id,
            });
        }

        let project = Project::from_draft(project_id, session.nric().clone(), draft);
        self.projects
            .insert(project.id.clone(), ProjectLedger::new(project.clone()));

        info!(
            project_id = %project.id,
            name = %project.name,
            manager = %project.manager,
            "project created"
        );
        Ok(project)
    }

    pub fn set_visibility(
        &self,
        session: &Session,
        project_id: &ProjectId,
        visible: bool,
    ) -> Result<Project, HousingError> {
        let ledger_handle = self.ledger_handle(project_id)?;
        let mut ledger = lock(&ledger_handle);
        roles::require_manager_of(session, &ledger.project, "change project visibility")?;
        ledger.project.visible = visible;
        info!(project_id = %project_id, visible, "project visibility changed");
        Ok(ledger.project.clone())
    }

    /// Resize the built total of a flat type; availability is clamped to the new total.
    pub fn set_unit_total(
        &self,
        session: &Session,
        project_id: &ProjectId,
        flat_type: FlatType,
        total: u32,
    ) -> Result<UnitCount, HousingError> {
        let ledger_handle = self.ledger_handle(project_id)?;
        let mut ledger = lock(&ledger_handle);
        roles::require_manager_of(session, &ledger.project, "edit unit totals")?;
        let count = ledger.project.resize_units(flat_type, total);
        info!(
            project_id = %project_id,
            %flat_type,
            total = count.total,
            available = count.available,
            "unit total changed"
        );
        Ok(count)
    }

    pub fn project(&self, project_id: &ProjectId) -> Result<Project, HousingError> {
        self.project_copy(project_id)
    }

    /// Every project, ordered by id.
    pub fn projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .values()
            .into_iter()
            .map(|ledger| ledger.project)
            .collect();
        projects.sort_by(|left, right| left.id.cmp(&right.id));
        projects
    }

    pub fn units(&self, project_id: &ProjectId) -> Result<UnitInventory, HousingError> {
        Ok(self.project_copy(project_id)?.units)
    }

    pub fn officers(&self, project_id: &ProjectId) -> Result<Vec<Nric>, HousingError> {
        Ok(self.project_copy(project_id)?.officers.into_iter().collect())
    }

    pub fn flats(&self, project_id: &ProjectId) -> Result<Vec<Flat>, HousingError> {
        let ledger_handle = self.ledger_handle(project_id)?;
        let ledger = lock(&ledger_handle);
        Ok(ledger.flats.values().cloned().collect())
    }

    /// Projects the session user may look at on `today`.
    ///
    /// Applicants and officers see visible projects whose window contains `today` and for
    /// which they pass the eligibility rules; officers never see projects they handle.
    /// Managers see every project.
    pub fn available_projects(&self, session: &Session, today: NaiveDate) -> Vec<Project> {
        let user = session.user();
        if !roles::can_apply(user) {
            return self.projects();
        }
        self.projects()
            .into_iter()
            .filter(|project| project.visible && project.window.contains(today))
            .filter(|project| !roles::handles(user, project))
            .filter(|project| self.engine.eligible(user.age, user.marital_status, project))
            .collect()
    }

    /// Applications filed against a project, visible to its manager and officers.
    pub fn project_applications(
        &self,
        session: &Session,
        project_id: &ProjectId,
    ) -> Result<Vec<Application>, HousingError> {
        let project = self.project_copy(project_id)?;
        if !roles::manages(session.user(), &project) && !roles::handles(session.user(), &project) {
            return Err(HousingError::NotAuthorized {
                user: session.nric().clone(),
                action: "view project applications",
            });
        }
        let mut applications: Vec<Application> = self
            .applications
            .values()
            .into_iter()
            .filter(|application| application.project == *project_id)
            .collect();
        applications.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(applications)
    }

    pub fn pending_withdrawals(
        &self,
        session: &Session,
        project_id: &ProjectId,
    ) -> Result<Vec<WithdrawalRequest>, HousingError> {
        let project = self.project_copy(project_id)?;
        roles::require_manager_of(session, &project, "review withdrawals")?;
        let mut pending: Vec<WithdrawalRequest> = self
            .withdrawals
            .values()
            .into_iter()
            .filter(|request| request.status == ReviewStatus::Pending)
            .filter(|request| {
                self.applications
                    .read(&request.application)
                    .is_some_and(|application| application.project == *project_id)
            })
            .collect();
        pending.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(pending)
    }
}
