//! Housing core facade.
//!
//! Every entity lives in its own [`Arena`] with one lock per record. Operations that touch
//! several records lock them in the order user account, project ledger, application, then
//! registration or withdrawal request, and validate everything before the first mutation.

mod applications;
mod projects;
mod registrations;
mod snapshot;

pub use applications::{Booking, FlatSelection};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::info;

use super::domain::{
    Application, ApplicationId, Flat, FlatId, FlatType, Nric, OfficerRegistration, ProjectId,
    RegistrationId, Session, User, WithdrawalId, WithdrawalRequest,
};
use super::eligibility::{EligibilityEngine, EligibilityPolicy};
use super::error::HousingError;
use super::project::Project;
use super::store::{lock, Arena};

/// User record plus the indexes the core keeps per account.
#[derive(Debug, Clone)]
pub(crate) struct Account {
    pub(crate) user: User,
    pub(crate) applications: Vec<ApplicationId>,
    pub(crate) registrations: Vec<RegistrationId>,
    pub(crate) booked_flat: Option<FlatId>,
}

impl Account {
    fn new(user: User) -> Self {
        Self {
            user,
            applications: Vec::new(),
            registrations: Vec::new(),
            booked_flat: None,
        }
    }
}

/// Project plus the flats allocated against it.
#[derive(Debug, Clone)]
pub(crate) struct ProjectLedger {
    pub(crate) project: Project,
    pub(crate) flats: BTreeMap<FlatId, Flat>,
}

impl ProjectLedger {
    fn new(project: Project) -> Self {
        Self {
            project,
            flats: BTreeMap::new(),
        }
    }

    /// First released flat of `flat_type` that nobody holds.
    fn vacant_flat(&self, flat_type: FlatType) -> Option<FlatId> {
        self.flats
            .values()
            .find(|flat| flat.flat_type == flat_type && !flat.is_booked())
            .map(|flat| flat.id.clone())
    }

    fn next_flat_id(&self, flat_type: FlatType) -> FlatId {
        let mut sequence = self.flats.len() + 1;
        loop {
            let candidate = FlatId(format!("{}-{}-{sequence:03}", self.project.id, flat_type.label()));
            if !self.flats.contains_key(&candidate) {
                return candidate;
            }
            sequence += 1;
        }
    }
}

/// Thread-safe entry point for every housing operation.
pub struct HousingService {
    engine: EligibilityEngine,
    accounts: Arena<Nric, Account>,
    projects: Arena<ProjectId, ProjectLedger>,
    applications: Arena<ApplicationId, Application>,
    registrations: Arena<RegistrationId, OfficerRegistration>,
    withdrawals: Arena<WithdrawalId, WithdrawalRequest>,
    sequence: AtomicU64,
}

impl Default for HousingService {
    fn default() -> Self {
        Self::new(EligibilityPolicy::default())
    }
}

impl HousingService {
    pub fn new(policy: EligibilityPolicy) -> Self {
        Self {
            engine: EligibilityEngine::new(policy),
            accounts: Arena::default(),
            projects: Arena::default(),
            applications: Arena::default(),
            registrations: Arena::default(),
            withdrawals: Arena::default(),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn engine(&self) -> &EligibilityEngine {
        &self.engine
    }

    /// Add an account; the NRIC is normalised before it becomes the account key.
    pub fn register_user(&self, mut user: User) -> Result<User, HousingError> {
        user.nric = Nric::parse(user.nric.as_str())?;
        if !self
            .accounts
            .insert(user.nric.clone(), Account::new(user.clone()))
        {
            return Err(HousingError::DuplicateUser(user.nric));
        }
        info!(nric = %user.nric, role = %user.role, "user registered");
        Ok(user)
    }

    pub fn open_session(&self, nric: &Nric) -> Result<Session, HousingError> {
        let account = self.account_handle(nric)?;
        let user = lock(&account).user.clone();
        Ok(Session::new(user))
    }

    pub fn user(&self, nric: &Nric) -> Result<User, HousingError> {
        let account = self.account_handle(nric)?;
        let user = lock(&account).user.clone();
        Ok(user)
    }

    pub fn users(&self) -> Vec<User> {
        let mut users: Vec<User> = self
            .accounts
            .values()
            .into_iter()
            .map(|account| account.user)
            .collect();
        users.sort_by(|left, right| left.nric.cmp(&right.nric));
        users
    }

    fn next_id(&self, prefix: &str) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}-{id:06}")
    }

    fn account_handle(&self, nric: &Nric) -> Result<Arc<Mutex<Account>>, HousingError> {
        self.accounts
            .get(nric)
            .ok_or_else(|| HousingError::UnknownUser(nric.clone()))
    }

    fn ledger_handle(&self, id: &ProjectId) -> Result<Arc<Mutex<ProjectLedger>>, HousingError> {
        self.projects
            .get(id)
            .ok_or_else(|| HousingError::UnknownProject(id.clone()))
    }

    fn application_handle(
        &self,
        id: &ApplicationId,
    ) -> Result<Arc<Mutex<Application>>, HousingError> {
        self.applications
            .get(id)
            .ok_or_else(|| HousingError::UnknownApplication(id.clone()))
    }

    fn registration_handle(
        &self,
        id: &RegistrationId,
    ) -> Result<Arc<Mutex<OfficerRegistration>>, HousingError> {
        self.registrations
            .get(id)
            .ok_or_else(|| HousingError::UnknownRegistration(id.clone()))
    }

    fn withdrawal_handle(
        &self,
        id: &WithdrawalId,
    ) -> Result<Arc<Mutex<WithdrawalRequest>>, HousingError> {
        self.withdrawals
            .get(id)
            .ok_or_else(|| HousingError::UnknownWithdrawal(id.clone()))
    }

    /// Copy of a project without its flats, taken under the ledger lock.
    fn project_copy(&self, id: &ProjectId) -> Result<Project, HousingError> {
        let ledger = self.ledger_handle(id)?;
        let project = lock(&ledger).project.clone();
        Ok(project)
    }
}
