use std::collections::HashMap;
use std::sync::atomic::Ordering;

use tracing::info;

use super::{Account, HousingService, ProjectLedger};
use crate::workflows::housing::domain::{ApplicationStatus, Nric};
use crate::workflows::housing::eligibility::EligibilityPolicy;
use crate::workflows::housing::error::HousingError;
use crate::workflows::housing::repository::{HousingSnapshot, RepositoryError, SnapshotStore};
use crate::workflows::housing::store::lock;

fn inconsistent(message: impl Into<String>) -> HousingError {
    HousingError::InconsistentSnapshot(message.into())
}

/// Numeric suffix of a generated id such as `APP-000042`.
fn sequence_of(id: &str) -> u64 {
    id.rsplit('-')
        .next()
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(0)
}

impl HousingService {
    /// Copy of every entity, each list ordered by id. Records are read one lock at a time.
    pub fn snapshot(&self) -> HousingSnapshot {
        let mut snapshot = HousingSnapshot {
            users: self.users(),
            ..HousingSnapshot::default()
        };
        for ledger in self.projects.values() {
            snapshot.flats.extend(ledger.flats.into_values());
            snapshot.projects.push(ledger.project);
        }
        snapshot.projects.sort_by(|left, right| left.id.cmp(&right.id));
        snapshot.flats.sort_by(|left, right| left.id.cmp(&right.id));

        snapshot.applications = self.applications.values();
        snapshot.applications.sort_by(|left, right| left.id.cmp(&right.id));
        snapshot.registrations = self.registrations.values();
        snapshot.registrations.sort_by(|left, right| left.id.cmp(&right.id));
        snapshot.withdrawals = self.withdrawals.values();
        snapshot.withdrawals.sort_by(|left, right| left.id.cmp(&right.id));
        snapshot
    }

    /// Rebuild a service from a snapshot, rejecting any cross-entity inconsistency.
    pub fn restore(
        snapshot: HousingSnapshot,
        policy: EligibilityPolicy,
    ) -> Result<Self, HousingError> {
        let service = Self::new(policy);
        let mut highest = 0;

        for mut user in snapshot.users {
            let nric = Nric::parse(user.nric.as_str())?;
            user.nric = nric.clone();
            if !service.accounts.insert(nric.clone(), Account::new(user)) {
                return Err(HousingError::DuplicateUser(nric));
            }
        }

        for project in snapshot.projects {
            project.check_invariants()?;
            service.account_handle(&project.manager)?;
            for officer in &project.officers {
                service.account_handle(officer)?;
            }
            highest = highest.max(sequence_of(project.id.as_str()));
            let id = project.id.clone();
            if !service.projects.insert(id.clone(), ProjectLedger::new(project)) {
                return Err(inconsistent(format!("project {id} appears twice")));
            }
        }

        for flat in snapshot.flats {
            let ledger = service.ledger_handle(&flat.project)?;
            let mut ledger = lock(&ledger);
            if ledger.flats.insert(flat.id.clone(), flat.clone()).is_some() {
                return Err(inconsistent(format!("flat {} appears twice", flat.id)));
            }
        }

        let mut active: HashMap<Nric, usize> = HashMap::new();
        let mut applications = snapshot.applications;
        applications.sort_by(|left, right| left.created_at.cmp(&right.created_at));
        for application in applications {
            let account = service.account_handle(&application.applicant)?;
            let ledger = service.ledger_handle(&application.project)?;
            highest = highest.max(sequence_of(application.id.as_str()));

            match (&application.flat, application.status) {
                (Some(flat_id), ApplicationStatus::Booked) => {
                    let ledger = lock(&ledger);
                    let holder = ledger
                        .flats
                        .get(flat_id)
                        .and_then(|flat| flat.application.as_ref());
                    if holder != Some(&application.id) {
                        return Err(inconsistent(format!(
                            "flat {flat_id} is not held by application {}",
                            application.id
                        )));
                    }
                    let mut account = lock(&account);
                    if let Some(held) = &account.booked_flat {
                        return Err(inconsistent(format!(
                            "applicant {} holds flats {held} and {flat_id}",
                            application.applicant
                        )));
                    }
                    account.booked_flat = Some(flat_id.clone());
                }
                (None, ApplicationStatus::Booked) => {
                    return Err(inconsistent(format!(
                        "booked application {} has no flat",
                        application.id
                    )));
                }
                (Some(flat_id), status) => {
                    return Err(inconsistent(format!(
                        "{status} application {} holds flat {flat_id}",
                        application.id
                    )));
                }
                (None, _) => {}
            }

            if application.status.is_active() {
                let count = active.entry(application.applicant.clone()).or_default();
                *count += 1;
                if *count > 1 {
                    return Err(inconsistent(format!(
                        "applicant {} has more than one active application",
                        application.applicant
                    )));
                }
            }

            lock(&account).applications.push(application.id.clone());
            let id = application.id.clone();
            if !service.applications.insert(id.clone(), application) {
                return Err(inconsistent(format!("application {id} appears twice")));
            }
        }

        for ledger in service.projects.values() {
            for flat in ledger.flats.values() {
                if let Some(holder) = &flat.application {
                    let held = service
                        .applications
                        .read(holder)
                        .is_some_and(|application| application.flat.as_ref() == Some(&flat.id));
                    if !held {
                        return Err(inconsistent(format!(
                            "flat {} references application {holder} which does not hold it",
                            flat.id
                        )));
                    }
                }
            }
        }

        for registration in snapshot.registrations {
            let account = service.account_handle(&registration.officer)?;
            service.ledger_handle(&registration.project)?;
            highest = highest.max(sequence_of(registration.id.as_str()));
            lock(&account).registrations.push(registration.id.clone());
            let id = registration.id.clone();
            if !service.registrations.insert(id.clone(), registration) {
                return Err(inconsistent(format!("registration {id} appears twice")));
            }
        }

        for request in snapshot.withdrawals {
            service.application_handle(&request.application)?;
            highest = highest.max(sequence_of(request.id.as_str()));
            let id = request.id.clone();
            if !service.withdrawals.insert(id.clone(), request) {
                return Err(inconsistent(format!("withdrawal {id} appears twice")));
            }
        }

        service.sequence.store(highest + 1, Ordering::Relaxed);
        info!(
            users = service.accounts.len(),
            projects = service.projects.len(),
            applications = service.applications.len(),
            "housing state restored"
        );
        Ok(service)
    }

    /// Save a snapshot of the current state to `store`.
    pub fn persist<S>(&self, store: &S) -> Result<(), RepositoryError>
    where
        S: SnapshotStore + ?Sized,
    {
        store.save(&self.snapshot())
    }
}
