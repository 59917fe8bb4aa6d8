//! Build-To-Order housing core: applications, eligibility, unit inventory, officer
//! registrations and withdrawals, shared safely between concurrent sessions.

pub mod domain;
pub mod eligibility;
pub mod error;
pub mod import;
pub mod inventory;
pub(crate) mod lifecycle;
pub mod project;
pub mod repository;
pub mod roles;
pub mod router;
pub mod service;
pub(crate) mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationOutcome, ApplicationStatus, DateWindow, Flat, FlatId,
    FlatType, MaritalStatus, Nric, OfficerRegistration, ProjectId, RegistrationId, ReviewStatus,
    Session, User, UserRole, WithdrawalId, WithdrawalRequest,
};
pub use eligibility::{
    EligibilityDecision, EligibilityEngine, EligibilityPolicy, IneligibilityReason,
};
pub use error::HousingError;
pub use import::{import_projects_csv, ImportError, ProjectImport};
pub use inventory::{OfficerSlots, UnitCount, UnitInventory};
pub use lifecycle::ApplicationTransition;
pub use project::{Project, ProjectDraft, MAX_OFFICER_SLOTS};
pub use repository::{
    HousingSnapshot, JsonFileSnapshotStore, MemorySnapshotStore, RepositoryError, SnapshotStore,
};
pub use router::{housing_router, SESSION_HEADER};
pub use service::{Booking, FlatSelection, HousingService};
