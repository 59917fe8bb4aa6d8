use super::domain::{
    ApplicationId, ApplicationStatus, FlatId, FlatType, Nric, ProjectId, RegistrationId,
    ReviewStatus, WithdrawalId,
};
use super::eligibility::IneligibilityReason;

/// Every recoverable outcome the housing core can surface to a caller.
///
/// Operations that fail with any of these kinds leave all entities untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HousingError {
    #[error("applicant {applicant} already has active application {existing}")]
    DuplicateActiveApplication {
        applicant: Nric,
        existing: ApplicationId,
    },
    #[error("applicant {applicant} is not eligible for project {project}: {reason}")]
    IneligibleApplicant {
        applicant: Nric,
        project: ProjectId,
        reason: IneligibilityReason,
    },
    #[error("unrecognised marital status '{value}'")]
    InvalidMaritalStatus { value: String },
    #[error("application cannot move from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("application {application} was already decided as {status}")]
    AlreadyDecided {
        application: ApplicationId,
        status: ApplicationStatus,
    },
    #[error("project {project} has no {flat_type} units available")]
    NoUnitsAvailable {
        project: ProjectId,
        flat_type: FlatType,
    },
    #[error("project {project} already has all {total} {flat_type} units available")]
    AtCapacity {
        project: ProjectId,
        flat_type: FlatType,
        total: u32,
    },
    #[error("officer {officer} already registered for project {project} ({registration})")]
    AlreadyRegistered {
        officer: Nric,
        project: ProjectId,
        registration: RegistrationId,
    },
    #[error("project {project} overlaps the window of project {conflicting}")]
    SchedulingConflict {
        project: ProjectId,
        conflicting: ProjectId,
    },
    #[error("{user} is not authorized to {action}")]
    NotAuthorized { user: Nric, action: &'static str },
    #[error("request {request} was already processed as {status}")]
    AlreadyProcessed { request: String, status: ReviewStatus },
    #[error("project {project} has no officer slots available")]
    NoSlotsAvailable { project: ProjectId },
    #[error("flat {flat} is already booked")]
    FlatUnavailable { flat: FlatId },
    #[error("applicant {applicant} already holds booked flat {flat}")]
    AlreadyBooked { applicant: Nric, flat: FlatId },
    #[error("{user} cannot both apply for and handle project {project}")]
    ConflictOfInterest { user: Nric, project: ProjectId },
    #[error("application {application} already has pending withdrawal {request}")]
    WithdrawalPending {
        application: ApplicationId,
        request: WithdrawalId,
    },
    #[error("'{value}' is not a valid NRIC")]
    InvalidNric { value: String },
    #[error("invalid project: {reason}")]
    InvalidProject { reason: String },
    #[error("user {0} is already registered")]
    DuplicateUser(Nric),
    #[error("unknown user {0}")]
    UnknownUser(Nric),
    #[error("unknown project {0}")]
    UnknownProject(ProjectId),
    #[error("unknown application {0}")]
    UnknownApplication(ApplicationId),
    #[error("unknown officer registration {0}")]
    UnknownRegistration(RegistrationId),
    #[error("unknown withdrawal request {0}")]
    UnknownWithdrawal(WithdrawalId),
    #[error("snapshot is inconsistent: {0}")]
    InconsistentSnapshot(String),
}

impl HousingError {
    /// Stable machine-readable name for the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::DuplicateActiveApplication { .. } => "DUPLICATE_ACTIVE_APPLICATION",
            Self::IneligibleApplicant { .. } => "INELIGIBLE_APPLICANT",
            Self::InvalidMaritalStatus { .. } => "INVALID_MARITAL_STATUS",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AlreadyDecided { .. } => "ALREADY_DECIDED",
            Self::NoUnitsAvailable { .. } => "NO_UNITS_AVAILABLE",
            Self::AtCapacity { .. } => "AT_CAPACITY",
            Self::AlreadyRegistered { .. } => "ALREADY_REGISTERED",
            Self::SchedulingConflict { .. } => "SCHEDULING_CONFLICT",
            Self::NotAuthorized { .. } => "NOT_AUTHORIZED",
            Self::AlreadyProcessed { .. } => "ALREADY_PROCESSED",
            Self::NoSlotsAvailable { .. } => "NO_SLOTS_AVAILABLE",
            Self::FlatUnavailable { .. } => "FLAT_UNAVAILABLE",
            Self::AlreadyBooked { .. } => "ALREADY_BOOKED",
            Self::ConflictOfInterest { .. } => "CONFLICT_OF_INTEREST",
            Self::WithdrawalPending { .. } => "WITHDRAWAL_PENDING",
            Self::InvalidNric { .. } => "INVALID_NRIC",
            Self::InvalidProject { .. } => "INVALID_PROJECT",
            Self::DuplicateUser(_) => "DUPLICATE_USER",
            Self::UnknownUser(_) => "UNKNOWN_USER",
            Self::UnknownProject(_) => "UNKNOWN_PROJECT",
            Self::UnknownApplication(_) => "UNKNOWN_APPLICATION",
            Self::UnknownRegistration(_) => "UNKNOWN_REGISTRATION",
            Self::UnknownWithdrawal(_) => "UNKNOWN_WITHDRAWAL",
            Self::InconsistentSnapshot(_) => "INCONSISTENT_SNAPSHOT",
        }
    }
}
