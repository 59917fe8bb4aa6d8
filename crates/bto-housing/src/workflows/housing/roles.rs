//! Role specific permissions expressed as free functions over a [`User`].

use super::domain::{Session, User, UserRole};
use super::error::HousingError;
use super::project::Project;

/// Applicants and officers may apply for flats; managers may not.
pub fn can_apply(user: &User) -> bool {
    matches!(user.role, UserRole::Applicant | UserRole::Officer)
}

pub fn can_book(user: &User) -> bool {
    user.role == UserRole::Officer
}

pub fn manages(user: &User, project: &Project) -> bool {
    user.role == UserRole::Manager && project.is_managed_by(&user.nric)
}

pub fn handles(user: &User, project: &Project) -> bool {
    user.role == UserRole::Officer && project.is_handled_by(&user.nric)
}

pub(crate) fn require_role(
    session: &Session,
    role: UserRole,
    action: &'static str,
) -> Result<(), HousingError> {
    if session.role() == role {
        Ok(())
    } else {
        Err(not_authorized(session, action))
    }
}

pub(crate) fn require_applicant(session: &Session) -> Result<(), HousingError> {
    if can_apply(session.user()) {
        Ok(())
    } else {
        Err(not_authorized(session, "apply for a flat"))
    }
}

pub(crate) fn require_manager_of(
    session: &Session,
    project: &Project,
    action: &'static str,
) -> Result<(), HousingError> {
    if manages(session.user(), project) {
        Ok(())
    } else {
        Err(not_authorized(session, action))
    }
}

pub(crate) fn require_officer_of(
    session: &Session,
    project: &Project,
    action: &'static str,
) -> Result<(), HousingError> {
    if can_book(session.user()) && handles(session.user(), project) {
        Ok(())
    } else {
        Err(not_authorized(session, action))
    }
}

fn not_authorized(session: &Session, action: &'static str) -> HousingError {
    HousingError::NotAuthorized {
        user: session.nric().clone(),
        action,
    }
}
