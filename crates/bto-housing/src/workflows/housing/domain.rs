use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::HousingError;

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

identifier!(
    /// National identity string; the identity key for every user role.
    Nric
);
identifier!(
    /// Identifier wrapper for housing projects.
    ProjectId
);
identifier!(
    /// Identifier wrapper for submitted applications.
    ApplicationId
);
identifier!(
    /// Identifier for a flat allocated at booking time.
    FlatId
);
identifier!(RegistrationId);
identifier!(WithdrawalId);

impl Nric {
    /// Validates the `S`/`T` prefix, seven digits and trailing check letter.
    pub fn parse(raw: &str) -> Result<Self, HousingError> {
        let value = raw.trim().to_ascii_uppercase();
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 9
            && matches!(bytes[0], b'S' | b'T')
            && bytes[1..8].iter().all(u8::is_ascii_digit)
            && bytes[8].is_ascii_uppercase();

        if well_formed {
            Ok(Self(value))
        } else {
            Err(HousingError::InvalidNric {
                value: raw.to_string(),
            })
        }
    }
}

/// Housing unit category with an independent inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlatType {
    TwoRoom,
    ThreeRoom,
}

impl FlatType {
    pub const fn ordered() -> [Self; 2] {
        [Self::TwoRoom, Self::ThreeRoom]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::TwoRoom => "TWO_ROOM",
            Self::ThreeRoom => "THREE_ROOM",
        }
    }
}

impl fmt::Display for FlatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlatType {
    type Err = HousingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase().replace(&['-', ' '][..], "_");
        match normalized.as_str() {
            "TWO_ROOM" | "2_ROOM" => Ok(Self::TwoRoom),
            "THREE_ROOM" | "3_ROOM" => Ok(Self::ThreeRoom),
            _ => Err(HousingError::InvalidProject {
                reason: format!("unknown flat type '{}'", value.trim()),
            }),
        }
    }
}

/// Closed set of marital statuses the eligibility rules understand.
///
/// Deserialization goes through [`FromStr`], so it accepts the same spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum MaritalStatus {
    Single,
    Married,
}

impl MaritalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Single => "SINGLE",
            Self::Married => "MARRIED",
        }
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for MaritalStatus {
    type Error = HousingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for MaritalStatus {
    type Err = HousingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SINGLE" => Ok(Self::Single),
            "MARRIED" => Ok(Self::Married),
            _ => Err(HousingError::InvalidMaritalStatus {
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Applicant,
    Officer,
    Manager,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Applicant => "APPLICANT",
            Self::Officer => "OFFICER",
            Self::Manager => "MANAGER",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single account record shared by applicants, officers and managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub nric: Nric,
    pub name: String,
    pub age: u8,
    pub marital_status: MaritalStatus,
    pub role: UserRole,
}

/// Caller context threaded through every core operation.
///
/// Sessions are issued by [`super::HousingService::open_session`] and carry a snapshot of
/// the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user: User,
}

impl Session {
    pub(crate) fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn nric(&self) -> &Nric {
        &self.user.nric
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }
}

/// Inclusive application window of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub opens: NaiveDate,
    pub closes: NaiveDate,
}

impl DateWindow {
    pub fn new(opens: NaiveDate, closes: NaiveDate) -> Result<Self, HousingError> {
        if closes < opens {
            return Err(HousingError::InvalidProject {
                reason: format!("window closes on {closes} before it opens on {opens}"),
            });
        }
        Ok(Self { opens, closes })
    }

    pub fn overlaps(&self, other: &DateWindow) -> bool {
        !(self.closes < other.opens || self.opens > other.closes)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.opens <= date && date <= self.closes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Pending,
    Successful,
    Unsuccessful,
    Booked,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Successful => "SUCCESSFUL",
            Self::Unsuccessful => "UNSUCCESSFUL",
            Self::Booked => "BOOKED",
        }
    }

    /// Active applications block the applicant from submitting another one.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Successful)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Manager verdict on a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationOutcome {
    Successful,
    Unsuccessful,
}

/// Status shared by officer registrations and withdrawal requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One applicant's request for one project; never deleted once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant: Nric,
    pub project: ProjectId,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub status_changed_at: DateTime<Utc>,
    pub flat: Option<FlatId>,
}

/// A unit allocated lazily when an application is booked.
///
/// The booked flag is derived from the application back-reference so the two can never
/// disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flat {
    pub id: FlatId,
    pub project: ProjectId,
    pub flat_type: FlatType,
    pub application: Option<ApplicationId>,
}

impl Flat {
    pub fn is_booked(&self) -> bool {
        self.application.is_some()
    }
}

/// An officer's request to handle a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerRegistration {
    pub id: RegistrationId,
    pub officer: Nric,
    pub project: ProjectId,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processed_by: Option<Nric>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub application: ApplicationId,
    pub reason: String,
    pub status: ReviewStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub processed_by: Option<Nric>,
}
