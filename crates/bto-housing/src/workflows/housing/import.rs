//! Project sheet importer.
//!
//! Reads the manager maintained CSV sheet with the columns
//! `Project Name,Neighbourhood,Type 1,Units for Type 1,Type 2,Units for Type 2,
//! Opening Date,Closing Date,Manager,Officer Slot` and an optional trailing `Visible`.

use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use tracing::info;

use super::domain::{DateWindow, FlatType, Nric};
use super::error::HousingError;
use super::project::{Project, ProjectDraft};
use super::service::HousingService;

/// One parsed sheet row, ready to be created under its manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectImport {
    pub manager: Nric,
    pub draft: ProjectDraft,
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read project sheet: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },
    #[error(transparent)]
    Housing(#[from] HousingError),
}

pub fn import_projects_csv<R: Read>(reader: R) -> Result<Vec<ProjectImport>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut imports = Vec::new();

    for (index, record) in csv_reader.deserialize::<ProjectRow>().enumerate() {
        let row = record?;
        let import = row.into_import().map_err(|reason| ImportError::Row {
            row: index + 1,
            reason,
        })?;
        imports.push(import);
    }

    Ok(imports)
}

impl HousingService {
    /// Create every imported project under its listed manager, stopping at the first failure.
    pub fn import_projects(&self, imports: Vec<ProjectImport>) -> Result<Vec<Project>, ImportError> {
        let mut created = Vec::with_capacity(imports.len());
        for import in imports {
            let session = self.open_session(&import.manager)?;
            created.push(self.create_project(&session, import.draft)?);
        }
        info!(count = created.len(), "projects imported");
        Ok(created)
    }
}

#[derive(Debug, Deserialize)]
struct ProjectRow {
    #[serde(rename = "Project Name")]
    name: String,
    #[serde(rename = "Neighbourhood")]
    neighbourhood: String,
    #[serde(rename = "Type 1", default, deserialize_with = "empty_string_as_none")]
    first_type: Option<String>,
    #[serde(rename = "Units for Type 1", default)]
    first_units: Option<u32>,
    #[serde(rename = "Type 2", default, deserialize_with = "empty_string_as_none")]
    second_type: Option<String>,
    #[serde(rename = "Units for Type 2", default)]
    second_units: Option<u32>,
    #[serde(rename = "Opening Date")]
    opens: String,
    #[serde(rename = "Closing Date")]
    closes: String,
    #[serde(rename = "Manager")]
    manager: String,
    #[serde(rename = "Officer Slot")]
    officer_slots: u32,
    #[serde(rename = "Visible", default, deserialize_with = "empty_string_as_none")]
    visible: Option<String>,
}

impl ProjectRow {
    fn into_import(self) -> Result<ProjectImport, String> {
        let manager = Nric::parse(&self.manager).map_err(|error| error.to_string())?;
        let window = DateWindow::new(parse_date(&self.opens)?, parse_date(&self.closes)?)
            .map_err(|error| error.to_string())?;

        let mut units = Vec::new();
        for (label, count) in [
            (self.first_type, self.first_units),
            (self.second_type, self.second_units),
        ] {
            if let Some(label) = label {
                let flat_type = label
                    .parse::<FlatType>()
                    .map_err(|error| error.to_string())?;
                units.push((flat_type, count.unwrap_or(0)));
            }
        }

        let visible = match self.visible.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("true") | Some("yes") | Some("on") => true,
            Some("false") | Some("no") | Some("off") => false,
            Some(other) => return Err(format!("unrecognised visibility '{other}'")),
        };

        Ok(ProjectImport {
            manager,
            draft: ProjectDraft {
                name: self.name,
                neighbourhood: self.neighbourhood,
                window,
                units,
                officer_slots: self.officer_slots,
                visible,
            },
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| format!("unrecognised date '{trimmed}'"))
}
