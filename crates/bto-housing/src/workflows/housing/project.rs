use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::domain::{DateWindow, FlatType, Nric, ProjectId};
use super::error::HousingError;
use super::inventory::{InventoryError, OfficerSlots, UnitCount, UnitInventory};

pub const MAX_OFFICER_SLOTS: u32 = 10;

/// Manager supplied details for a new project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub neighbourhood: String,
    pub window: DateWindow,
    pub units: Vec<(FlatType, u32)>,
    pub officer_slots: u32,
    #[serde(default)]
    pub visible: bool,
}

impl ProjectDraft {
    pub(crate) fn validate(&self) -> Result<(), HousingError> {
        if self.name.trim().is_empty() {
            return Err(HousingError::InvalidProject {
                reason: "project name is required".to_string(),
            });
        }
        DateWindow::new(self.window.opens, self.window.closes)?;
        if self.officer_slots > MAX_OFFICER_SLOTS {
            return Err(HousingError::InvalidProject {
                reason: format!(
                    "{} officer slots exceeds the maximum of {MAX_OFFICER_SLOTS}",
                    self.officer_slots
                ),
            });
        }
        Ok(())
    }
}

/// Housing project with its unit and officer inventories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub neighbourhood: String,
    pub window: DateWindow,
    pub visible: bool,
    pub manager: Nric,
    pub units: UnitInventory,
    pub officer_slots: OfficerSlots,
    pub officers: BTreeSet<Nric>,
}

impl Project {
    pub(crate) fn from_draft(id: ProjectId, manager: Nric, draft: ProjectDraft) -> Self {
        Self {
            id,
            name: draft.name,
            neighbourhood: draft.neighbourhood,
            window: draft.window,
            visible: draft.visible,
            manager,
            units: UnitInventory::with_totals(draft.units),
            officer_slots: OfficerSlots::with_total(draft.officer_slots),
            officers: BTreeSet::new(),
        }
    }

    pub fn is_managed_by(&self, nric: &Nric) -> bool {
        &self.manager == nric
    }

    pub fn is_handled_by(&self, nric: &Nric) -> bool {
        self.officers.contains(nric)
    }

    pub(crate) fn reserve_unit(&mut self, flat_type: FlatType) -> Result<u32, HousingError> {
        self.units
            .decrement(flat_type)
            .map_err(|error| self.inventory_error(error))
    }

    pub(crate) fn release_unit(&mut self, flat_type: FlatType) -> Result<u32, HousingError> {
        self.units
            .increment(flat_type)
            .map_err(|error| self.inventory_error(error))
    }

    pub(crate) fn resize_units(&mut self, flat_type: FlatType, total: u32) -> UnitCount {
        self.units.set_total(flat_type, total)
    }

    /// Seat an officer, claiming a slot unless they already hold one.
    pub(crate) fn assign_officer(&mut self, officer: &Nric) -> Result<(), HousingError> {
        if self.officers.contains(officer) {
            return Ok(());
        }
        self.officer_slots
            .claim()
            .map_err(|error| self.inventory_error(error))?;
        self.officers.insert(officer.clone());
        Ok(())
    }

    pub(crate) fn check_invariants(&self) -> Result<(), HousingError> {
        if !self.units.is_consistent() {
            return Err(HousingError::InconsistentSnapshot(format!(
                "project {} has more available units than built",
                self.id
            )));
        }
        if !self.officer_slots.is_consistent()
            || self.officers.len() as u32 > self.officer_slots.total
        {
            return Err(HousingError::InconsistentSnapshot(format!(
                "project {} has inconsistent officer slots",
                self.id
            )));
        }
        Ok(())
    }

    fn inventory_error(&self, error: InventoryError) -> HousingError {
        match error {
            InventoryError::NoUnitsAvailable(flat_type) => HousingError::NoUnitsAvailable {
                project: self.id.clone(),
                flat_type,
            },
            InventoryError::AtCapacity { flat_type, total } => HousingError::AtCapacity {
                project: self.id.clone(),
                flat_type,
                total,
            },
            InventoryError::NoSlotsAvailable => HousingError::NoSlotsAvailable {
                project: self.id.clone(),
            },
        }
    }
}
