use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::FlatType;

/// Total and available units for a single flat type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCount {
    pub total: u32,
    pub available: u32,
}

impl UnitCount {
    pub fn full(total: u32) -> Self {
        Self {
            total,
            available: total,
        }
    }

    pub fn booked(&self) -> u32 {
        self.total - self.available
    }
}

/// Counter failures, resolved to a project-scoped [`super::HousingError`] by the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("no {0} units available")]
    NoUnitsAvailable(FlatType),
    #[error("all {total} {flat_type} units already available")]
    AtCapacity { flat_type: FlatType, total: u32 },
    #[error("no officer slots available")]
    NoSlotsAvailable,
}

/// Per flat type unit counters of a project.
///
/// Every mutation keeps `available <= total`; `available >= 0` is carried by the type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitInventory {
    counts: BTreeMap<FlatType, UnitCount>,
}

impl UnitInventory {
    pub fn with_totals<I>(totals: I) -> Self
    where
        I: IntoIterator<Item = (FlatType, u32)>,
    {
        let counts = totals
            .into_iter()
            .map(|(flat_type, total)| (flat_type, UnitCount::full(total)))
            .collect();
        Self { counts }
    }

    pub fn count(&self, flat_type: FlatType) -> UnitCount {
        self.counts.get(&flat_type).copied().unwrap_or_default()
    }

    pub fn available(&self, flat_type: FlatType) -> u32 {
        self.count(flat_type).available
    }

    pub fn total(&self, flat_type: FlatType) -> u32 {
        self.count(flat_type).total
    }

    /// A project offers a flat type when it was built with at least one such unit.
    pub fn offers(&self, flat_type: FlatType) -> bool {
        self.total(flat_type) > 0
    }

    pub fn offered_types(&self) -> Vec<FlatType> {
        FlatType::ordered()
            .into_iter()
            .filter(|flat_type| self.offers(*flat_type))
            .collect()
    }

    pub fn can_increment(&self, flat_type: FlatType) -> bool {
        let count = self.count(flat_type);
        count.available < count.total
    }

    /// Consume one unit, returning the remaining availability.
    pub fn decrement(&mut self, flat_type: FlatType) -> Result<u32, InventoryError> {
        let count = match self.counts.get_mut(&flat_type) {
            Some(count) if count.available > 0 => count,
            _ => return Err(InventoryError::NoUnitsAvailable(flat_type)),
        };
        count.available -= 1;
        let remaining = count.available;
        debug_assert!(self.is_consistent());
        Ok(remaining)
    }

    /// Return one unit, returning the new availability.
    pub fn increment(&mut self, flat_type: FlatType) -> Result<u32, InventoryError> {
        let total = self.total(flat_type);
        let count = match self.counts.get_mut(&flat_type) {
            Some(count) if count.available < count.total => count,
            _ => return Err(InventoryError::AtCapacity { flat_type, total }),
        };
        count.available += 1;
        let available = count.available;
        debug_assert!(self.is_consistent());
        Ok(available)
    }

    /// Resize a flat type; availability is clamped to the new total.
    pub fn set_total(&mut self, flat_type: FlatType, new_total: u32) -> UnitCount {
        let count = self.counts.entry(flat_type).or_default();
        count.total = new_total;
        count.available = count.available.min(new_total);
        let updated = *count;
        debug_assert!(self.is_consistent());
        updated
    }

    pub fn is_consistent(&self) -> bool {
        self.counts
            .values()
            .all(|count| count.available <= count.total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlatType, UnitCount)> + '_ {
        self.counts
            .iter()
            .map(|(flat_type, count)| (*flat_type, *count))
    }
}

/// Seats for officers handling a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerSlots {
    pub total: u32,
    pub available: u32,
}

impl OfficerSlots {
    pub fn with_total(total: u32) -> Self {
        Self {
            total,
            available: total,
        }
    }

    pub fn claim(&mut self) -> Result<u32, InventoryError> {
        if self.available == 0 {
            return Err(InventoryError::NoSlotsAvailable);
        }
        self.available -= 1;
        Ok(self.available)
    }

    pub fn is_consistent(&self) -> bool {
        self.available <= self.total
    }
}
