//! Hazard index tracking where clones stand.

use std::collections::BTreeMap;

use stackwalk_core::{CloneId, CommandRejection, Vector};

/// Registry of clone hazards keyed by cell.
///
/// A character sharing a cell with a clone should be dead.
#[derive(Clone, Debug, Default)]
pub struct CloneManager {
    by_position: BTreeMap<Vector, CloneId>,
    positions: BTreeMap<CloneId, Vector>,
    next_clone_id: u32,
}

impl CloneManager {
    /// Creates an empty hazard index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the clone occupying the provided cell, if any.
    #[must_use]
    pub fn get(&self, position: Vector) -> Option<CloneId> {
        self.by_position.get(&position).copied()
    }

    /// Cell occupied by the provided clone.
    #[must_use]
    pub fn position_of(&self, clone: CloneId) -> Option<Vector> {
        self.positions.get(&clone).copied()
    }

    /// Registers a clone at an unoccupied cell.
    pub fn spawn(&mut self, position: Vector) -> Result<CloneId, CommandRejection> {
        if self.by_position.contains_key(&position) {
            return Err(CommandRejection::CloneOccupied);
        }

        let clone = CloneId::new(self.next_clone_id);
        self.next_clone_id = self.next_clone_id.saturating_add(1);
        let _ = self.by_position.insert(position, clone);
        let _ = self.positions.insert(clone, position);
        Ok(clone)
    }

    /// Removes a clone, returning the cell it occupied.
    pub fn despawn(&mut self, clone: CloneId) -> Option<Vector> {
        let position = self.positions.remove(&clone)?;
        let _ = self.by_position.remove(&position);
        Some(position)
    }

    /// Iterator over clones and their cells in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (CloneId, Vector)> + '_ {
        self.positions
            .iter()
            .map(|(clone, position)| (*clone, *position))
    }

    /// Number of registered clones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Reports whether no clones are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
