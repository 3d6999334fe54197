//! Entity storage and the read-only world view handed to unit AI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{StructureId, UnitId};
use crate::config::MatchConfig;
use crate::structures::Structure;
use crate::units::Unit;

/// Id-keyed storage.
///
/// Ids are handed out in increasing order, so iterating the map in key order
/// is iterating in insertion order. Tie-breaking in target selection relies
/// on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(bound(
    serialize = "I: Serialize, T: Serialize",
    deserialize = "I: Deserialize<'de> + Ord, T: Deserialize<'de>"
))]
pub struct EntityStorage<I, T> {
    entities: BTreeMap<I, T>,
    next_id: u32,
}

impl<I, T> Default for EntityStorage<I, T> {
    fn default() -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<I: Copy + Ord + From<u32>, T> EntityStorage<I, T> {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id, build the entity with it and store it.
    pub fn insert_with(&mut self, build: impl FnOnce(I) -> T) -> I {
        let id = I::from(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, build(id));
        id
    }

    /// Remove an entity by id.
    pub fn remove(&mut self, id: I) -> Option<T> {
        self.entities.remove(&id)
    }

    /// Get an entity by id.
    #[must_use]
    pub fn get(&self, id: I) -> Option<&T> {
        self.entities.get(&id)
    }

    /// Get a mutable reference to an entity by id.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.entities.get_mut(&id)
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: I) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Snapshot of ids in insertion order.
    #[must_use]
    pub fn ids(&self) -> Vec<I> {
        self.entities.keys().copied().collect()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.entities.iter().map(|(id, entity)| (*id, entity))
    }

    /// Iterate entities in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.entities.values()
    }

    /// Drop every entity matching `predicate`, returning the removed ids.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Vec<I> {
        let doomed: Vec<I> = self
            .entities
            .iter()
            .filter(|(_, entity)| predicate(entity))
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            self.entities.remove(id);
        }
        doomed
    }
}

/// Unit collection.
pub type UnitStorage = EntityStorage<UnitId, Unit>;

/// Structure collection.
pub type StructureStorage = EntityStorage<StructureId, Structure>;

/// Read-only view of the match a unit decides against.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    /// Every unit, including ones killed earlier this tick.
    pub units: &'a UnitStorage,
    /// Every structure.
    pub structures: &'a StructureStorage,
    /// Match tuning.
    pub config: &'a MatchConfig,
    /// The structure whose loss ends the match.
    pub command_center: Option<StructureId>,
}

impl<'a> WorldView<'a> {
    /// The command center, if it still exists.
    #[must_use]
    pub fn command_center(&self) -> Option<&'a Structure> {
        self.command_center.and_then(|id| self.structures.get(id))
    }

    /// Intact walls in insertion order.
    pub fn intact_walls(&self) -> impl Iterator<Item = &'a Structure> {
        self.structures.values().filter(|s| s.is_intact_wall())
    }

    /// Living units in insertion order.
    pub fn living_units(&self) -> impl Iterator<Item = &'a Unit> {
        self.units.values().filter(|u| u.is_alive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_follow_insertion_order() {
        let mut storage: EntityStorage<UnitId, &str> = EntityStorage::new();
        let a = storage.insert_with(|_| "a");
        let b = storage.insert_with(|_| "b");
        storage.remove(a);
        let c = storage.insert_with(|_| "c");
        assert_eq!(storage.ids(), vec![b, c]);
        assert!(c > b);
        assert_eq!(storage.values().copied().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_insert_with_sees_assigned_id() {
        let mut storage: EntityStorage<StructureId, StructureId> = EntityStorage::new();
        let id = storage.insert_with(|id| id);
        assert_eq!(storage.get(id), Some(&id));
        assert_eq!(id, StructureId(1));
    }

    #[test]
    fn test_remove_where() {
        let mut storage: EntityStorage<UnitId, u32> = EntityStorage::new();
        for value in [0, 5, 0, 7] {
            storage.insert_with(|_| value);
        }
        let removed = storage.remove_where(|v| *v == 0);
        assert_eq!(removed, vec![UnitId(1), UnitId(3)]);
        assert_eq!(storage.len(), 2);
        assert!(!storage.contains(UnitId(1)));
    }
}
