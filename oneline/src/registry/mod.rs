//! Equipment Registry
//!
//! The registry owns every piece of equipment in a diagram and is the only
//! place links are created or removed, so `source_ids`/`load_ids` stay
//! mutually consistent:
//! - `A` lists `B` as a load exactly when `B` lists `A` as a source
//! - no id appears twice in one list
//! - cycles are allowed; every traversal here is visited-set guarded
//!
//! Registries are ordinary values. Create one per diagram, pass it by
//! reference, and drop or [`Registry::clear`] it when the diagram goes away.

pub mod shared;

use indexmap::IndexMap;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

use crate::equipment::{Equipment, EquipmentKind, EquipmentRecord, EquipmentSpec};

pub use shared::SharedRegistry;

/// Errors raised by registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Equipment with id '{0}' already exists")]
    DuplicateId(String),

    #[error("Unknown equipment: {0}")]
    UnknownEquipment(String),

    #[error("Registry lock poisoned")]
    LockPoisoned,
}

/// A source → load reference that could not be linked during a rebuild
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanglingLink {
    pub source: String,
    pub load: String,
}

/// Outcome of [`Registry::rebuild_connections`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildSummary {
    /// Links newly established by this rebuild
    pub links_created: usize,

    /// References to ids that are not in the registry
    pub dangling: Vec<DanglingLink>,
}

/// Statistics about a registry's contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub equipment_count: usize,
    pub connection_count: usize,
    pub bus_count: usize,
    /// Equipment with no sources
    pub root_count: usize,
    /// Equipment with neither sources nor loads
    pub isolated_count: usize,
    pub by_kind: BTreeMap<EquipmentKind, usize>,
}

/// Identity map and link manager for a single diagram
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// Keyed by id, in insertion order
    equipment: IndexMap<String, Equipment>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.equipment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equipment.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.equipment.contains_key(id)
    }

    /// Create a new piece of equipment
    ///
    /// Fails with [`RegistryError::DuplicateId`] if the id is taken; the
    /// existing equipment is never overwritten.
    pub fn create(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        spec: impl Into<EquipmentSpec>,
    ) -> Result<&mut Equipment, RegistryError> {
        self.insert_detached(Equipment::new(id, name, spec))
    }

    /// Create equipment under a freshly generated id (`"<kind>-<uuid>"`)
    pub fn create_with_generated_id(
        &mut self,
        name: impl Into<String>,
        spec: impl Into<EquipmentSpec>,
    ) -> &mut Equipment {
        let spec = spec.into();
        let mut id = generate_id(spec.kind());
        while self.contains(&id) {
            id = generate_id(spec.kind());
        }
        let equipment = Equipment::new(id.clone(), name, spec);
        self.equipment.entry(id).or_insert(equipment)
    }

    /// Insert equipment reconstructed from a record, without its links
    pub fn restore(&mut self, record: EquipmentRecord) -> Result<&mut Equipment, RegistryError> {
        self.insert_detached(Equipment::from_record(record))
    }

    fn insert_detached(&mut self, equipment: Equipment) -> Result<&mut Equipment, RegistryError> {
        let id = equipment.id().to_string();
        if self.equipment.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        Ok(self.equipment.entry(id).or_insert(equipment))
    }

    /// Look up equipment by id
    pub fn get(&self, id: &str) -> Option<&Equipment> {
        self.equipment.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Equipment> {
        self.equipment.get_mut(id)
    }

    /// Look up equipment by id, returning `None` if it is not of `kind`
    pub fn get_of_kind(&self, id: &str, kind: EquipmentKind) -> Option<&Equipment> {
        self.get(id).filter(|e| e.kind() == kind)
    }

    /// Iterate over all equipment in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Equipment> {
        self.equipment.values()
    }

    /// All equipment, in insertion order
    pub fn all(&self) -> Vec<&Equipment> {
        self.iter().collect()
    }

    /// All equipment of one kind, in insertion order
    pub fn all_of_kind(&self, kind: EquipmentKind) -> Vec<&Equipment> {
        self.iter().filter(|e| e.kind() == kind).collect()
    }

    /// Owned copy of every piece of equipment, in insertion order
    pub fn snapshot(&self) -> Vec<Equipment> {
        self.iter().cloned().collect()
    }

    /// Link `source` → `load`, updating both sides
    ///
    /// Re-adding an existing link is a no-op.
    pub fn add_load(&mut self, source: &str, load: &str) -> Result<(), RegistryError> {
        self.link(source, load).map(|_| ())
    }

    /// Link `source` → `load`, seen from the load's side
    pub fn add_source(&mut self, load: &str, source: &str) -> Result<(), RegistryError> {
        self.link(source, load).map(|_| ())
    }

    /// Returns whether a new link was made
    fn link(&mut self, source: &str, load: &str) -> Result<bool, RegistryError> {
        for id in [source, load] {
            if !self.contains(id) {
                return Err(RegistryError::UnknownEquipment(id.to_string()));
            }
        }

        let mut created = false;
        if let Some(s) = self.equipment.get_mut(source) {
            created |= s.push_load(load);
        }
        if let Some(l) = self.equipment.get_mut(load) {
            created |= l.push_source(source);
        }
        Ok(created)
    }

    /// Remove the `source` → `load` link from both sides
    ///
    /// Returns whether anything was removed; unknown ids and absent links are
    /// a no-op.
    pub fn remove_load(&mut self, source: &str, load: &str) -> bool {
        let mut removed = false;
        if let Some(s) = self.equipment.get_mut(source) {
            removed |= s.drop_load(load);
        }
        if let Some(l) = self.equipment.get_mut(load) {
            removed |= l.drop_source(source);
        }
        removed
    }

    /// Remove the `source` → `load` link, seen from the load's side
    pub fn remove_source(&mut self, load: &str, source: &str) -> bool {
        self.remove_load(source, load)
    }

    /// True if `a` and `b` are linked in either direction
    pub fn is_connected(&self, a: &str, b: &str) -> bool {
        self.get(a).map(|e| e.is_connected_to(b)).unwrap_or(false)
    }

    /// Every piece of equipment directly linked to `id` as a source or load
    pub fn connections(&self, id: &str) -> Vec<&Equipment> {
        let Some(equipment) = self.get(id) else {
            return Vec::new();
        };

        equipment
            .connection_ids()
            .into_iter()
            .filter_map(|other| self.get(other))
            .collect()
    }

    /// Link `source_id` → `load_id` if both exist
    ///
    /// Returns `false`, leaving the registry untouched, when either id is
    /// unknown.
    pub fn connect_by_id(&mut self, source_id: &str, load_id: &str) -> bool {
        self.add_load(source_id, load_id).is_ok()
    }

    /// Delete equipment, severing every link to and from it
    pub fn remove(&mut self, id: &str) -> Option<Equipment> {
        let mut equipment = self.equipment.shift_remove(id)?;

        for load in equipment.load_ids().to_vec() {
            if let Some(l) = self.equipment.get_mut(&load) {
                l.drop_source(id);
            }
            equipment.drop_load(&load);
        }
        for source in equipment.source_ids().to_vec() {
            if let Some(s) = self.equipment.get_mut(&source) {
                s.drop_load(id);
            }
            equipment.drop_source(&source);
        }

        tracing::debug!("Removed equipment {}", id);
        Some(equipment)
    }

    /// Drop every piece of equipment
    pub fn clear(&mut self) {
        self.equipment.clear();
    }

    /// Serialize every piece of equipment, in insertion order
    pub fn to_records(&self) -> Vec<EquipmentRecord> {
        self.iter().map(Equipment::to_record).collect()
    }

    /// Re-establish the links described by a batch of records
    ///
    /// The equipment must already be in the registry (see
    /// [`Registry::restore`]). Both `load_ids` and `source_ids` are honoured;
    /// they describe the same edges from either end, so the result does not
    /// depend on record order. Afterwards each equipment's lists are ordered
    /// as in its record. Running it twice changes nothing.
    pub fn rebuild_connections(&mut self, records: &[EquipmentRecord]) -> RebuildSummary {
        let mut summary = RebuildSummary::default();
        let mut seen_dangling: HashSet<(String, String)> = HashSet::new();

        let edges = records.iter().flat_map(|record| {
            let loads = record
                .load_ids
                .iter()
                .map(move |load| (record.id.as_str(), load.as_str()));
            let sources = record
                .source_ids
                .iter()
                .map(move |source| (source.as_str(), record.id.as_str()));
            loads.chain(sources)
        });

        for (source, load) in edges {
            match self.link(source, load) {
                Ok(true) => summary.links_created += 1,
                Ok(false) => {}
                Err(_) => {
                    if seen_dangling.insert((source.to_string(), load.to_string())) {
                        tracing::warn!("Skipping link {} -> {}: unknown equipment", source, load);
                        summary.dangling.push(DanglingLink {
                            source: source.to_string(),
                            load: load.to_string(),
                        });
                    }
                }
            }
        }

        for record in records {
            if let Some(equipment) = self.equipment.get_mut(&record.id) {
                equipment.align_links_with(record);
            }
        }

        summary
    }

    /// Replace the registry's contents with a saved diagram
    ///
    /// Either every record is restored and linked, or the registry is left
    /// as it was (duplicate ids in the batch).
    pub fn load_records(
        &mut self,
        records: &[EquipmentRecord],
    ) -> Result<RebuildSummary, RegistryError> {
        let mut fresh = Registry::new();
        for record in records {
            fresh.restore(record.clone())?;
        }
        let summary = fresh.rebuild_connections(records);
        tracing::debug!(
            "Loaded {} equipment records ({} links, {} dangling)",
            fresh.len(),
            summary.links_created,
            summary.dangling.len()
        );
        *self = fresh;
        Ok(summary)
    }

    /// Find a chain of connections from `start` to `goal`
    ///
    /// Depth-first over [`Registry::connections`] (direction ignored); returns
    /// the first path discovered, `[start]` when `start == goal`, and `None`
    /// when either id is unknown or no chain exists.
    pub fn find_path(&self, start: &str, goal: &str) -> Option<Vec<&Equipment>> {
        let start = self.get(start)?;
        if !self.contains(goal) {
            return None;
        }

        let mut visited = HashSet::new();
        let mut path = Vec::new();
        if self.search(start, goal, &mut visited, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn search<'a>(
        &'a self,
        current: &'a Equipment,
        goal: &str,
        visited: &mut HashSet<&'a str>,
        path: &mut Vec<&'a Equipment>,
    ) -> bool {
        visited.insert(current.id());
        path.push(current);

        if current.id() == goal {
            return true;
        }

        for next_id in current.connection_ids() {
            if visited.contains(next_id) {
                continue;
            }
            if let Some(next) = self.get(next_id) {
                if self.search(next, goal, visited, path) {
                    return true;
                }
            }
        }

        path.pop();
        false
    }

    /// Equipment with no sources, in insertion order
    pub fn roots(&self) -> Vec<&Equipment> {
        self.iter().filter(|e| e.source_ids().is_empty()).collect()
    }

    /// Directed source → load graph over equipment ids
    ///
    /// Nodes and edges appear in registry order.
    pub fn to_graph(&self) -> DiGraphMap<&str, ()> {
        let mut graph = DiGraphMap::new();
        for equipment in self.iter() {
            graph.add_node(equipment.id());
        }
        for equipment in self.iter() {
            for load in equipment.load_ids() {
                if let Some(target) = self.get(load) {
                    graph.add_edge(equipment.id(), target.id(), ());
                }
            }
        }
        graph
    }

    /// True if following source → load links can lead back to the start
    pub fn has_cycle(&self) -> bool {
        is_cyclic_directed(&self.to_graph())
    }

    pub fn stats(&self) -> RegistryStats {
        let mut by_kind = BTreeMap::new();
        for equipment in self.iter() {
            *by_kind.entry(equipment.kind()).or_insert(0) += 1;
        }

        RegistryStats {
            equipment_count: self.len(),
            connection_count: self.iter().map(|e| e.load_ids().len()).sum(),
            bus_count: by_kind.get(&EquipmentKind::Bus).copied().unwrap_or(0),
            root_count: self.roots().len(),
            isolated_count: self
                .iter()
                .filter(|e| e.source_ids().is_empty() && e.load_ids().is_empty())
                .count(),
            by_kind,
        }
    }
}

fn generate_id(kind: EquipmentKind) -> String {
    format!("{}-{}", kind.slug(), uuid::Uuid::new_v4())
}
