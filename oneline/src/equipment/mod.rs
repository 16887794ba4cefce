//! Equipment Model
//!
//! An `Equipment` is one node of the single-line diagram: a named, typed
//! piece of gear together with the ids of the equipment feeding it
//! (`source_ids`) and the equipment it feeds (`load_ids`).
//!
//! The adjacency lists can only be changed through the owning
//! [`Registry`](crate::registry::Registry), which keeps both directions of
//! every link in step.

mod spec;

pub use spec::{
    BreakerAttributes, DistributionAttributes, EquipmentKind, EquipmentSpec, GeneratorAttributes,
    LoadAttributes, MotorAttributes, OtherAttributes, PanelAttributes, RelayAttributes,
    SourceAttributes, TransformerAttributes,
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form key/value data attached to a piece of equipment
pub type Metadata = Map<String, Value>;

/// Position on the drawing canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Serialized form of a piece of equipment
///
/// Subtype attributes are flattened next to the base fields, so a generator
/// record looks like
/// `{"id":"G1","name":"Gen 1","type":"Generator","capacityKw":500.0,...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRecord {
    pub id: String,

    pub name: String,

    /// `type` tag plus the attributes for that type
    #[serde(flatten)]
    pub spec: EquipmentSpec,

    #[serde(default)]
    pub source_ids: Vec<String>,

    #[serde(default)]
    pub load_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl EquipmentRecord {
    pub fn kind(&self) -> EquipmentKind {
        self.spec.kind()
    }
}

/// A piece of equipment in the diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Equipment {
    id: String,
    name: String,
    spec: EquipmentSpec,
    source_ids: Vec<String>,
    load_ids: Vec<String>,
    position: Position,
    metadata: Option<Metadata>,
}

impl Equipment {
    /// Create a detached piece of equipment with no connections
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        spec: impl Into<EquipmentSpec>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            spec: spec.into(),
            source_ids: Vec::new(),
            load_ids: Vec::new(),
            position: Position::default(),
            metadata: None,
        }
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata_mut().insert(key.into(), value.into());
        self
    }

    /// Reconstruct equipment from its serialized record
    ///
    /// The record's `source_ids`/`load_ids` are not applied here: links are
    /// restored registry-wide by
    /// [`Registry::rebuild_connections`](crate::registry::Registry::rebuild_connections)
    /// so that both sides always agree.
    pub fn from_record(record: EquipmentRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            spec: record.spec,
            source_ids: Vec::new(),
            load_ids: Vec::new(),
            position: record.position.unwrap_or_default(),
            metadata: record.metadata,
        }
    }

    /// Serialize to a record, including the current adjacency lists
    pub fn to_record(&self) -> EquipmentRecord {
        EquipmentRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            spec: self.spec.clone(),
            source_ids: self.source_ids.clone(),
            load_ids: self.load_ids.clone(),
            position: Some(self.position),
            metadata: self.metadata.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn kind(&self) -> EquipmentKind {
        self.spec.kind()
    }

    pub fn is_bus(&self) -> bool {
        self.kind().is_bus()
    }

    pub fn spec(&self) -> &EquipmentSpec {
        &self.spec
    }

    /// Mutable access to the type-specific attributes
    ///
    /// Replacing the spec with one of a different kind is allowed; ids and
    /// links are unaffected.
    pub fn spec_mut(&mut self) -> &mut EquipmentSpec {
        &mut self.spec
    }

    /// Ids of the equipment feeding this one, in link order
    pub fn source_ids(&self) -> &[String] {
        &self.source_ids
    }

    /// Ids of the equipment fed by this one, in link order
    pub fn load_ids(&self) -> &[String] {
        &self.load_ids
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.position = Position::new(x, y);
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        self.metadata.get_or_insert_with(Map::new)
    }

    pub fn has_load(&self, id: &str) -> bool {
        self.load_ids.iter().any(|l| l == id)
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.source_ids.iter().any(|s| s == id)
    }

    /// True if `other` feeds or is fed by this equipment
    pub fn is_connected_to(&self, other: &str) -> bool {
        self.has_load(other) || self.has_source(other)
    }

    /// Ids of every directly linked equipment, sources first, without repeats
    pub fn connection_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.source_ids.len() + self.load_ids.len());
        for id in self.source_ids.iter().chain(self.load_ids.iter()) {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        ids
    }

    pub(crate) fn push_load(&mut self, id: &str) -> bool {
        if self.has_load(id) {
            return false;
        }
        self.load_ids.push(id.to_string());
        true
    }

    pub(crate) fn push_source(&mut self, id: &str) -> bool {
        if self.has_source(id) {
            return false;
        }
        self.source_ids.push(id.to_string());
        true
    }

    pub(crate) fn drop_load(&mut self, id: &str) -> bool {
        let before = self.load_ids.len();
        self.load_ids.retain(|l| l != id);
        before != self.load_ids.len()
    }

    pub(crate) fn drop_source(&mut self, id: &str) -> bool {
        let before = self.source_ids.len();
        self.source_ids.retain(|s| s != id);
        before != self.source_ids.len()
    }

    /// Reorder both adjacency lists to follow the order given in `record`
    ///
    /// Ids the record does not mention keep their relative order at the end.
    pub(crate) fn align_links_with(&mut self, record: &EquipmentRecord) {
        align(&mut self.source_ids, &record.source_ids);
        align(&mut self.load_ids, &record.load_ids);
    }
}

fn align(ids: &mut [String], order: &[String]) {
    ids.sort_by_key(|id| order.iter().position(|o| o == id).unwrap_or(usize::MAX));
}
