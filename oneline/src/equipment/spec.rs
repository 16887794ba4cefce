//! Equipment kinds and their type-specific attribute sets.
//!
//! `EquipmentKind` is the closed tag set used for dispatch and grouping;
//! `EquipmentSpec` carries the attributes belonging to that kind. Both
//! serialize with the kind name (`"Generator"`, `"Bus"`, ...) as the `type`
//! field of an equipment record.

use serde::{Deserialize, Serialize};

/// Closed enumeration of the equipment types a diagram can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EquipmentKind {
    Generator,
    Transformer,
    Switchgear,
    Motor,
    Panel,
    Bus,
    Breaker,
    Relay,
    Load,
    Source,
    Other,
}

impl EquipmentKind {
    /// Every kind, in declaration order
    pub const ALL: [EquipmentKind; 11] = [
        EquipmentKind::Generator,
        EquipmentKind::Transformer,
        EquipmentKind::Switchgear,
        EquipmentKind::Motor,
        EquipmentKind::Panel,
        EquipmentKind::Bus,
        EquipmentKind::Breaker,
        EquipmentKind::Relay,
        EquipmentKind::Load,
        EquipmentKind::Source,
        EquipmentKind::Other,
    ];

    /// Lowercase identifier, used for icon references and generated ids
    pub fn slug(&self) -> &'static str {
        match self {
            EquipmentKind::Generator => "generator",
            EquipmentKind::Transformer => "transformer",
            EquipmentKind::Switchgear => "switchgear",
            EquipmentKind::Motor => "motor",
            EquipmentKind::Panel => "panel",
            EquipmentKind::Bus => "bus",
            EquipmentKind::Breaker => "breaker",
            EquipmentKind::Relay => "relay",
            EquipmentKind::Load => "load",
            EquipmentKind::Source => "source",
            EquipmentKind::Other => "other",
        }
    }

    /// Parse a kind from its display name or slug (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.slug().eq_ignore_ascii_case(value))
    }

    pub fn is_bus(&self) -> bool {
        matches!(self, EquipmentKind::Bus)
    }
}

impl std::fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EquipmentKind::Generator => "Generator",
            EquipmentKind::Transformer => "Transformer",
            EquipmentKind::Switchgear => "Switchgear",
            EquipmentKind::Motor => "Motor",
            EquipmentKind::Panel => "Panel",
            EquipmentKind::Bus => "Bus",
            EquipmentKind::Breaker => "Breaker",
            EquipmentKind::Relay => "Relay",
            EquipmentKind::Load => "Load",
            EquipmentKind::Source => "Source",
            EquipmentKind::Other => "Other",
        };
        f.pad(name)
    }
}

/// Rotating generation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorAttributes {
    /// Nameplate capacity in kW
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_kw: Option<f64>,

    /// Terminal voltage in volts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    /// Efficiency as a fraction (0.0 - 1.0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,

    /// Whether the unit is currently online
    #[serde(default)]
    pub running: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerAttributes {
    /// Rating in kVA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_kva: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_voltage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_voltage: Option<f64>,

    /// Percent impedance (%Z)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impedance_percent: Option<f64>,
}

/// Attributes shared by switchgear lineups and bus bars
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    /// Continuous current rating in amps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_rating: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotorAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horsepower: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    /// Main bus rating in amps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_rating: Option<f64>,

    /// Number of branch circuit positions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuits: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakerAttributes {
    /// Trip rating in amps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_rating: Option<f64>,

    /// Closed (conducting) when true
    #[serde(default = "default_closed")]
    pub closed: bool,
}

fn default_closed() -> bool {
    true
}

impl Default for BreakerAttributes {
    fn default() -> Self {
        Self {
            current_rating: None,
            closed: default_closed(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayAttributes {
    /// Protective function code (e.g. "50/51", "87T")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadAttributes {
    /// Demand in kW
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_kw: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_factor: Option<f64>,
}

/// Utility service or other upstream supply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    /// Available short-circuit capacity in MVA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_circuit_mva: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OtherAttributes {}

/// Kind tag plus the attributes that belong to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EquipmentSpec {
    Generator(GeneratorAttributes),
    Transformer(TransformerAttributes),
    Switchgear(DistributionAttributes),
    Motor(MotorAttributes),
    Panel(PanelAttributes),
    Bus(DistributionAttributes),
    Breaker(BreakerAttributes),
    Relay(RelayAttributes),
    Load(LoadAttributes),
    Source(SourceAttributes),
    Other(OtherAttributes),
}

impl EquipmentSpec {
    /// Default attribute set for a kind
    pub fn for_kind(kind: EquipmentKind) -> Self {
        match kind {
            EquipmentKind::Generator => EquipmentSpec::Generator(GeneratorAttributes::default()),
            EquipmentKind::Transformer => {
                EquipmentSpec::Transformer(TransformerAttributes::default())
            }
            EquipmentKind::Switchgear => {
                EquipmentSpec::Switchgear(DistributionAttributes::default())
            }
            EquipmentKind::Motor => EquipmentSpec::Motor(MotorAttributes::default()),
            EquipmentKind::Panel => EquipmentSpec::Panel(PanelAttributes::default()),
            EquipmentKind::Bus => EquipmentSpec::Bus(DistributionAttributes::default()),
            EquipmentKind::Breaker => EquipmentSpec::Breaker(BreakerAttributes::default()),
            EquipmentKind::Relay => EquipmentSpec::Relay(RelayAttributes::default()),
            EquipmentKind::Load => EquipmentSpec::Load(LoadAttributes::default()),
            EquipmentKind::Source => EquipmentSpec::Source(SourceAttributes::default()),
            EquipmentKind::Other => EquipmentSpec::Other(OtherAttributes::default()),
        }
    }

    pub fn kind(&self) -> EquipmentKind {
        match self {
            EquipmentSpec::Generator(_) => EquipmentKind::Generator,
            EquipmentSpec::Transformer(_) => EquipmentKind::Transformer,
            EquipmentSpec::Switchgear(_) => EquipmentKind::Switchgear,
            EquipmentSpec::Motor(_) => EquipmentKind::Motor,
            EquipmentSpec::Panel(_) => EquipmentKind::Panel,
            EquipmentSpec::Bus(_) => EquipmentKind::Bus,
            EquipmentSpec::Breaker(_) => EquipmentKind::Breaker,
            EquipmentSpec::Relay(_) => EquipmentKind::Relay,
            EquipmentSpec::Load(_) => EquipmentKind::Load,
            EquipmentSpec::Source(_) => EquipmentKind::Source,
            EquipmentSpec::Other(_) => EquipmentKind::Other,
        }
    }

    /// Operating voltage, where the kind has a single one
    ///
    /// Transformers report their secondary (load-side) voltage.
    pub fn voltage(&self) -> Option<f64> {
        match self {
            EquipmentSpec::Generator(a) => a.voltage,
            EquipmentSpec::Transformer(a) => a.secondary_voltage,
            EquipmentSpec::Switchgear(a) | EquipmentSpec::Bus(a) => a.voltage,
            EquipmentSpec::Motor(a) => a.voltage,
            EquipmentSpec::Panel(a) => a.voltage,
            EquipmentSpec::Load(a) => a.voltage,
            EquipmentSpec::Source(a) => a.voltage,
            EquipmentSpec::Breaker(_) | EquipmentSpec::Relay(_) | EquipmentSpec::Other(_) => None,
        }
    }
}

impl From<EquipmentKind> for EquipmentSpec {
    fn from(kind: EquipmentKind) -> Self {
        EquipmentSpec::for_kind(kind)
    }
}

impl Default for EquipmentSpec {
    fn default() -> Self {
        EquipmentSpec::Other(OtherAttributes::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_spec() {
        for kind in EquipmentKind::ALL {
            assert_eq!(EquipmentSpec::for_kind(kind).kind(), kind);
        }
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(EquipmentKind::parse("bus"), Some(EquipmentKind::Bus));
        assert_eq!(EquipmentKind::parse("Generator"), Some(EquipmentKind::Generator));
        assert_eq!(EquipmentKind::parse("meter"), None);
    }

    #[test]
    fn test_spec_serializes_with_type_tag() {
        let spec = EquipmentSpec::Generator(GeneratorAttributes {
            capacity_kw: Some(500.0),
            voltage: Some(480.0),
            efficiency: None,
            running: true,
        });
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "Generator");
        assert_eq!(json["capacityKw"], 500.0);
        assert_eq!(json["running"], true);
        assert!(json.get("efficiency").is_none());
    }

    #[test]
    fn test_breaker_defaults_closed() {
        let spec: EquipmentSpec = serde_json::from_str(r#"{"type":"Breaker"}"#).unwrap();
        match spec {
            EquipmentSpec::Breaker(attrs) => assert!(attrs.closed),
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_transformer_voltage_is_secondary() {
        let spec = EquipmentSpec::Transformer(TransformerAttributes {
            primary_voltage: Some(13_800.0),
            secondary_voltage: Some(480.0),
            ..Default::default()
        });
        assert_eq!(spec.voltage(), Some(480.0));
    }
}
