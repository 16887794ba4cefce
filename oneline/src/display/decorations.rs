//! Per-kind text decorations (ratings, voltages, status flags).

use super::{Anchor, TextDecoration};
use crate::equipment::EquipmentSpec;

/// Vertical distance between stacked decorations on the same side
const LINE_HEIGHT: f64 = 14.0;

const STATUS_ON_COLOR: &str = "#2e7d32";
const STATUS_OFF_COLOR: &str = "#c62828";

/// Decorations for a piece of equipment, selected by its kind
pub fn decorations_for(spec: &EquipmentSpec) -> Vec<TextDecoration> {
    let mut side = Stack::new(Anchor::Right);
    let mut extra = Vec::new();

    match spec {
        EquipmentSpec::Generator(a) => {
            side.push(a.capacity_kw.map(|kw| format!("{} kW", number(kw))));
            side.push(a.voltage.map(voltage));
            let (status, color) = if a.running {
                ("ON", STATUS_ON_COLOR)
            } else {
                ("OFF", STATUS_OFF_COLOR)
            };
            extra.push(TextDecoration::new(status, Anchor::Top).with_color(color));
        }
        EquipmentSpec::Transformer(a) => {
            side.push(a.rating_kva.map(|kva| format!("{} kVA", number(kva))));
            side.push(match (a.primary_voltage, a.secondary_voltage) {
                (Some(p), Some(s)) => Some(format!("{} / {}", voltage(p), voltage(s))),
                (Some(v), None) | (None, Some(v)) => Some(voltage(v)),
                (None, None) => None,
            });
            side.push(a.impedance_percent.map(|z| format!("Z={}%", number(z))));
        }
        EquipmentSpec::Switchgear(a) => {
            side.push(a.voltage.map(voltage));
            side.push(a.current_rating.map(amps));
        }
        EquipmentSpec::Motor(a) => {
            side.push(a.horsepower.map(|hp| format!("{} HP", number(hp))));
            side.push(a.voltage.map(voltage));
        }
        EquipmentSpec::Panel(a) => {
            side.push(a.voltage.map(voltage));
            side.push(a.current_rating.map(amps));
            side.push(a.circuits.map(|c| format!("{} ckt", c)));
        }
        EquipmentSpec::Bus(a) => {
            // Buses are resized to their connections, keep the label off the bar
            if let Some(v) = a.voltage {
                extra.push(TextDecoration::new(voltage(v), Anchor::Left).with_offset(-4.0, 0.0));
            }
        }
        EquipmentSpec::Breaker(a) => {
            side.push(a.current_rating.map(amps));
            let (status, color) = if a.closed {
                ("CLOSED", STATUS_ON_COLOR)
            } else {
                ("OPEN", STATUS_OFF_COLOR)
            };
            extra.push(TextDecoration::new(status, Anchor::Left).with_color(color));
        }
        EquipmentSpec::Relay(a) => {
            if let Some(function) = &a.function {
                extra.push(TextDecoration::new(function.clone(), Anchor::Center));
            }
        }
        EquipmentSpec::Load(a) => {
            side.push(a.demand_kw.map(|kw| format!("{} kW", number(kw))));
            side.push(a.voltage.map(voltage));
            side.push(a.power_factor.map(|pf| format!("PF {}", number(pf))));
        }
        EquipmentSpec::Source(a) => {
            side.push(a.voltage.map(voltage));
            side.push(a.short_circuit_mva.map(|mva| format!("{} MVA SC", number(mva))));
        }
        EquipmentSpec::Other(_) => {}
    }

    let mut decorations = side.finish();
    decorations.extend(extra);
    decorations
}

/// Decorations on one side, each a line below the previous
struct Stack {
    anchor: Anchor,
    items: Vec<TextDecoration>,
}

impl Stack {
    fn new(anchor: Anchor) -> Self {
        Self {
            anchor,
            items: Vec::new(),
        }
    }

    fn push(&mut self, text: Option<String>) {
        let Some(text) = text else {
            return;
        };
        let line = self.items.len() as f64;
        let mut decoration = TextDecoration::new(text, self.anchor);
        if line > 0.0 {
            decoration = decoration.with_offset(0.0, line * LINE_HEIGHT);
        }
        self.items.push(decoration);
    }

    fn finish(self) -> Vec<TextDecoration> {
        self.items
    }
}

/// Two-decimal number without trailing zeros ("480", "13.8", "0.85")
fn number(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    format!("{}", rounded)
}

fn voltage(volts: f64) -> String {
    if volts.abs() >= 1000.0 {
        format!("{} kV", number(volts / 1000.0))
    } else {
        format!("{} V", number(volts))
    }
}

fn amps(current: f64) -> String {
    format!("{} A", number(current))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Offset, TextAlign};
    use crate::equipment::{
        BreakerAttributes, DistributionAttributes, EquipmentKind, GeneratorAttributes,
        TransformerAttributes,
    };

    fn texts(decorations: &[TextDecoration]) -> Vec<&str> {
        decorations.iter().map(|d| d.text.as_str()).collect()
    }

    #[test]
    fn test_generator_decorations() {
        let spec = EquipmentSpec::Generator(GeneratorAttributes {
            capacity_kw: Some(500.0),
            voltage: Some(480.0),
            efficiency: Some(0.95),
            running: false,
        });

        let decorations = decorations_for(&spec);

        assert_eq!(texts(&decorations), vec!["500 kW", "480 V", "OFF"]);
        assert_eq!(decorations[0].anchor, Anchor::Right);
        assert_eq!(decorations[0].align, TextAlign::Left);
        assert_eq!(decorations[1].offset, Some(Offset { dx: 0.0, dy: 14.0 }));
        assert_eq!(decorations[2].color.as_deref(), Some(STATUS_OFF_COLOR));
    }

    #[test]
    fn test_bus_gets_voltage_only() {
        let spec = EquipmentSpec::Bus(DistributionAttributes {
            voltage: Some(13_800.0),
            current_rating: Some(2000.0),
        });

        let decorations = decorations_for(&spec);

        assert_eq!(texts(&decorations), vec!["13.8 kV"]);
        assert_eq!(decorations[0].anchor, Anchor::Left);
    }

    #[test]
    fn test_transformer_voltage_pair() {
        let spec = EquipmentSpec::Transformer(TransformerAttributes {
            rating_kva: Some(1500.0),
            primary_voltage: Some(13_800.0),
            secondary_voltage: Some(480.0),
            impedance_percent: Some(5.75),
        });

        assert_eq!(
            texts(&decorations_for(&spec)),
            vec!["1500 kVA", "13.8 kV / 480 V", "Z=5.75%"]
        );
    }

    #[test]
    fn test_missing_attributes_are_skipped() {
        let decorations = decorations_for(&EquipmentSpec::for_kind(EquipmentKind::Motor));
        assert!(decorations.is_empty());

        let decorations = decorations_for(&EquipmentSpec::for_kind(EquipmentKind::Other));
        assert!(decorations.is_empty());
    }

    #[test]
    fn test_open_breaker_status() {
        let spec = EquipmentSpec::Breaker(BreakerAttributes {
            current_rating: Some(400.0),
            closed: false,
        });

        assert_eq!(texts(&decorations_for(&spec)), vec!["400 A", "OPEN"]);
    }
}
