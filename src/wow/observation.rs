use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::wow::{Slot, convert, round2};

/// Raw state strings the host uses for sensors without a reading.
const UNAVAILABLE_STATES: [&str; 2] = ["unknown", "unavailable"];

/// Current value of a host sensor, as the host reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorState {
    pub value: String,

    pub unit: Option<String>,
}

impl SensorState {
    pub fn new(value: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            value: value.into(),
            unit: unit.map(str::to_owned),
        }
    }
}

/// Read access to the host's sensor states, keyed by entity id.
pub trait StateLookup {
    fn lookup(&self, entity_id: &str) -> Option<SensorState>;
}

impl StateLookup for HashMap<String, SensorState> {
    fn lookup(&self, entity_id: &str) -> Option<SensorState> {
        self.get(entity_id).cloned()
    }
}

/// Which host entity feeds each slot. Slots without a binding are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SensorBindings(IndexMap<Slot, String>);

impl SensorBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `slot` to `entity_id`. A blank id removes the binding.
    pub fn bind(&mut self, slot: Slot, entity_id: impl Into<String>) {
        let entity_id = entity_id.into();
        if entity_id.trim().is_empty() {
            self.0.shift_remove(&slot);
            return;
        }

        self.0.insert(slot, entity_id.trim().to_owned());
    }

    pub fn with(mut self, slot: Slot, entity_id: impl Into<String>) -> Self {
        self.bind(slot, entity_id);
        self
    }

    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.0.get(&slot).map(String::as_str)
    }

    /// Bound slots in upload order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &str)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|id| (slot, id)))
    }

    pub fn entity_ids(&self) -> Vec<String> {
        self.iter().map(|(_, id)| id.to_owned()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Converted readings keyed by wire parameter name, in slot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation(IndexMap<&'static str, f64>);

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` rounded to two decimal places.
    pub fn insert(&mut self, wire_name: &'static str, value: f64) {
        self.0.insert(wire_name, round2(value));
    }

    pub fn get(&self, wire_name: &str) -> Option<f64> {
        self.0.get(wire_name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.0.iter().map(|(name, value)| (*name, *value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Reads every bound sensor and converts it into an [`Observation`].
///
/// Sensors that are missing, unavailable, or not numeric are skipped; the
/// remaining slots are still collected.
pub fn collect(bindings: &SensorBindings, states: &impl StateLookup) -> Observation {
    let mut observation = Observation::new();

    for (slot, entity_id) in bindings.iter() {
        let Some(state) = states.lookup(entity_id) else {
            debug!(entity_id, slot = slot.as_str(), "sensor not found");
            continue;
        };

        let raw = state.value.trim();
        if raw.is_empty() || UNAVAILABLE_STATES.contains(&raw) {
            debug!(entity_id, slot = slot.as_str(), "sensor is unavailable");
            continue;
        }

        let value = match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!(entity_id, value = raw, "could not parse sensor value");
                continue;
            }
        };

        let unit = state.unit.as_deref();
        let category = slot.category();
        let converted = convert(value, category, unit);
        debug!(
            entity_id,
            category = category.as_str(),
            value,
            unit = unit.unwrap_or(""),
            converted,
            "converted sensor value"
        );

        observation.insert(slot.wire_name(), converted);
    }

    observation
}
