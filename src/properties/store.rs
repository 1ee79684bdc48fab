use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::name::PropName;
use crate::utils::ModelError;

/// Stable handle into a [`PropertyStore`]. Function nodes and the physics
/// components hold ids, never owned copies; the store is the single owner of
/// every property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub(crate) usize);

#[derive(Debug, Clone)]
pub struct Property {
    pub key: String,
    pub unit: String,
    value: f32,
}

impl Property {
    fn new(name: &PropName) -> Self {
        // tunable gains default to 1 so an absent tuning entry is a no-op
        let value = if name.root() == "tune" { 1.0 } else { 0.0 };
        Property {
            key: name.key(),
            unit: name.unit.clone(),
            value,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Named scalar state backing the whole simulation. Properties are created
/// lazily on first reference and live for the lifetime of the model;
/// iteration order is lexicographic by canonical key so debug dumps are
/// reproducible.
#[derive(Debug, Default)]
pub struct PropertyStore {
    entries: Vec<Property>,
    by_key: BTreeMap<String, PropertyId>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, identifier: &str) -> PropertyId {
        self.get_or_create_name(&PropName::parse(identifier))
    }

    pub fn get_or_create_name(&mut self, name: &PropName) -> PropertyId {
        let key = name.key();
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = PropertyId(self.entries.len());
        self.entries.push(Property::new(name));
        self.by_key.insert(key, id);
        id
    }

    pub fn lookup(&self, identifier: &str) -> Option<PropertyId> {
        self.by_key.get(&PropName::parse(identifier).key()).copied()
    }

    pub fn value(&self, id: PropertyId) -> f32 {
        self.entries[id.0].value
    }

    pub fn set_value(&mut self, id: PropertyId, value: f32) {
        self.entries[id.0].value = value;
    }

    pub fn property(&self, id: PropertyId) -> &Property {
        &self.entries[id.0]
    }

    pub fn get(&self, identifier: &str) -> Option<f32> {
        self.lookup(identifier).map(|id| self.value(id))
    }

    /// Lenient set: unknown identifiers are a logged no-op. Use [`try_set`]
    /// where a typo must not pass silently.
    ///
    /// [`try_set`]: PropertyStore::try_set
    pub fn set(&mut self, identifier: &str, value: f32) {
        match self.lookup(identifier) {
            Some(id) => self.set_value(id, value),
            None => warn!(identifier, "property not found"),
        }
    }

    pub fn try_set(&mut self, identifier: &str, value: f32) -> Result<(), ModelError> {
        match self.lookup(identifier) {
            Some(id) => {
                self.set_value(id, value);
                Ok(())
            }
            None => Err(ModelError::UnknownProperty(identifier.to_owned())),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in creation order, with their ids. Serialization relies on
    /// this order matching the id values.
    pub fn records(&self) -> impl Iterator<Item = (PropertyId, &Property)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, p)| (PropertyId(i), p))
    }

    /// Append an entry restored from a serialized record. Ids are assigned in
    /// call order, so records must arrive in their original creation order.
    pub fn push_record(&mut self, key: String, unit: String, value: f32) -> PropertyId {
        let id = PropertyId(self.entries.len());
        self.by_key.insert(key.clone(), id);
        self.entries.push(Property { key, unit, value });
        id
    }

    /// Entries in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.by_key
            .iter()
            .map(move |(k, &id)| (k.as_str(), &self.entries[id.0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_resolves_to_same_property() {
        let mut store = PropertyStore::new();
        let a = store.get_or_create("aero/qbar-psf");
        let b = store.get_or_create("aero/qbar-1?");
        assert_eq!(a, b);
        store.set_value(a, 42.0);
        assert_eq!(store.value(b), 42.0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn array_indices_are_distinct() {
        let mut store = PropertyStore::new();
        let a = store.get_or_create("fcs/flap-pos-norm[0]");
        let b = store.get_or_create("fcs/flap-pos-norm[1]");
        assert_ne!(a, b);
    }

    #[test]
    fn tune_defaults_to_one() {
        let mut store = PropertyStore::new();
        let t = store.get_or_create("tune/cl-gain");
        let o = store.get_or_create("aero/alpha-rad");
        assert_eq!(store.value(t), 1.0);
        assert_eq!(store.value(o), 0.0);
    }

    #[test]
    fn set_unknown_is_a_noop() {
        let mut store = PropertyStore::new();
        store.set("aero/never-created", 3.0);
        assert_eq!(store.len(), 0);
        assert!(store.get("aero/never-created").is_none());
    }

    #[test]
    fn try_set_unknown_fails() {
        let mut store = PropertyStore::new();
        assert!(matches!(
            store.try_set("aero/never-created", 3.0),
            Err(ModelError::UnknownProperty(_))
        ));
        store.get_or_create("aero/alpha-rad");
        assert!(store.try_set("aero/alpha-deg", 0.5).is_ok());
    }

    #[test]
    fn iteration_is_lexicographic() {
        let mut store = PropertyStore::new();
        store.get_or_create("velocities/mach");
        store.get_or_create("aero/alpha-rad");
        store.get_or_create("metrics/Sw-sqft");
        let keys: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["aero/alpha", "metrics/Sw", "velocities/mach"]);
    }
}
