use serde::{Deserialize, Serialize};

use crate::core::value::{EdmType, EntityValue};

/// A single typed property slot: payload, declared host type, null flag.
///
/// When `is_null` is set the payload holds the declared type's zero
/// representation, so absence of a value and "present but null" stay
/// distinguishable at the entity level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityProperty {
    value: EntityValue,
    edm_type: EdmType,
    is_null: bool,
}

impl EntityProperty {
    pub fn new(value: impl Into<EntityValue>) -> Self {
        let value = value.into();
        Self {
            edm_type: value.edm_type(),
            value,
            is_null: false,
        }
    }

    pub fn null(edm_type: EdmType) -> Self {
        Self {
            value: edm_type.zero_value(),
            edm_type,
            is_null: true,
        }
    }

    pub fn value(&self) -> &EntityValue {
        &self.value
    }

    pub fn edm_type(&self) -> EdmType {
        self.edm_type
    }

    pub fn is_null(&self) -> bool {
        self.is_null
    }

    /// Wire text form of the payload (base64 for binary, RFC 3339 for
    /// timestamps). Null slots encode as the zero value's text.
    pub fn wire_value(&self) -> String {
        crate::coercion::encode_wire_value(&self.value)
    }
}

/// Insertion-ordered property name → slot mapping.
///
/// Inserting under an existing name replaces the slot in place, keeping the
/// original position; last write wins. Lookup is positional over a small
/// vector, same shape as a schema column lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap {
    entries: Vec<(String, EntityProperty)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn find_index(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(entry, _)| entry == name)
    }

    pub fn insert(&mut self, name: impl Into<String>, property: EntityProperty) {
        let name = name.into();
        match self.find_index(&name) {
            Some(idx) => self.entries[idx].1 = property,
            None => self.entries.push((name, property)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&EntityProperty> {
        self.find_index(name).map(|idx| &self.entries[idx].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityProperty)> {
        self.entries.iter().map(|(name, prop)| (name.as_str(), prop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order_and_replaces_in_place() {
        let mut map = PropertyMap::new();
        map.insert("a", EntityProperty::new(1i32));
        map.insert("b", EntityProperty::new(2i32));
        map.insert("a", EntityProperty::new(3i32));

        let names: Vec<&str> = map.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(map.get("a").unwrap().value(), &EntityValue::Int32(3));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_null_slot_carries_zero_value() {
        let prop = EntityProperty::null(EdmType::String);
        assert!(prop.is_null());
        assert_eq!(prop.edm_type(), EdmType::String);
        assert_eq!(prop.value(), &EntityValue::String(String::new()));
    }
}
