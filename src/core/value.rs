use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::EntityProperty;
use crate::core::{Result, TableError};

/// The closed set of host types a stored property may carry.
///
/// Fixed at compile time; anything outside this set is a data error on the
/// wire, never a silent coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdmType {
    Int32,
    Int64,
    Double,
    Boolean,
    Binary,
    Guid,
    DateTime,
    String,
}

impl EdmType {
    /// The exact tag string used by the storage service's data protocol.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Int32 => "Edm.Int32",
            Self::Int64 => "Edm.Int64",
            Self::Double => "Edm.Double",
            Self::Boolean => "Edm.Boolean",
            Self::Binary => "Edm.Binary",
            Self::Guid => "Edm.Guid",
            Self::DateTime => "Edm.DateTime",
            Self::String => "Edm.String",
        }
    }

    /// Zero representation used for null property slots.
    pub fn zero_value(&self) -> EntityValue {
        match self {
            Self::Int32 => EntityValue::Int32(0),
            Self::Int64 => EntityValue::Int64(0),
            Self::Double => EntityValue::Double(0.0),
            Self::Boolean => EntityValue::Boolean(false),
            Self::Binary => EntityValue::Binary(Vec::new()),
            Self::Guid => EntityValue::Guid(Uuid::nil()),
            Self::DateTime => EntityValue::DateTime(DateTime::<Utc>::UNIX_EPOCH),
            Self::String => EntityValue::String(String::new()),
        }
    }
}

impl fmt::Display for EdmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

/// A dynamically-typed property payload.
///
/// Always a tagged variant over the closed host-type set, never an untyped
/// blob, so round-trip fidelity stays checkable per type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityValue {
    Int32(i32),
    Int64(i64),
    Double(f64),
    Boolean(bool),
    Binary(Vec<u8>),
    Guid(Uuid),
    DateTime(DateTime<Utc>),
    String(String),
}

impl EntityValue {
    pub fn edm_type(&self) -> EdmType {
        match self {
            Self::Int32(_) => EdmType::Int32,
            Self::Int64(_) => EdmType::Int64,
            Self::Double(_) => EdmType::Double,
            Self::Boolean(_) => EdmType::Boolean,
            Self::Binary(_) => EdmType::Binary,
            Self::Guid(_) => EdmType::Guid,
            Self::DateTime(_) => EdmType::DateTime,
            Self::String(_) => EdmType::String,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.edm_type().wire_name()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(i) => Some(*i as i64),
            Self::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(f) => Some(*f),
            Self::Int32(i) => Some(*i as f64),
            Self::Int64(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for EntityValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            // NaN compares equal to NaN so round-tripped doubles stay equal
            (Self::Double(a), Self::Double(b)) => {
                (a.is_nan() && b.is_nan()) || a == b
            }
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Binary(a), Self::Binary(b)) => a == b,
            (Self::Guid(a), Self::Guid(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for EntityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::coercion::encode_wire_value(self))
    }
}

impl From<i32> for EntityValue {
    fn from(i: i32) -> Self {
        Self::Int32(i)
    }
}

impl From<i64> for EntityValue {
    fn from(i: i64) -> Self {
        Self::Int64(i)
    }
}

impl From<f64> for EntityValue {
    fn from(f: f64) -> Self {
        Self::Double(f)
    }
}

impl From<bool> for EntityValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Vec<u8>> for EntityValue {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(bytes)
    }
}

impl From<&[u8]> for EntityValue {
    fn from(bytes: &[u8]) -> Self {
        Self::Binary(bytes.to_vec())
    }
}

impl From<Uuid> for EntityValue {
    fn from(guid: Uuid) -> Self {
        Self::Guid(guid)
    }
}

impl From<DateTime<Utc>> for EntityValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::DateTime(ts)
    }
}

impl From<String> for EntityValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for EntityValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// Conversion between a host-typed field and a property slot.
///
/// Implemented for the eight supported host types and for `Option<T>`,
/// where `None` maps to a null slot carrying the inner type's tag.
/// The derive macro leans on this trait for both mapping directions.
pub trait PropertyValue: Sized {
    const EDM_TYPE: EdmType;

    fn to_property(&self) -> EntityProperty;

    fn from_property(prop: &EntityProperty) -> Result<Self>;
}

macro_rules! property_value_impl {
    ($host:ty, $variant:ident, $edm:ident) => {
        impl PropertyValue for $host {
            const EDM_TYPE: EdmType = EdmType::$edm;

            fn to_property(&self) -> EntityProperty {
                EntityProperty::new(EntityValue::$variant(self.clone()))
            }

            fn from_property(prop: &EntityProperty) -> Result<Self> {
                if prop.is_null() {
                    return Err(TableError::TypeMismatch(format!(
                        "null value for non-nullable {}",
                        EdmType::$edm
                    )));
                }
                match prop.value() {
                    EntityValue::$variant(v) => Ok(v.clone()),
                    other => Err(TableError::TypeMismatch(format!(
                        "expected {}, found {}",
                        EdmType::$edm,
                        other.type_name()
                    ))),
                }
            }
        }
    };
}

property_value_impl!(i32, Int32, Int32);
property_value_impl!(i64, Int64, Int64);
property_value_impl!(f64, Double, Double);
property_value_impl!(bool, Boolean, Boolean);
property_value_impl!(Vec<u8>, Binary, Binary);
property_value_impl!(Uuid, Guid, Guid);
property_value_impl!(DateTime<Utc>, DateTime, DateTime);
property_value_impl!(String, String, String);

impl<T: PropertyValue> PropertyValue for Option<T> {
    const EDM_TYPE: EdmType = T::EDM_TYPE;

    fn to_property(&self) -> EntityProperty {
        match self {
            Some(v) => v.to_property(),
            None => EntityProperty::null(T::EDM_TYPE),
        }
    }

    fn from_property(prop: &EntityProperty) -> Result<Self> {
        if prop.is_null() {
            return Ok(None);
        }
        T::from_property(prop).map(Some)
    }
}
