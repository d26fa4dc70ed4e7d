//! The closed, bidirectional table between wire type tags and host types,
//! plus the per-type wire text codec used on the read path.

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use uuid::Uuid;

use crate::core::{EdmType, EntityValue, Result, TableError};

lazy_static! {
    static ref WIRE_TYPES: HashMap<&'static str, EdmType> = {
        let mut table = HashMap::new();
        table.insert("Edm.Int32", EdmType::Int32);
        table.insert("Edm.Int64", EdmType::Int64);
        table.insert("Edm.Double", EdmType::Double);
        table.insert("Edm.Boolean", EdmType::Boolean);
        table.insert("Edm.Binary", EdmType::Binary);
        table.insert("Edm.Guid", EdmType::Guid);
        table.insert("Edm.DateTime", EdmType::DateTime);
        table.insert("Edm.String", EdmType::String);
        table
    };
}

/// Host type for a wire tag. An absent tag defaults to string; a present
/// tag outside the closed table is a hard data error, never a silent
/// string fallback.
pub fn resolve_host_type(tag: Option<&str>) -> Result<EdmType> {
    match tag {
        None => Ok(EdmType::String),
        Some(tag) => WIRE_TYPES
            .get(tag)
            .copied()
            .ok_or_else(|| TableError::UnknownWireType(tag.to_string())),
    }
}

/// Parse the wire text form of a value into its host representation.
pub fn parse_wire_value(edm_type: EdmType, raw: &str) -> Result<EntityValue> {
    let value = match edm_type {
        EdmType::Int32 => EntityValue::Int32(
            raw.parse::<i32>()
                .map_err(|err| parse_error(edm_type, raw, err))?,
        ),
        EdmType::Int64 => EntityValue::Int64(
            raw.parse::<i64>()
                .map_err(|err| parse_error(edm_type, raw, err))?,
        ),
        EdmType::Double => EntityValue::Double(
            raw.parse::<f64>()
                .map_err(|err| parse_error(edm_type, raw, err))?,
        ),
        EdmType::Boolean => EntityValue::Boolean(
            raw.parse::<bool>()
                .map_err(|err| parse_error(edm_type, raw, err))?,
        ),
        EdmType::Binary => EntityValue::Binary(
            STANDARD
                .decode(raw)
                .map_err(|err| parse_error(edm_type, raw, err))?,
        ),
        EdmType::Guid => EntityValue::Guid(
            Uuid::parse_str(raw).map_err(|err| parse_error(edm_type, raw, err))?,
        ),
        EdmType::DateTime => EntityValue::DateTime(
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|err| parse_error(edm_type, raw, err))?,
        ),
        EdmType::String => EntityValue::String(raw.to_string()),
    };
    Ok(value)
}

/// Inverse of [`parse_wire_value`]: the wire text form of a host value.
pub fn encode_wire_value(value: &EntityValue) -> String {
    match value {
        EntityValue::Int32(i) => i.to_string(),
        EntityValue::Int64(i) => i.to_string(),
        EntityValue::Double(f) => f.to_string(),
        EntityValue::Boolean(b) => b.to_string(),
        EntityValue::Binary(bytes) => STANDARD.encode(bytes),
        EntityValue::Guid(guid) => guid.to_string(),
        EntityValue::DateTime(ts) => ts.to_rfc3339(),
        EntityValue::String(s) => s.clone(),
    }
}

fn parse_error(edm_type: EdmType, raw: &str, err: impl std::fmt::Display) -> TableError {
    TableError::ParseError(format!("invalid {} value '{}': {}", edm_type, raw, err))
}
