use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;
use log::debug;

use crate::core::{EdmType, Result, TableError};
use crate::schema::{PropertySpec, TableEntity};

// Global role-map cache. Written once per type on first use, read-only
// afterwards; a first-use race recomputes the same deterministic map.
lazy_static! {
    static ref ROLE_MAPS: RwLock<HashMap<TypeId, Arc<RoleMap>>> = RwLock::new(HashMap::new());
}

/// Per-type classification of properties into key/etag/timestamp/regular
/// roles, computed once from the derive-emitted schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleMap {
    partition_key: Option<&'static str>,
    row_key: Option<&'static str>,
    etag: Option<&'static str>,
    timestamp: Option<&'static str>,
    regular: Vec<(&'static str, EdmType)>,
}

impl RoleMap {
    pub fn partition_key(&self) -> Option<&'static str> {
        self.partition_key
    }

    pub fn row_key(&self) -> Option<&'static str> {
        self.row_key
    }

    pub fn etag(&self) -> Option<&'static str> {
        self.etag
    }

    pub fn timestamp(&self) -> Option<&'static str> {
        self.timestamp
    }

    /// Bag-bound properties in declaration order, base properties first.
    pub fn regular(&self) -> &[(&'static str, EdmType)] {
        &self.regular
    }
}

/// Role map for `T`, computed on first use and cached for the process
/// lifetime. Misconfigured role attributes fail here on every call.
pub fn role_map_for<T: TableEntity>() -> Result<Arc<RoleMap>> {
    let key = TypeId::of::<T>();

    if let Some(map) = ROLE_MAPS.read()?.get(&key) {
        return Ok(Arc::clone(map));
    }

    let computed = Arc::new(compute_role_map(T::schema())?);
    debug!(
        "computed role map for {}: {} regular propert{}",
        std::any::type_name::<T>(),
        computed.regular.len(),
        if computed.regular.len() == 1 { "y" } else { "ies" }
    );

    let mut maps = ROLE_MAPS.write()?;
    let entry = maps.entry(key).or_insert(computed);
    Ok(Arc::clone(entry))
}

fn compute_role_map(specs: Vec<PropertySpec>) -> Result<RoleMap> {
    // Most-derived wins: a later redeclaration of the same name replaces
    // the earlier spec entirely, keeping the earlier position.
    let mut merged: Vec<PropertySpec> = Vec::new();
    for spec in specs {
        match merged.iter_mut().find(|existing| existing.name == spec.name) {
            Some(existing) => *existing = spec,
            None => merged.push(spec),
        }
    }

    let mut map = RoleMap::default();
    for spec in &merged {
        if spec.roles.partition_key {
            assign_key_role(&mut map.partition_key, spec, "PartitionKey")?;
        }
        if spec.roles.row_key {
            assign_key_role(&mut map.row_key, spec, "RowKey")?;
        }
        if spec.roles.etag && map.etag.is_none() {
            map.etag = Some(spec.name);
        }
        if spec.roles.timestamp && map.timestamp.is_none() {
            map.timestamp = Some(spec.name);
        }
        if !spec.roles.is_excluded() {
            if let Some(edm_type) = spec.edm_type {
                map.regular.push((spec.name, edm_type));
            }
        }
    }

    Ok(map)
}

fn assign_key_role(
    slot: &mut Option<&'static str>,
    spec: &PropertySpec,
    role: &str,
) -> Result<()> {
    if let Some(existing) = slot {
        return Err(TableError::InvalidEntity(format!(
            "duplicate {} role: declared on both '{}' and '{}'",
            role, existing, spec.name
        )));
    }
    if spec.edm_type != Some(EdmType::String) {
        return Err(TableError::InvalidEntity(format!(
            "{} property '{}' must be a string",
            role, spec.name
        )));
    }
    *slot = Some(spec.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::RoleFlags;

    fn spec(name: &'static str, roles: RoleFlags, edm_type: EdmType) -> PropertySpec {
        PropertySpec {
            name,
            roles,
            edm_type: Some(edm_type),
        }
    }

    #[test]
    fn test_regular_properties_keep_declaration_order() {
        let map = compute_role_map(vec![
            spec("First", RoleFlags::NONE, EdmType::String),
            spec("Second", RoleFlags::NONE, EdmType::Int32),
        ])
        .unwrap();
        assert_eq!(
            map.regular(),
            &[("First", EdmType::String), ("Second", EdmType::Int32)]
        );
        assert!(map.partition_key().is_none());
    }

    #[test]
    fn test_key_roles_leave_the_bag() {
        let pk = RoleFlags {
            partition_key: true,
            ..RoleFlags::NONE
        };
        let map = compute_role_map(vec![
            spec("Id", pk, EdmType::String),
            spec("Age", RoleFlags::NONE, EdmType::Int32),
        ])
        .unwrap();
        assert_eq!(map.partition_key(), Some("Id"));
        assert_eq!(map.regular(), &[("Age", EdmType::Int32)]);
    }

    #[test]
    fn test_duplicate_partition_key_is_invalid() {
        let pk = RoleFlags {
            partition_key: true,
            ..RoleFlags::NONE
        };
        let err = compute_role_map(vec![
            spec("A", pk, EdmType::String),
            spec("B", pk, EdmType::String),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::InvalidEntity(_)));
        assert!(err.to_string().contains("PartitionKey"));
    }

    #[test]
    fn test_non_string_key_is_invalid() {
        let rk = RoleFlags {
            row_key: true,
            ..RoleFlags::NONE
        };
        let err = compute_role_map(vec![spec("N", rk, EdmType::Int64)]).unwrap_err();
        assert!(matches!(err, TableError::InvalidEntity(_)));
    }

    #[test]
    fn test_redeclaration_overrides_role_and_position() {
        let skip = RoleFlags {
            excluded: true,
            ..RoleFlags::NONE
        };
        // base declares Name as regular, derived redeclares it excluded
        let map = compute_role_map(vec![
            spec("Name", RoleFlags::NONE, EdmType::String),
            spec("Age", RoleFlags::NONE, EdmType::Int32),
            spec("Name", skip, EdmType::String),
        ])
        .unwrap();
        assert_eq!(map.regular(), &[("Age", EdmType::Int32)]);
    }

    #[test]
    fn test_one_property_may_carry_both_key_roles() {
        let both = RoleFlags {
            partition_key: true,
            row_key: true,
            ..RoleFlags::NONE
        };
        let map = compute_role_map(vec![spec("Key", both, EdmType::String)]).unwrap();
        assert_eq!(map.partition_key(), Some("Key"));
        assert_eq!(map.row_key(), Some("Key"));
        assert!(map.regular().is_empty());
    }
}
