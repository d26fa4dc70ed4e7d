//! Write-path factory (typed instance → row) and its inverse.

use crate::core::{EntityValue, Result, TableError};
use crate::entity::TableRow;
use crate::schema::{TableEntity, role_map_for};

/// Convert a typed instance into a storage row.
///
/// Key resolution, independently per key: the explicit override if given,
/// else the role-mapped property's value, else `InvalidEntity`. Every
/// non-excluded property is copied into the bag with its declared type and
/// null flag; the instance itself is never mutated.
pub fn hydrate<T: TableEntity>(
    instance: &T,
    partition_key: Option<&str>,
    row_key: Option<&str>,
) -> Result<TableRow> {
    let roles = role_map_for::<T>()?;

    let pk = resolve_key(instance, partition_key, roles.partition_key(), "partition key")?;
    let rk = resolve_key(instance, row_key, roles.row_key(), "row key")?;

    let mut row = TableRow::new(pk, rk);
    for (name, _) in roles.regular() {
        let property = instance.property(name).ok_or_else(|| {
            TableError::InvalidEntity(format!(
                "schema lists property '{}' but the type exposes no value for it",
                name
            ))
        })?;
        row.set_property(*name, property);
    }

    Ok(row)
}

/// Reconstruct a typed instance from a row; the inverse of [`hydrate`].
/// Strictness follows field nullability, see
/// [`TableEntity::from_row`](crate::schema::TableEntity::from_row).
pub fn dehydrate<T: TableEntity>(row: &TableRow) -> Result<T> {
    T::from_row(row)
}

fn resolve_key<T: TableEntity>(
    instance: &T,
    explicit: Option<&str>,
    role_property: Option<&'static str>,
    role: &str,
) -> Result<String> {
    if let Some(key) = explicit {
        return Ok(key.to_string());
    }

    let name = role_property
        .ok_or_else(|| TableError::InvalidEntity(format!("no {} source", role)))?;
    let property = instance.property(name).ok_or_else(|| {
        TableError::InvalidEntity(format!("no value for {} property '{}'", role, name))
    })?;
    if property.is_null() {
        return Err(TableError::InvalidEntity(format!(
            "{} property '{}' is null",
            role, name
        )));
    }
    match property.value() {
        EntityValue::String(key) => Ok(key.clone()),
        other => Err(TableError::InvalidEntity(format!(
            "{} property '{}' must be a string, found {}",
            role,
            name,
            other.type_name()
        ))),
    }
}
