// ============================================================================
// TableMap Library
// ============================================================================
//
// Attribute-driven mapping between typed structs and schema-less table rows.
// A struct derives `TableEntity`, marks fields with `#[row(...)]` roles
// (partition_key, row_key, etag, timestamp, skip, extend), and `hydrate`
// turns instances into `TableRow` property bags the transport layer can
// ship to a wide-column store; `dehydrate` inverts that on read-back.

pub mod coercion;
pub mod core;
pub mod entity;
pub mod hydrator;
pub mod prelude;
pub mod schema;

// Re-export main types for convenience
pub use crate::coercion::resolve_host_type;
pub use crate::core::{
    EdmType, EntityProperty, EntityValue, PropertyMap, PropertyValue, Result, TableError,
};
pub use crate::entity::TableRow;
pub use crate::hydrator::{dehydrate, hydrate};
pub use crate::schema::{PropertySpec, RoleFlags, RoleMap, TableEntity, role_map_for};

// Derive macro implementing the TableEntity trait
pub use tablemap_derive::TableEntity;
