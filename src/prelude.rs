//! Single-import surface for application code.
//!
//! Brings in the derive, the mapping entry points, and the value model —
//! everything a struct-to-row mapping needs day to day. Lower-level pieces
//! (the role scanner, the wire codec) stay behind their own modules.

pub use crate::{
    EdmType, EntityProperty, EntityValue, PropertyValue, Result, TableEntity, TableError,
    TableRow, dehydrate, hydrate,
};
