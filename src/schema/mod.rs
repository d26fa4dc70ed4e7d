pub mod scanner;

use serde::{Deserialize, Serialize};

use crate::core::{EdmType, EntityProperty, Result};
use crate::entity::TableRow;

pub use scanner::{RoleMap, role_map_for};

/// Storage roles a field can carry.
///
/// `partition_key`, `row_key`, `etag` and `timestamp` each imply exclusion
/// from the regular property bag; `excluded` on its own is the plain
/// "never serialized" marker. A single field may carry both key roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFlags {
    pub partition_key: bool,
    pub row_key: bool,
    pub etag: bool,
    pub timestamp: bool,
    pub excluded: bool,
}

impl RoleFlags {
    pub const NONE: RoleFlags = RoleFlags {
        partition_key: false,
        row_key: false,
        etag: false,
        timestamp: false,
        excluded: false,
    };

    /// Whether the field is kept out of the regular property bag, either
    /// explicitly or because it carries a role.
    pub fn is_excluded(&self) -> bool {
        self.partition_key || self.row_key || self.etag || self.timestamp || self.excluded
    }
}

/// Compile-time description of one mappable property.
///
/// `edm_type` is `None` only for plain-excluded fields, whose host type
/// never crosses the mapping boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub roles: RoleFlags,
    pub edm_type: Option<EdmType>,
}

/// A struct that maps to and from a storage row.
///
/// Implemented by `#[derive(TableEntity)]`. `schema()` lists properties in
/// base-first order when the struct embeds another entity via
/// `#[row(extend)]`; a redeclaration of the same property name in the
/// embedding struct overrides the embedded declaration entirely, role
/// included. That most-derived-wins precedence is part of the public
/// contract, not an implementation detail.
pub trait TableEntity: Sized + 'static {
    /// Property descriptors, base-first, unmerged.
    fn schema() -> Vec<PropertySpec>;

    /// Current slot for a named property, shadowing embedded declarations.
    /// `None` for unknown names and plain-excluded fields.
    fn property(&self, name: &str) -> Option<EntityProperty>;

    /// Reconstruct an instance from a row. Non-`Option` fields are strict:
    /// a missing property is `PropertyNotFound`, a null slot is
    /// `TypeMismatch`. `Option` fields map missing or null to `None`.
    fn from_row(row: &TableRow) -> Result<Self>;
}
