use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coercion;
use crate::core::{EntityProperty, PropertyMap, Result, TableError};

/// The schema-less, storage-facing representation of one row.
///
/// Produced by [`hydrate`](crate::hydrate) on the write path and populated
/// property-by-property by the transport on the read path. The property bag
/// never contains key-, etag-, timestamp- or excluded-marked fields; etag
/// and timestamp arrive as row metadata instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    partition_key: String,
    row_key: String,
    etag: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    properties: PropertyMap,
}

impl TableRow {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            etag: None,
            timestamp: None,
            properties: PropertyMap::new(),
        }
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn set_etag(&mut self, etag: impl Into<String>) {
        self.etag = Some(etag.into());
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = Some(timestamp);
    }

    /// The regular property bag, in insertion order.
    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Slot for a named property. Absence (an excluded or nonexistent name)
    /// is `PropertyNotFound`, distinct from a present-but-null slot.
    pub fn property(&self, name: &str) -> Result<&EntityProperty> {
        self.properties
            .get(name)
            .ok_or_else(|| TableError::PropertyNotFound(name.to_string()))
    }

    /// Set or overwrite a named slot; last write for a name wins.
    pub fn set_property(&mut self, name: impl Into<String>, property: EntityProperty) {
        self.properties.insert(name, property);
    }

    /// Read-path ingestion of one pre-parsed wire tuple. The tag is resolved
    /// against the closed coercion table (absent tag means string, unknown
    /// tag is a hard failure), then the raw text is parsed into a typed
    /// slot. Null tuples skip parsing and store a null slot.
    pub fn set_wire_property(
        &mut self,
        name: impl Into<String>,
        type_tag: Option<&str>,
        raw: &str,
        is_null: bool,
    ) -> Result<()> {
        let edm_type = coercion::resolve_host_type(type_tag)?;
        let property = if is_null {
            EntityProperty::null(edm_type)
        } else {
            EntityProperty::new(coercion::parse_wire_value(edm_type, raw)?)
        };
        self.properties.insert(name, property);
        Ok(())
    }
}
