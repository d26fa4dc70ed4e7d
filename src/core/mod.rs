pub mod error;
pub mod types;
pub mod value;

pub use error::{Result, TableError};
pub use types::{EntityProperty, PropertyMap};
pub use value::{EdmType, EntityValue, PropertyValue};
