//! Concrete transformer implementations.

pub mod fields;
pub mod map;

pub use fields::{DropFieldsTransformer, RenameFieldTransformer, SetFieldTransformer};
pub use map::MapTransformer;
