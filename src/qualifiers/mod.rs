//! Concrete qualifier implementations.

pub mod fn_qualifier;

pub use fn_qualifier::FnQualifier;
