//! Concrete aggregator implementations.

pub mod batch;

pub use batch::BatchAggregator;
