//! Concrete extractor implementations.

pub mod csv;
pub mod jsonl;
pub mod keyed_vec;
pub mod vec;

pub use csv::CsvExtractor;
pub use jsonl::JsonLinesExtractor;
pub use keyed_vec::KeyedVecExtractor;
pub use vec::VecExtractor;
