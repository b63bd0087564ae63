//! Concrete loader implementations.

pub mod buffered_vec;
pub mod console;
pub mod csv;
pub mod vec;

pub use buffered_vec::{BufferedVecLoader, BufferedVecLoaderHandle};
pub use console::ConsoleLoader;
pub use csv::CsvLoader;
pub use vec::{VecLoader, VecLoaderHandle};
