pub mod errors;

pub use errors::{BackendError, ConversionError, ListError};
