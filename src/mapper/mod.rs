//! Conversion of raw backend items into media payloads
//!
//! Converters are plain functions keyed by backend kind, raw item shape and
//! target media type. They never perform I/O.

pub mod macros;
mod registry;
pub mod transforms;

pub use registry::{ConvertFn, ConverterKey, ConverterRegistry};
